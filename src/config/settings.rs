//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::path::Path;
use serde::{Deserialize, Serialize};
use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub forms: FormsConfig,
    pub broadcast: BroadcastConfig,
    pub moderation: ModerationConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    pub admin_ids: Vec<i64>,
    /// Chat that receives anketa and appeal submissions
    pub admin_chat_id: i64,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// Access key, used as the connection password
    pub key: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Conversation form timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormsConfig {
    pub cooldown_minutes: i64,
    pub repeat_cooldown_minutes: i64,
    /// Idle pending forms older than this are discarded; 0 keeps them forever
    pub pending_ttl_minutes: i64,
    pub cleanup_interval_seconds: u64,
}

/// Broadcast pacing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BroadcastConfig {
    pub messages_per_second: u32,
    pub concurrency: usize,
}

/// Moderation behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModerationConfig {
    pub notify_users: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub json: bool,
}

/// Plain environment variables accepted for compatibility with older deployments.
const LEGACY_TOKEN: &str = "BOT_TOKEN";
const LEGACY_DATABASE_URL: [&str; 2] = ["DATABASE_URL", "SUPABASE_URL"];
const LEGACY_DATABASE_KEY: [&str; 2] = ["DATABASE_KEY", "SUPABASE_KEY"];
const LEGACY_ADMIN_IDS: &str = "ADMIN_IDS";
const LEGACY_ADMIN_CHAT_ID: &str = "ADMIN_CHAT_ID";

impl Settings {
    /// Load settings from `config.toml` (optional) and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load(Path::new("config"))
    }

    /// Load settings with an explicit configuration file base path
    pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = Self::defaults(Config::builder())?
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("STARLY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bot.admin_ids")
                    .try_parsing(true),
            );

        let builder = Self::legacy_overrides(builder)?;

        builder.build()?.try_deserialize()
    }

    fn defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let defaults = Settings::default();
        builder
            .set_default("bot.token", defaults.bot.token)?
            .set_default("bot.admin_ids", Vec::<i64>::new())?
            .set_default("bot.admin_chat_id", defaults.bot.admin_chat_id)?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.key", defaults.database.key)?
            .set_default("database.max_connections", defaults.database.max_connections)?
            .set_default("database.min_connections", defaults.database.min_connections)?
            .set_default(
                "database.acquire_timeout_seconds",
                defaults.database.acquire_timeout_seconds,
            )?
            .set_default("forms.cooldown_minutes", defaults.forms.cooldown_minutes)?
            .set_default("forms.repeat_cooldown_minutes", defaults.forms.repeat_cooldown_minutes)?
            .set_default("forms.pending_ttl_minutes", defaults.forms.pending_ttl_minutes)?
            .set_default(
                "forms.cleanup_interval_seconds",
                defaults.forms.cleanup_interval_seconds,
            )?
            .set_default(
                "broadcast.messages_per_second",
                defaults.broadcast.messages_per_second,
            )?
            .set_default("broadcast.concurrency", defaults.broadcast.concurrency as u64)?
            .set_default("moderation.notify_users", defaults.moderation.notify_users)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.json", defaults.logging.json)
    }

    fn legacy_overrides(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let admin_ids = match env_var(LEGACY_ADMIN_IDS) {
            Some(raw) => Some(
                parse_admin_ids(&raw).map_err(|e| config::ConfigError::Message(e))?,
            ),
            None => None,
        };

        let admin_chat_id = match env_var(LEGACY_ADMIN_CHAT_ID) {
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|_| {
                config::ConfigError::Message(format!("{} must be a chat id, got '{}'", LEGACY_ADMIN_CHAT_ID, raw))
            })?),
            None => None,
        };

        builder
            .set_override_option("bot.token", env_var(LEGACY_TOKEN))?
            .set_override_option("database.url", first_env_var(&LEGACY_DATABASE_URL))?
            .set_override_option("database.key", first_env_var(&LEGACY_DATABASE_KEY))?
            .set_override_option("bot.admin_ids", admin_ids)?
            .set_override_option("bot.admin_chat_id", admin_chat_id)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::StarlyError> {
        super::validation::validate_settings(self)
    }

    /// Check whether a Telegram user is on the admin allow-list
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.bot.admin_ids.contains(&user_id)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_ids: vec![],
                admin_chat_id: 0,
            },
            database: DatabaseConfig {
                url: String::new(),
                key: String::new(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
            },
            forms: FormsConfig {
                cooldown_minutes: 3,
                repeat_cooldown_minutes: 20,
                pending_ttl_minutes: 1440,
                cleanup_interval_seconds: 600,
            },
            broadcast: BroadcastConfig {
                messages_per_second: 25,
                concurrency: 4,
            },
            moderation: ModerationConfig {
                notify_users: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                json: false,
            },
        }
    }
}

/// Parse a comma separated admin list such as `"123, 456"`
pub fn parse_admin_ids(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| format!("Invalid admin id '{}'", part))
        })
        .collect()
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn first_env_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env_var(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_ids() {
        assert_eq!(parse_admin_ids("1, 2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_admin_ids("").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_admin_ids("42,").unwrap(), vec![42]);
        assert!(parse_admin_ids("1,abc").is_err());
    }

    #[test]
    fn test_default_timings() {
        let settings = Settings::default();
        assert_eq!(settings.forms.cooldown_minutes, 3);
        assert_eq!(settings.forms.repeat_cooldown_minutes, 20);
        assert!(settings.moderation.notify_users);
    }

    #[test]
    fn test_is_admin() {
        let mut settings = Settings::default();
        settings.bot.admin_ids = vec![10, 20];
        assert!(settings.is_admin(20));
        assert!(!settings.is_admin(30));
    }
}
