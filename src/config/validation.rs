//! Configuration validation module
//!
//! Every setting the bot cannot run without is checked here before anything
//! connects to Telegram or the database.

use crate::utils::errors::{StarlyError, Result};
use super::Settings;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_forms_config(&settings.forms)?;
    validate_broadcast_config(&settings.broadcast)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(StarlyError::Config(
            "Bot token is required (BOT_TOKEN)".to_string()
        ));
    }

    if config.admin_ids.is_empty() {
        return Err(StarlyError::Config(
            "At least one admin ID must be configured (ADMIN_IDS)".to_string()
        ));
    }

    if config.admin_chat_id == 0 {
        return Err(StarlyError::Config(
            "Admin chat ID is required (ADMIN_CHAT_ID)".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(StarlyError::Config(
            "Database URL is required (DATABASE_URL)".to_string()
        ));
    }

    if config.key.is_empty() {
        return Err(StarlyError::Config(
            "Database key is required (DATABASE_KEY)".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(StarlyError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(StarlyError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate form timing configuration
fn validate_forms_config(config: &super::FormsConfig) -> Result<()> {
    if config.cooldown_minutes < 0 || config.repeat_cooldown_minutes < 0 {
        return Err(StarlyError::Config(
            "Cooldowns cannot be negative".to_string()
        ));
    }

    if config.repeat_cooldown_minutes < config.cooldown_minutes {
        return Err(StarlyError::Config(
            "Repeat cooldown must not be shorter than the base cooldown".to_string()
        ));
    }

    if config.pending_ttl_minutes < 0 {
        return Err(StarlyError::Config(
            "Pending form TTL cannot be negative".to_string()
        ));
    }

    if config.cleanup_interval_seconds == 0 {
        return Err(StarlyError::Config(
            "Cleanup interval must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate broadcast configuration
fn validate_broadcast_config(config: &super::BroadcastConfig) -> Result<()> {
    if config.messages_per_second == 0 {
        return Err(StarlyError::Config(
            "Broadcast rate must be greater than 0".to_string()
        ));
    }

    if config.concurrency == 0 {
        return Err(StarlyError::Config(
            "Broadcast concurrency must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if !LOG_LEVELS.contains(&config.level.to_lowercase().as_str()) {
        return Err(StarlyError::Config(format!(
            "Invalid log level '{}'. Must be one of: {}",
            config.level,
            LOG_LEVELS.join(", ")
        )));
    }

    if matches!(config.file_path.as_deref(), Some("")) {
        return Err(StarlyError::Config(
            "Log file path cannot be empty when set".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "12345:token".to_string();
        settings.bot.admin_ids = vec![1];
        settings.bot.admin_chat_id = -100500;
        settings.database.url = "postgresql://localhost/starly".to_string();
        settings.database.key = "secret".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let mut settings = valid_settings();
        settings.bot.token.clear();
        assert_matches!(validate_settings(&settings), Err(StarlyError::Config(msg)) if msg.contains("token"));
    }

    #[test]
    fn test_missing_admin_chat_is_rejected() {
        let mut settings = valid_settings();
        settings.bot.admin_chat_id = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_missing_database_key_is_rejected() {
        let mut settings = valid_settings();
        settings.database.key.clear();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_zero_broadcast_rate_is_rejected() {
        let mut settings = valid_settings();
        settings.broadcast.messages_per_second = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let mut settings = valid_settings();
        settings.logging.level = "loud".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
