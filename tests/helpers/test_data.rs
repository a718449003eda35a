//! Test data builders

use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};

use StarlyBot::config::Settings;
use StarlyBot::models::{RegisterUserRequest, User};
use StarlyBot::services::ServiceFactory;

use super::{MemoryFormStore, MemoryUserStore, RecordingMessenger};

pub const ADMIN_ID: i64 = 1000;
pub const ADMIN_CHAT_ID: i64 = -100500;

/// Settings with one admin and a fast broadcast limiter
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.bot.token = "12345:test_token".to_string();
    settings.bot.admin_ids = vec![ADMIN_ID];
    settings.bot.admin_chat_id = ADMIN_CHAT_ID;
    settings.database.url = "postgres://localhost/starly_test".to_string();
    settings.broadcast.messages_per_second = 1000;
    settings
}

pub fn create_test_user(user_id: i64, username: Option<&str>, first_name: &str) -> User {
    User::new(
        RegisterUserRequest {
            user_id,
            username: username.map(str::to_string),
            first_name: Some(first_name.to_string()),
            last_name: None,
        },
        Utc::now(),
    )
}

/// A user with a fixed registration time, for ordering checks
pub fn create_user_registered_at(user_id: i64, username: Option<&str>, created_at: DateTime<Utc>) -> User {
    let mut user = create_test_user(user_id, username, "Test");
    user.created_at = created_at;
    user
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    Utc::now() - Duration::minutes(minutes)
}

/// Services wired to in-memory stores and a recording messenger
pub struct TestContext {
    pub users: Arc<MemoryUserStore>,
    pub forms: Arc<MemoryFormStore>,
    pub messenger: Arc<RecordingMessenger>,
    pub services: ServiceFactory,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let forms = Arc::new(MemoryFormStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let services = ServiceFactory::new(settings, users.clone(), forms.clone(), messenger.clone())
            .expect("Failed to build services");

        Self {
            users,
            forms,
            messenger,
            services,
        }
    }

    /// Seed a plain user and return their id
    pub async fn seed_user(&self, user_id: i64, username: Option<&str>) -> i64 {
        self.users.insert(create_test_user(user_id, username, "Test")).await;
        user_id
    }
}
