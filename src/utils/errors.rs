//! Error handling for StarlyBot
//!
//! This module defines the main error type used throughout the bot
//! together with its recoverability and severity classification.

use thiserror::Error;

/// Main error type for StarlyBot
#[derive(Error, Debug)]
pub enum StarlyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("No user with handle @{handle}")]
    HandleNotFound { handle: String },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported content type: {0}")]
    UnsupportedContent(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for StarlyBot operations
pub type Result<T> = std::result::Result<T, StarlyError>;

impl StarlyError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            StarlyError::Database(_) => false,
            StarlyError::Migration(_) => false,
            StarlyError::Telegram(_) => true,
            StarlyError::Config(_) => false,
            StarlyError::ConfigSource(_) => false,
            StarlyError::PermissionDenied(_) => false,
            StarlyError::UserNotFound { .. } => false,
            StarlyError::HandleNotFound { .. } => false,
            StarlyError::InvalidStateTransition { .. } => false,
            StarlyError::InvalidInput(_) => false,
            StarlyError::UnsupportedContent(_) => false,
            StarlyError::Delivery(_) => true,
            StarlyError::Io(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StarlyError::Database(_) => ErrorSeverity::Critical,
            StarlyError::Migration(_) => ErrorSeverity::Critical,
            StarlyError::Config(_) | StarlyError::ConfigSource(_) => ErrorSeverity::Critical,
            StarlyError::PermissionDenied(_) => ErrorSeverity::Warning,
            StarlyError::UnsupportedContent(_) => ErrorSeverity::Warning,
            StarlyError::Delivery(_) => ErrorSeverity::Warning,
            StarlyError::InvalidInput(_)
            | StarlyError::UserNotFound { .. }
            | StarlyError::HandleNotFound { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
