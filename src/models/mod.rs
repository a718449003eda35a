//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod form;
pub mod instance;
pub mod payload;
pub mod menu;

// Re-export commonly used models
pub use user::{User, RegisterUserRequest, Feature, Membership, UserFilter, UserRef};
pub use form::{FormKind, Submission};
pub use instance::BotInstance;
pub use payload::{Media, Payload};
pub use menu::{Keyboard, MenuKind, CANCEL_TOKEN};
