//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod form;
pub mod instance;

// Re-export repositories
pub use user::UserRepository;
pub use form::FormRepository;
pub use instance::InstanceRepository;
