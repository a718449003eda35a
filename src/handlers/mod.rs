//! Bot handlers module
//!
//! Telegram update handlers organized by type:
//! - Command handlers for slash commands
//! - Callback handlers for inline keyboard presses
//! - Message handlers for menu buttons, form input and admin replies

pub mod callbacks;
pub mod commands;
pub mod forms;
pub mod messages;

pub use callbacks::handle_callback_query;
pub use commands::{handle_command, Command};
pub use messages::handle_message;
