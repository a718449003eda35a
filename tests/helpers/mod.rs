//! Test helpers module
//!
//! In-memory stores, a recording messenger and data builders so service
//! flows run without Postgres or the Telegram API.

#![allow(dead_code)]

pub mod memory;
pub mod messenger;
pub mod test_data;

pub use memory::*;
pub use messenger::*;
pub use test_data::*;
