//! Conversation state
//!
//! Form state machines, field validators, the resubmission cool-down and
//! expiry of abandoned forms.

pub mod context;
pub mod cooldown;
pub mod scenarios;
pub mod storage;
pub mod validation;

pub use context::PendingForm;
pub use cooldown::{CooldownDenial, CooldownPolicy};
pub use scenarios::{transition, is_cancel, AnketaState, AppealState, FormState, Transition, CANCEL_TOKEN};
pub use storage::FormCleanupManager;
pub use validation::ValidationError;
