//! Pending form context
//!
//! A user has at most one form in progress across both kinds.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use crate::models::FormKind;
use super::scenarios::FormState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingForm {
    pub user_id: i64,
    pub state: FormState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PendingForm {
    /// Start a fresh form at its first step
    pub fn new(user_id: i64, kind: FormKind, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            state: FormState::initial(kind),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.state.kind()
    }

    /// Move to a new state, bumping the activity timestamp
    pub fn advance(&mut self, state: FormState, now: DateTime<Utc>) {
        self.state = state;
        self.updated_at = now;
    }

    /// Idle for longer than `ttl`. A `None` ttl never expires.
    pub fn is_expired(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        match ttl {
            Some(ttl) => now - self.updated_at > ttl,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::scenarios::AnketaState;

    #[test]
    fn test_new_form_starts_at_first_step() {
        let now = Utc::now();
        let form = PendingForm::new(5, FormKind::Anketa, now);
        assert_eq!(form.state, FormState::Anketa(AnketaState::Name));
        assert_eq!(form.kind(), FormKind::Anketa);
    }

    #[test]
    fn test_expiry_uses_last_activity() {
        let start = Utc::now() - Duration::hours(3);
        let mut form = PendingForm::new(5, FormKind::Appeal, start);
        let now = Utc::now();
        assert!(form.is_expired(Some(Duration::hours(1)), now));
        assert!(!form.is_expired(None, now));

        form.advance(form.state.clone(), now - Duration::minutes(10));
        assert!(!form.is_expired(Some(Duration::hours(1)), now));
    }
}
