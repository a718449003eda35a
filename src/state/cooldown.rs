//! Resubmission cool-down
//!
//! Both form kinds share one two-tier window. Within the base window after
//! the latest submission everything is refused. If the latest submission
//! itself came within the repeat window of the one before it, the refusal
//! extends to the end of the repeat window.

use chrono::{DateTime, Duration, Utc};
use crate::config::FormsConfig;
use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    pub base: Duration,
    pub repeat: Duration,
}

/// A refused start, with the remaining wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDenial {
    Base { remaining: Duration },
    Repeat { remaining: Duration },
}

impl CooldownDenial {
    pub fn remaining(&self) -> Duration {
        match self {
            CooldownDenial::Base { remaining } | CooldownDenial::Repeat { remaining } => *remaining,
        }
    }

    /// Whole minutes left, rounded up and never below one
    pub fn remaining_minutes(&self) -> i64 {
        let seconds = self.remaining().num_seconds().max(1);
        (seconds + 59) / 60
    }
}

impl CooldownPolicy {
    pub fn new(base: Duration, repeat: Duration) -> Self {
        Self { base, repeat }
    }

    pub fn from_config(config: &FormsConfig) -> Self {
        Self::new(
            Duration::minutes(config.cooldown_minutes),
            Duration::minutes(config.repeat_cooldown_minutes),
        )
    }

    pub fn check(&self, user: &User, now: DateTime<Utc>) -> Result<(), CooldownDenial> {
        let Some(latest) = user.latest_submission() else {
            return Ok(());
        };
        let since_latest = now - latest;

        if since_latest < self.base {
            return Err(CooldownDenial::Base {
                remaining: self.base - since_latest,
            });
        }

        if let Some(previous) = user.prev_submission_time {
            let burst = latest - previous < self.repeat;
            if burst && since_latest < self.repeat {
                return Err(CooldownDenial::Repeat {
                    remaining: self.repeat - since_latest,
                });
            }
        }

        Ok(())
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::new(Duration::minutes(3), Duration::minutes(20))
    }
}
