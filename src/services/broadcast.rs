//! Broadcast dispatcher
//!
//! Resolves a cohort, drops everyone who opted out or is banned, then sends
//! the payload to each recipient independently. A failed recipient is
//! counted and logged; it never stops the rest of the batch.

use std::num::NonZeroU32;
use std::sync::Arc;
use futures::stream::{self, StreamExt};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::{info, warn};
use crate::config::BroadcastConfig;
use crate::database::UserStore;
use crate::models::{Payload, UserFilter, UserRef};
use crate::services::messenger::Messenger;
use crate::utils::errors::{StarlyError, Result};

/// Who a cohort broadcast goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cohort {
    /// Everyone who has not opted out
    Subscribers,
    Squad,
    City,
    /// Squad or city
    Starly,
}

impl Cohort {
    pub fn filter(&self) -> UserFilter {
        match self {
            Cohort::Subscribers => UserFilter::Subscribers,
            Cohort::Squad => UserFilter::Squad,
            Cohort::City => UserFilter::City,
            Cohort::Starly => UserFilter::Starly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.filter().as_str()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

impl BroadcastReport {
    pub fn total(&self) -> usize {
        self.sent + self.failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    NoRecipients,
    Completed(BroadcastReport),
}

/// Result of a send to one named user or chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetedOutcome {
    Delivered,
    NotFound,
    Banned,
    OptedOut,
    Failed(String),
}

#[derive(Clone)]
pub struct BroadcastService {
    users: Arc<dyn UserStore>,
    messenger: Arc<dyn Messenger>,
    limiter: Arc<DefaultDirectRateLimiter>,
    concurrency: usize,
}

impl BroadcastService {
    pub fn new(users: Arc<dyn UserStore>, messenger: Arc<dyn Messenger>, config: &BroadcastConfig) -> Result<Self> {
        let rate = NonZeroU32::new(config.messages_per_second).ok_or_else(|| {
            StarlyError::Config("Broadcast rate must be greater than 0".to_string())
        })?;

        Ok(Self {
            users,
            messenger,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
            concurrency: config.concurrency.max(1),
        })
    }

    /// Eligible members of a cohort
    pub async fn recipients(&self, cohort: Cohort) -> Result<Vec<i64>> {
        let users = self.users.list(cohort.filter()).await?;

        Ok(users
            .into_iter()
            .filter(|user| user.is_broadcast_eligible())
            .map(|user| user.user_id)
            .collect())
    }

    pub async fn broadcast(&self, cohort: Cohort, payload: &Payload) -> Result<BroadcastOutcome> {
        let recipients = self.recipients(cohort).await?;
        if recipients.is_empty() {
            info!(cohort = cohort.as_str(), "Broadcast skipped: no recipients");
            return Ok(BroadcastOutcome::NoRecipients);
        }

        info!(
            cohort = cohort.as_str(),
            recipients = recipients.len(),
            kind = payload.kind(),
            "Starting broadcast"
        );
        Ok(BroadcastOutcome::Completed(self.deliver_all(recipients, payload).await))
    }

    /// Send to every recipient, at most `concurrency` at a time under the rate limit
    pub async fn deliver_all(&self, recipients: Vec<i64>, payload: &Payload) -> BroadcastReport {
        let results: Vec<bool> = stream::iter(recipients)
            .map(|chat_id| async move {
                self.limiter.until_ready().await;
                match self.messenger.send_payload(chat_id, payload).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(chat_id = chat_id, kind = payload.kind(), error = %e, "Broadcast delivery failed");
                        false
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let sent = results.iter().filter(|delivered| **delivered).count();
        BroadcastReport {
            sent,
            failed: results.len() - sent,
        }
    }

    /// Send to one user, refusing with a specific reason when they are not eligible
    pub async fn send_to_user(&self, target: &UserRef, payload: &Payload) -> Result<TargetedOutcome> {
        let user = match target {
            UserRef::Id(user_id) => self.users.find(*user_id).await?,
            UserRef::Handle(handle) => self.users.find_by_username(handle).await?,
        };

        let Some(user) = user else {
            return Ok(TargetedOutcome::NotFound);
        };
        if user.is_fully_banned() {
            return Ok(TargetedOutcome::Banned);
        }
        if !user.can_receive_broadcast {
            return Ok(TargetedOutcome::OptedOut);
        }

        Ok(self.send_once(user.user_id, payload).await)
    }

    /// Send to an arbitrary chat without eligibility checks
    pub async fn send_to_chat(&self, chat_id: i64, payload: &Payload) -> TargetedOutcome {
        self.send_once(chat_id, payload).await
    }

    async fn send_once(&self, chat_id: i64, payload: &Payload) -> TargetedOutcome {
        self.limiter.until_ready().await;
        match self.messenger.send_payload(chat_id, payload).await {
            Ok(()) => TargetedOutcome::Delivered,
            Err(e) => {
                warn!(chat_id = chat_id, kind = payload.kind(), error = %e, "Targeted delivery failed");
                TargetedOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cohort_filters() {
        assert_eq!(Cohort::Subscribers.filter(), UserFilter::Subscribers);
        assert_eq!(Cohort::Starly.as_str(), "starly");
    }

    #[test]
    fn test_report_total() {
        let report = BroadcastReport { sent: 3, failed: 2 };
        assert_eq!(report.total(), 5);
    }
}
