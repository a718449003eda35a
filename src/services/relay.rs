//! Admin reply relay
//!
//! An admin answers a submission by replying to its notification in the
//! admin chat; the reply text is forwarded to the user who submitted it.

use std::sync::Arc;
use tracing::{info, warn};
use crate::database::UserStore;
use crate::services::messenger::{Messenger, TextFormat};
use crate::services::notification::NotificationService;
use crate::utils::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The replied-to message carries no user id
    NotANotification,
    UserBanned { user_id: i64 },
    Delivered { user_id: i64 },
    Failed { user_id: i64, reason: String },
}

#[derive(Clone)]
pub struct ReplyRelay {
    users: Arc<dyn UserStore>,
    messenger: Arc<dyn Messenger>,
    notifications: NotificationService,
}

impl ReplyRelay {
    pub fn new(
        users: Arc<dyn UserStore>,
        messenger: Arc<dyn Messenger>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            users,
            messenger,
            notifications,
        }
    }

    pub async fn relay(&self, admin_id: i64, notification: &str, reply: &str) -> Result<RelayOutcome> {
        let Some(target) = self.notifications.parse_reply_target(notification) else {
            return Ok(RelayOutcome::NotANotification);
        };
        let user_id = target.user_id;

        if let Some(user) = self.users.find(user_id).await? {
            if user.is_fully_banned() {
                warn!(admin_id = admin_id, user_id = user_id, "Reply not relayed: user is banned");
                return Ok(RelayOutcome::UserBanned { user_id });
            }
        }

        let text = self.notifications.format_admin_reply(target.kind, reply);
        match self.messenger.send_text(user_id, &text, TextFormat::Html, None).await {
            Ok(()) => {
                info!(admin_id = admin_id, user_id = user_id, kind = %target.kind, "Admin reply relayed");
                Ok(RelayOutcome::Delivered { user_id })
            }
            Err(e) => {
                warn!(admin_id = admin_id, user_id = user_id, error = %e, "Failed to relay admin reply");
                Ok(RelayOutcome::Failed {
                    user_id,
                    reason: e.to_string(),
                })
            }
        }
    }
}
