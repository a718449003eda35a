//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod broadcast;
pub mod conversation;
pub mod messenger;
pub mod moderation;
pub mod notification;
pub mod relay;
pub mod user;

// Re-export commonly used services
pub use auth::{AuthService, CommandFamily, Denial};
pub use broadcast::{BroadcastOutcome, BroadcastReport, BroadcastService, Cohort, TargetedOutcome};
pub use conversation::{ConversationService, StartOutcome, StepOutcome};
pub use messenger::{Messenger, TelegramMessenger, TextFormat};
pub use moderation::ModerationService;
pub use notification::{NotificationService, ReplyTarget, Submitter};
pub use relay::{RelayOutcome, ReplyRelay};
pub use user::UserService;

use std::sync::Arc;
use chrono::Duration;
use crate::config::settings::Settings;
use crate::database::{FormStore, UserStore};
use crate::state::CooldownPolicy;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub conversation_service: ConversationService,
    pub moderation_service: ModerationService,
    pub broadcast_service: BroadcastService,
    pub reply_relay: ReplyRelay,
    pub messenger: Arc<dyn Messenger>,
    pub settings: Settings,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(
        settings: Settings,
        users: Arc<dyn UserStore>,
        forms: Arc<dyn FormStore>,
        messenger: Arc<dyn Messenger>,
    ) -> Result<Self> {
        let notification_service = NotificationService::new()?;
        let pending_ttl = match settings.forms.pending_ttl_minutes {
            0 => None,
            minutes => Some(Duration::minutes(minutes)),
        };

        let conversation_service = ConversationService::new(
            users.clone(),
            forms,
            messenger.clone(),
            notification_service.clone(),
            CooldownPolicy::from_config(&settings.forms),
            pending_ttl,
            settings.bot.admin_chat_id,
        );
        let moderation_service = ModerationService::new(
            users.clone(),
            messenger.clone(),
            settings.moderation.notify_users,
        );
        let broadcast_service = BroadcastService::new(users.clone(), messenger.clone(), &settings.broadcast)?;
        let reply_relay = ReplyRelay::new(users.clone(), messenger.clone(), notification_service);

        Ok(Self {
            user_service: UserService::new(users),
            auth_service: AuthService::new(&settings.bot.admin_ids),
            conversation_service,
            moderation_service,
            broadcast_service,
            reply_relay,
            messenger,
            settings,
        })
    }
}
