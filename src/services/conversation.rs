//! Conversation engine
//!
//! Drives the anketa and appeal forms: the entry guard, one step per user
//! message, and the single best-effort delivery to the admin chat.

use std::sync::Arc;
use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use crate::database::{FormStore, UserStore};
use crate::models::MenuKind;
use crate::models::{FormKind, Submission, User};
use crate::services::messenger::{Messenger, TextFormat};
use crate::services::notification::{NotificationService, Submitter};
use crate::state::{transition, CooldownDenial, CooldownPolicy, PendingForm, Transition, ValidationError};
use crate::utils::errors::{StarlyError, Result};
use crate::utils::logging::log_form_event;

/// Why a form could not be started, or the first question when it could
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started { prompt: &'static str },
    AlreadyFilling,
    CoolingDown(CooldownDenial),
    Banned { menu: MenuKind },
    Restricted { kind: FormKind, menu: MenuKind },
}

/// Result of one user message while a form may be open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// No form in progress
    Idle,
    Prompt(&'static str),
    Retry(ValidationError),
    Cancelled { kind: FormKind, menu: MenuKind },
    Submitted { kind: FormKind, menu: MenuKind },
    SubmissionFailed { kind: FormKind, menu: MenuKind },
}

#[derive(Clone)]
pub struct ConversationService {
    users: Arc<dyn UserStore>,
    forms: Arc<dyn FormStore>,
    messenger: Arc<dyn Messenger>,
    notifications: NotificationService,
    cooldown: CooldownPolicy,
    pending_ttl: Option<Duration>,
    admin_chat_id: i64,
}

impl ConversationService {
    pub fn new(
        users: Arc<dyn UserStore>,
        forms: Arc<dyn FormStore>,
        messenger: Arc<dyn Messenger>,
        notifications: NotificationService,
        cooldown: CooldownPolicy,
        pending_ttl: Option<Duration>,
        admin_chat_id: i64,
    ) -> Self {
        Self {
            users,
            forms,
            messenger,
            notifications,
            cooldown,
            pending_ttl,
            admin_chat_id,
        }
    }

    /// The user's open form, discarding it if it sat idle past the TTL
    pub async fn active_form(&self, user_id: i64) -> Result<Option<PendingForm>> {
        let Some(form) = self.forms.find(user_id).await? else {
            return Ok(None);
        };

        if form.is_expired(self.pending_ttl, Utc::now()) {
            debug!(user_id = user_id, kind = %form.kind(), "Discarding expired form");
            self.forms.delete(user_id).await?;
            return Ok(None);
        }

        Ok(Some(form))
    }

    /// Entry guard then a fresh form at its first step
    pub async fn start(&self, user_id: i64, kind: FormKind) -> Result<StartOutcome> {
        if self.active_form(user_id).await?.is_some() {
            debug!(user_id = user_id, "Start refused: form already open");
            return Ok(StartOutcome::AlreadyFilling);
        }

        let user = self
            .users
            .find(user_id)
            .await?
            .ok_or(StarlyError::UserNotFound { user_id })?;
        let now = Utc::now();

        if let Err(denial) = self.cooldown.check(&user, now) {
            debug!(user_id = user_id, remaining_minutes = denial.remaining_minutes(), "Start refused: cooling down");
            return Ok(StartOutcome::CoolingDown(denial));
        }

        let menu = MenuKind::for_user(Some(&user));
        if user.is_fully_banned() {
            return Ok(StartOutcome::Banned { menu });
        }
        if user.is_restricted_from(kind.feature()) {
            return Ok(StartOutcome::Restricted { kind, menu });
        }

        let form = PendingForm::new(user_id, kind, now);
        self.forms.save(&form).await?;
        log_form_event(user_id, kind.as_str(), "started");

        Ok(StartOutcome::Started {
            prompt: form.state.prompt(),
        })
    }

    /// Feed one message into the user's open form
    pub async fn handle_input(&self, user_id: i64, input: &str) -> Result<StepOutcome> {
        let Some(mut form) = self.active_form(user_id).await? else {
            return Ok(StepOutcome::Idle);
        };
        let kind = form.kind();

        match transition(form.state.clone(), input) {
            Transition::Advance(next) => {
                let prompt = next.prompt();
                log_form_event(user_id, kind.as_str(), next.step());
                form.advance(next, Utc::now());
                self.forms.save(&form).await?;
                Ok(StepOutcome::Prompt(prompt))
            }
            Transition::Retry { error, .. } => {
                debug!(user_id = user_id, step = form.state.step(), error = %error, "Form input rejected");
                Ok(StepOutcome::Retry(error))
            }
            Transition::Cancelled => {
                self.forms.delete(user_id).await?;
                log_form_event(user_id, kind.as_str(), "cancelled");
                let menu = self.menu_for(user_id).await?;
                Ok(StepOutcome::Cancelled { kind, menu })
            }
            Transition::Submit(submission) => self.submit(user_id, submission).await,
        }
    }

    /// Drop the user's open form, returning its kind when there was one
    pub async fn cancel(&self, user_id: i64) -> Result<Option<FormKind>> {
        let Some(form) = self.active_form(user_id).await? else {
            return Ok(None);
        };

        self.forms.delete(user_id).await?;
        log_form_event(user_id, form.kind().as_str(), "cancelled");
        Ok(Some(form.kind()))
    }

    async fn submit(&self, user_id: i64, submission: Submission) -> Result<StepOutcome> {
        let kind = submission.kind();
        let user = self.users.find(user_id).await?;
        let submitter = Submitter {
            user_id,
            handle: self.messenger.lookup_handle(user_id).await,
            full_name: user.as_ref().map(User::display_name).unwrap_or_default(),
        };
        let text = self.notifications.format_submission(&submitter, &submission);

        let delivery = self
            .messenger
            .send_text(self.admin_chat_id, &text, TextFormat::Html, None)
            .await;

        self.forms.delete(user_id).await?;
        let menu = MenuKind::for_user(user.as_ref());

        match delivery {
            Ok(()) => {
                self.users.record_submission(user_id, kind, Utc::now()).await?;
                info!(user_id = user_id, kind = %kind, "Form delivered to admin chat");
                Ok(StepOutcome::Submitted { kind, menu })
            }
            Err(e) => {
                warn!(user_id = user_id, kind = %kind, error = %e, "Failed to deliver form to admin chat");
                Ok(StepOutcome::SubmissionFailed { kind, menu })
            }
        }
    }

    async fn menu_for(&self, user_id: i64) -> Result<MenuKind> {
        let user = self.users.find(user_id).await?;
        Ok(MenuKind::for_user(user.as_ref()))
    }
}

