//! Moderation service
//!
//! Admin mutations of user flags. Every operation takes a [`UserRef`] and
//! resolves it first; an unknown handle never mutates anything.

use std::sync::Arc;
use tracing::warn;
use crate::database::UserStore;
use crate::models::{Keyboard, MenuKind};
use crate::models::{Feature, Membership, User, UserFilter, UserRef};
use crate::services::messenger::{Messenger, TextFormat};
use crate::utils::errors::{StarlyError, Result};
use crate::utils::helpers::format_short_timestamp;

const BANNED_NOTICE: &str = "🚫 Вы заблокированы администратором.";
const UNBANNED_NOTICE: &str = "✅ Вы разблокированы! Все функции бота снова доступны.";
const EMPTY_LIST: &str = "Список пуст.";

#[derive(Clone)]
pub struct ModerationService {
    users: Arc<dyn UserStore>,
    messenger: Arc<dyn Messenger>,
    notify_users: bool,
}

impl ModerationService {
    pub fn new(users: Arc<dyn UserStore>, messenger: Arc<dyn Messenger>, notify_users: bool) -> Self {
        Self {
            users,
            messenger,
            notify_users,
        }
    }

    /// Numeric id for a command argument
    pub async fn resolve(&self, target: &UserRef) -> Result<i64> {
        match target {
            UserRef::Id(user_id) => Ok(*user_id),
            UserRef::Handle(handle) => self
                .users
                .find_by_username(handle)
                .await?
                .map(|user| user.user_id)
                .ok_or_else(|| StarlyError::HandleNotFound {
                    handle: handle.clone(),
                }),
        }
    }

    pub async fn ban(&self, target: &UserRef) -> Result<User> {
        let user_id = self.resolve(target).await?;
        let user = self.users.set_ban(user_id, true).await?;
        self.notify(user_id, BANNED_NOTICE, MenuKind::Reduced).await;
        Ok(user)
    }

    pub async fn unban(&self, target: &UserRef) -> Result<User> {
        let user_id = self.resolve(target).await?;
        let user = self.users.set_ban(user_id, false).await?;
        self.notify(user_id, UNBANNED_NOTICE, MenuKind::for_user(Some(&user))).await;
        Ok(user)
    }

    pub async fn restrict(&self, target: &UserRef, feature: Feature) -> Result<User> {
        let user_id = self.resolve(target).await?;
        self.users.add_restriction(user_id, feature).await
    }

    pub async fn unrestrict(&self, target: &UserRef, feature: Feature) -> Result<User> {
        let user_id = self.resolve(target).await?;
        self.users.remove_restriction(user_id, feature).await
    }

    /// Join squad or city, leaving the other. The user must already exist.
    pub async fn add_to(&self, target: &UserRef, membership: Membership) -> Result<User> {
        let user_id = self.resolve(target).await?;
        self.users
            .set_membership(user_id, membership)
            .await?
            .ok_or(StarlyError::UserNotFound { user_id })
    }

    pub async fn remove_from(&self, target: &UserRef, membership: Membership) -> Result<User> {
        let user_id = self.resolve(target).await?;
        self.users
            .clear_membership(user_id, membership)
            .await?
            .ok_or(StarlyError::UserNotFound { user_id })
    }

    /// Formatted listing, newest registration first
    pub async fn list(&self, filter: UserFilter) -> Result<String> {
        let users = self.users.list(filter).await?;
        Ok(format_user_list(list_title(filter), &users))
    }

    async fn notify(&self, user_id: i64, text: &str, menu: MenuKind) {
        if !self.notify_users {
            return;
        }

        if let Err(e) = self
            .messenger
            .send_text(user_id, text, TextFormat::Plain, Some(Keyboard::Menu(menu)))
            .await
        {
            warn!(user_id = user_id, error = %e, "Failed to notify user about moderation change");
        }
    }
}

fn list_title(filter: UserFilter) -> &'static str {
    match filter {
        UserFilter::All => "👥 Все пользователи",
        UserFilter::Squad => "⚔️ Сквад",
        UserFilter::City => "🏙️ Город",
        UserFilter::Starly => "⭐ Старли",
        UserFilter::Banned => "🚫 Заблокированные",
        UserFilter::Subscribers => "🔔 Подписчики рассылки",
    }
}

/// One line per user: `- Name @handle (ID: n) - dd/mm HH:MM`
pub fn format_user_list(title: &str, users: &[User]) -> String {
    if users.is_empty() {
        return format!("{}:\n{}", title, EMPTY_LIST);
    }

    let lines: Vec<String> = users
        .iter()
        .map(|user| {
            let handle = user
                .username
                .as_deref()
                .map(|h| format!("@{}", h))
                .unwrap_or_else(|| "----".to_string());
            format!(
                "- {} {} (ID: {}) - {}",
                user.display_name(),
                handle,
                user.user_id,
                format_short_timestamp(user.created_at)
            )
        })
        .collect();

    format!("{} ({}):\n{}", title, users.len(), lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::models::RegisterUserRequest;

    #[test]
    fn test_format_user_list() {
        let user = User::new(
            RegisterUserRequest {
                user_id: 5,
                username: Some("neo".to_string()),
                first_name: Some("Томас".to_string()),
                last_name: None,
            },
            Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap(),
        );
        let mut anonymous = user.clone();
        anonymous.user_id = 6;
        anonymous.username = None;

        let text = format_user_list("Сквад", &[user, anonymous]);
        assert_eq!(
            text,
            "Сквад (2):\n- Томас @neo (ID: 5) - 31/12 23:59\n- Томас ---- (ID: 6) - 31/12 23:59"
        );
    }

    #[test]
    fn test_empty_list_marker() {
        assert_eq!(format_user_list("Город", &[]), "Город:\nСписок пуст.");
    }
}
