//! Admin command handlers
//!
//! Moderation and listing commands. Non-admins get no answer at all.

use teloxide::{Bot, types::Message, prelude::*};
use tracing::{debug, info, warn};
use crate::models::{Feature, Membership, User, UserFilter, UserRef};
use crate::services::{CommandFamily, Denial, ServiceFactory};
use crate::utils::errors::{StarlyError, Result};
use crate::utils::helpers::{split_first_word, split_message, MAX_MESSAGE_CHARS};
use crate::utils::logging::log_admin_action;

const TARGET_USAGE: &str = "<id|@username>";
const RESTRICT_USAGE: &str = "<id|@username> <anketa|appeal>";

/// Caller id when they may run commands of this family.
/// Explicit denials are answered here; silent ones are only logged.
pub async fn authorize(
    bot: &Bot,
    msg: &Message,
    services: &ServiceFactory,
    family: CommandFamily,
) -> Result<Option<i64>> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(None);
    };
    let user_id = user.id.0 as i64;

    let Err(refusal) = services.auth_service.authorize(user_id, family) else {
        return Ok(Some(user_id));
    };

    match family.denial_policy() {
        Denial::Silent => {
            debug!(user_id = user_id, error = %refusal, "Ignoring admin command from non-admin");
        }
        Denial::Explicit(text) => {
            debug!(user_id = user_id, error = %refusal, "Refusing admin command");
            bot.send_message(msg.chat.id, text).await?;
        }
    }
    Ok(None)
}

/// Text shown to the admin when a moderation command fails
pub fn moderation_error_text(error: &StarlyError) -> String {
    match error {
        StarlyError::HandleNotFound { handle } => {
            format!("❌ Пользователь @{} не найден в базе.", handle)
        }
        StarlyError::UserNotFound { user_id } => {
            format!("❌ Пользователь {} не найден в базе.", user_id)
        }
        StarlyError::InvalidInput(_) => {
            "❌ user_id должен быть числом, а username начинаться с @.".to_string()
        }
        _ => "❌ Ошибка базы данных. Попробуйте позже.".to_string(),
    }
}

fn usage_text(command: &str, usage: &str) -> String {
    format!("Использование: /{} {}", command, usage)
}

async fn reply(bot: &Bot, msg: &Message, text: impl Into<String>) -> Result<()> {
    bot.send_message(msg.chat.id, text.into()).await?;
    Ok(())
}

/// Report the outcome of one moderation mutation
async fn report(
    bot: &Bot,
    msg: &Message,
    admin_id: i64,
    action: &str,
    target: &UserRef,
    result: Result<User>,
    success: String,
) -> Result<()> {
    match result {
        Ok(user) => {
            log_admin_action(admin_id, action, Some(&user.user_id.to_string()), None);
            reply(bot, msg, success).await
        }
        Err(e) => {
            warn!(admin_id = admin_id, action = action, target = %target, error = %e, "Moderation command failed");
            reply(bot, msg, moderation_error_text(&e)).await
        }
    }
}

/// Parse a single target argument, answering with usage or a format error
async fn parse_target(bot: &Bot, msg: &Message, args: &str, command: &str) -> Result<Option<UserRef>> {
    let (first, _) = split_first_word(args);
    if first.is_empty() {
        reply(bot, msg, usage_text(command, TARGET_USAGE)).await?;
        return Ok(None);
    }

    match first.parse::<UserRef>() {
        Ok(target) => Ok(Some(target)),
        Err(e) => {
            reply(bot, msg, moderation_error_text(&e)).await?;
            Ok(None)
        }
    }
}

/// Handle /list_* commands
pub async fn handle_list(bot: Bot, msg: Message, services: ServiceFactory, filter: UserFilter) -> Result<()> {
    let Some(admin_id) = authorize(&bot, &msg, &services, CommandFamily::Listing).await? else {
        return Ok(());
    };

    let report = match services.moderation_service.list(filter).await {
        Ok(report) => report,
        Err(e) => {
            warn!(admin_id = admin_id, filter = filter.as_str(), error = %e, "Listing failed");
            return reply(&bot, &msg, moderation_error_text(&e)).await;
        }
    };

    for chunk in split_message(&report, MAX_MESSAGE_CHARS) {
        reply(&bot, &msg, chunk).await?;
    }

    info!(admin_id = admin_id, filter = filter.as_str(), "Admin listed users");
    Ok(())
}

fn membership_name(membership: Membership) -> &'static str {
    match membership {
        Membership::Squad => "сквад",
        Membership::City => "город",
    }
}

fn membership_command(membership: Membership, adding: bool) -> &'static str {
    match (membership, adding) {
        (Membership::Squad, true) => "add_to_squad",
        (Membership::City, true) => "add_to_city",
        (Membership::Squad, false) => "remove_from_squad",
        (Membership::City, false) => "remove_from_city",
    }
}

/// Handle /add_to_squad and /add_to_city
pub async fn handle_add_to(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    args: String,
    membership: Membership,
) -> Result<()> {
    let Some(admin_id) = authorize(&bot, &msg, &services, CommandFamily::Moderation).await? else {
        return Ok(());
    };
    let command = membership_command(membership, true);
    let Some(target) = parse_target(&bot, &msg, &args, command).await? else {
        return Ok(());
    };

    let result = services.moderation_service.add_to(&target, membership).await;
    let success = format!("✅ Пользователь {} добавлен в {}.", target, membership_name(membership));
    report(&bot, &msg, admin_id, command, &target, result, success).await
}

/// Handle /remove_from_squad and /remove_from_city
pub async fn handle_remove_from(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    args: String,
    membership: Membership,
) -> Result<()> {
    let Some(admin_id) = authorize(&bot, &msg, &services, CommandFamily::Moderation).await? else {
        return Ok(());
    };
    let command = membership_command(membership, false);
    let Some(target) = parse_target(&bot, &msg, &args, command).await? else {
        return Ok(());
    };

    let result = services.moderation_service.remove_from(&target, membership).await;
    let success = format!("✅ Пользователь {} удалён из: {}.", target, membership_name(membership));
    report(&bot, &msg, admin_id, command, &target, result, success).await
}

/// Handle /ban
pub async fn handle_ban(bot: Bot, msg: Message, services: ServiceFactory, args: String) -> Result<()> {
    let Some(admin_id) = authorize(&bot, &msg, &services, CommandFamily::Moderation).await? else {
        return Ok(());
    };
    let Some(target) = parse_target(&bot, &msg, &args, "ban").await? else {
        return Ok(());
    };

    let result = services.moderation_service.ban(&target).await;
    let success = format!("🚫 Пользователь {} заблокирован.", target);
    report(&bot, &msg, admin_id, "ban", &target, result, success).await
}

/// Handle /unban
pub async fn handle_unban(bot: Bot, msg: Message, services: ServiceFactory, args: String) -> Result<()> {
    let Some(admin_id) = authorize(&bot, &msg, &services, CommandFamily::Moderation).await? else {
        return Ok(());
    };
    let Some(target) = parse_target(&bot, &msg, &args, "unban").await? else {
        return Ok(());
    };

    let result = services.moderation_service.unban(&target).await;
    let success = format!("✅ Пользователь {} разблокирован.", target);
    report(&bot, &msg, admin_id, "unban", &target, result, success).await
}

/// Handle /restrict and /unrestrict
pub async fn handle_restrict(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    args: String,
    restrict: bool,
) -> Result<()> {
    let Some(admin_id) = authorize(&bot, &msg, &services, CommandFamily::Moderation).await? else {
        return Ok(());
    };
    let command = if restrict { "restrict" } else { "unrestrict" };

    let (first, rest) = split_first_word(&args);
    let (feature_arg, _) = split_first_word(rest);
    if first.is_empty() || feature_arg.is_empty() {
        return reply(&bot, &msg, usage_text(command, RESTRICT_USAGE)).await;
    }

    let target = match first.parse::<UserRef>() {
        Ok(target) => target,
        Err(e) => return reply(&bot, &msg, moderation_error_text(&e)).await,
    };
    let Ok(feature) = feature_arg.parse::<Feature>() else {
        return reply(&bot, &msg, usage_text(command, RESTRICT_USAGE)).await;
    };

    let (result, success) = if restrict {
        (
            services.moderation_service.restrict(&target, feature).await,
            format!("🔒 Пользователю {} запрещено: {}.", target, feature),
        )
    } else {
        (
            services.moderation_service.unrestrict(&target, feature).await,
            format!("🔓 Пользователю {} снова разрешено: {}.", target, feature),
        )
    };
    report(&bot, &msg, admin_id, command, &target, result, success).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderation_error_texts() {
        let not_found = StarlyError::HandleNotFound { handle: "ghost".to_string() };
        assert_eq!(moderation_error_text(&not_found), "❌ Пользователь @ghost не найден в базе.");

        let bad = StarlyError::InvalidInput("abc".to_string());
        assert!(moderation_error_text(&bad).contains("user_id должен быть числом"));
    }

    #[test]
    fn test_usage_text() {
        assert_eq!(usage_text("ban", TARGET_USAGE), "Использование: /ban <id|@username>");
    }
}
