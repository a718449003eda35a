//! Message handlers module
//!
//! Private chats: menu buttons, then the open form, otherwise the menu again.
//! Group chats: admin replies to submission notifications are relayed.

use teloxide::{Bot, types::{Message, ReplyParameters}, prelude::*};
use tracing::{debug, info, warn};
use crate::handlers::commands::{settings, start};
use crate::handlers::forms::{self, send_with_keyboard, CHOOSE_ACTION};
use crate::models::menu::{BUTTON_ABOUT, BUTTON_ANKETA, BUTTON_APPEAL, BUTTON_SETTINGS};
use crate::models::{FormKind, Keyboard, MenuKind};
use crate::services::{RelayOutcome, ServiceFactory};
use crate::utils::errors::{StarlyError, Result};

/// Handle incoming messages that are not commands
pub async fn handle_message(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    if msg.chat.id.is_user() {
        handle_private_message(bot, msg, services).await
    } else {
        handle_group_message(bot, msg, services).await
    }
}

async fn handle_private_message(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let from = msg.from.as_ref().ok_or_else(|| {
        StarlyError::InvalidInput("No user in message".to_string())
    })?;
    let user_id = from.id.0 as i64;
    let chat_id = msg.chat.id;

    let user = services.user_service.register(from).await?;

    let Some(text) = msg.text().map(str::trim) else {
        if services.conversation_service.active_form(user_id).await?.is_some() {
            return forms::reply_text_only(&bot, chat_id).await;
        }
        debug!(user_id = user_id, "Ignoring non-text private message");
        return Ok(());
    };

    match text {
        BUTTON_ANKETA => return forms::start_form(bot, msg, services, FormKind::Anketa).await,
        BUTTON_APPEAL => return forms::start_form(bot, msg, services, FormKind::Appeal).await,
        BUTTON_ABOUT => return start::handle_about(bot, msg, services).await,
        BUTTON_SETTINGS => return settings::handle_settings(bot, msg, services).await,
        _ => {}
    }

    let outcome = services.conversation_service.handle_input(user_id, text).await?;
    if forms::reply_to_step(&bot, chat_id, outcome).await? {
        return Ok(());
    }

    let menu = MenuKind::for_user(Some(&user));
    send_with_keyboard(&bot, chat_id, CHOOSE_ACTION, Keyboard::Menu(menu)).await
}

/// Relay an admin's reply to a submission notification back to the user
async fn handle_group_message(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(reply_to) = msg.reply_to_message() else {
        return Ok(());
    };
    let Some(admin) = msg.from.as_ref() else {
        return Ok(());
    };
    let admin_id = admin.id.0 as i64;

    let from_bot = reply_to.from.as_ref().map(|u| u.is_bot).unwrap_or(false);
    if !from_bot || !services.auth_service.is_admin(admin_id) {
        return Ok(());
    }

    let (Some(notification), Some(reply)) = (reply_to.text(), msg.text()) else {
        return Ok(());
    };

    let text = match services.reply_relay.relay(admin_id, notification, reply).await? {
        RelayOutcome::NotANotification => return Ok(()),
        RelayOutcome::UserBanned { user_id } => {
            format!("⚠️ Пользователь {} заблокирован, ответ не отправлен.", user_id)
        }
        RelayOutcome::Delivered { user_id } => {
            info!(admin_id = admin_id, user_id = user_id, "Admin answered a submission");
            format!("✅ Ответ отправлен пользователю {}.", user_id)
        }
        RelayOutcome::Failed { user_id, reason } => {
            warn!(admin_id = admin_id, user_id = user_id, reason = %reason, "Reply relay failed");
            format!("❌ Не удалось отправить ответ пользователю {}: {}", user_id, reason)
        }
    };

    bot.send_message(msg.chat.id, text)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}
