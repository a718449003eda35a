//! Broadcast settings

use teloxide::{Bot, types::Message, prelude::*};
use crate::models::menu::broadcast_toggle_keyboard;
use crate::services::ServiceFactory;
use crate::utils::errors::{StarlyError, Result};

pub const USER_NOT_FOUND_TEXT: &str = "❌ Ошибка: пользователь не найден. Нажмите /start.";

pub fn broadcast_status_text(enabled: bool) -> &'static str {
    if enabled {
        "🔔 Рассылка включена"
    } else {
        "🔕 Рассылка отключена"
    }
}

/// Handle /settings command and the settings menu button
pub async fn handle_settings(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let from = msg.from.as_ref().ok_or_else(|| {
        StarlyError::InvalidInput("No user in message".to_string())
    })?;

    let Some(user) = services.user_service.get(from.id.0 as i64).await? else {
        bot.send_message(msg.chat.id, USER_NOT_FOUND_TEXT).await?;
        return Ok(());
    };

    let enabled = user.can_receive_broadcast;
    bot.send_message(
        msg.chat.id,
        format!("⚙️ {}\nВыберите действие:", broadcast_status_text(enabled)),
    )
    .reply_markup(broadcast_toggle_keyboard(enabled))
    .await?;

    Ok(())
}
