//! Start and help command handlers

use teloxide::{Bot, types::Message, prelude::*};
use tracing::info;
use crate::handlers::forms::send_with_keyboard;
use crate::models::{Keyboard, MenuKind};
use crate::services::ServiceFactory;
use crate::utils::errors::{StarlyError, Result};
use crate::utils::logging::log_user_action;

const WELCOME_TEXT: &str = "Привет! 👋 Я бот для сообщества Старли.\n\n\
    Что я умею:\n\
    • Рассказать о нас и о себе\n\
    • Принять твою анкету в сквад\n\
    • Передать обращение админам\n\n\
    Выбери пункт в меню ниже ↓";

pub const ABOUT_TEXT: &str = "🤖 Я помощник сообщества Старли.\n\n\
    Через меня можно подать анкету в сквад, написать обращение администраторам \
    и управлять подпиской на рассылку в настройках.";

const BANNED_NOTICE: &str = "❌ Вы заблокированы и не можете подавать анкеты и обращения.";

const USER_HELP: &str = "📖 Команды:\n\n\
    /start - главное меню\n\
    /settings - настройки рассылки\n\
    /cancel - отменить заполнение анкеты или обращения\n\
    /note - эта справка";

const ADMIN_HELP: &str = "🛠 Команды администратора:\n\n\
    /list_all, /list_squad, /list_city, /list_banned, /list_subscribers - списки пользователей\n\
    /add_to_squad, /add_to_city <id|@username> - добавить в состав\n\
    /remove_from_squad, /remove_from_city <id|@username> - убрать из состава\n\
    /ban, /unban <id|@username> - блокировка\n\
    /restrict, /unrestrict <id|@username> <anketa|appeal> - запрет функции\n\
    /broadcast_all, /broadcast_squad, /broadcast_city, /broadcast_starly <текст> - рассылка \
    (без текста пересылается сообщение, на которое вы ответили)\n\
    /broadcast_to_user <id|@username> <текст> - сообщение пользователю\n\
    /broadcast_to_group <chat_id> <текст> - сообщение в группу\n\n\
    Ответ на уведомление с ID в чате администраторов пересылается пользователю.";

/// Handle /start command
pub async fn handle_start(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let from = msg.from.as_ref().ok_or_else(|| {
        StarlyError::InvalidInput("No user in message".to_string())
    })?;

    let user = services.user_service.register(from).await?;
    log_user_action(user.user_id, "start", None);

    let menu = MenuKind::for_user(Some(&user));
    send_with_keyboard(&bot, msg.chat.id, WELCOME_TEXT, Keyboard::Menu(menu)).await?;

    if user.is_fully_banned() {
        info!(user_id = user.user_id, "Banned user opened the menu");
        bot.send_message(msg.chat.id, BANNED_NOTICE).await?;
    }

    Ok(())
}

/// Handle /note command
pub async fn handle_note(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let is_admin = msg
        .from
        .as_ref()
        .map(|user| services.auth_service.is_admin(user.id.0 as i64))
        .unwrap_or(false);

    let text = if is_admin {
        format!("{}\n\n{}", USER_HELP, ADMIN_HELP)
    } else {
        USER_HELP.to_string()
    };

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Answer the "about" menu button
pub async fn handle_about(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let user_id = msg.from.as_ref().map(|user| user.id.0 as i64);
    let user = match user_id {
        Some(id) => services.user_service.get(id).await?,
        None => None,
    };

    let menu = MenuKind::for_user(user.as_ref());
    send_with_keyboard(&bot, msg.chat.id, ABOUT_TEXT, Keyboard::Menu(menu)).await
}
