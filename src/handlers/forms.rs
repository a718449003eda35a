//! Form replies
//!
//! Turns conversation engine outcomes into messages for the user.

use teloxide::{Bot, types::{ChatId, Message}, prelude::*};
use tracing::debug;
use crate::models::{Keyboard, MenuKind};
use crate::models::FormKind;
use crate::services::{ServiceFactory, StartOutcome, StepOutcome};
use crate::state::CooldownDenial;
use crate::utils::errors::{StarlyError, Result};

pub const CHOOSE_ACTION: &str = "Выберите действие:";
const ALREADY_FILLING: &str = "❌ Вы уже заполняете анкету или обращение. Дождитесь завершения.";
const BANNED: &str = "❌ Вы заблокированы и не можете пользоваться ботом.";
const NOTHING_TO_CANCEL: &str = "Нечего отменять.";
const TEXT_ONLY: &str = "✏️ Пожалуйста, ответьте текстом.";

pub async fn send_with_keyboard(bot: &Bot, chat_id: ChatId, text: &str, keyboard: Keyboard) -> Result<()> {
    bot.send_message(chat_id, text)
        .reply_markup(keyboard.markup())
        .await?;
    Ok(())
}

fn cooldown_text(denial: &CooldownDenial) -> String {
    match denial {
        CooldownDenial::Base { .. } => format!(
            "⏱️ Повторная анкета или обращение возможны только через {} мин. после отправки предыдущей.",
            denial.remaining_minutes()
        ),
        CooldownDenial::Repeat { .. } => format!(
            "⏱️ Вы отправляете слишком часто. Следующая отправка возможна через {} мин.",
            denial.remaining_minutes()
        ),
    }
}

fn restricted_text(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Anketa => "❌ Вы не можете подавать анкеты.",
        FormKind::Appeal => "❌ Вы не можете подавать обращения.",
    }
}

fn cancelled_text(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Anketa => "❌ Заполнение анкеты отменено.",
        FormKind::Appeal => "❌ Заполнение обращения отменено.",
    }
}

fn submitted_text(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Anketa => "✅ Анкета отправлена администраторам! Спасибо! 🎉",
        FormKind::Appeal => "✅ Обращение отправлено администраторам! Спасибо! 🎉",
    }
}

fn failed_text(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Anketa => "❌ Ошибка при отправке анкеты. Попробуйте позже.",
        FormKind::Appeal => "❌ Ошибка при отправке обращения. Попробуйте позже.",
    }
}

/// Start a form from its menu button
pub async fn start_form(bot: Bot, msg: Message, services: ServiceFactory, kind: FormKind) -> Result<()> {
    let user = msg.from.as_ref().ok_or_else(|| {
        StarlyError::InvalidInput("No user in message".to_string())
    })?;
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    debug!(user_id = user_id, kind = %kind, "Starting form");

    match services.conversation_service.start(user_id, kind).await? {
        StartOutcome::Started { prompt } => {
            send_with_keyboard(&bot, chat_id, prompt, Keyboard::Cancel).await
        }
        StartOutcome::AlreadyFilling => {
            bot.send_message(chat_id, ALREADY_FILLING).await?;
            Ok(())
        }
        StartOutcome::CoolingDown(denial) => {
            bot.send_message(chat_id, cooldown_text(&denial)).await?;
            Ok(())
        }
        StartOutcome::Banned { menu } => {
            send_with_keyboard(&bot, chat_id, BANNED, Keyboard::Menu(menu)).await
        }
        StartOutcome::Restricted { kind, menu } => {
            send_with_keyboard(&bot, chat_id, restricted_text(kind), Keyboard::Menu(menu)).await
        }
    }
}

/// Reply to one message fed into the open form. Returns false when no form was open.
pub async fn reply_to_step(bot: &Bot, chat_id: ChatId, outcome: StepOutcome) -> Result<bool> {
    match outcome {
        StepOutcome::Idle => return Ok(false),
        StepOutcome::Prompt(prompt) => {
            send_with_keyboard(bot, chat_id, prompt, Keyboard::Cancel).await?;
        }
        StepOutcome::Retry(error) => {
            bot.send_message(chat_id, error.message()).await?;
        }
        StepOutcome::Cancelled { kind, menu } => {
            send_with_keyboard(bot, chat_id, cancelled_text(kind), Keyboard::Menu(menu)).await?;
        }
        StepOutcome::Submitted { kind, menu } => {
            send_with_keyboard(bot, chat_id, submitted_text(kind), Keyboard::Menu(menu)).await?;
        }
        StepOutcome::SubmissionFailed { kind, menu } => {
            send_with_keyboard(bot, chat_id, failed_text(kind), Keyboard::Menu(menu)).await?;
        }
    }

    Ok(true)
}

/// Non-text message while a form is open
pub async fn reply_text_only(bot: &Bot, chat_id: ChatId) -> Result<()> {
    bot.send_message(chat_id, TEXT_ONLY).await?;
    Ok(())
}

/// Handle /cancel
pub async fn handle_cancel(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let user = msg.from.as_ref().ok_or_else(|| {
        StarlyError::InvalidInput("No user in message".to_string())
    })?;
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    let menu = MenuKind::for_user(services.user_service.get(user_id).await?.as_ref());
    match services.conversation_service.cancel(user_id).await? {
        Some(kind) => send_with_keyboard(&bot, chat_id, cancelled_text(kind), Keyboard::Menu(menu)).await,
        None => send_with_keyboard(&bot, chat_id, NOTHING_TO_CANCEL, Keyboard::Menu(menu)).await,
    }
}
