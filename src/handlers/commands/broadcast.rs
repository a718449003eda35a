//! Broadcast command handlers
//!
//! Admin-only fan-out. Text comes from the command arguments; with no
//! arguments the message the admin replied to is re-sent as is.

use teloxide::{Bot, types::Message, prelude::*};
use tracing::warn;
use crate::models::{Payload, UserRef};
use crate::services::{BroadcastOutcome, BroadcastReport, Cohort, CommandFamily, ServiceFactory, TargetedOutcome};
use crate::handlers::commands::admin::{authorize, moderation_error_text};
use crate::utils::errors::Result;
use crate::utils::helpers::split_first_word;
use crate::utils::logging::{log_admin_action, log_broadcast};

const NO_RECIPIENTS: &str = "📭 Нет пользователей для рассылки.";
const NO_PAYLOAD: &str = "❌ Укажите текст после команды или ответьте командой на сообщение для рассылки.";

/// Payload from the arguments, else from the replied-to message
pub fn resolve_payload(text: &str, msg: &Message) -> Option<Payload> {
    let text = text.trim();
    if !text.is_empty() {
        return Some(Payload::text(text));
    }
    msg.reply_to_message().map(Payload::from_message)
}

pub fn report_text(cohort: Cohort, report: &BroadcastReport) -> String {
    format!(
        "📢 Рассылка ({}) завершена.\n✅ Доставлено: {}\n❌ Не доставлено: {}",
        cohort.as_str(),
        report.sent,
        report.failed
    )
}

pub fn targeted_text(target: &str, outcome: &TargetedOutcome) -> String {
    match outcome {
        TargetedOutcome::Delivered => format!("✅ Сообщение доставлено: {}", target),
        TargetedOutcome::NotFound => format!("❌ Пользователь {} не найден в базе.", target),
        TargetedOutcome::Banned => format!("🚫 Пользователь {} заблокирован, сообщение не отправлено.", target),
        TargetedOutcome::OptedOut => format!("🔕 Пользователь {} отключил рассылку.", target),
        TargetedOutcome::Failed(reason) => format!("❌ Не удалось доставить сообщение {}: {}", target, reason),
    }
}

/// Handle /broadcast_all, /broadcast_squad, /broadcast_city and /broadcast_starly
pub async fn handle_cohort(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    args: String,
    cohort: Cohort,
) -> Result<()> {
    let Some(admin_id) = authorize(&bot, &msg, &services, CommandFamily::Broadcast).await? else {
        return Ok(());
    };
    let Some(payload) = resolve_payload(&args, &msg) else {
        bot.send_message(msg.chat.id, NO_PAYLOAD).await?;
        return Ok(());
    };

    let text = match services.broadcast_service.broadcast(cohort, &payload).await {
        Ok(BroadcastOutcome::NoRecipients) => {
            log_broadcast(admin_id, cohort.as_str(), 0, 0);
            NO_RECIPIENTS.to_string()
        }
        Ok(BroadcastOutcome::Completed(report)) => {
            log_broadcast(admin_id, cohort.as_str(), report.sent, report.failed);
            report_text(cohort, &report)
        }
        Err(e) => {
            warn!(admin_id = admin_id, cohort = cohort.as_str(), error = %e, "Broadcast failed");
            moderation_error_text(&e)
        }
    };

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle /broadcast_to_user <id|@username> <text>
pub async fn handle_to_user(bot: Bot, msg: Message, services: ServiceFactory, args: String) -> Result<()> {
    let Some(admin_id) = authorize(&bot, &msg, &services, CommandFamily::Broadcast).await? else {
        return Ok(());
    };

    let (first, rest) = split_first_word(&args);
    if first.is_empty() {
        bot.send_message(msg.chat.id, "Использование: /broadcast_to_user <id|@username> <текст>").await?;
        return Ok(());
    }
    let target = match first.parse::<UserRef>() {
        Ok(target) => target,
        Err(e) => {
            bot.send_message(msg.chat.id, moderation_error_text(&e)).await?;
            return Ok(());
        }
    };
    let Some(payload) = resolve_payload(rest, &msg) else {
        bot.send_message(msg.chat.id, NO_PAYLOAD).await?;
        return Ok(());
    };

    let text = match services.broadcast_service.send_to_user(&target, &payload).await {
        Ok(outcome) => {
            log_admin_action(admin_id, "broadcast_to_user", Some(&target.to_string()), Some(payload.kind()));
            targeted_text(&target.to_string(), &outcome)
        }
        Err(e) => {
            warn!(admin_id = admin_id, target = %target, error = %e, "Targeted send failed");
            moderation_error_text(&e)
        }
    };

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle /broadcast_to_group <chat_id> <text>
pub async fn handle_to_group(bot: Bot, msg: Message, services: ServiceFactory, args: String) -> Result<()> {
    let Some(admin_id) = authorize(&bot, &msg, &services, CommandFamily::Broadcast).await? else {
        return Ok(());
    };

    let (first, rest) = split_first_word(&args);
    let Ok(chat_id) = first.parse::<i64>() else {
        bot.send_message(msg.chat.id, "Использование: /broadcast_to_group <chat_id> <текст>").await?;
        return Ok(());
    };
    let Some(payload) = resolve_payload(rest, &msg) else {
        bot.send_message(msg.chat.id, NO_PAYLOAD).await?;
        return Ok(());
    };

    let outcome = services.broadcast_service.send_to_chat(chat_id, &payload).await;
    log_admin_action(admin_id, "broadcast_to_group", Some(&chat_id.to_string()), Some(payload.kind()));

    bot.send_message(msg.chat.id, targeted_text(&format!("чат {}", chat_id), &outcome)).await?;
    Ok(())
}
