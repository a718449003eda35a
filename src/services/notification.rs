//! Admin channel notifications
//!
//! Formats finished forms for the admin chat and turns admin replies to those
//! notifications back into messages for the submitting user.

use regex::Regex;
use crate::models::{FormKind, Submission};
use crate::utils::errors::{StarlyError, Result};
use crate::utils::helpers::escape_html;

const ANKETA_HEADER: &str = "📋 Новая анкета!";
const APPEAL_HEADER: &str = "📬 Новое обращение!";

/// Who submitted a form, as shown to admins
#[derive(Debug, Clone)]
pub struct Submitter {
    pub user_id: i64,
    pub handle: Option<String>,
    pub full_name: String,
}

/// Target of an admin reply, recovered from the notification text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTarget {
    pub user_id: i64,
    pub kind: FormKind,
}

#[derive(Debug, Clone)]
pub struct NotificationService {
    id_pattern: Regex,
}

impl NotificationService {
    pub fn new() -> Result<Self> {
        let id_pattern = Regex::new(r"🆔 ID:\s*(?:<code>)?(\d+)")
            .map_err(|e| StarlyError::Config(format!("Invalid ID pattern: {}", e)))?;

        Ok(Self { id_pattern })
    }

    /// HTML notification for the admin chat
    pub fn format_submission(&self, submitter: &Submitter, submission: &Submission) -> String {
        let handle = submitter
            .handle
            .as_deref()
            .map(|h| format!("@{}", escape_html(h)))
            .unwrap_or_else(|| "@unknown".to_string());
        let id_line = format!("🆔 ID: <code>{}</code> | {}", submitter.user_id, handle);

        match submission {
            Submission::Anketa { name, age, game_nickname, why_join } => format!(
                "<b>{}</b>\n\n{}\n👤 Имя: {}\n🔢 Возраст: {}\n🎮 Игровой ник: {}\n💬 Почему в сквад:\n{}",
                ANKETA_HEADER,
                id_line,
                escape_html(name),
                age,
                escape_html(game_nickname),
                escape_html(why_join),
            ),
            Submission::Appeal { user_type, message } => format!(
                "<b>{}</b>\n\n{}\n👤 {}\n❓ Кто: {}\n💬 Сообщение:\n{}",
                APPEAL_HEADER,
                id_line,
                escape_html(&submitter.full_name),
                escape_html(user_type),
                escape_html(message),
            ),
        }
    }

    /// Find which user and form an admin is answering, from the notification text
    pub fn parse_reply_target(&self, notification: &str) -> Option<ReplyTarget> {
        let kind = if notification.contains(APPEAL_HEADER) {
            FormKind::Appeal
        } else if notification.contains(ANKETA_HEADER) {
            FormKind::Anketa
        } else {
            return None;
        };
        let captures = self.id_pattern.captures(notification)?;
        let user_id = captures.get(1)?.as_str().parse::<i64>().ok()?;

        Some(ReplyTarget { user_id, kind })
    }

    /// HTML message delivering an admin's answer to the user
    pub fn format_admin_reply(&self, kind: FormKind, reply: &str) -> String {
        let subject = match kind {
            FormKind::Anketa => "вашу анкету",
            FormKind::Appeal => "ваше обращение",
        };

        format!(
            "👀 <b>Вам сообщение!</b>\nАдмин дал ответ на {}:\n\"{}\"\nСпасибо, что с нами! 🙏",
            subject,
            escape_html(reply)
        )
    }
}
