//! Menus and keyboards
//!
//! Which buttons a user sees follows from their bans, so services pick a
//! [`MenuKind`] and the Telegram markup is built at send time.

use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};
use super::{Feature, User};

/// Leaves any form from any step
pub const CANCEL_TOKEN: &str = "❌ Отменить";

pub const BUTTON_ABOUT: &str = "🤖 О боте";
pub const BUTTON_ANKETA: &str = "📝 Анкета";
pub const BUTTON_APPEAL: &str = "📨 Обращение";
pub const BUTTON_SETTINGS: &str = "⚙️ Настройки";

pub const CALLBACK_TOGGLE_BROADCAST: &str = "toggle_broadcast";

/// Main menu variant, derived from the user's bans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Full,
    WithoutAnketa,
    WithoutAppeal,
    WithoutForms,
    /// Banned users keep only the about and settings buttons
    Reduced,
}

impl MenuKind {
    pub fn for_user(user: Option<&User>) -> Self {
        let Some(user) = user else {
            return MenuKind::Full;
        };
        if user.is_fully_banned() {
            return MenuKind::Reduced;
        }

        match (user.has_feature_ban(Feature::Anketa), user.has_feature_ban(Feature::Appeal)) {
            (false, false) => MenuKind::Full,
            (true, false) => MenuKind::WithoutAnketa,
            (false, true) => MenuKind::WithoutAppeal,
            (true, true) => MenuKind::WithoutForms,
        }
    }

    pub fn rows(&self) -> Vec<Vec<&'static str>> {
        match self {
            MenuKind::Full => vec![
                vec![BUTTON_ABOUT, BUTTON_ANKETA, BUTTON_APPEAL],
                vec![BUTTON_SETTINGS],
            ],
            MenuKind::WithoutAnketa => vec![
                vec![BUTTON_ABOUT, BUTTON_APPEAL],
                vec![BUTTON_SETTINGS],
            ],
            MenuKind::WithoutAppeal => vec![
                vec![BUTTON_ABOUT, BUTTON_ANKETA],
                vec![BUTTON_SETTINGS],
            ],
            MenuKind::WithoutForms | MenuKind::Reduced => vec![
                vec![BUTTON_ABOUT],
                vec![BUTTON_SETTINGS],
            ],
        }
    }
}

/// Keyboard attached to an outgoing text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    Menu(MenuKind),
    Cancel,
}

impl Keyboard {
    pub fn markup(&self) -> ReplyMarkup {
        match self {
            Keyboard::Menu(kind) => ReplyMarkup::Keyboard(menu_keyboard(*kind)),
            Keyboard::Cancel => ReplyMarkup::Keyboard(
                KeyboardMarkup::new(vec![vec![KeyboardButton::new(CANCEL_TOKEN)]])
                    .resize_keyboard()
                    .one_time_keyboard(),
            ),
        }
    }
}

pub fn menu_keyboard(kind: MenuKind) -> KeyboardMarkup {
    let rows = kind
        .rows()
        .into_iter()
        .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    KeyboardMarkup::new(rows).resize_keyboard()
}

/// Inline toggle shown under the settings message
pub fn broadcast_toggle_keyboard(enabled: bool) -> InlineKeyboardMarkup {
    let label = if enabled {
        "🔕 Отключить рассылку"
    } else {
        "🔔 Включить рассылку"
    };

    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        label,
        CALLBACK_TOGGLE_BROADCAST,
    )]])
}
