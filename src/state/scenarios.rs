//! Conversation scenarios
//!
//! The anketa and appeal forms are explicit state enums carrying the fields
//! collected so far. [`transition`] is total: every state and input pair maps
//! to exactly one [`Transition`].

use serde::{Deserialize, Serialize};
use crate::models::{FormKind, Submission};
use super::validation::{validate_age, validate_nickname, validate_text, ValidationError};

pub use crate::models::CANCEL_TOKEN;

/// Anketa steps: name, age, game nickname, motivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnketaState {
    Name,
    Age {
        name: String,
    },
    GameNickname {
        name: String,
        age: u8,
    },
    WhyJoin {
        name: String,
        age: u8,
        game_nickname: String,
    },
}

/// Appeal steps: who the user is, then the message itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppealState {
    UserType,
    Message { user_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormState {
    Anketa(AnketaState),
    Appeal(AppealState),
}

/// Result of feeding one input into a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Field accepted; ask for the next one
    Advance(FormState),
    /// Field refused; the state is unchanged
    Retry {
        state: FormState,
        error: ValidationError,
    },
    /// Last field accepted
    Submit(Submission),
    Cancelled,
}

impl FormState {
    pub fn initial(kind: FormKind) -> Self {
        match kind {
            FormKind::Anketa => FormState::Anketa(AnketaState::Name),
            FormKind::Appeal => FormState::Appeal(AppealState::UserType),
        }
    }

    pub fn kind(&self) -> FormKind {
        match self {
            FormState::Anketa(_) => FormKind::Anketa,
            FormState::Appeal(_) => FormKind::Appeal,
        }
    }

    /// Persisted step name
    pub fn step(&self) -> &'static str {
        match self {
            FormState::Anketa(AnketaState::Name) => "name",
            FormState::Anketa(AnketaState::Age { .. }) => "age",
            FormState::Anketa(AnketaState::GameNickname { .. }) => "game_nickname",
            FormState::Anketa(AnketaState::WhyJoin { .. }) => "why_join",
            FormState::Appeal(AppealState::UserType) => "user_type",
            FormState::Appeal(AppealState::Message { .. }) => "message",
        }
    }

    /// Question asked when the form enters this state
    pub fn prompt(&self) -> &'static str {
        match self {
            FormState::Anketa(AnketaState::Name) => {
                "📝 Давайте заполним анкету!\n✏️ Введите ваше имя:"
            }
            FormState::Anketa(AnketaState::Age { .. }) => {
                "🔢 Введите ваш возраст (только цифры от 12 до 100):"
            }
            FormState::Anketa(AnketaState::GameNickname { .. }) => {
                "🎮 Введите ваш игровой ник (только латинские буквы, цифры и _):"
            }
            FormState::Anketa(AnketaState::WhyJoin { .. }) => {
                "💬 Почему вы хотите в наш сквад? Расскажите о себе:"
            }
            FormState::Appeal(AppealState::UserType) => {
                "📨 Давайте оформим обращение!\n❓ Кто вы? (например: участник, житель города, новичок и т.д.):"
            }
            FormState::Appeal(AppealState::Message { .. }) => "💬 Что вы хотите сказать?",
        }
    }
}

/// Whether the input abandons the form
pub fn is_cancel(input: &str) -> bool {
    let input = input.trim();
    input == CANCEL_TOKEN
        || input == "/cancel"
        || input.starts_with("/cancel@")
}

/// Feed one user input into a form.
///
/// Input is trimmed before validation. Cancellation is checked first and wins
/// in every state.
pub fn transition(state: FormState, input: &str) -> Transition {
    if is_cancel(input) {
        return Transition::Cancelled;
    }
    let input = input.trim();

    match state {
        FormState::Anketa(anketa) => anketa_transition(anketa, input),
        FormState::Appeal(appeal) => appeal_transition(appeal, input),
    }
}

fn anketa_transition(state: AnketaState, input: &str) -> Transition {
    match state {
        AnketaState::Name => match validate_text(input) {
            Ok(name) => Transition::Advance(FormState::Anketa(AnketaState::Age {
                name: name.to_string(),
            })),
            Err(error) => retry(FormState::Anketa(AnketaState::Name), error),
        },
        AnketaState::Age { name } => match validate_age(input) {
            Ok(age) => Transition::Advance(FormState::Anketa(AnketaState::GameNickname { name, age })),
            Err(error) => retry(FormState::Anketa(AnketaState::Age { name }), error),
        },
        AnketaState::GameNickname { name, age } => match validate_nickname(input) {
            Ok(nickname) => Transition::Advance(FormState::Anketa(AnketaState::WhyJoin {
                name,
                age,
                game_nickname: nickname.to_string(),
            })),
            Err(error) => retry(FormState::Anketa(AnketaState::GameNickname { name, age }), error),
        },
        AnketaState::WhyJoin { name, age, game_nickname } => match validate_text(input) {
            Ok(why_join) => Transition::Submit(Submission::Anketa {
                name,
                age,
                game_nickname,
                why_join: why_join.to_string(),
            }),
            Err(error) => retry(
                FormState::Anketa(AnketaState::WhyJoin { name, age, game_nickname }),
                error,
            ),
        },
    }
}

fn appeal_transition(state: AppealState, input: &str) -> Transition {
    match state {
        AppealState::UserType => match validate_text(input) {
            Ok(user_type) => Transition::Advance(FormState::Appeal(AppealState::Message {
                user_type: user_type.to_string(),
            })),
            Err(error) => retry(FormState::Appeal(AppealState::UserType), error),
        },
        AppealState::Message { user_type } => match validate_text(input) {
            Ok(message) => Transition::Submit(Submission::Appeal {
                user_type,
                message: message.to_string(),
            }),
            Err(error) => retry(FormState::Appeal(AppealState::Message { user_type }), error),
        },
    }
}

fn retry(state: FormState, error: ValidationError) -> Transition {
    Transition::Retry { state, error }
}
