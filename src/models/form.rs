//! Form models
//!
//! Kinds of intake forms and the completed payloads they produce.

use std::fmt;
use serde::{Deserialize, Serialize};
use super::user::Feature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Anketa,
    Appeal,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Anketa => "anketa",
            FormKind::Appeal => "appeal",
        }
    }

    /// Restriction that blocks this kind
    pub fn feature(&self) -> Feature {
        match self {
            FormKind::Anketa => Feature::Anketa,
            FormKind::Appeal => Feature::Appeal,
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed form ready for the admin channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Submission {
    Anketa {
        name: String,
        age: u8,
        game_nickname: String,
        why_join: String,
    },
    Appeal {
        user_type: String,
        message: String,
    },
}

impl Submission {
    pub fn kind(&self) -> FormKind {
        match self {
            Submission::Anketa { .. } => FormKind::Anketa,
            Submission::Appeal { .. } => FormKind::Appeal,
        }
    }
}
