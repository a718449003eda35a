//! User model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::utils::errors::StarlyError;
use crate::utils::helpers::strip_handle;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_banned: bool,
    pub banned_features: Vec<String>,
    pub is_in_squad: bool,
    pub is_in_city: bool,
    pub can_receive_broadcast: bool,
    pub last_anketa_time: Option<DateTime<Utc>>,
    pub last_appeal_time: Option<DateTime<Utc>>,
    pub prev_submission_time: Option<DateTime<Utc>>,
}

impl User {
    /// A freshly registered user with default flags
    pub fn new(request: RegisterUserRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: request.user_id,
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
            created_at,
            is_banned: false,
            banned_features: Vec::new(),
            is_in_squad: false,
            is_in_city: false,
            can_receive_broadcast: true,
            last_anketa_time: None,
            last_appeal_time: None,
            prev_submission_time: None,
        }
    }

    pub fn has_feature_ban(&self, feature: Feature) -> bool {
        self.banned_features.iter().any(|f| f == feature.as_str())
    }

    /// Banned outright, either by flag or by the `all` feature marker
    pub fn is_fully_banned(&self) -> bool {
        self.is_banned || self.has_feature_ban(Feature::All)
    }

    /// Whether the user may start the given feature's form
    pub fn is_restricted_from(&self, feature: Feature) -> bool {
        self.is_fully_banned() || self.has_feature_ban(feature)
    }

    pub fn is_broadcast_eligible(&self) -> bool {
        self.can_receive_broadcast && !self.is_fully_banned()
    }

    /// Most recent submission of either kind
    pub fn latest_submission(&self) -> Option<DateTime<Utc>> {
        match (self.last_anketa_time, self.last_appeal_time) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            "Без имени".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Identity fields refreshed on every contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Features an admin can switch off for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Anketa,
    Appeal,
    All,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Anketa => "anketa",
            Feature::Appeal => "appeal",
            Feature::All => "all",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = StarlyError;

    /// Only the restrictable features parse; `all` is reserved for bans.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anketa" => Ok(Feature::Anketa),
            "appeal" => Ok(Feature::Appeal),
            other => Err(StarlyError::InvalidInput(format!(
                "Unknown restriction '{}', expected anketa or appeal",
                other
            ))),
        }
    }
}

/// Mutually exclusive community groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Membership {
    Squad,
    City,
}

impl Membership {
    pub fn column(&self) -> &'static str {
        match self {
            Membership::Squad => "is_in_squad",
            Membership::City => "is_in_city",
        }
    }
}

/// Row selections used by listings and broadcast cohorts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFilter {
    All,
    Squad,
    City,
    /// Squad or city
    Starly,
    Banned,
    Subscribers,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        match self {
            UserFilter::All => true,
            UserFilter::Squad => user.is_in_squad,
            UserFilter::City => user.is_in_city,
            UserFilter::Starly => user.is_in_squad || user.is_in_city,
            UserFilter::Banned => user.is_banned,
            UserFilter::Subscribers => user.can_receive_broadcast,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserFilter::All => "all",
            UserFilter::Squad => "squad",
            UserFilter::City => "city",
            UserFilter::Starly => "starly",
            UserFilter::Banned => "banned",
            UserFilter::Subscribers => "subscribers",
        }
    }
}

/// How an admin names a user in a command argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Id(i64),
    Handle(String),
}

impl FromStr for UserRef {
    type Err = StarlyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('@') {
            let handle = strip_handle(s);
            if handle.is_empty() {
                return Err(StarlyError::InvalidInput("Empty username".to_string()));
            }
            return Ok(UserRef::Handle(handle.to_string()));
        }

        s.parse::<i64>().map(UserRef::Id).map_err(|_| {
            StarlyError::InvalidInput(
                "user_id must be a number and a username must start with @".to_string(),
            )
        })
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRef::Id(id) => write!(f, "{}", id),
            UserRef::Handle(handle) => write!(f, "@{}", handle),
        }
    }
}
