//! Storage seams
//!
//! Services depend on these traits rather than on the Postgres repositories
//! directly, so the conversation, moderation and broadcast logic can run
//! against any row store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::models::{Feature, FormKind, Membership, RegisterUserRequest, User, UserFilter};
use crate::state::PendingForm;
use crate::utils::errors::Result;

/// Row-per-user store with moderation flags
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert the user or refresh their name fields
    async fn register(&self, request: RegisterUserRequest) -> Result<User>;

    async fn find(&self, user_id: i64) -> Result<Option<User>>;

    /// First user with this handle by registration time, case-insensitive
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Matching users, newest registration first
    async fn list(&self, filter: UserFilter) -> Result<Vec<User>>;

    /// Ban sets `is_banned` and replaces features with `all`; unban clears both.
    /// Creates the row when missing.
    async fn set_ban(&self, user_id: i64, banned: bool) -> Result<User>;

    /// Set-insert into `banned_features`. Creates the row when missing.
    async fn add_restriction(&self, user_id: i64, feature: Feature) -> Result<User>;

    /// Set-remove from `banned_features`. Creates the row when missing.
    async fn remove_restriction(&self, user_id: i64, feature: Feature) -> Result<User>;

    /// Join one group and leave the other. `None` when the user is unknown.
    async fn set_membership(&self, user_id: i64, membership: Membership) -> Result<Option<User>>;

    /// Leave one group. `None` when the user is unknown.
    async fn clear_membership(&self, user_id: i64, membership: Membership) -> Result<Option<User>>;

    async fn set_broadcast_opt_in(&self, user_id: i64, enabled: bool) -> Result<Option<User>>;

    /// Stamp a delivered submission, remembering the previous latest one
    async fn record_submission(&self, user_id: i64, kind: FormKind, at: DateTime<Utc>) -> Result<()>;
}

/// Store for forms still being filled in
#[async_trait]
pub trait FormStore: Send + Sync {
    async fn find(&self, user_id: i64) -> Result<Option<PendingForm>>;

    /// Insert or update, dropping any form of the other kind
    async fn save(&self, form: &PendingForm) -> Result<()>;

    async fn delete(&self, user_id: i64) -> Result<()>;

    /// Remove forms idle since before `cutoff`, returning how many went
    async fn purge_idle(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
