//! In-memory implementations of the storage traits

use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use StarlyBot::database::{FormStore, UserStore};
use StarlyBot::models::{Feature, FormKind, Membership, RegisterUserRequest, User, UserFilter};
use StarlyBot::state::PendingForm;
use StarlyBot::Result;

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<i64, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row directly, bypassing registration
    pub async fn insert(&self, user: User) {
        self.users.lock().await.insert(user.user_id, user);
    }

    pub async fn get(&self, user_id: i64) -> Option<User> {
        self.users.lock().await.get(&user_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    async fn upsert<F>(&self, user_id: i64, change: F) -> User
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.lock().await;
        let user = users.entry(user_id).or_insert_with(|| {
            User::new(
                RegisterUserRequest { user_id, username: None, first_name: None, last_name: None },
                Utc::now(),
            )
        });
        change(user);
        user.clone()
    }

    async fn update<F>(&self, user_id: i64, change: F) -> Option<User>
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.lock().await;
        users.get_mut(&user_id).map(|user| {
            change(user);
            user.clone()
        })
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn register(&self, request: RegisterUserRequest) -> Result<User> {
        let mut users = self.users.lock().await;
        let user = users
            .entry(request.user_id)
            .and_modify(|user| {
                user.username = request.username.clone();
                user.first_name = request.first_name.clone();
                user.last_name = request.last_name.clone();
            })
            .or_insert_with(|| User::new(request.clone(), Utc::now()));
        Ok(user.clone())
    }

    async fn find(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.get(user_id).await)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.lock().await;
        let wanted = username.to_lowercase();
        Ok(users
            .values()
            .filter(|user| user.username.as_deref().map(str::to_lowercase).as_deref() == Some(wanted.as_str()))
            .min_by_key(|user| user.created_at)
            .cloned())
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>> {
        let users = self.users.lock().await;
        let mut matching: Vec<User> = users.values().filter(|user| filter.matches(user)).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn set_ban(&self, user_id: i64, banned: bool) -> Result<User> {
        Ok(self
            .upsert(user_id, |user| {
                user.is_banned = banned;
                user.banned_features = if banned { vec![Feature::All.as_str().to_string()] } else { Vec::new() };
            })
            .await)
    }

    async fn add_restriction(&self, user_id: i64, feature: Feature) -> Result<User> {
        Ok(self
            .upsert(user_id, |user| {
                if !user.has_feature_ban(feature) {
                    user.banned_features.push(feature.as_str().to_string());
                }
            })
            .await)
    }

    async fn remove_restriction(&self, user_id: i64, feature: Feature) -> Result<User> {
        Ok(self
            .upsert(user_id, |user| user.banned_features.retain(|f| f != feature.as_str()))
            .await)
    }

    async fn set_membership(&self, user_id: i64, membership: Membership) -> Result<Option<User>> {
        Ok(self
            .update(user_id, |user| {
                user.is_in_squad = membership == Membership::Squad;
                user.is_in_city = membership == Membership::City;
            })
            .await)
    }

    async fn clear_membership(&self, user_id: i64, membership: Membership) -> Result<Option<User>> {
        Ok(self
            .update(user_id, |user| match membership {
                Membership::Squad => user.is_in_squad = false,
                Membership::City => user.is_in_city = false,
            })
            .await)
    }

    async fn set_broadcast_opt_in(&self, user_id: i64, enabled: bool) -> Result<Option<User>> {
        Ok(self.update(user_id, |user| user.can_receive_broadcast = enabled).await)
    }

    async fn record_submission(&self, user_id: i64, kind: FormKind, at: DateTime<Utc>) -> Result<()> {
        self.update(user_id, |user| {
            user.prev_submission_time = user.latest_submission();
            match kind {
                FormKind::Anketa => user.last_anketa_time = Some(at),
                FormKind::Appeal => user.last_appeal_time = Some(at),
            }
        })
        .await;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryFormStore {
    forms: Mutex<HashMap<i64, PendingForm>>,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: i64) -> Option<PendingForm> {
        self.forms.lock().await.get(&user_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.forms.lock().await.len()
    }
}

#[async_trait]
impl FormStore for MemoryFormStore {
    async fn find(&self, user_id: i64) -> Result<Option<PendingForm>> {
        Ok(self.get(user_id).await)
    }

    async fn save(&self, form: &PendingForm) -> Result<()> {
        self.forms.lock().await.insert(form.user_id, form.clone());
        Ok(())
    }

    async fn delete(&self, user_id: i64) -> Result<()> {
        self.forms.lock().await.remove(&user_id);
        Ok(())
    }

    async fn purge_idle(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut forms = self.forms.lock().await;
        let before = forms.len();
        forms.retain(|_, form| form.updated_at >= cutoff);
        Ok((before - forms.len()) as u64)
    }
}
