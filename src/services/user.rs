//! User service implementation
//!
//! Registration on first contact and the user's own settings.

use std::sync::Arc;
use tracing::{debug, info};
use crate::database::UserStore;
use crate::models::{RegisterUserRequest, User};
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Create the user or refresh their name fields
    pub async fn register(&self, from: &teloxide::types::User) -> Result<User> {
        let request = RegisterUserRequest {
            user_id: from.id.0 as i64,
            username: from.username.clone(),
            first_name: Some(from.first_name.clone()),
            last_name: from.last_name.clone(),
        };

        debug!(user_id = request.user_id, "Registering user");
        self.users.register(request).await
    }

    pub async fn get(&self, user_id: i64) -> Result<Option<User>> {
        self.users.find(user_id).await
    }

    /// Flip the broadcast opt-in. `None` when the user is unknown.
    pub async fn toggle_broadcast(&self, user_id: i64) -> Result<Option<User>> {
        let Some(user) = self.users.find(user_id).await? else {
            return Ok(None);
        };

        let updated = self
            .users
            .set_broadcast_opt_in(user_id, !user.can_receive_broadcast)
            .await?;

        if let Some(ref updated) = updated {
            info!(
                user_id = user_id,
                can_receive_broadcast = updated.can_receive_broadcast,
                "Broadcast preference changed"
            );
        }
        Ok(updated)
    }
}
