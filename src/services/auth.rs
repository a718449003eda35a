//! Authorization service
//!
//! Admin commands are gated by a static allow-list. How a refusal looks is a
//! property of the command family: moderation stays silent so the commands
//! are not revealed, broadcasts answer explicitly.

use std::collections::HashSet;
use tracing::debug;
use crate::utils::errors::{StarlyError, Result};

pub const NO_RIGHTS_TEXT: &str = "❌ У вас нет прав для этой команды.";

/// Groups of admin commands sharing a denial policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandFamily {
    /// Ban, restrict and group membership changes
    Moderation,
    /// User listings
    Listing,
    Broadcast,
}

/// What a non-admin sees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Silent,
    Explicit(&'static str),
}

impl CommandFamily {
    pub fn denial_policy(&self) -> Denial {
        match self {
            CommandFamily::Moderation | CommandFamily::Listing => Denial::Silent,
            CommandFamily::Broadcast => Denial::Explicit(NO_RIGHTS_TEXT),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthService {
    admin_ids: HashSet<i64>,
}

impl AuthService {
    pub fn new(admin_ids: &[i64]) -> Self {
        Self {
            admin_ids: admin_ids.iter().copied().collect(),
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// `Ok` for admins. The caller answers a refusal per `family.denial_policy()`.
    pub fn authorize(&self, user_id: i64, family: CommandFamily) -> Result<()> {
        if self.is_admin(user_id) {
            return Ok(());
        }

        debug!(user_id = user_id, family = ?family, "Admin command refused");
        Err(StarlyError::PermissionDenied(format!(
            "user {} may not run {:?} commands",
            user_id, family
        )))
    }
}
