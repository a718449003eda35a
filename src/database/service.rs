//! Database service layer
//!
//! Bundles the repositories over one shared pool.

use std::sync::Arc;
use uuid::Uuid;
use tracing::info;
use crate::database::{DatabasePool, FormRepository, InstanceRepository, UserRepository};
use crate::database::store::{FormStore, UserStore};
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub forms: FormRepository,
    pub instances: InstanceRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            forms: FormRepository::new(pool.clone()),
            instances: InstanceRepository::new(pool),
        }
    }

    pub fn user_store(&self) -> Arc<dyn UserStore> {
        Arc::new(self.users.clone())
    }

    pub fn form_store(&self) -> Arc<dyn FormStore> {
        Arc::new(self.forms.clone())
    }

    /// Take over from any previous process: stale instances are marked
    /// stopped and this one is recorded as active.
    pub async fn claim_instance(&self) -> Result<Uuid> {
        let stale = self.instances.deactivate_all().await?;
        if stale > 0 {
            info!(stale_instances = stale, "Deactivated previous bot instances");
        }

        let instance_id = Uuid::new_v4();
        self.instances.register(instance_id).await?;
        info!(instance_id = %instance_id, "Registered bot instance");

        Ok(instance_id)
    }

    pub async fn release_instance(&self, instance_id: Uuid) -> Result<()> {
        self.instances.deactivate(instance_id).await?;
        info!(instance_id = %instance_id, "Bot instance deactivated");
        Ok(())
    }
}
