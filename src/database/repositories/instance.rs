//! Bot instance registry

use sqlx::PgPool;
use chrono::Utc;
use uuid::Uuid;
use crate::models::BotInstance;
use crate::utils::errors::Result;

#[derive(Clone, Debug)]
pub struct InstanceRepository {
    pool: PgPool,
}

impl InstanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mark every recorded instance as stopped, returning how many were live
    pub async fn deactivate_all(&self) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE bot_instances SET is_active = FALSE, stopped_at = $1 WHERE is_active"
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Record a newly started instance
    pub async fn register(&self, instance_id: Uuid) -> Result<BotInstance> {
        let instance = sqlx::query_as::<_, BotInstance>(
            r#"
            INSERT INTO bot_instances (instance_id, is_active, started_at)
            VALUES ($1, TRUE, $2)
            RETURNING instance_id, is_active, started_at, stopped_at
            "#
        )
        .bind(instance_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(instance)
    }

    pub async fn deactivate(&self, instance_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE bot_instances SET is_active = FALSE, stopped_at = $2 WHERE instance_id = $1"
        )
        .bind(instance_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn active_count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bot_instances WHERE is_active")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
