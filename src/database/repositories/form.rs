//! Pending form repository implementation
//!
//! Anketas and appeals live in separate tables keyed by user. Saving one kind
//! removes any row of the other kind in the same transaction.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use chrono::{DateTime, Utc};
use crate::database::store::FormStore;
use crate::state::{AnketaState, AppealState, FormState, PendingForm};
use crate::utils::errors::{StarlyError, Result};

#[derive(Debug, FromRow)]
struct PendingAnketaRow {
    user_id: i64,
    step: String,
    name: Option<String>,
    age: Option<i32>,
    game_nickname: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PendingAppealRow {
    user_id: i64,
    step: String,
    user_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn corrupt(table: &str, user_id: i64, step: &str) -> StarlyError {
    StarlyError::InvalidStateTransition {
        from: format!("{}:{}:{}", table, user_id, step),
        to: "restored form".to_string(),
    }
}

impl PendingAnketaRow {
    fn into_form(self) -> Result<PendingForm> {
        let missing = || corrupt("pending_anketas", self.user_id, &self.step);
        let age = self.age.and_then(|age| u8::try_from(age).ok());

        let state = match self.step.as_str() {
            "name" => AnketaState::Name,
            "age" => AnketaState::Age {
                name: self.name.clone().ok_or_else(missing)?,
            },
            "game_nickname" => AnketaState::GameNickname {
                name: self.name.clone().ok_or_else(missing)?,
                age: age.ok_or_else(missing)?,
            },
            "why_join" => AnketaState::WhyJoin {
                name: self.name.clone().ok_or_else(missing)?,
                age: age.ok_or_else(missing)?,
                game_nickname: self.game_nickname.clone().ok_or_else(missing)?,
            },
            _ => return Err(missing()),
        };

        Ok(PendingForm {
            user_id: self.user_id,
            state: FormState::Anketa(state),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PendingAppealRow {
    fn into_form(self) -> Result<PendingForm> {
        let missing = || corrupt("pending_appeals", self.user_id, &self.step);

        let state = match self.step.as_str() {
            "user_type" => AppealState::UserType,
            "message" => AppealState::Message {
                user_type: self.user_type.clone().ok_or_else(missing)?,
            },
            _ => return Err(missing()),
        };

        Ok(PendingForm {
            user_id: self.user_id,
            state: FormState::Appeal(state),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone, Debug)]
pub struct FormRepository {
    pool: PgPool,
}

impl FormRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FormStore for FormRepository {
    async fn find(&self, user_id: i64) -> Result<Option<PendingForm>> {
        let anketa = sqlx::query_as::<_, PendingAnketaRow>(
            "SELECT user_id, step, name, age, game_nickname, created_at, updated_at FROM pending_anketas WHERE user_id = $1"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = anketa {
            return row.into_form().map(Some);
        }

        let appeal = sqlx::query_as::<_, PendingAppealRow>(
            "SELECT user_id, step, user_type, created_at, updated_at FROM pending_appeals WHERE user_id = $1"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        appeal.map(PendingAppealRow::into_form).transpose()
    }

    async fn save(&self, form: &PendingForm) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        match &form.state {
            FormState::Anketa(state) => {
                let (name, age, game_nickname) = match state {
                    AnketaState::Name => (None, None, None),
                    AnketaState::Age { name } => (Some(name.as_str()), None, None),
                    AnketaState::GameNickname { name, age } => {
                        (Some(name.as_str()), Some(i32::from(*age)), None)
                    }
                    AnketaState::WhyJoin { name, age, game_nickname } => (
                        Some(name.as_str()),
                        Some(i32::from(*age)),
                        Some(game_nickname.as_str()),
                    ),
                };

                sqlx::query("DELETE FROM pending_appeals WHERE user_id = $1")
                    .bind(form.user_id)
                    .execute(&mut *tx)
                    .await?;

                sqlx::query(
                    r#"
                    INSERT INTO pending_anketas (user_id, step, name, age, game_nickname, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    ON CONFLICT (user_id) DO UPDATE
                    SET step = EXCLUDED.step,
                        name = EXCLUDED.name,
                        age = EXCLUDED.age,
                        game_nickname = EXCLUDED.game_nickname,
                        created_at = EXCLUDED.created_at,
                        updated_at = EXCLUDED.updated_at
                    "#
                )
                .bind(form.user_id)
                .bind(form.state.step())
                .bind(name)
                .bind(age)
                .bind(game_nickname)
                .bind(form.created_at)
                .bind(form.updated_at)
                .execute(&mut *tx)
                .await?;
            }
            FormState::Appeal(state) => {
                let user_type = match state {
                    AppealState::UserType => None,
                    AppealState::Message { user_type } => Some(user_type.as_str()),
                };

                sqlx::query("DELETE FROM pending_anketas WHERE user_id = $1")
                    .bind(form.user_id)
                    .execute(&mut *tx)
                    .await?;

                sqlx::query(
                    r#"
                    INSERT INTO pending_appeals (user_id, step, user_type, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (user_id) DO UPDATE
                    SET step = EXCLUDED.step,
                        user_type = EXCLUDED.user_type,
                        created_at = EXCLUDED.created_at,
                        updated_at = EXCLUDED.updated_at
                    "#
                )
                .bind(form.user_id)
                .bind(form.state.step())
                .bind(user_type)
                .bind(form.created_at)
                .bind(form.updated_at)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, user_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM pending_anketas WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM pending_appeals WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn purge_idle(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let anketas = sqlx::query("DELETE FROM pending_anketas WHERE updated_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        let appeals = sqlx::query("DELETE FROM pending_appeals WHERE updated_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(anketas.rows_affected() + appeals.rows_affected())
    }
}
