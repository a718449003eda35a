//! User repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::database::store::UserStore;
use crate::models::{Feature, FormKind, Membership, RegisterUserRequest, User, UserFilter};
use crate::utils::errors::Result;

const USER_COLUMNS: &str = "user_id, username, first_name, last_name, created_at, is_banned, \
    banned_features, is_in_squad, is_in_city, can_receive_broadcast, last_anketa_time, \
    last_appeal_time, prev_submission_time";

#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn filter_clause(filter: UserFilter) -> &'static str {
        match filter {
            UserFilter::All => "TRUE",
            UserFilter::Squad => "is_in_squad",
            UserFilter::City => "is_in_city",
            UserFilter::Starly => "(is_in_squad OR is_in_city)",
            UserFilter::Banned => "is_banned",
            UserFilter::Subscribers => "can_receive_broadcast",
        }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn register(&self, request: RegisterUserRequest) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (user_id, username, first_name, last_name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET username = EXCLUDED.username,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(request.user_id)
            .bind(request.username)
            .bind(request.first_name)
            .bind(request.last_name)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find(&self, user_id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE user_id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE LOWER(username) = LOWER($1) ORDER BY created_at ASC LIMIT 1",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE {} ORDER BY created_at DESC",
            USER_COLUMNS,
            Self::filter_clause(filter)
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn set_ban(&self, user_id: i64, banned: bool) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (user_id, is_banned, banned_features)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET is_banned = EXCLUDED.is_banned,
                banned_features = EXCLUDED.banned_features
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let features: Vec<String> = if banned {
            vec![Feature::All.as_str().to_string()]
        } else {
            Vec::new()
        };

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(banned)
            .bind(features)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn add_restriction(&self, user_id: i64, feature: Feature) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (user_id, banned_features)
            VALUES ($1, ARRAY[$2]::TEXT[])
            ON CONFLICT (user_id) DO UPDATE
            SET banned_features = CASE
                WHEN $2 = ANY(users.banned_features) THEN users.banned_features
                ELSE array_append(users.banned_features, $2)
            END
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(feature.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn remove_restriction(&self, user_id: i64, feature: Feature) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE
            SET banned_features = array_remove(users.banned_features, $2)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(feature.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn set_membership(&self, user_id: i64, membership: Membership) -> Result<Option<User>> {
        let assignment = match membership {
            Membership::Squad => "is_in_squad = TRUE, is_in_city = FALSE",
            Membership::City => "is_in_city = TRUE, is_in_squad = FALSE",
        };
        let sql = format!(
            "UPDATE users SET {} WHERE user_id = $1 RETURNING {}",
            assignment, USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn clear_membership(&self, user_id: i64, membership: Membership) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET {} = FALSE WHERE user_id = $1 RETURNING {}",
            membership.column(),
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn set_broadcast_opt_in(&self, user_id: i64, enabled: bool) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET can_receive_broadcast = $2 WHERE user_id = $1 RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(enabled)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn record_submission(&self, user_id: i64, kind: FormKind, at: DateTime<Utc>) -> Result<()> {
        let column = match kind {
            FormKind::Anketa => "last_anketa_time",
            FormKind::Appeal => "last_appeal_time",
        };
        let sql = format!(
            r#"
            UPDATE users
            SET prev_submission_time = GREATEST(last_anketa_time, last_appeal_time),
                {} = $2
            WHERE user_id = $1
            "#,
            column
        );

        sqlx::query(&sql)
            .bind(user_id)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
