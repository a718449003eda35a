//! Database connection management

use std::str::FromStr;
use std::time::Duration;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use crate::config::DatabaseConfig;
use crate::utils::errors::Result;

pub type DatabasePool = Pool<Postgres>;

/// Build connect options from the URL, using the access key as password
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions> {
    let options = PgConnectOptions::from_str(&config.url)?;

    Ok(if config.key.is_empty() {
        options
    } else {
        options.password(&config.key)
    })
}

/// Create a new database connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .idle_timeout(Some(Duration::from_secs(600)))
        .max_lifetime(Some(Duration::from_secs(1800)))
        .connect_with(connect_options(config)?)
        .await?;

    // Test the connection
    health_check(&pool).await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<()> {
    tracing::info!("Running database migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &DatabasePool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, key: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            key: key.to_string(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_seconds: 5,
        }
    }

    #[test]
    fn test_connect_options_parse_url() {
        let options = connect_options(&config("postgresql://starly@db.example.com:6543/postgres", "secret"));
        let options = options.unwrap();
        assert_eq!(options.get_host(), "db.example.com");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("postgres"));
    }

    #[test]
    fn test_connect_options_reject_garbage() {
        assert!(connect_options(&config("not a url", "secret")).is_err());
    }
}
