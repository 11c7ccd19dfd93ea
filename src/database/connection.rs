//! PgPool construction from configuration.
//!
//! One pool per process; every public operation checks a connection out of it
//! and runs its single all-or-nothing transaction there.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Build a connection pool from database configuration.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.pool)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect(&config.database_url())
        .await?;

    info!(
        host = %config.host,
        database = %config.database,
        pool = config.pool,
        "database pool established"
    );

    Ok(pool)
}

/// Apply pending migrations. Intended for service startup and test bootstrap.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| crate::error::WristpassError::Configuration(format!("migration failed: {e}")))?;
    Ok(())
}
