use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config;

/// Errors from pool bootstrap
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connects the single application pool from DATABASE_URL and applies
/// pending migrations.
pub async fn connect() -> Result<PgPool, DatabaseError> {
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

    // Validate early so a malformed URL fails with a clear error
    url::Url::parse(&database_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

    let db_config = &config::config().database;
    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(Duration::from_secs(db_config.connection_timeout))
        .connect(&database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    info!("Connected database pool ({} max connections)", db_config.max_connections);
    Ok(pool)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
