//! Postgres connection pool.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::instrument;

use crate::config::DatabaseConfig;
use crate::error::PersistenceError;

#[instrument(skip_all, fields(max_connections = cfg.max_connections), err)]
pub async fn connect(cfg: &DatabaseConfig) -> Result<PgPool, PersistenceError> {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect(&cfg.url)
        .await
        .map_err(|e| PersistenceError::new("connect", e))
}
