//! Connection pool management and migrations.
//!
//! The durable backend is Postgres through SQLx. Counters rely on a single
//! upsert statement for atomicity, so any number of service instances may
//! share one database without further coordination.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::sequence::PgSequenceStore;
use crate::templates::PgTemplateStore;
use crate::StoreError;

/// Pool settings for the counter and template tables.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Postgres URL holding `sequence_counters` and `identifier_templates`.
    pub database_url: String,

    /// Upper bound on concurrent allocations per process.
    pub max_connections: u32,

    pub min_connections: u32,

    /// Connection acquire timeout. Bounds how long `allocate` can wait for
    /// a connection before failing with `StorageUnavailable`.
    pub acquire_timeout: Duration,

    pub idle_timeout: Duration,

    pub max_lifetime: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/ordinal".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl DbConfig {
    /// Reads `DATABASE_URL`, `DB_MAX_CONNECTIONS`, `DB_MIN_CONNECTIONS` and
    /// `DB_ACQUIRE_TIMEOUT_SECS`. Unset or unparsable values keep their
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database_url = std::env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_connections);

        let min_connections = std::env::var("DB_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.min_connections);

        let acquire_timeout = std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.acquire_timeout);

        Self {
            database_url,
            max_connections,
            min_connections,
            acquire_timeout,
            ..defaults
        }
    }
}

/// Shared pool from which sequence and template store handles are made.
///
/// Handles are cheap clones of the pool; every handle made from the same
/// database sees the same counters.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Opens the pool. Unreachable databases fail with a storage-unavailable
    /// error once `acquire_timeout` elapses.
    pub async fn connect(config: &DbConfig) -> Result<Self, StoreError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to sequence database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .max_lifetime(Some(config.max_lifetime))
            .connect(&config.database_url)
            .await
            .map_err(StoreError::Connect)?;

        info!("Sequence database ready");

        Ok(Self { pool })
    }

    /// Uses a pool owned by the host service, so allocation can share its
    /// connections.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trips a trivial query.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    /// Creates or updates the counter and template tables.
    ///
    /// Migration files are read at runtime from the first candidate
    /// directory that loads, so the binary works both from the workspace
    /// root and from the crate directory.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        info!("Applying sequence schema migrations");

        let candidates = vec![
            std::path::PathBuf::from("./migrations"),
            std::path::PathBuf::from("libs/store/migrations"),
            std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations"),
        ];
        let mut last_error: Option<sqlx::migrate::MigrateError> = None;

        for dir in &candidates {
            match sqlx::migrate::Migrator::new(dir.clone()).await {
                Ok(migrator) => {
                    info!(migrations_dir = %dir.display(), "Loaded migrations");
                    migrator
                        .run(&self.pool)
                        .await
                        .map_err(StoreError::Migration)?;
                    info!("Sequence schema up to date");
                    return Ok(());
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        let tried = candidates
            .iter()
            .map(|dir| dir.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Err(StoreError::MigrationDirNotFound {
            tried,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string()),
        })
    }

    /// Handle for allocating numbers.
    pub fn sequence_store(&self) -> PgSequenceStore {
        PgSequenceStore::new(self.pool.clone())
    }

    /// Handle for reading and editing display templates.
    pub fn template_store(&self) -> PgTemplateStore {
        PgTemplateStore::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_defaults() {
        // Allocation must fail fast rather than hang on an unreachable database
        let config = DbConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
    }
}
