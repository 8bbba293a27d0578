//! Store error types.

use ordinal_id::IdError;
use thiserror::Error;

/// Sequence and template store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the database.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// The counter or template store could not be reached.
    ///
    /// Entity creation must abort; whether a pending allocation took effect
    /// is unknown, so it must not be retried blindly.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A query reached the database and failed.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    /// Migration directory not found in the current environment.
    #[error("migration directory not found; tried {tried}. Last error: {last_error}")]
    MigrationDirNotFound { tried: String, last_error: String },

    /// No display template exists for the entity type.
    #[error("no identifier template configured for entity type '{entity_type}'")]
    NotConfigured { entity_type: String },

    /// The counter reached the largest storable value.
    #[error("sequence exhausted for {key}")]
    SequenceExhausted { key: String },

    /// An entity type or scope failed validation.
    #[error("invalid sequence key: {0}")]
    InvalidKey(#[from] IdError),

    /// A template file could not be parsed.
    #[error("invalid template file: {0}")]
    InvalidToml(#[from] toml::de::Error),
}

impl StoreError {
    /// Classifies a sqlx error: connectivity failures are `StorageUnavailable`,
    /// everything else is a query failure.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::WorkerCrashed => StoreError::StorageUnavailable(Box::new(err)),
            other => StoreError::Query(other),
        }
    }

    pub fn not_configured(entity_type: impl std::fmt::Display) -> Self {
        StoreError::NotConfigured {
            entity_type: entity_type.to_string(),
        }
    }

    /// Returns true if the backing store could not be reached.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::StorageUnavailable(_) | StoreError::Connect(_)
        )
    }

    /// Returns true if no template is configured.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, StoreError::NotConfigured { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let err = StoreError::from_sqlx(sqlx::Error::PoolTimedOut);
        assert!(err.is_storage_unavailable());
    }

    #[test]
    fn test_row_not_found_is_query_error() {
        let err = StoreError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Query(_)));
        assert!(!err.is_storage_unavailable());
    }

    #[test]
    fn test_not_configured_message() {
        let err = StoreError::not_configured("Requirement");
        assert!(err.is_not_configured());
        assert_eq!(
            err.to_string(),
            "no identifier template configured for entity type 'Requirement'"
        );
    }
}
