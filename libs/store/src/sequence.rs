//! Sequence allocation.
//!
//! `allocate` is the only operation in the subsystem that needs
//! coordination. Each backend performs the read-modify-write as one
//! indivisible step in the storage layer and never caches the next value
//! locally. Nothing here retries: after an ambiguous failure the caller
//! cannot know whether a number was consumed, so the decision is theirs.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use ordinal_id::{SequenceKey, SequenceNumber};
use sqlx::postgres::PgPool;
use tracing::debug;

use crate::StoreError;

/// Durable per-key counters.
///
/// # Invariants
/// - The first allocation for a key returns 1
/// - N allocations for one key return exactly 1..=N, however interleaved
/// - Keys are independent of each other
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Atomically increments the counter for `key` and returns the new
    /// value, creating the counter at 0 first if it does not exist.
    async fn allocate(&self, key: &SequenceKey) -> Result<SequenceNumber, StoreError>;

    /// Returns the last allocated value without incrementing, or `None` if
    /// nothing was ever allocated for `key`.
    async fn current(&self, key: &SequenceKey) -> Result<Option<SequenceNumber>, StoreError>;
}

/// Postgres-backed counters.
///
/// Allocation is a single `INSERT ... ON CONFLICT DO UPDATE ... RETURNING`
/// statement; the row lock taken by the upsert serializes concurrent callers
/// for the same key across every connection and process.
#[derive(Clone)]
pub struct PgSequenceStore {
    pool: PgPool,
}

impl PgSequenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SequenceStore for PgSequenceStore {
    async fn allocate(&self, key: &SequenceKey) -> Result<SequenceNumber, StoreError> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sequence_counters (entity_type, scope_id, value)
            VALUES ($1, $2, 1)
            ON CONFLICT (entity_type, scope_id)
            DO UPDATE SET
                value = sequence_counters.value + 1,
                updated_at = now()
            RETURNING value
            "#,
        )
        .bind(key.entity_type().as_str())
        .bind(key.storage_scope())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // 22003: numeric_value_out_of_range
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.code().as_deref() == Some("22003") {
                    return StoreError::SequenceExhausted {
                        key: key.to_string(),
                    };
                }
            }
            StoreError::from_sqlx(e)
        })?;

        debug!(key = %key, value, "Allocated sequence number");
        Ok(SequenceNumber::new(value))
    }

    async fn current(&self, key: &SequenceKey) -> Result<Option<SequenceNumber>, StoreError> {
        let value: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT value
            FROM sequence_counters
            WHERE entity_type = $1 AND scope_id = $2
            "#,
        )
        .bind(key.entity_type().as_str())
        .bind(key.storage_scope())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(value.map(SequenceNumber::new))
    }
}

/// In-process counters for single-instance embedding and tests.
///
/// The mutex plays the role of the storage layer's atomic primitive and is
/// held only for the increment itself. It offers no guarantee across
/// processes; use [`PgSequenceStore`] when more than one instance allocates.
#[derive(Debug, Default)]
pub struct MemorySequenceStore {
    counters: Mutex<HashMap<SequenceKey, i64>>,
}

impl MemorySequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys that have allocated at least once.
    pub fn key_count(&self) -> usize {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl SequenceStore for MemorySequenceStore {
    async fn allocate(&self, key: &SequenceKey) -> Result<SequenceNumber, StoreError> {
        let value = {
            // No code between lock and unlock can panic, so a poisoned map
            // still holds consistent counters.
            let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
            let counter = counters.entry(key.clone()).or_insert(0);
            let next = counter
                .checked_add(1)
                .ok_or_else(|| StoreError::SequenceExhausted {
                    key: key.to_string(),
                })?;
            *counter = next;
            next
        };

        debug!(key = %key, value, "Allocated sequence number");
        Ok(SequenceNumber::new(value))
    }

    async fn current(&self, key: &SequenceKey) -> Result<Option<SequenceNumber>, StoreError> {
        let counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(counters.get(key).copied().map(SequenceNumber::new))
    }
}
