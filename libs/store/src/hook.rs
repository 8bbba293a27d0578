//! Entity creation with a sequence number.
//!
//! Creation workflows allocate before they first persist a record, store the
//! number on the entity, then commit. If the commit fails the number stays
//! consumed: the workflow either completes later with the same number or
//! abandons creation and leaves a gap. Allocation is never repeated for the
//! same logical entity.

use std::future::Future;

use ordinal_id::{SequenceKey, SequenceNumber};
use thiserror::Error;
use tracing::{debug, warn};

use crate::sequence::SequenceStore;
use crate::StoreError;

/// Failure while creating a numbered entity.
#[derive(Debug, Error)]
pub enum CreateError<E: std::error::Error + 'static> {
    /// No number was allocated; the entity must not be created.
    #[error("failed to allocate a sequence number for {key}")]
    Allocation {
        key: SequenceKey,
        #[source]
        source: StoreError,
    },

    /// The number was allocated but the entity was not committed.
    #[error("creating {key} #{number} failed; the number stays consumed")]
    Commit {
        key: SequenceKey,
        number: SequenceNumber,
        #[source]
        source: E,
    },
}

impl<E: std::error::Error + 'static> CreateError<E> {
    /// The number lost to a failed commit, if any.
    ///
    /// Callers that retry the commit must reuse this number.
    pub fn consumed_number(&self) -> Option<SequenceNumber> {
        match self {
            CreateError::Allocation { .. } => None,
            CreateError::Commit { number, .. } => Some(*number),
        }
    }
}

/// An entity committed with its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Numbered<T> {
    pub number: SequenceNumber,
    pub entity: T,
}

/// Allocates once for `key`, then runs `commit` once with the number.
///
/// `commit` is expected to write the number into the entity's sequence
/// field as part of the same persistence step that creates the entity.
pub async fn create_numbered<S, F, Fut, T, E>(
    store: &S,
    key: &SequenceKey,
    commit: F,
) -> Result<Numbered<T>, CreateError<E>>
where
    S: SequenceStore + ?Sized,
    F: FnOnce(SequenceNumber) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let number = store
        .allocate(key)
        .await
        .map_err(|source| CreateError::Allocation {
            key: key.clone(),
            source,
        })?;

    debug!(key = %key, number = number.value(), "Committing numbered entity");

    match commit(number).await {
        Ok(entity) => Ok(Numbered { number, entity }),
        Err(source) => {
            warn!(
                key = %key,
                number = number.value(),
                error = %source,
                "Entity commit failed after allocation; sequence number consumed"
            );
            Err(CreateError::Commit {
                key: key.clone(),
                number,
                source,
            })
        }
    }
}
