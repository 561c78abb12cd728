//! Error types for the session layer.

use hanzi_core::EntryKind;
use thiserror::Error;

/// Errors surfaced by a [`crate::store::StudyStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("study item not found: {0}")]
    ItemNotFound(i64),
}

/// Errors from review session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("dictionary entry not found: {kind:?} id {id}")]
    EntryNotFound { kind: EntryKind, id: i64 },
}
