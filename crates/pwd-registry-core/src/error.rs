//! Errors raised while loading, changing or storing a registry draft.

use thiserror::Error;
use uuid::Uuid;

/// Failure of a draft command or query.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The draft stream is empty: never started, discarded or expired.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Another writer appended to the draft stream after this command loaded it.
    /// The caller reloads the draft and decides whether to retry.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// Draft whose stream moved on.
        aggregate_id: Uuid,
        /// Last sequence number the command saw when it loaded the draft.
        expected: i64,
        /// Last sequence number in the stream at append time.
        actual: i64,
    },

    /// The command does not fit the draft's state, such as editing a
    /// discarded draft or uploading an unreadable photo.
    #[error("validation error: {0}")]
    Validation(String),

    /// The draft store or payload encoding failed. Surfaces as HTTP 500.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
