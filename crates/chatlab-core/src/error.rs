//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No live session exists for the given identifier.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// The caller violated the conversation state machine contract
    /// (reply after finish, survey before finish, duplicate survey).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Optimistic concurrency check failed: the session changed since it
    /// was loaded.
    #[error("concurrency conflict on session {session_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The session that had the conflict.
        session_id: Uuid,
        /// The version the caller loaded.
        expected: u64,
        /// The version in the store.
        actual: u64,
    },

    /// Input failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The session sink could not persist a completed session.
    #[error("sink write failed: {0}")]
    SinkWrite(String),

    /// An infrastructure error unrelated to the sink.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
