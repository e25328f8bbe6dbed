//! Error types for Nomos

use thiserror::Error;

/// Repository result type
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Errors raised by persistence adapters
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// Entity missing where the adapter required it
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness constraint violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend failure
    #[error("storage error: {0}")]
    StorageError(String),
}

/// Engine error type
#[derive(Debug, Error)]
pub enum EngineError {
    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Caller supplied input that violates a precondition
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation is not allowed in the entity's current state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Persistence failure
    #[error("storage failure: {0}")]
    Storage(#[from] RepositoryError),
}

impl EngineError {
    /// Not-found error for an entity kind and id
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {}", kind, id))
    }

    /// Whether the error is a client-visible not-found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
