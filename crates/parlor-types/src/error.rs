use thiserror::Error;

/// Errors from repository operations (used by trait definitions in parlor-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to chat operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat not found")]
    NotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors related to profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
