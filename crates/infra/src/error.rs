use thiserror::Error;

/// A database failure, tagged with the operation that hit it.
#[derive(Debug, Error)]
#[error("{operation}: {source}")]
pub struct PersistenceError {
    pub operation: &'static str,
    #[source]
    pub source: sqlx::Error,
}

impl PersistenceError {
    pub fn new(operation: &'static str, source: sqlx::Error) -> Self {
        Self { operation, source }
    }
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,

    /// The write refers to something that does not exist or is not allowed.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// No active user with that id.
    #[error("identity not found")]
    NotFound,

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
