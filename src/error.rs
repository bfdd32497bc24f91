use thiserror::Error;

use crate::validator::FieldErrors;

/// Failure reported by the project repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("project `{0}` not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepositoryError {
    /// Connection-level failures mean the backend could not be reached at all.
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                RepositoryError::Unavailable(err.to_string())
            }
            other => RepositoryError::Database(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} field(s) failed validation", .0.len())]
    Validation(FieldErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page {requested} is out of range (1..={total})")]
    OutOfRange { requested: usize, total: usize },
}
