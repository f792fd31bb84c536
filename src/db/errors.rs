//! Credential store error types.

use std::time::Duration;
use thiserror::Error;

/// Credential store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Operation timed out
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Insert rejected by the unique email constraint
    #[error("Email already exists")]
    DuplicateEmail,

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Translate unique violations into [`StoreError::DuplicateEmail`].
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            other => StoreError::Database(other),
        }
    }
}

/// Result type for credential store operations
pub type StoreResult<T> = Result<T, StoreError>;
