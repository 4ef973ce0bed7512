//! Storage error types.

use alert_engine::AlertError;
use thiserror::Error;

/// Errors that can occur while reading or writing records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// CSV reader error
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for AlertError {
    fn from(err: StoreError) -> Self {
        AlertError::Source(err.to_string())
    }
}

/// Map a unique-constraint violation to `AlreadyExists`.
pub(crate) fn conflict(entity: &'static str, id: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return StoreError::AlreadyExists {
                entity,
                id: id.to_string(),
            };
        }
    }
    StoreError::Sqlx(err)
}
