//! # Store Errors
//!
//! Error types for the record store. Constraint violations reported by the
//! database are classified here so the HTTP layer never inspects SQL errors.

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Lookup by primary key found no row
    #[error("Record not found")]
    NotFound,

    /// Unique constraint violated (e.g. duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// CHECK, NOT NULL or foreign key constraint violated
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Could not reach or open the database
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Any other query failure
    #[error("Query error: {0}")]
    Query(String),

    /// Applying or reverting migrations failed
    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) => {
                let message = db.message().to_string();
                match db.kind() {
                    ErrorKind::UniqueViolation => StoreError::Conflict(message),
                    ErrorKind::CheckViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::ForeignKeyViolation => StoreError::Validation(message),
                    _ => StoreError::Query(message),
                }
            }
            pool @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                StoreError::Connection(pool.to_string())
            }
            sqlx::Error::Io(e) => StoreError::Connection(e.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Migration(err.to_string())
    }
}
