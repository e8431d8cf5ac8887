//! Error types for the data access layer.

use thiserror::Error;

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("invalid column data: {0}")]
    InvalidData(String),
}
