//! Error types for flock.

use thiserror::Error;

/// Common error type for flock.
#[derive(Error, Debug)]
pub enum FlockError {
    /// Database error.
    ///
    /// Wraps errors from the SQLite backend. Errors from sqlx are
    /// automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Password hashing error.
    #[error("password error: {0}")]
    Password(#[from] crate::auth::PasswordError),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for FlockError {
    fn from(e: sqlx::Error) -> Self {
        FlockError::Database(e.to_string())
    }
}

/// Result type alias for flock operations.
pub type Result<T> = std::result::Result<T, FlockError>;
