//! API error handling.
//!
//! Every failure body carries a `status` discriminator (`error` or `locked`)
//! and a `messages.error` string.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::{AuthError, LockoutStatus};
use crate::FlockError;

/// Message for rejected credentials.
pub const INVALID_CREDENTIALS: &str = "Invalid login credentials";

/// Message for a locked (address, username) pair.
pub const LOCKED_OUT: &str = "Too many failed attempts. Please wait before trying again.";

/// Message for unexpected failures.
pub const INTERNAL_ERROR: &str = "An internal error occurred";

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Unauthorized (401).
    Unauthorized,
    /// Locked out (429).
    Locked,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Locked => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the body's `status` field.
    pub fn status_label(&self) -> &'static str {
        match self {
            ErrorCode::Locked => "locked",
            ErrorCode::Unauthorized | ErrorCode::InternalError => "error",
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// `error` or `locked`.
    pub status: &'static str,
    /// Error messages.
    pub messages: ErrorMessages,
    /// Attempts inside the lockout window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    /// Seconds until another attempt is allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// Error messages.
#[derive(Debug, Serialize)]
pub struct ErrorMessages {
    /// Human-readable message.
    pub error: String,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    lockout: Option<LockoutStatus>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            lockout: None,
        }
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Rejected credentials, with the lockout state after the failure.
    pub fn invalid_credentials(lockout: LockoutStatus) -> Self {
        Self {
            lockout: Some(lockout),
            ..Self::unauthorized(INVALID_CREDENTIALS)
        }
    }

    /// Refused because the pair is locked.
    pub fn locked(lockout: LockoutStatus) -> Self {
        Self {
            code: ErrorCode::Locked,
            message: LOCKED_OUT.to_string(),
            lockout: Some(lockout),
        }
    }

    /// The error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            status: self.code.status_label(),
            messages: ErrorMessages {
                error: self.message,
            },
            attempts: self.lockout.map(|l| l.attempts),
            retry_after: self.lockout.map(|l| l.retry_after_secs),
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<FlockError> for ApiError {
    fn from(err: FlockError) -> Self {
        tracing::error!(error = %err, "Internal error");
        ApiError::internal(INTERNAL_ERROR)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken => {
                ApiError::unauthorized(err.to_string())
            }
            AuthError::Store(e) => e.into(),
        }
    }
}
