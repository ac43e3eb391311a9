//! Opaque session tokens.
//!
//! A user holds at most one token, stored in `users.session_token`. Issuing a
//! new token overwrites the old one, which stops resolving immediately.

use std::fmt::Write as _;

use rand_core::{OsRng, RngCore};
use thiserror::Error;
use tracing::{debug, info};

use crate::db::{DbPool, User, UserRepository};
use crate::{FlockError, Result};

/// Random bytes per token.
pub const TOKEN_BYTES: usize = 32;

/// Request authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No token supplied.
    #[error("Authentication required. Please log in.")]
    MissingToken,

    /// Token does not belong to any user.
    #[error("Invalid or expired session. Please log in again.")]
    InvalidToken,

    /// Token lookup failed.
    #[error("session lookup failed: {0}")]
    Store(#[from] FlockError),
}

/// Generate a fresh token: [`TOKEN_BYTES`] bytes from the OS RNG, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes
        .iter()
        .fold(String::with_capacity(TOKEN_BYTES * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}

/// Issues and revokes session tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    pool: DbPool,
}

impl SessionIssuer {
    /// Create an issuer.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Issue a new token for the user, replacing any previous one.
    pub async fn issue(&self, user_id: i64) -> Result<String> {
        let token = generate_token();
        let stored = UserRepository::new(&self.pool)
            .set_session_token(user_id, Some(&token))
            .await?;
        if !stored {
            return Err(FlockError::NotFound("user".to_string()));
        }
        debug!(user_id, "Issued session token");
        Ok(token)
    }

    /// Clear the user's token. Returns false if the user does not exist.
    pub async fn revoke(&self, user_id: i64) -> Result<bool> {
        let revoked = UserRepository::new(&self.pool)
            .set_session_token(user_id, None)
            .await?;
        if revoked {
            info!(user_id, "Revoked session token");
        }
        Ok(revoked)
    }
}

/// Resolves request tokens to users.
#[derive(Clone)]
pub struct SessionValidator {
    pool: DbPool,
}

impl SessionValidator {
    /// Create a validator.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Resolve the caller from an `Authorization` header value or a query token.
    ///
    /// The header wins when both are present. Empty tokens count as absent.
    pub async fn resolve(
        &self,
        authorization: Option<&str>,
        query_token: Option<&str>,
    ) -> std::result::Result<User, AuthError> {
        let token = authorization
            .and_then(bearer_token)
            .or_else(|| query_token.map(str::trim).filter(|t| !t.is_empty()))
            .ok_or(AuthError::MissingToken)?;

        UserRepository::new(&self.pool)
            .get_by_session_token(token)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

/// Extract the token from a `Bearer <token>` header value.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
