//! Credential verification with the plaintext → hash ratchet.
//!
//! Every rejection costs one Argon2 verification, whether the account
//! exists, holds a hash, or holds a legacy plaintext secret.

use std::sync::OnceLock;

use tracing::{info, warn};

use super::password::{hash_password, plaintext_matches, verify_password, PasswordError};
use crate::db::{DbPool, PasswordEncoding, User, UserRepository};
use crate::{FlockError, Result};

/// Outcome of checking a submitted secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    /// The secret matched.
    pub valid: bool,
    /// A legacy plaintext secret was re-stored as a hash during this check.
    pub upgraded: bool,
}

impl Verification {
    const INVALID: Self = Self {
        valid: false,
        upgraded: false,
    };
}

/// Verifies submitted secrets against stored user records.
#[derive(Clone)]
pub struct CredentialVerifier {
    pool: DbPool,
}

impl CredentialVerifier {
    /// Create a verifier.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check `submitted` against `user`'s stored secret.
    ///
    /// A matching plaintext secret is hashed and stored before returning, so
    /// an account only ever moves from plaintext to hashed. Failing to store
    /// the hash fails the call.
    pub async fn verify(&self, user: &User, submitted: &str) -> Result<Verification> {
        match user.password_encoding {
            PasswordEncoding::Plaintext => {
                if !plaintext_matches(submitted, &user.password) {
                    return self.verify_dummy(submitted).await;
                }
                self.upgrade(user, submitted).await?;
                Ok(Verification {
                    valid: true,
                    upgraded: true,
                })
            }
            PasswordEncoding::Hashed => {
                let (submitted, hash) = (submitted.to_owned(), user.password.clone());
                let outcome = blocking(move || verify_password(&submitted, &hash)).await?;
                match outcome {
                    Ok(()) => Ok(Verification {
                        valid: true,
                        upgraded: false,
                    }),
                    Err(PasswordError::InvalidHash) => {
                        warn!(user_id = user.id, "Stored password hash is malformed");
                        Ok(Verification::INVALID)
                    }
                    Err(_) => Ok(Verification::INVALID),
                }
            }
        }
    }

    /// Spend one Argon2 verification against a fixed hash and reject.
    ///
    /// Used when there is no stored hash to check, so the caller's timing
    /// matches a wrong password for a hashed account.
    pub async fn verify_dummy(&self, submitted: &str) -> Result<Verification> {
        let submitted = submitted.to_owned();
        blocking(move || match dummy_hash() {
            Some(hash) => {
                let _ = verify_password(&submitted, hash);
            }
            None => warn!("Dummy password hash unavailable"),
        })
        .await?;
        Ok(Verification::INVALID)
    }

    async fn upgrade(&self, user: &User, secret: &str) -> Result<()> {
        let secret = secret.to_owned();
        let hash = blocking(move || hash_password(&secret)).await??;

        let stored = UserRepository::new(&self.pool)
            .store_password_hash(user.id, &hash)
            .await?;
        if !stored {
            return Err(FlockError::NotFound("user".to_string()));
        }

        info!(username = %user.username, "Migrated password");
        Ok(())
    }
}

/// Argon2id hash of a fixed secret, built once with the production parameters.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("flock-dummy-secret").ok())
        .as_deref()
}

// Argon2 at 64 MiB is too heavy for the async worker threads.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| FlockError::Auth(format!("password task failed: {e}")))
}
