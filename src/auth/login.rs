//! Login and logout flows.
//!
//! Each call runs `lockout check → credential check → success | failure`
//! and ends with at most one audit event. Nothing is held between calls.

use tracing::{info, warn};

use super::credential::CredentialVerifier;
use super::ledger::{AttemptLedger, LockoutStatus};
use super::session::SessionIssuer;
use crate::audit::{action, AuditEvent, AuditTrail};
use crate::db::{DbPool, User, UserRepository};
use crate::Result;

/// Result of a login call.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Credentials accepted and a new token issued.
    Success {
        /// The new session token.
        token: String,
        /// The authenticated user.
        user: User,
    },
    /// Credentials rejected; `lockout` is re-evaluated after recording the failure.
    Rejected {
        /// Lockout state after this failure.
        lockout: LockoutStatus,
    },
    /// The pair was already locked; credentials were not checked.
    Locked {
        /// Current lockout state.
        lockout: LockoutStatus,
    },
}

/// Ties the ledger, verifier, issuer and audit trail together.
#[derive(Clone)]
pub struct LoginOrchestrator {
    pool: DbPool,
    ledger: AttemptLedger,
    verifier: CredentialVerifier,
    issuer: SessionIssuer,
    audit: AuditTrail,
}

impl LoginOrchestrator {
    /// Create an orchestrator.
    pub fn new(
        pool: DbPool,
        ledger: AttemptLedger,
        verifier: CredentialVerifier,
        issuer: SessionIssuer,
        audit: AuditTrail,
    ) -> Self {
        Self {
            pool,
            ledger,
            verifier,
            issuer,
            audit,
        }
    }

    /// The attempt ledger.
    pub fn ledger(&self) -> &AttemptLedger {
        &self.ledger
    }

    /// Attempt a login from `address`.
    ///
    /// Unknown usernames take the same failure path as a wrong password,
    /// including one Argon2 verification. Ledger and token write failures
    /// are returned as errors, so no session is granted unless it was
    /// stored. On success the pair is cleared before the token is issued,
    /// so a failed clear leaves the user's current session untouched.
    pub async fn login(&self, address: &str, username: &str, password: &str) -> Result<LoginOutcome> {
        let lockout = self.ledger.evaluate_lockout(address, username).await?;
        if lockout.locked {
            warn!(
                address = %address,
                username = %username,
                retry_after = lockout.retry_after_secs,
                "Login refused: locked out"
            );
            return Ok(LoginOutcome::Locked { lockout });
        }

        let user = UserRepository::new(&self.pool).get_by_username(username).await?;
        let Some(user) = user else {
            self.verifier.verify_dummy(password).await?;
            return self.fail(address, username).await;
        };
        if !self.verifier.verify(&user, password).await?.valid {
            return self.fail(address, username).await;
        }

        self.ledger.clear(address, username).await?;
        let token = self.issuer.issue(user.id).await?;

        info!(user_id = user.id, username = %username, address = %address, "User logged in");
        self.audit
            .record(AuditEvent {
                actor_id: Some(user.id),
                actor_name: user.full_name.clone(),
                action: action::LOGIN,
                details: "User logged in successfully".to_string(),
                address: Some(address.to_string()),
            })
            .await;

        Ok(LoginOutcome::Success { token, user })
    }

    async fn fail(&self, address: &str, username: &str) -> Result<LoginOutcome> {
        self.ledger.record_failure(address, username).await?;
        let lockout = self.ledger.evaluate_lockout(address, username).await?;

        warn!(
            address = %address,
            username = %username,
            attempts = lockout.attempts,
            "Failed login attempt"
        );
        self.audit
            .record(AuditEvent {
                actor_id: None,
                actor_name: username.to_string(),
                action: action::FAILED_LOGIN,
                details: format!("Failed login attempt from IP: {address}"),
                address: Some(address.to_string()),
            })
            .await;

        Ok(LoginOutcome::Rejected { lockout })
    }

    /// Log out `user_id`. A missing id or unknown user is a no-op.
    pub async fn logout(&self, user_id: Option<i64>, address: &str) -> Result<()> {
        let Some(user_id) = user_id else {
            return Ok(());
        };
        let Some(user) = UserRepository::new(&self.pool).get_by_id(user_id).await? else {
            return Ok(());
        };

        self.issuer.revoke(user.id).await?;
        info!(user_id = user.id, address = %address, "User logged out");
        self.audit
            .record(AuditEvent {
                actor_id: Some(user.id),
                actor_name: user.full_name,
                action: action::LOGOUT,
                details: "User logged out".to_string(),
                address: Some(address.to_string()),
            })
            .await;
        Ok(())
    }
}
