//! Authentication and brute-force mitigation.
//!
//! This module provides password hashing, the failed-login ledger,
//! credential verification, session tokens and the login flow.

mod credential;
mod ledger;
mod login;
mod password;
mod session;

pub use credential::{CredentialVerifier, Verification};
pub use ledger::{AttemptLedger, LockoutPolicy, LockoutStatus, LockoutTier};
pub use login::{LoginOrchestrator, LoginOutcome};
pub use password::{hash_password, plaintext_matches, verify_password, PasswordError};
pub use session::{generate_token, AuthError, SessionIssuer, SessionValidator, TOKEN_BYTES};
