//! Flock - church membership records manager
//!
//! Authentication core and HTTP surface: password ratchet, failed-login
//! ledger with progressive lockout, and opaque session tokens.

pub mod audit;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    hash_password, verify_password, AttemptLedger, AuthError, CredentialVerifier, LockoutPolicy,
    LockoutStatus, LoginOrchestrator, LoginOutcome, PasswordError, SessionIssuer,
    SessionValidator,
};
pub use config::Config;
pub use db::{Database, NewUser, Role, User, UserRepository};
pub use error::{FlockError, Result};
