//! API handlers for Web UI.

pub mod auth;

pub use auth::*;
