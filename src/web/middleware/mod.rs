//! Middleware for Web API.

pub mod auth;
pub mod cors;

pub use auth::{AuthUser, ClientAddress, UNKNOWN_ADDRESS};
pub use cors::create_cors_layer;
