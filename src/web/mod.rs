//! Web API module.
//!
//! Login and logout endpoints, the protected-route extractor and a health
//! check, served with axum.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
