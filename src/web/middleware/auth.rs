//! Session token authentication and client address extraction.

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::db::User;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Address used when the peer cannot be determined.
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Extractor for authenticated users.
///
/// Use this extractor to require authentication for a handler. The token is
/// read from `Authorization: Bearer <token>`, or from the `token` query
/// parameter for links that cannot set headers (downloads).
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let query_token = parts.uri.query().and_then(query_token);

        let user = state
            .sessions
            .resolve(header, query_token.as_deref())
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Session rejected");
                ApiError::from(e)
            })?;

        Ok(AuthUser(user))
    }
}

/// Find and URL-decode the `token` query parameter.
fn query_token(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?;
        let value = parts.next()?;
        if key == "token" {
            urlencoding::decode(value).ok().map(|s| s.into_owned())
        } else {
            None
        }
    })
}

/// Extractor for the client address used as the lockout key.
///
/// The peer socket address, or the first `X-Forwarded-For` entry when the
/// deployment trusts its proxy. Falls back to [`UNKNOWN_ADDRESS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub String);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for ClientAddress {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if state.trust_forwarded_for {
            if let Some(forwarded) = forwarded_for(parts) {
                return Ok(ClientAddress(forwarded));
            }
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string());
        Ok(ClientAddress(peer))
    }
}

fn forwarded_for(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .map(str::to_string)
}
