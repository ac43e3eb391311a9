//! Authentication handlers.

use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;

use crate::audit::AuditTrail;
use crate::auth::{
    AttemptLedger, CredentialVerifier, LockoutPolicy, LoginOrchestrator, LoginOutcome,
    SessionIssuer, SessionValidator,
};
use crate::clock::{SharedClock, SystemClock};
use crate::web::dto::{
    LoginRequest, LoginResponse, LogoutRequest, MeResponse, StatusResponse, UserInfo, SUCCESS,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, ClientAddress};
use crate::{Config, Database, Result};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Login and logout flows.
    pub login: LoginOrchestrator,
    /// Resolves request tokens.
    pub sessions: SessionValidator,
    /// Take the client address from `X-Forwarded-For` when present.
    pub trust_forwarded_for: bool,
}

impl AppState {
    /// Create application state over `db`.
    pub fn new(db: &Database, clock: SharedClock, policy: LockoutPolicy) -> Self {
        let pool = db.pool().clone();
        let login = LoginOrchestrator::new(
            pool.clone(),
            AttemptLedger::new(pool.clone(), clock.clone(), policy),
            CredentialVerifier::new(pool.clone()),
            SessionIssuer::new(pool.clone()),
            AuditTrail::new(pool.clone(), clock),
        );
        Self {
            login,
            sessions: SessionValidator::new(pool),
            trust_forwarded_for: false,
        }
    }

    /// Create application state from configuration, on the wall clock.
    pub fn from_config(db: &Database, config: &Config) -> Result<Self> {
        let policy = config.auth.lockout_policy()?;
        Ok(Self::new(db, Arc::new(SystemClock), policy)
            .with_trust_forwarded_for(config.web.trust_forwarded_for))
    }

    /// Set whether `X-Forwarded-For` is trusted.
    pub fn with_trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

/// POST /auth/login - User login.
///
/// The body is read without a content-type check; see [`LoginRequest::from_body`].
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientAddress(address): ClientAddress,
    body: Bytes,
) -> std::result::Result<Json<LoginResponse>, ApiError> {
    let req = LoginRequest::from_body(&body);
    let outcome = state
        .login
        .login(&address, &req.username, &req.password)
        .await?;

    match outcome {
        LoginOutcome::Success { token, user } => Ok(Json(LoginResponse {
            status: SUCCESS,
            token,
            user: UserInfo::from(&user),
        })),
        LoginOutcome::Rejected { lockout } => Err(ApiError::invalid_credentials(lockout)),
        LoginOutcome::Locked { lockout } => Err(ApiError::locked(lockout)),
    }
}

/// POST /auth/logout - Clear a user's session token.
///
/// Always succeeds; a missing body or `user_id` does nothing.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    ClientAddress(address): ClientAddress,
    body: Bytes,
) -> std::result::Result<Json<StatusResponse>, ApiError> {
    let req = LogoutRequest::from_body(&body);
    state.login.logout(req.user_id, &address).await?;
    Ok(Json(StatusResponse::success()))
}

/// GET /api/me - The authenticated user.
pub async fn me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        status: SUCCESS,
        user: UserInfo::from(&user),
    })
}
