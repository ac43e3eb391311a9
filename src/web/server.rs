//! Web server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::{Database, FlockError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
    /// Login attempts older than this are pruned at startup.
    attempt_retention: Duration,
}

impl WebServer {
    /// Create a new web server from configuration.
    pub fn new(config: &Config, db: &Database) -> Result<Self> {
        let addr = format!("{}:{}", config.web.host, config.web.port)
            .parse()
            .map_err(|e| FlockError::Config(format!("invalid web server address: {e}")))?;

        Ok(Self::with_state(
            addr,
            AppState::from_config(db, config)?,
            config,
        ))
    }

    /// Create a web server around prepared state.
    pub fn with_state(addr: SocketAddr, app_state: AppState, config: &Config) -> Self {
        Self {
            addr,
            app_state: Arc::new(app_state),
            cors_origins: config.web.cors_origins.clone(),
            attempt_retention: config.auth.attempt_retention(),
        }
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Delete login attempts past retention. Failure is logged, not fatal.
    async fn prune_attempts(&self) {
        if let Err(e) = self
            .app_state
            .login
            .ledger()
            .prune(self.attempt_retention)
            .await
        {
            tracing::warn!(error = %e, "Failed to prune login attempts");
        }
    }

    async fn bind(self) -> Result<(TcpListener, axum::Router, SocketAddr)> {
        self.prune_attempts().await;

        let router = create_router(self.app_state, &self.cors_origins);
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);
        Ok((listener, router, local_addr))
    }

    /// Run the web server.
    pub async fn run(self) -> Result<()> {
        let (listener, router, _) = self.bind().await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let (listener, router, local_addr) = self.bind().await?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
