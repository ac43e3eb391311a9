//! Fire-and-forget audit trail.
//!
//! The auth core reports login, logout and failed-login outcomes here.
//! Recording never fails the caller: a write error is logged and dropped.

use tracing::{debug, warn};

use crate::clock::{to_db_datetime, SharedClock};
use crate::db::{ActivityLogRepository, DbPool, NewActivityLog};

/// Audit action labels.
pub mod action {
    /// Successful login.
    pub const LOGIN: &str = "Login";
    /// Failed login.
    pub const FAILED_LOGIN: &str = "Failed Login";
    /// Logout.
    pub const LOGOUT: &str = "Logout";
}

/// An event to append to the activity log.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Acting user, if the actor resolved to an account.
    pub actor_id: Option<i64>,
    /// Name snapshot of the actor.
    pub actor_name: String,
    /// Action label, see [`action`].
    pub action: &'static str,
    /// Human-readable details.
    pub details: String,
    /// Client address.
    pub address: Option<String>,
}

/// Writes audit events to the `activity_logs` table.
#[derive(Clone)]
pub struct AuditTrail {
    pool: DbPool,
    clock: SharedClock,
}

impl AuditTrail {
    /// Create an audit trail over the given pool.
    pub fn new(pool: DbPool, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Record an event, swallowing any storage error.
    pub async fn record(&self, event: AuditEvent) {
        let entry = NewActivityLog {
            user_id: event.actor_id,
            user_name: Some(event.actor_name),
            action: event.action.to_string(),
            details: Some(event.details),
            ip_address: event.address,
            created_at: to_db_datetime(&self.clock.now()),
        };

        match ActivityLogRepository::new(&self.pool).insert(&entry).await {
            Ok(id) => debug!(id, action = %entry.action, "Recorded activity"),
            Err(e) => warn!(error = %e, action = %entry.action, "Failed to record activity"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::Database;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn clock() -> SharedClock {
        Arc::new(ManualClock::new(
            chrono::Utc.with_ymd_and_hms(2026, 2, 12, 5, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_record_writes_row() {
        let db = Database::open_in_memory().await.unwrap();
        let audit = AuditTrail::new(db.pool().clone(), clock());

        audit
            .record(AuditEvent {
                actor_id: None,
                actor_name: "mallory".to_string(),
                action: action::FAILED_LOGIN,
                details: "Failed login attempt from IP: 203.0.113.9".to_string(),
                address: Some("203.0.113.9".to_string()),
            })
            .await;

        let logs = ActivityLogRepository::new(db.pool()).list_recent(1).await.unwrap();
        assert_eq!(logs[0].action, "Failed Login");
        assert!(logs[0].user_id.is_none());
        assert_eq!(logs[0].user_name.as_deref(), Some("mallory"));
        assert_eq!(logs[0].created_at, "2026-02-12 05:00:00");
    }

    #[tokio::test]
    async fn test_record_swallows_storage_errors() {
        let db = Database::open_in_memory().await.unwrap();
        sqlx::query("DROP TABLE activity_logs")
            .execute(db.pool())
            .await
            .unwrap();
        let audit = AuditTrail::new(db.pool().clone(), clock());

        // Must not panic or return an error.
        audit
            .record(AuditEvent {
                actor_id: Some(1),
                actor_name: "Alice".to_string(),
                action: action::LOGOUT,
                details: "User logged out".to_string(),
                address: None,
            })
            .await;
    }
}
