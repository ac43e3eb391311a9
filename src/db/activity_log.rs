//! Activity log (audit trail) storage.

use super::DbPool;
use crate::Result;

/// A stored activity log entry.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityLog {
    /// Entry ID.
    pub id: i64,
    /// Acting user, if known.
    pub user_id: Option<i64>,
    /// Actor name snapshot.
    pub user_name: Option<String>,
    /// Action label, e.g. "Login".
    pub action: String,
    /// Free-form details.
    pub details: Option<String>,
    /// Client address.
    pub ip_address: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// New activity log entry.
#[derive(Debug, Clone)]
pub struct NewActivityLog {
    /// Acting user, if known.
    pub user_id: Option<i64>,
    /// Actor name snapshot.
    pub user_name: Option<String>,
    /// Action label.
    pub action: String,
    /// Free-form details.
    pub details: Option<String>,
    /// Client address.
    pub ip_address: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// Repository for the `activity_logs` table.
pub struct ActivityLogRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ActivityLogRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    pub async fn insert(&self, entry: &NewActivityLog) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO activity_logs (user_id, user_name, action, details, ip_address, created_at)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(entry.user_id)
        .bind(&entry.user_name)
        .bind(&entry.action)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(&entry.created_at)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// List the newest entries first.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<ActivityLog>> {
        let rows = sqlx::query_as::<_, ActivityLog>(
            "SELECT id, user_id, user_name, action, details, ip_address, created_at
             FROM activity_logs ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
