//! Failed login attempt storage.

use super::DbPool;
use crate::Result;

/// Count and recency of attempts for one (address, username) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptStats {
    /// Attempts at or after the requested cutoff.
    pub count: u32,
    /// Most recent attempt timestamp, regardless of the cutoff.
    pub latest: Option<String>,
}

/// Repository for the `login_attempts` table.
///
/// Timestamps are `YYYY-MM-DD HH:MM:SS` strings, which compare correctly
/// as text.
pub struct LoginAttemptRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> LoginAttemptRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert one failed attempt.
    pub async fn insert(&self, ip_address: &str, username: &str, attempted_at: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO login_attempts (ip_address, username, attempted_at) VALUES (?, ?, ?)",
        )
        .bind(ip_address)
        .bind(username)
        .bind(attempted_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Count attempts since `since` and fetch the latest attempt time.
    pub async fn stats(&self, ip_address: &str, username: &str, since: &str) -> Result<AttemptStats> {
        let (count, latest): (i64, Option<String>) = sqlx::query_as(
            "SELECT
                COALESCE(SUM(CASE WHEN attempted_at >= ? THEN 1 ELSE 0 END), 0),
                MAX(attempted_at)
             FROM login_attempts
             WHERE ip_address = ? AND username = ?",
        )
        .bind(since)
        .bind(ip_address)
        .bind(username)
        .fetch_one(self.pool)
        .await?;

        Ok(AttemptStats {
            count: u32::try_from(count).unwrap_or(u32::MAX),
            latest,
        })
    }

    /// Delete every attempt for the exact pair.
    pub async fn delete_for_pair(&self, ip_address: &str, username: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE ip_address = ? AND username = ?")
            .bind(ip_address)
            .bind(username)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete attempts strictly older than `before`.
    pub async fn delete_older_than(&self, before: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE attempted_at < ?")
            .bind(before)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
