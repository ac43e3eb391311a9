//! Failed login ledger and progressive lockout.
//!
//! Lockout is never stored. Every evaluation recomputes it from the
//! attempts recorded for the (address, username) pair inside the trailing
//! window, so the `login_attempts` table is the only source of truth.

use std::time::Duration;

use tracing::{debug, info};

use crate::clock::{from_db_datetime, to_db_datetime, SharedClock};
use crate::db::{DbPool, LoginAttemptRepository};
use crate::{FlockError, Result};

/// One lockout tier: at `threshold` or more attempts, lock for `lockout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutTier {
    /// Attempt count at which the tier starts (inclusive).
    pub threshold: u32,
    /// Lockout length, counted from the most recent attempt.
    pub lockout: Duration,
}

impl LockoutTier {
    /// Create a tier.
    pub const fn new(threshold: u32, lockout: Duration) -> Self {
        Self { threshold, lockout }
    }
}

/// Window and tier table for lockout decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutPolicy {
    window: Duration,
    tiers: Vec<LockoutTier>,
}

impl Default for LockoutPolicy {
    /// 30 minute window; 3 → 1 min, 6 → 3 min, 9+ → 15 min.
    fn default() -> Self {
        Self {
            window: Duration::from_secs(30 * 60),
            tiers: vec![
                LockoutTier::new(3, Duration::from_secs(60)),
                LockoutTier::new(6, Duration::from_secs(3 * 60)),
                LockoutTier::new(9, Duration::from_secs(15 * 60)),
            ],
        }
    }
}

impl LockoutPolicy {
    /// Create a policy. Tiers must have strictly increasing thresholds ≥ 1.
    pub fn new(window: Duration, tiers: Vec<LockoutTier>) -> Result<Self> {
        if window.is_zero() {
            return Err(FlockError::Config("lockout window must be positive".to_string()));
        }
        if tiers.is_empty() {
            return Err(FlockError::Config("at least one lockout tier is required".to_string()));
        }
        if tiers[0].threshold == 0 {
            return Err(FlockError::Config("tier thresholds must be at least 1".to_string()));
        }
        if tiers.windows(2).any(|w| w[0].threshold >= w[1].threshold) {
            return Err(FlockError::Config(
                "tier thresholds must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { window, tiers })
    }

    /// Trailing window over which attempts are counted.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Tiers, lowest threshold first.
    pub fn tiers(&self) -> &[LockoutTier] {
        &self.tiers
    }

    /// Lockout length for `attempts` failures, if any tier applies.
    pub fn lockout_for(&self, attempts: u32) -> Option<Duration> {
        self.tiers
            .iter()
            .rev()
            .find(|tier| attempts >= tier.threshold)
            .map(|tier| tier.lockout)
    }
}

/// Lockout state of an (address, username) pair at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutStatus {
    /// Whether login is currently refused.
    pub locked: bool,
    /// Seconds until the lockout lifts; 0 when not locked.
    pub retry_after_secs: u64,
    /// Attempts inside the window.
    pub attempts: u32,
}

impl LockoutStatus {
    fn open(attempts: u32) -> Self {
        Self {
            locked: false,
            retry_after_secs: 0,
            attempts,
        }
    }
}

/// Append-only record of failed logins.
#[derive(Clone)]
pub struct AttemptLedger {
    pool: DbPool,
    clock: SharedClock,
    policy: LockoutPolicy,
}

impl AttemptLedger {
    /// Create a ledger.
    pub fn new(pool: DbPool, clock: SharedClock, policy: LockoutPolicy) -> Self {
        Self {
            pool,
            clock,
            policy,
        }
    }

    /// The policy in force.
    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Record a failed attempt at the current time.
    pub async fn record_failure(&self, address: &str, username: &str) -> Result<()> {
        let now = to_db_datetime(&self.clock.now());
        LoginAttemptRepository::new(&self.pool)
            .insert(address, username, &now)
            .await?;
        debug!(address = %address, username = %username, "Recorded failed login attempt");
        Ok(())
    }

    /// Delete all attempts for the pair. Call only after a verified success.
    pub async fn clear(&self, address: &str, username: &str) -> Result<()> {
        let removed = LoginAttemptRepository::new(&self.pool)
            .delete_for_pair(address, username)
            .await?;
        if removed > 0 {
            debug!(address = %address, username = %username, removed, "Cleared login attempts");
        }
        Ok(())
    }

    /// Compute the lockout state for the pair.
    pub async fn evaluate_lockout(&self, address: &str, username: &str) -> Result<LockoutStatus> {
        // Whole seconds throughout; stored timestamps carry no fraction.
        let now = self.clock.now().timestamp();
        let window = i64::try_from(self.policy.window.as_secs()).unwrap_or(i64::MAX);
        let since = chrono::DateTime::from_timestamp(now.saturating_sub(window), 0)
            .unwrap_or_default();

        let stats = LoginAttemptRepository::new(&self.pool)
            .stats(address, username, &to_db_datetime(&since))
            .await?;

        let latest = match stats.latest.as_deref().and_then(from_db_datetime) {
            Some(latest) => latest.timestamp(),
            None => return Ok(LockoutStatus::open(stats.count)),
        };
        let lockout = match self.policy.lockout_for(stats.count) {
            Some(lockout) => i64::try_from(lockout.as_secs()).unwrap_or(i64::MAX),
            None => return Ok(LockoutStatus::open(stats.count)),
        };

        let unlock_at = latest.saturating_add(lockout);
        if now < unlock_at {
            Ok(LockoutStatus {
                locked: true,
                retry_after_secs: (unlock_at - now) as u64,
                attempts: stats.count,
            })
        } else {
            Ok(LockoutStatus::open(stats.count))
        }
    }

    /// Delete attempts recorded before `now - older_than`.
    pub async fn prune(&self, older_than: Duration) -> Result<u64> {
        let age = chrono::Duration::from_std(older_than)
            .map_err(|e| FlockError::Config(format!("retention out of range: {e}")))?;
        let cutoff = to_db_datetime(&(self.clock.now() - age));
        let removed = LoginAttemptRepository::new(&self.pool)
            .delete_older_than(&cutoff)
            .await?;
        if removed > 0 {
            info!(removed, cutoff = %cutoff, "Pruned old login attempts");
        }
        Ok(removed)
    }
}
