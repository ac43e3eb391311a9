//! Configuration module for flock.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::auth::{LockoutPolicy, LockoutTier};
use crate::{FlockError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/flock.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/flock.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the Web API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Take the client address from `X-Forwarded-For` instead of the peer.
    ///
    /// Only enable this behind a reverse proxy that overwrites the header,
    /// otherwise clients can pick their own lockout key.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
            trust_forwarded_for: false,
        }
    }
}

/// One lockout tier as written in `config.toml`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct TierConfig {
    /// Attempt count at which this tier starts (inclusive).
    pub threshold: u32,
    /// Lockout length in seconds.
    pub lockout_secs: u64,
}

/// Authentication and lockout configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Trailing window over which failed attempts are counted.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Lockout tiers, lowest threshold first.
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierConfig>,
    /// Failed attempts older than this are pruned at startup.
    #[serde(default = "default_attempt_retention_hours")]
    pub attempt_retention_hours: u64,
}

fn default_window_secs() -> u64 {
    30 * 60
}

fn default_tiers() -> Vec<TierConfig> {
    LockoutPolicy::default()
        .tiers()
        .iter()
        .map(|tier| TierConfig {
            threshold: tier.threshold,
            lockout_secs: tier.lockout.as_secs(),
        })
        .collect()
}

fn default_attempt_retention_hours() -> u64 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            tiers: default_tiers(),
            attempt_retention_hours: default_attempt_retention_hours(),
        }
    }
}

impl AuthConfig {
    /// Build the lockout policy described by this section.
    pub fn lockout_policy(&self) -> Result<LockoutPolicy> {
        let tiers = self
            .tiers
            .iter()
            .map(|t| LockoutTier::new(t.threshold, Duration::from_secs(t.lockout_secs)))
            .collect();
        LockoutPolicy::new(Duration::from_secs(self.window_secs), tiers)
    }

    /// Retention period for failed attempts.
    pub fn attempt_retention(&self) -> Duration {
        Duration::from_secs(self.attempt_retention_hours.saturating_mul(3600))
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FlockError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FlockError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FLOCK_DATABASE_PATH`: Override the SQLite database path
    /// - `FLOCK_WEB_PORT`: Override the Web API port
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("FLOCK_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
        if let Ok(port) = std::env::var("FLOCK_WEB_PORT") {
            match port.parse() {
                Ok(port) => self.web.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid FLOCK_WEB_PORT"),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the lockout policy is malformed
    /// - the attempt retention is zero or shorter than the lockout window
    pub fn validate(&self) -> Result<()> {
        let policy = self.auth.lockout_policy()?;

        if self.auth.attempt_retention_hours == 0 {
            return Err(FlockError::Config(
                "auth.attempt_retention_hours must be at least 1".to_string(),
            ));
        }
        if self.auth.attempt_retention() < policy.window() {
            return Err(FlockError::Config(
                "auth.attempt_retention_hours must cover the lockout window".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database.path, "data/flock.db");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/flock.log");

        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 8080);
        assert!(config.web.cors_origins.is_empty());
        assert!(!config.web.trust_forwarded_for);

        assert_eq!(config.auth.window_secs, 1800);
        assert_eq!(
            config.auth.tiers,
            vec![
                TierConfig { threshold: 3, lockout_secs: 60 },
                TierConfig { threshold: 6, lockout_secs: 180 },
                TierConfig { threshold: 9, lockout_secs: 900 },
            ]
        );
        assert_eq!(config.auth.attempt_retention_hours, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[database]
path = "custom/members.db"

[logging]
level = "debug"
file = "custom/logs/auth.log"

[web]
host = "127.0.0.1"
port = 9000
cors_origins = ["http://localhost:5173"]
trust_forwarded_for = true

[auth]
window_secs = 600
attempt_retention_hours = 2
tiers = [
    { threshold = 5, lockout_secs = 30 },
    { threshold = 10, lockout_secs = 300 },
]
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.database.path, "custom/members.db");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/auth.log");
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.web.cors_origins, vec!["http://localhost:5173"]);
        assert!(config.web.trust_forwarded_for);

        let policy = config.auth.lockout_policy().unwrap();
        assert_eq!(policy.window(), Duration::from_secs(600));
        assert_eq!(policy.tiers().len(), 2);
        assert_eq!(policy.tiers()[0].threshold, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let config = Config::parse("[web]\nport = 8443\n").unwrap();

        assert_eq!(config.web.port, 8443);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.database.path, "data/flock.db");
        assert_eq!(config.auth.window_secs, 1800);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = Config::parse("[web\nport = ");
        assert!(matches!(result, Err(FlockError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_unordered_tiers() {
        let mut config = Config::default();
        config.auth.tiers = vec![
            TierConfig { threshold: 6, lockout_secs: 180 },
            TierConfig { threshold: 3, lockout_secs: 60 },
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_retention() {
        let mut config = Config::default();
        config.auth.attempt_retention_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_retention_shorter_than_window() {
        let mut config = Config::default();
        config.auth.window_secs = 2 * 3600;
        config.auth.attempt_retention_hours = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/flock/config.toml");
        assert!(matches!(result, Err(FlockError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\npath = \"x.db\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.database.path, "x.db");
    }
}
