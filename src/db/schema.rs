//! Database schema and migrations for flock.
//!
//! Migrations are applied in order when the database is first opened or
//! upgraded; `schema_version` records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    username            TEXT NOT NULL UNIQUE,
    password            TEXT NOT NULL,           -- plaintext (legacy) or Argon2 PHC string
    password_encoding   TEXT NOT NULL DEFAULT 'hashed',  -- 'plaintext', 'hashed'
    full_name           TEXT NOT NULL,
    role                TEXT NOT NULL DEFAULT 'staff',   -- 'admin', 'staff'
    profile_pic         TEXT,
    created_at          TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v2: single active session token per user
    r#"
ALTER TABLE users ADD COLUMN session_token TEXT;

CREATE UNIQUE INDEX idx_users_session_token ON users(session_token);
"#,
    // v3: activity log (audit trail)
    r#"
CREATE TABLE activity_logs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER,                 -- NULL for failed logins
    user_name   TEXT,                    -- snapshot, survives user deletion
    action      TEXT NOT NULL,
    details     TEXT,
    ip_address  TEXT,
    created_at  TEXT NOT NULL
);

CREATE INDEX idx_activity_logs_created_at ON activity_logs(created_at);
"#,
    // v4: failed login attempts
    r#"
CREATE TABLE login_attempts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    ip_address      TEXT NOT NULL,
    username        TEXT NOT NULL,
    attempted_at    TEXT NOT NULL
);

CREATE INDEX idx_login_attempts_pair ON login_attempts(ip_address, username, attempted_at);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_contains_users_table() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE users"));
        assert!(first.contains("username"));
        assert!(first.contains("password_encoding"));
    }

    #[test]
    fn test_login_attempts_migration_indexes_pair() {
        let attempts = MIGRATIONS[3];
        assert!(attempts.contains("CREATE TABLE login_attempts"));
        assert!(attempts.contains("ON login_attempts(ip_address, username"));
    }

    #[test]
    fn test_migrations_are_valid_sql() {
        for migration in MIGRATIONS {
            assert!(!migration.trim().is_empty());
            assert!(migration.contains("CREATE TABLE") || migration.contains("ALTER TABLE"));
        }
    }
}
