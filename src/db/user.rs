//! User model for flock.

use std::fmt;
use std::str::FromStr;

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Role {
    /// Office staff.
    #[default]
    Staff = 0,
    /// Administrator.
    Admin = 1,
}

impl Role {
    /// Convert role to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    // Older rows were written with "Admin" capitalised.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// How a stored secret is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordEncoding {
    /// Legacy clear text, upgraded on the next successful login.
    Plaintext,
    /// Argon2 PHC string.
    #[default]
    Hashed,
}

impl PasswordEncoding {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordEncoding::Plaintext => "plaintext",
            PasswordEncoding::Hashed => "hashed",
        }
    }
}

impl FromStr for PasswordEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plaintext" => Ok(PasswordEncoding::Plaintext),
            "hashed" => Ok(PasswordEncoding::Hashed),
            _ => Err(format!("unknown password encoding: {s}")),
        }
    }
}

/// A user who can sign in to the records manager.
#[derive(Clone)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login username (unique).
    pub username: String,
    /// Stored secret, see `password_encoding`.
    pub password: String,
    /// Encoding of `password`.
    pub password_encoding: PasswordEncoding,
    /// Display name.
    pub full_name: String,
    /// User role.
    pub role: Role,
    /// Profile picture file name.
    pub profile_pic: Option<String>,
    /// The single active session token, if logged in.
    pub session_token: Option<String>,
    /// Account creation timestamp.
    pub created_at: String,
}

// Secrets stay out of logs.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_encoding", &self.password_encoding)
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .field("profile_pic", &self.profile_pic)
            .field("has_session", &self.session_token.is_some())
            .finish()
    }
}

/// Data for provisioning a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login username.
    pub username: String,
    /// Stored secret (hash or legacy plaintext, see `password_encoding`).
    pub password: String,
    /// Encoding of `password`.
    pub password_encoding: PasswordEncoding,
    /// Display name.
    pub full_name: String,
    /// User role (defaults to Staff).
    pub role: Role,
    /// Profile picture file name.
    pub profile_pic: Option<String>,
}

impl NewUser {
    /// Create a new user with an already hashed password.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password_hash.into(),
            password_encoding: PasswordEncoding::Hashed,
            full_name: full_name.into(),
            role: Role::Staff,
            profile_pic: None,
        }
    }

    /// Create a user carrying a legacy plaintext password.
    pub fn legacy(
        username: impl Into<String>,
        plaintext: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            password_encoding: PasswordEncoding::Plaintext,
            ..Self::new(username, plaintext, full_name)
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set the profile picture.
    pub fn with_profile_pic(mut self, profile_pic: impl Into<String>) -> Self {
        self.profile_pic = Some(profile_pic.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("staff").unwrap(), Role::Staff);
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("Admin").unwrap(), Role::Admin);
        assert!(Role::from_str("sysop").is_err());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(format!("{}", Role::Admin), "admin");
        assert_eq!(Role::default(), Role::Staff);
    }

    #[test]
    fn test_password_encoding_from_str() {
        assert_eq!(
            PasswordEncoding::from_str("plaintext").unwrap(),
            PasswordEncoding::Plaintext
        );
        assert_eq!(
            PasswordEncoding::from_str("hashed").unwrap(),
            PasswordEncoding::Hashed
        );
        assert!(PasswordEncoding::from_str("md5").is_err());
    }

    #[test]
    fn test_new_user_builder() {
        let user = NewUser::new("alice", "$argon2id$...", "Alice Mwangi")
            .with_role(Role::Admin)
            .with_profile_pic("alice.png");

        assert_eq!(user.username, "alice");
        assert_eq!(user.password_encoding, PasswordEncoding::Hashed);
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.profile_pic.as_deref(), Some("alice.png"));
    }

    #[test]
    fn test_legacy_user_is_plaintext() {
        let user = NewUser::legacy("bob", "hunter2", "Bob");
        assert_eq!(user.password, "hunter2");
        assert_eq!(user.password_encoding, PasswordEncoding::Plaintext);
        assert_eq!(user.role, Role::Staff);
    }

    #[test]
    fn test_user_debug_hides_secrets() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            password: "hunter2".to_string(),
            password_encoding: PasswordEncoding::Plaintext,
            full_name: "Alice".to_string(),
            role: Role::Staff,
            profile_pic: None,
            session_token: Some("deadbeef".to_string()),
            created_at: "2026-01-01 00:00:00".to_string(),
        };

        let debug = format!("{user:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("deadbeef"));
        assert!(debug.contains("has_session: true"));
    }
}
