//! User repository for flock.
//!
//! Only the operations the auth core needs: lookups, provisioning, the
//! password ratchet and the session token slot.

use super::user::{NewUser, PasswordEncoding, Role, User};
use super::DbPool;
use crate::{FlockError, Result};

const USER_COLUMNS: &str = "id, username, password, password_encoding, full_name, role,
                            profile_pic, session_token, created_at";

/// Repository for user records.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Provision a new user.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, password, password_encoding, full_name, role, profile_pic)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&new_user.username)
        .bind(&new_user.password)
        .bind(new_user.password_encoding.as_str())
        .bind(&new_user.full_name)
        .bind(new_user.role.as_str())
        .bind(&new_user.profile_pic)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FlockError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(UserRow::into_user))
    }

    /// Get a user by exact username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(UserRow::into_user))
    }

    /// Get the user currently holding `token` as their session token.
    pub async fn get_by_session_token(&self, token: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE session_token = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(token)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(UserRow::into_user))
    }

    /// Replace the stored secret with a hash and mark it hashed.
    ///
    /// Returns false if the user does not exist.
    pub async fn store_password_hash(&self, id: i64, hash: &str) -> Result<bool> {
        let result =
            sqlx::query("UPDATE users SET password = ?, password_encoding = ? WHERE id = ?")
                .bind(hash)
                .bind(PasswordEncoding::Hashed.as_str())
                .bind(id)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set or clear the session token slot.
    ///
    /// Returns false if the user does not exist.
    pub async fn set_session_token(&self, id: i64, token: Option<&str>) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET session_token = ? WHERE id = ?")
            .bind(token)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Internal struct for mapping database rows to User.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
    password_encoding: String,
    full_name: String,
    role: String,
    profile_pic: Option<String>,
    session_token: Option<String>,
    created_at: String,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password: self.password,
            // Unknown encodings must never be compared as plaintext.
            password_encoding: self
                .password_encoding
                .parse()
                .unwrap_or(PasswordEncoding::Hashed),
            full_name: self.full_name,
            role: self.role.parse().unwrap_or(Role::Staff),
            profile_pic: self.profile_pic,
            session_token: self.session_token,
            created_at: self.created_at,
        }
    }
}
