//! Response DTOs for Web API.

use serde::Serialize;

use crate::db::User;

/// Value of `status` on every successful response.
pub const SUCCESS: &str = "success";

/// Bare `{"status":"success"}` response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always `success`.
    pub status: &'static str,
}

impl StatusResponse {
    /// Create a success response.
    pub fn success() -> Self {
        Self { status: SUCCESS }
    }
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Role (`admin` or `staff`).
    pub role: &'static str,
    /// Profile picture path.
    pub profile_pic: Option<String>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.full_name.clone(),
            role: user.role.as_str(),
            profile_pic: user.profile_pic.clone(),
        }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Always `success`.
    pub status: &'static str,
    /// Session token.
    pub token: String,
    /// The logged-in user.
    pub user: UserInfo,
}

/// Current user response.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// Always `success`.
    pub status: &'static str,
    /// The authenticated user.
    pub user: UserInfo,
}
