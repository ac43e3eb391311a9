//! Request DTOs for Web API.

use serde::Deserialize;

/// Login request. Missing fields are empty strings.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// Username.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// Parse a login body leniently.
    ///
    /// Each field that is absent or not a string reads as empty, and an
    /// unreadable body reads as both fields empty. The request then takes
    /// the normal rejected-credentials path.
    pub fn from_body(body: &[u8]) -> Self {
        let value: serde_json::Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(_) => return Self::default(),
        };
        let field = |name: &str| {
            value
                .get(name)
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            username: field("username"),
            password: field("password"),
        }
    }
}

/// Logout request.
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    /// User to log out.
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl LogoutRequest {
    /// Parse a possibly empty or malformed body; anything unreadable is no request.
    pub fn from_body(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        serde_json::from_slice(body).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_defaults() {
        let req: LoginRequest = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(req.username, "alice");
        assert_eq!(req.password, "");

        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.username, "");
    }

    #[test]
    fn test_login_request_from_body() {
        let req = LoginRequest::from_body(br#"{"username":"alice","password":"hunter2"}"#);
        assert_eq!(req.username, "alice");
        assert_eq!(req.password, "hunter2");

        let req = LoginRequest::from_body(br#"{"username":5,"password":"hunter2"}"#);
        assert_eq!(req.username, "");
        assert_eq!(req.password, "hunter2");

        for body in [&b""[..], &b"not json"[..], &b"[1,2]"[..], &b"null"[..]] {
            let req = LoginRequest::from_body(body);
            assert_eq!(req.username, "");
            assert_eq!(req.password, "");
        }
    }

    #[test]
    fn test_logout_request_from_body() {
        assert_eq!(LogoutRequest::from_body(br#"{"user_id":7}"#).user_id, Some(7));
        assert_eq!(LogoutRequest::from_body(b"").user_id, None);
        assert_eq!(LogoutRequest::from_body(b"  \n").user_id, None);
        assert_eq!(LogoutRequest::from_body(b"{}").user_id, None);
        assert_eq!(LogoutRequest::from_body(b"not json").user_id, None);
        assert_eq!(LogoutRequest::from_body(br#"{"user_id":null}"#).user_id, None);
    }
}
