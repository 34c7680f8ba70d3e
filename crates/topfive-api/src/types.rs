//! Wire types for the session API

use serde::{Deserialize, Serialize};

/// Account identity as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Login form payload.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Registration form payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_verify: String,
}

/// Successful login/registration response body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: User,
}

/// Current server-side session validity, as reported by the probe endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub logged_in: bool,
    #[serde(default)]
    pub user: Option<User>,
}

/// Error body the server attaches to 400-class rejections.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    pub error_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_decodes_camel_case() {
        let status: SessionStatus = serde_json::from_str(
            r#"{"loggedIn": true, "user": {"id": "u2", "username": "ana"}}"#,
        )
        .unwrap();
        assert!(status.logged_in);
        assert_eq!(status.user.unwrap().username, "ana");
    }

    #[test]
    fn test_session_status_tolerates_missing_user() {
        let status: SessionStatus = serde_json::from_str(r#"{"loggedIn": false}"#).unwrap();
        assert!(!status.logged_in);
        assert!(status.user.is_none());
    }

    #[test]
    fn test_error_body_field_name() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"errorMessage": "Invalid credentials"}"#).unwrap();
        assert_eq!(body.error_message, "Invalid credentials");
    }
}
