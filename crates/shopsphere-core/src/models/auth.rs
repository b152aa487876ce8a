use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Answer to an admin login.
///
/// A non-empty `access` token is the only success signal the backend gives;
/// anything else comes back as-is with no session stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LoginResponse {
    /// The access token, when the login succeeded.
    pub fn access_token(&self) -> Option<&str> {
        self.access.as_deref().filter(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_access_token() {
        let ok: LoginResponse =
            serde_json::from_str(r#"{"access": "A", "refresh": "R", "user": {"username": "alice"}}"#)
                .expect("login");
        assert_eq!(ok.access_token(), Some("A"));
        assert_eq!(ok.refresh.as_deref(), Some("R"));
        assert!(ok.fields.contains_key("user"));

        let empty: LoginResponse = serde_json::from_str(r#"{"access": ""}"#).expect("login");
        assert_eq!(empty.access_token(), None);

        let missing: LoginResponse =
            serde_json::from_str(r#"{"detail": "No active account"}"#).expect("login");
        assert_eq!(missing.access_token(), None);
    }
}
