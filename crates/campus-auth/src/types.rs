//! Identity and token data model
//!
//! Wire shapes for the remote auth API. The identity record is replaced
//! wholesale on every successful auth operation; the token pair is always
//! stored and cleared as a unit — an access token in memory is always
//! paired with the refresh token that can renew it.

use common::Secret;
use serde::{Deserialize, Serialize};

/// Platform role, a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Role label for display and logging.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

/// The current user record as the server reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Access/refresh token pair issued by login, registration, and refresh.
///
/// `expires_in` is a delta in seconds from the response time, not an
/// absolute timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
}

/// Response from login and registration: identity plus fresh tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: Identity,
    pub tokens: TokenPair,
}

/// Login credentials. The password is redacted in Debug output.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub student_id: String,
    pub password: Secret<String>,
}

/// Registration data for a new account.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub password: Secret<String>,
}

/// Password change payload. The server invalidates all outstanding tokens
/// for the account on success.
#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: Secret<String>,
    pub new_password: Secret<String>,
}

/// Partial profile update; only the set fields are sent.
#[derive(Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_pair_deserializes_from_wire_shape() {
        let json = r#"{"access_token":"at_abc","refresh_token":"rt_def","token_type":"bearer","expires_in":3600}"#;
        let tokens: TokenPair = serde_json::from_str(json).unwrap();
        assert_eq!(tokens.access_token, "at_abc");
        assert_eq!(tokens.refresh_token, "rt_def");
        assert_eq!(tokens.token_type, "bearer");
        assert_eq!(tokens.expires_in, 3600);
    }

    #[test]
    fn identity_roles_use_lowercase_wire_names() {
        let json = r#"{"id":42,"name":"Li Wei","role":"teacher","is_active":true}"#;
        let user: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Teacher);
        assert_eq!(user.role.label(), "teacher");
        assert!(user.last_login.is_none());
        assert!(user.avatar_url.is_none());
    }

    #[test]
    fn identity_roundtrips_through_json() {
        let user = Identity {
            id: 7,
            name: "Zhang San".into(),
            role: Role::Student,
            is_active: true,
            last_login: Some("2026-08-01T09:30:00Z".into()),
            avatar_url: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains(r#""role":"student""#));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn login_request_redacts_password_in_debug() {
        let request = LoginRequest {
            student_id: "2021000001".into(),
            password: "Abc12345".into(),
        };
        let debug = format!("{request:?}");
        assert!(debug.contains("2021000001"));
        assert!(!debug.contains("Abc12345"), "password must not leak: {debug}");
    }

    #[test]
    fn login_request_serializes_password_for_the_wire() {
        let request = LoginRequest {
            student_id: "2021000001".into(),
            password: "Abc12345".into(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""password":"Abc12345""#));
    }

    #[test]
    fn profile_update_omits_unset_fields() {
        let update = ProfileUpdate {
            name: Some("New Name".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"name":"New Name"}"#);
    }
}
