use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account representation returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend-assigned numeric identifier.
    pub id: i64,
    /// Unique account name.
    pub username: String,
    /// Contact address; may be blank for legacy accounts.
    #[serde(default)]
    pub email: String,
    /// Account creation timestamp, when the backend exposes it.
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

/// Username/password pair submitted to the login endpoint.
///
/// The password is intentionally excluded from `Debug` output.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Payload for creating a new account.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Current authentication state of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
    /// Startup state before the stored token has been checked.
    Unknown,
    /// No valid session; the user must sign in.
    SignedOut,
    /// A validated session is active.
    SignedIn,
}

impl AuthState {
    /// Returns `true` when a validated session is active.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::SignedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("alice", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn user_deserializes_with_missing_optionals() {
        let user: User = serde_json::from_str(r#"{"id": 7, "username": "alice"}"#).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.email, "");
        assert!(user.date_joined.is_none());
    }

    #[test]
    fn auth_state_classification() {
        assert!(AuthState::SignedIn.is_authenticated());
        assert!(!AuthState::SignedOut.is_authenticated());
        assert!(!AuthState::Unknown.is_authenticated());
    }
}
