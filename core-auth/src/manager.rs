//! # Authentication Manager
//!
//! High-level orchestrator for the backend's token authentication flow.
//!
//! ## Overview
//!
//! `AuthManager` signs users in against the backend token endpoints, keeps the
//! active session in memory, persists the opaque token through [`TokenStore`],
//! and emits [`AuthEvent`]s so UI shells can react to state changes.
//!
//! The session token is attached to outgoing requests as
//! `Authorization: Token <value>`; callers never handle the raw token.
//!
//! ## Startup
//!
//! Call [`AuthManager::restore`] exactly once at process start. It reads the
//! persisted token and validates it against the backend; any validation
//! failure (rejected token, transport fault) clears the stored token so the
//! app starts signed out rather than half-authenticated.

use crate::error::{AuthError, Result};
use crate::token_store::TokenStore;
use crate::types::{AuthState, Credentials, Registration, User};
use bridge_traits::{HttpClient, HttpRequest, SecureStore};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Token issued by the backend on successful login. No `Debug` derive: the
/// raw token must never reach log output.
#[derive(Deserialize)]
struct TokenResponse {
    auth_token: String,
}

/// In-memory session: the validated account plus its raw token.
struct Session {
    user: User,
    token: String,
}

/// Unified authentication manager for the music backend.
pub struct AuthManager {
    token_store: TokenStore,
    http_client: Arc<dyn HttpClient>,
    event_bus: EventBus,
    base_url: String,
    session: RwLock<Option<Session>>,
    state: RwLock<AuthState>,
}

impl AuthManager {
    /// Creates a new authentication manager.
    ///
    /// # Arguments
    ///
    /// * `secure_store` - platform secure storage for the session token
    /// * `http_client` - host-provided HTTP transport
    /// * `event_bus` - bus for auth state events
    /// * `base_url` - backend base URL without trailing slash
    pub fn new(
        secure_store: Arc<dyn SecureStore>,
        http_client: Arc<dyn HttpClient>,
        event_bus: EventBus,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            token_store: TokenStore::new(secure_store),
            http_client,
            event_bus,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: RwLock::new(None),
            state: RwLock::new(AuthState::Unknown),
        }
    }

    /// Current authentication state.
    pub async fn state(&self) -> AuthState {
        *self.state.read().await
    }

    /// Returns `true` when a validated session is active.
    pub async fn is_authenticated(&self) -> bool {
        self.state().await.is_authenticated()
    }

    /// The signed-in account, when one is active.
    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    /// Attach the session token to a request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotAuthenticated`] when no session is active.
    pub async fn authorize(&self, request: HttpRequest) -> Result<HttpRequest> {
        let session = self.session.read().await;
        let session = session.as_ref().ok_or(AuthError::NotAuthenticated)?;
        Ok(request.authorization(format!("Token {}", session.token)))
    }

    /// Validate the persisted token once at process start.
    ///
    /// Returns the resulting state. Never returns `Unknown`: a missing,
    /// rejected, or unverifiable token all resolve to `SignedOut` with the
    /// stored token cleared.
    pub async fn restore(&self) -> Result<AuthState> {
        let Some(token) = self.token_store.load().await? else {
            debug!("No persisted token; starting signed out");
            return Ok(self.enter_signed_out(None).await);
        };

        match self.fetch_current_user(&token).await {
            Ok(user) => {
                info!(username = %user.username, "Persisted session restored");
                Ok(self.enter_signed_in(user, token, true).await)
            }
            Err(AuthError::TokenRejected { status }) => {
                info!(status, "Persisted token rejected; signing out");
                self.token_store.clear().await?;
                Ok(self.enter_signed_out(None).await)
            }
            Err(err) => {
                // An unverifiable token is never trusted; start signed out.
                warn!(error = %err, "Token validation failed; signing out");
                self.token_store.clear().await?;
                Ok(self.enter_signed_out(None).await)
            }
        }
    }

    /// Sign in with username and password.
    ///
    /// On success the token is persisted, the session becomes active, and a
    /// `SignedIn` event is emitted.
    pub async fn login(&self, credentials: Credentials) -> Result<User> {
        debug!(username = %credentials.username, "Attempting login");

        let request = HttpRequest::post(format!("{}/api/v1/token/login/", self.base_url))
            .json(&credentials)?;
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            let reason = response
                .text()
                .unwrap_or_else(|_| "invalid credentials".to_string());
            self.emit(AuthEvent::AuthError {
                message: reason.clone(),
            });
            return Err(AuthError::AuthenticationFailed { reason });
        }

        let token = response.json::<TokenResponse>()?.auth_token;
        let user = self.fetch_current_user(&token).await?;

        self.token_store.store(&token).await?;
        let username = user.username.clone();
        self.enter_signed_in(user.clone(), token, false).await;

        info!(username = %username, "User signed in");
        Ok(user)
    }

    /// Create a new account. Does not sign the account in.
    pub async fn register(&self, registration: Registration) -> Result<User> {
        let request =
            HttpRequest::post(format!("{}/api/v1/users/", self.base_url)).json(&registration)?;
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            let reason = response
                .text()
                .unwrap_or_else(|_| format!("status {}", response.status));
            return Err(AuthError::RegistrationFailed { reason });
        }

        response.json::<User>().map_err(AuthError::from)
    }

    /// Sign out: invalidate the token server-side (best effort), delete it
    /// from secure storage, and reset the session.
    ///
    /// Server-side invalidation failures are logged and never block the local
    /// sign-out.
    pub async fn logout(&self) -> Result<()> {
        let token = {
            let session = self.session.read().await;
            session.as_ref().map(|s| s.token.clone())
        };

        if let Some(token) = token {
            let request = HttpRequest::post(format!("{}/api/v1/token/logout/", self.base_url))
                .authorization(format!("Token {}", token));
            match self.http_client.execute(request).await {
                Ok(response) if !response.is_success() => {
                    warn!(
                        status = response.status,
                        "Server-side token invalidation returned an error"
                    );
                }
                Err(err) => warn!(error = %err, "Server-side token invalidation failed"),
                _ => {}
            }
        }

        self.token_store.clear().await?;
        self.enter_signed_out(Some(AuthEvent::SignedOut)).await;

        info!("User signed out");
        Ok(())
    }

    /// Fetch the account belonging to `token` from the backend.
    async fn fetch_current_user(&self, token: &str) -> Result<User> {
        let request = HttpRequest::get(format!("{}/api/v1/users/me/", self.base_url))
            .authorization(format!("Token {}", token));
        let response = self.http_client.execute(request).await?;

        if response.is_unauthorized() {
            return Err(AuthError::TokenRejected {
                status: response.status,
            });
        }

        if !response.is_success() {
            return Err(AuthError::UnexpectedResponse {
                status: response.status,
                message: response.text().unwrap_or_default(),
            });
        }

        response.json::<User>().map_err(AuthError::from)
    }

    async fn enter_signed_in(&self, user: User, token: String, restored: bool) -> AuthState {
        let username = user.username.clone();
        *self.session.write().await = Some(Session { user, token });
        *self.state.write().await = AuthState::SignedIn;

        self.emit(if restored {
            AuthEvent::SessionRestored { username }
        } else {
            AuthEvent::SignedIn { username }
        });

        AuthState::SignedIn
    }

    async fn enter_signed_out(&self, event: Option<AuthEvent>) -> AuthState {
        *self.session.write().await = None;
        *self.state.write().await = AuthState::SignedOut;

        if let Some(event) = event {
            self.emit(event);
        }

        AuthState::SignedOut
    }

    fn emit(&self, event: AuthEvent) {
        self.event_bus.emit(CoreEvent::Auth(event)).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{BridgeError, HttpResponse};
    use bytes::Bytes;
    use std::collections::{HashMap, VecDeque};
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockSecureStore {
        storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    #[async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
            self.storage
                .lock()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(self.storage.lock().await.get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
            self.storage.lock().await.remove(key);
            Ok(())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            self.storage.lock().await.clear();
            Ok(())
        }
    }

    /// Scripted HTTP client: pops one canned outcome per request and records
    /// every request it sees.
    #[derive(Default)]
    struct ScriptedHttpClient {
        responses: Mutex<VecDeque<BridgeResult<HttpResponse>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        async fn push_json(&self, status: u16, body: &str) {
            self.responses.lock().await.push_back(Ok(HttpResponse {
                status,
                headers: HashMap::new(),
                body: Bytes::from(body.to_string()),
            }));
        }

        async fn push_transport_error(&self, message: &str) {
            self.responses
                .lock()
                .await
                .push_back(Err(BridgeError::OperationFailed(message.to_string())));
        }

        async fn recorded(&self) -> Vec<HttpRequest> {
            self.requests.lock().await.clone()
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedHttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            self.requests.lock().await.push(request);
            self.responses
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Err(BridgeError::OperationFailed("no scripted response".into())))
        }
    }

    const USER_JSON: &str = r#"{"id": 1, "username": "alice", "email": "alice@example.com"}"#;

    fn manager(
        store: Arc<MockSecureStore>,
        http: Arc<ScriptedHttpClient>,
    ) -> (AuthManager, EventBus) {
        let bus = EventBus::new(16);
        let manager = AuthManager::new(store, http, bus.clone(), "https://api.example.com");
        (manager, bus)
    }

    #[tokio::test]
    async fn login_stores_token_and_activates_session() {
        let store = Arc::new(MockSecureStore::default());
        let http = Arc::new(ScriptedHttpClient::default());
        http.push_json(200, r#"{"auth_token": "tok-1"}"#).await;
        http.push_json(200, USER_JSON).await;

        let (manager, bus) = manager(store.clone(), http.clone());
        let mut events = bus.subscribe();

        let user = manager
            .login(Credentials::new("alice", "hunter2"))
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert!(manager.is_authenticated().await);
        assert_eq!(
            store.get_secret("auth_token").await.unwrap(),
            Some(b"tok-1".to_vec())
        );

        // Profile fetch carried the freshly issued token
        let requests = http.recorded().await;
        assert_eq!(
            requests[1].headers.get("Authorization"),
            Some(&"Token tok-1".to_string())
        );

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            CoreEvent::Auth(AuthEvent::SignedIn {
                username: "alice".to_string()
            })
        );
    }

    #[tokio::test]
    async fn login_failure_stores_nothing() {
        let store = Arc::new(MockSecureStore::default());
        let http = Arc::new(ScriptedHttpClient::default());
        http.push_json(400, r#"{"non_field_errors": ["bad credentials"]}"#)
            .await;

        let (manager, _bus) = manager(store.clone(), http);

        let err = manager
            .login(Credentials::new("alice", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::AuthenticationFailed { .. }));
        assert!(store.get_secret("auth_token").await.unwrap().is_none());
        assert_eq!(manager.state().await, AuthState::Unknown);
    }

    #[tokio::test]
    async fn restore_without_token_starts_signed_out() {
        let store = Arc::new(MockSecureStore::default());
        let http = Arc::new(ScriptedHttpClient::default());

        let (manager, _bus) = manager(store, http.clone());

        assert_eq!(manager.restore().await.unwrap(), AuthState::SignedOut);
        assert!(http.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn restore_validates_persisted_token() {
        let store = Arc::new(MockSecureStore::default());
        store
            .set_secret("auth_token", b"persisted-tok")
            .await
            .unwrap();

        let http = Arc::new(ScriptedHttpClient::default());
        http.push_json(200, USER_JSON).await;

        let (manager, _bus) = manager(store, http.clone());

        assert_eq!(manager.restore().await.unwrap(), AuthState::SignedIn);
        assert_eq!(manager.current_user().await.unwrap().username, "alice");

        let requests = http.recorded().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].headers.get("Authorization"),
            Some(&"Token persisted-tok".to_string())
        );
    }

    #[tokio::test]
    async fn restore_clears_rejected_token() {
        let store = Arc::new(MockSecureStore::default());
        store.set_secret("auth_token", b"stale-tok").await.unwrap();

        let http = Arc::new(ScriptedHttpClient::default());
        http.push_json(401, r#"{"detail": "Invalid token."}"#).await;

        let (manager, _bus) = manager(store.clone(), http);

        assert_eq!(manager.restore().await.unwrap(), AuthState::SignedOut);
        assert!(store.get_secret("auth_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn restore_clears_token_on_transport_failure() {
        let store = Arc::new(MockSecureStore::default());
        store.set_secret("auth_token", b"some-tok").await.unwrap();

        let http = Arc::new(ScriptedHttpClient::default());
        http.push_transport_error("connection refused").await;

        let (manager, _bus) = manager(store.clone(), http);

        assert_eq!(manager.restore().await.unwrap(), AuthState::SignedOut);
        assert!(store.get_secret("auth_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_clears_token_even_when_server_fails() {
        let store = Arc::new(MockSecureStore::default());
        let http = Arc::new(ScriptedHttpClient::default());
        http.push_json(200, r#"{"auth_token": "tok-1"}"#).await;
        http.push_json(200, USER_JSON).await;
        http.push_transport_error("gateway timeout").await;

        let (manager, _bus) = manager(store.clone(), http);

        manager
            .login(Credentials::new("alice", "hunter2"))
            .await
            .unwrap();
        manager.logout().await.unwrap();

        assert_eq!(manager.state().await, AuthState::SignedOut);
        assert!(manager.current_user().await.is_none());
        assert!(store.get_secret("auth_token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn authorize_requires_session() {
        let store = Arc::new(MockSecureStore::default());
        let http = Arc::new(ScriptedHttpClient::default());
        let (manager, _bus) = manager(store, http);

        let err = manager
            .authorize(HttpRequest::get("https://api.example.com/api/v1/tracks/"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::NotAuthenticated));
    }
}
