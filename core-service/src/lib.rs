//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, secure
//! storage, audio engine) into the shared Rust core and owns the singletons
//! with process lifetime: the event bus, the authentication manager, and the
//! playback session. Mobile shells construct one [`CoreService`] at startup,
//! call [`CoreService::initialize`] once, and tear it down on exit; desktop
//! test hosts enable the `desktop-shims` feature to reuse the adapters from
//! `bridge-desktop`.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{AudioEngine, HttpClient, SecureStore};
use core_auth::{AuthManager, AuthState};
use core_playback::PlayerSession;
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, Receiver};
use tracing::info;

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub secure_store: Arc<dyn SecureStore>,
    pub audio_engine: Arc<dyn AudioEngine>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        secure_store: Arc<dyn SecureStore>,
        audio_engine: Arc<dyn AudioEngine>,
    ) -> Self {
        Self {
            http_client,
            secure_store,
            audio_engine,
        }
    }

    /// Construct a bundle with desktop defaults for HTTP and secure storage.
    ///
    /// There is no desktop audio backend; the engine is always supplied by
    /// the caller.
    #[cfg(feature = "desktop-shims")]
    pub fn with_desktop_shims(audio_engine: Arc<dyn AudioEngine>) -> Self {
        Self {
            http_client: Arc::new(bridge_desktop::ReqwestHttpClient::new()),
            secure_store: Arc::new(bridge_desktop::KeyringSecureStore::new()),
            audio_engine,
        }
    }

    /// Build a [`CoreConfig`] from this bundle.
    pub fn into_config(self, api_base_url: impl Into<String>) -> Result<CoreConfig> {
        CoreConfig::builder()
            .api_base_url(api_base_url)
            .http_client(self.http_client)
            .secure_store(self.secure_store)
            .audio_engine(self.audio_engine)
            .build()
            .map_err(CoreError::from)
    }
}

/// Primary façade exposed to host applications.
///
/// Clones share the same underlying singletons.
#[derive(Clone)]
pub struct CoreService {
    event_bus: EventBus,
    auth: Arc<AuthManager>,
    player: PlayerSession,
}

impl CoreService {
    /// Create the process-wide core from a validated configuration.
    pub fn new(config: CoreConfig) -> Self {
        let event_bus = EventBus::new(config.event_buffer_size);

        let auth = Arc::new(AuthManager::new(
            Arc::clone(&config.secure_store),
            Arc::clone(&config.http_client),
            event_bus.clone(),
            config.api_base_url.clone(),
        ));

        let player = PlayerSession::new(Arc::clone(&config.audio_engine), event_bus.clone());

        info!(api_base_url = %config.api_base_url, "Core service constructed");

        Self {
            event_bus,
            auth,
            player,
        }
    }

    /// Restore persisted state. Call once at application start.
    ///
    /// Currently this validates the stored auth token and returns the
    /// resulting authentication state.
    pub async fn initialize(&self) -> Result<AuthState> {
        let state = self.auth.restore().await?;
        info!(?state, "Core service initialized");
        Ok(state)
    }

    /// Release held resources. Call once at application exit.
    pub async fn shutdown(&self) {
        self.player.teardown().await;
        info!("Core service shut down");
    }

    /// The authentication collaborator.
    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// The playback session.
    pub fn player(&self) -> &PlayerSession {
        &self.player
    }

    /// The shared event bus.
    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    /// Subscribe to core events.
    pub fn subscribe_events(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::playback::{EngineSessionId, EngineStatus, OpenRequest};
    use bridge_traits::{HttpRequest, HttpResponse};
    use std::time::Duration;
    use tokio::sync::broadcast;

    struct EmptySecureStore;

    #[async_trait]
    impl SecureStore for EmptySecureStore {
        async fn set_secret(&self, _key: &str, _value: &[u8]) -> BridgeResult<()> {
            Ok(())
        }

        async fn get_secret(&self, _key: &str) -> BridgeResult<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn delete_secret(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct UnreachableHttpClient;

    #[async_trait]
    impl HttpClient for UnreachableHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(bridge_traits::BridgeError::OperationFailed(
                "no network in tests".to_string(),
            ))
        }
    }

    struct IdleEngine;

    #[async_trait]
    impl AudioEngine for IdleEngine {
        async fn open(&self, _request: OpenRequest) -> BridgeResult<EngineSessionId> {
            Ok(EngineSessionId::new())
        }

        async fn play(&self, _session: EngineSessionId) -> BridgeResult<()> {
            Ok(())
        }

        async fn pause(&self, _session: EngineSessionId) -> BridgeResult<()> {
            Ok(())
        }

        async fn seek(&self, _session: EngineSessionId, _position: Duration) -> BridgeResult<()> {
            Ok(())
        }

        async fn close(&self, _session: EngineSessionId) -> BridgeResult<()> {
            Ok(())
        }

        fn status_stream(&self, _session: EngineSessionId) -> broadcast::Receiver<EngineStatus> {
            broadcast::channel(1).1
        }
    }

    fn service() -> CoreService {
        let config = CoreDependencies::new(
            Arc::new(UnreachableHttpClient),
            Arc::new(EmptySecureStore),
            Arc::new(IdleEngine),
        )
        .into_config("https://api.example.com")
        .expect("config should build");

        CoreService::new(config)
    }

    #[tokio::test]
    async fn initialize_without_token_starts_signed_out() {
        let service = service();
        let state = service.initialize().await.unwrap();
        assert_eq!(state, AuthState::SignedOut);
        assert!(!service.auth().is_authenticated().await);
    }

    #[tokio::test]
    async fn shutdown_resets_player() {
        let service = service();
        service.shutdown().await;

        let snapshot = service.player().snapshot();
        assert!(snapshot.active_track.is_none());
        assert!(!snapshot.visible);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let service = service();
        let clone = service.clone();

        service.initialize().await.unwrap();
        assert_eq!(clone.auth().state().await, AuthState::SignedOut);
    }
}
