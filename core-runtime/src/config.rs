//! # Core Configuration Module
//!
//! Provides configuration management for the mobile music core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`CoreConfig`] holding the bridge handles and settings the core needs. It
//! enforces fail-fast validation so a missing host capability surfaces at
//! startup with an actionable message rather than as a latent panic.
//!
//! ## Required Dependencies
//!
//! - `SecureStore` - credential persistence
//! - `HttpClient` - authenticated API calls
//! - `AudioEngine` - device playback backend
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.example.com")
//!     .secure_store(Arc::new(MySecureStore))
//!     .http_client(Arc::new(MyHttpClient))
//!     .audio_engine(Arc::new(MyAudioEngine))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{AudioEngine, HttpClient, SecureStore};
use std::sync::Arc;

/// Core configuration for the mobile music core.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL of the backend API (no trailing slash)
    pub api_base_url: String,

    /// Event bus channel capacity
    pub event_buffer_size: usize,

    /// Secure credential storage bridge
    pub secure_store: Arc<dyn SecureStore>,

    /// HTTP transport bridge
    pub http_client: Arc<dyn HttpClient>,

    /// Device audio engine bridge
    pub audio_engine: Arc<dyn AudioEngine>,
}

impl CoreConfig {
    /// Start building a configuration.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    event_buffer_size: Option<usize>,
    secure_store: Option<Arc<dyn SecureStore>>,
    http_client: Option<Arc<dyn HttpClient>>,
    audio_engine: Option<Arc<dyn AudioEngine>>,
}

impl CoreConfigBuilder {
    /// Set the backend API base URL. A trailing slash is stripped.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.api_base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Override the event bus channel capacity.
    pub fn event_buffer_size(mut self, capacity: usize) -> Self {
        self.event_buffer_size = Some(capacity);
        self
    }

    /// Provide the secure storage bridge.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Provide the HTTP transport bridge.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Provide the device audio engine bridge.
    pub fn audio_engine(mut self, engine: Arc<dyn AudioEngine>) -> Self {
        self.audio_engine = Some(engine);
        self
    }

    /// Validate the collected capabilities and produce a [`CoreConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] naming the first absent bridge,
    /// or [`Error::Config`] for invalid settings.
    pub fn build(self) -> Result<CoreConfig> {
        let api_base_url = self
            .api_base_url
            .ok_or_else(|| Error::Config("api_base_url is required".to_string()))?;

        if api_base_url.is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }

        let secure_store = self.secure_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SecureStore".to_string(),
            message: "provide a platform secure store via CoreConfigBuilder::secure_store"
                .to_string(),
        })?;

        let http_client = self.http_client.ok_or_else(|| Error::CapabilityMissing {
            capability: "HttpClient".to_string(),
            message: "provide an HTTP transport via CoreConfigBuilder::http_client".to_string(),
        })?;

        let audio_engine = self.audio_engine.ok_or_else(|| Error::CapabilityMissing {
            capability: "AudioEngine".to_string(),
            message: "provide a device audio backend via CoreConfigBuilder::audio_engine"
                .to_string(),
        })?;

        Ok(CoreConfig {
            api_base_url,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            secure_store,
            http_client,
            audio_engine,
        })
    }
}
