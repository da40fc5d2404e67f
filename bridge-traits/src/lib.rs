//! # Bridge Traits
//!
//! Platform abstraction traits for the mobile music core.
//!
//! The core never talks to a device audio engine, secure keystore, or HTTP
//! socket directly. Host applications (iOS, Android, desktop test shells)
//! implement these traits and hand them to the core at startup; everything
//! above this crate is portable Rust.

pub mod error;
pub mod http;
pub mod playback;
pub mod storage;

pub use error::{BridgeError, Result};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use playback::{AudioEngine, EngineSessionId, EngineStatus, MediaMetadata, OpenRequest};
pub use storage::SecureStore;
