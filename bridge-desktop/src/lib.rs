//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop hosts
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! The production targets of the core are mobile shells that bring their own
//! bridges. This crate provides the desktop-appropriate subset so demos and
//! integration hosts can run the same core:
//! - `HttpClient` using `reqwest`
//! - `SecureStore` using the `keyring` crate
//!
//! There is deliberately no desktop `AudioEngine` here: playback backends are
//! always supplied by the host application (or scripted in tests).
//!
//! ## Feature Flags
//!
//! - `secure-store`: Enable OS keychain integration (default)

mod http;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use http::ReqwestHttpClient;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;
