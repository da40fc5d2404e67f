//! Playback bridge trait and supporting status types.
//!
//! These abstractions let the core playback module drive a platform-specific
//! audio engine while preserving a consistent, async-first API surface. Host
//! applications are expected to provide a concrete [`AudioEngine`] that
//! satisfies their platform constraints (AVAudioEngine, ExoPlayer, a desktop
//! backend, or a scripted engine in tests).

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Unique identifier for playback sessions managed by a host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineSessionId(Uuid);

impl EngineSessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EngineSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EngineSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display metadata surfaced to the host alongside a session.
///
/// Engines may use this to populate platform media sessions, lock-screen
/// controls, or notification center entries.
#[derive(Debug, Clone, Default)]
pub struct MediaMetadata {
    /// Opaque track identifier.
    pub track_id: Option<String>,
    /// Display title for the track.
    pub title: Option<String>,
    /// Display artist string.
    pub artist: Option<String>,
    /// Artwork URI, when available.
    pub artwork_url: Option<String>,
    /// Arbitrary extra fields (e.g., album, genre).
    pub extra: HashMap<String, String>,
}

/// Request describing the playback session a host engine should provision.
#[derive(Debug, Clone)]
pub struct OpenRequest {
    /// Opaque source locator resolved by the engine (file path, HTTPS URL,
    /// asset reference).
    pub uri: String,
    /// Whether playback should start as soon as the source is ready.
    pub autoplay: bool,
    /// Whether playback should loop automatically.
    pub looping: bool,
    /// Optional metadata surfaced to the host.
    pub metadata: MediaMetadata,
}

impl OpenRequest {
    /// Construct a new request for the provided locator.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            autoplay: false,
            looping: false,
            metadata: MediaMetadata::default(),
        }
    }

    /// Request playback to start as soon as the source is ready.
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    /// Request automatic looping.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Attach metadata to the request.
    pub fn with_metadata(mut self, metadata: MediaMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Raw status snapshot pushed by the engine for one session.
///
/// Position and duration are signed because they arrive from device callbacks
/// verbatim; consumers are expected to clamp before trusting them. A snapshot
/// with `loaded = false` and an error message describes a failed or aborted
/// load; `loaded = false` without an error is an in-flight load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Whether the source is decoded and ready for control operations.
    pub loaded: bool,
    /// Current playback position in milliseconds.
    pub position_ms: i64,
    /// Total duration in milliseconds; `0` when not yet known.
    pub duration_ms: i64,
    /// Whether audio is currently advancing.
    pub playing: bool,
    /// The track just played to its natural end.
    pub finished: bool,
    /// The session was opened with looping enabled.
    pub looping: bool,
    /// Device-level failure description, when present.
    pub error: Option<String>,
}

impl EngineStatus {
    /// Snapshot for a source that is still being prepared.
    pub fn pending() -> Self {
        Self {
            loaded: false,
            position_ms: 0,
            duration_ms: 0,
            playing: false,
            finished: false,
            looping: false,
            error: None,
        }
    }

    /// Snapshot for a failed load or a mid-playback device fault.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::pending()
        }
    }

    /// Snapshot for a live session at the given position.
    pub fn live(position_ms: i64, duration_ms: i64, playing: bool) -> Self {
        Self {
            loaded: true,
            position_ms,
            duration_ms,
            playing,
            finished: false,
            looping: false,
            error: None,
        }
    }

    /// Mark this snapshot as the natural end of the track.
    pub fn with_finished(mut self, finished: bool) -> Self {
        self.finished = finished;
        self
    }
}

/// Trait for platform-specific audio engines.
///
/// One engine instance manages any number of sessions, each created by
/// [`open`](AudioEngine::open) and referenced by its [`EngineSessionId`] until
/// [`close`](AudioEngine::close). Opening a session with autoplay acquires
/// exclusive device audio focus; closing it releases focus and all decoding
/// resources.
///
/// Implementations must deliver status snapshots for a session in emission
/// order and stop emitting once the session is closed.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Provision a playback session for the requested source.
    ///
    /// # Errors
    ///
    /// Fails if the locator is unreachable, the format is unsupported, or the
    /// audio device is unavailable.
    async fn open(&self, request: OpenRequest) -> Result<EngineSessionId>;

    /// Begin or resume playback. No-op if the session is already playing.
    async fn play(&self, session: EngineSessionId) -> Result<()>;

    /// Pause playback. No-op if the session is already paused.
    async fn pause(&self, session: EngineSessionId) -> Result<()>;

    /// Seek to an absolute position. Implementations clamp the position to
    /// `[0, duration]`.
    async fn seek(&self, session: EngineSessionId, position: Duration) -> Result<()>;

    /// Release the session and its device resources. Closing an unknown or
    /// already-closed session is not an error.
    async fn close(&self, session: EngineSessionId) -> Result<()>;

    /// Subscribe to status snapshots for a session.
    ///
    /// Each call returns an independent receiver. No snapshots are delivered
    /// after the session is closed.
    fn status_stream(&self, session: EngineSessionId) -> broadcast::Receiver<EngineStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_unique() {
        let a = EngineSessionId::new();
        let b = EngineSessionId::new();
        assert_ne!(a, b);
        assert_eq!(a, EngineSessionId::from_uuid(*a.as_uuid()));
    }

    #[test]
    fn open_request_builder() {
        let request = OpenRequest::new("https://cdn.example.com/track.mp3")
            .with_autoplay(true)
            .with_metadata(MediaMetadata {
                title: Some("Test Song".to_string()),
                ..MediaMetadata::default()
            });

        assert!(request.autoplay);
        assert!(!request.looping);
        assert_eq!(request.metadata.title.as_deref(), Some("Test Song"));
    }

    #[test]
    fn engine_status_constructors() {
        let pending = EngineStatus::pending();
        assert!(!pending.loaded);
        assert!(pending.error.is_none());

        let failed = EngineStatus::failed("unsupported codec");
        assert!(!failed.loaded);
        assert_eq!(failed.error.as_deref(), Some("unsupported codec"));

        let live = EngineStatus::live(1_000, 180_000, true).with_finished(false);
        assert!(live.loaded);
        assert!(live.playing);
        assert!(!live.finished);
    }
}
