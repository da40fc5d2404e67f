//! Playback resource handle.
//!
//! A [`ResourceHandle`] wraps exactly one engine session from open to close.
//! It is exclusively owned by the playback session; UI consumers never see it.
//! Closing is idempotent, and every other operation fails with
//! [`PlaybackError::InvalidState`] once the handle is closed, so a stale task
//! holding a superseded handle cannot disturb the engine.

use crate::error::{PlaybackError, Result};
use bridge_traits::playback::{AudioEngine, EngineSessionId, EngineStatus, OpenRequest};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

/// Handle to one live engine session.
pub struct ResourceHandle {
    engine: Arc<dyn AudioEngine>,
    session: EngineSessionId,
    closed: AtomicBool,
}

impl ResourceHandle {
    /// Open a new engine session for the requested source.
    ///
    /// Opening with autoplay acquires exclusive device audio focus; the engine
    /// emits status snapshots until the handle is closed.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::ResourceOpen`] when the locator is unreachable
    /// or the format is unsupported.
    pub async fn open(engine: Arc<dyn AudioEngine>, request: OpenRequest) -> Result<Self> {
        let uri = request.uri.clone();
        let session = engine
            .open(request)
            .await
            .map_err(|e| PlaybackError::ResourceOpen(e.to_string()))?;

        debug!(%session, uri = %uri, "Opened engine session");

        Ok(Self {
            engine,
            session,
            closed: AtomicBool::new(false),
        })
    }

    /// The engine session this handle controls.
    pub fn session_id(&self) -> EngineSessionId {
        self.session
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self, operation: &str) -> Result<()> {
        if self.is_closed() {
            return Err(PlaybackError::InvalidState(format!(
                "{operation} on closed resource"
            )));
        }
        Ok(())
    }

    /// Begin or resume playback. No-op at the engine if already playing.
    pub async fn play(&self) -> Result<()> {
        self.ensure_open("play")?;
        self.engine
            .play(self.session)
            .await
            .map_err(|e| PlaybackError::Runtime(e.to_string()))
    }

    /// Pause playback. No-op at the engine if already paused.
    pub async fn pause(&self) -> Result<()> {
        self.ensure_open("pause")?;
        self.engine
            .pause(self.session)
            .await
            .map_err(|e| PlaybackError::Runtime(e.to_string()))
    }

    /// Seek to an absolute position. The engine clamps to `[0, duration]`.
    pub async fn seek(&self, position: Duration) -> Result<()> {
        self.ensure_open("seek")?;
        self.engine
            .seek(self.session, position)
            .await
            .map_err(|e| PlaybackError::Runtime(e.to_string()))
    }

    /// Release the engine session and device audio focus.
    ///
    /// Safe to call multiple times; only the first call reaches the engine.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        debug!(session = %self.session, "Closing engine session");

        self.engine
            .close(self.session)
            .await
            .map_err(|e| PlaybackError::Runtime(e.to_string()))
    }

    /// Subscribe to raw status snapshots for this session.
    ///
    /// The engine stops emitting once the session is closed.
    pub fn status_stream(&self) -> broadcast::Receiver<EngineStatus> {
        self.engine.status_stream(self.session)
    }
}

impl std::fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("session", &self.session)
            .field("closed", &self.is_closed())
            .finish()
    }
}
