//! Playback session state machine.
//!
//! One [`PlayerSession`] exists per process. It owns at most one
//! [`ResourceHandle`], serializes load requests, folds engine status into
//! observable state, and publishes [`PlayerSnapshot`]s to UI consumers over a
//! `watch` channel.
//!
//! ## Ordering model
//!
//! Every `load` (and `teardown`) bumps a generation counter. Open outcomes and
//! status events are tagged with the generation they were started under; any
//! outcome arriving for an older generation is discarded, regardless of
//! arrival order. This is what makes rapid track switches safe: the slow open
//! or late status callback of a superseded track can never overwrite state
//! belonging to the current one. The old resource is still closed, so device
//! audio focus and decoder memory are always released.
//!
//! ## Failure model
//!
//! Commands are infallible at the API. Open failures and device faults are
//! converted into the `Error` state (cause retained for diagnostics) and an
//! [`PlaybackEvent::Error`] on the bus; nothing propagates to consumers as an
//! unhandled failure. There is no automatic retry: recovery is an explicit new
//! `load`.

use crate::error::PlaybackError;
use crate::handle::ResourceHandle;
use crate::projection::{project, Projected, SessionStatus};
use crate::track::Track;
use bridge_traits::playback::{AudioEngine, EngineStatus, OpenRequest};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, RecvError};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Lifecycle state of the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionState {
    /// No track; nothing to render.
    #[default]
    Idle,
    /// A resource is being opened for the active track.
    Loading,
    /// The active track is live and advancing.
    Playing,
    /// The active track is live and paused.
    Paused,
    /// The active track played to its natural end.
    Finished,
    /// The last load or playback attempt failed; recover with a new load.
    Error,
}

/// Read-only state published to UI consumers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlayerSnapshot {
    /// The track this session is about, if any.
    pub active_track: Option<Track>,
    /// Session lifecycle state.
    pub state: SessionState,
    /// Confirmed playing flag.
    pub playing: bool,
    /// Position in milliseconds.
    pub position_ms: u64,
    /// Duration in milliseconds; `0` while unknown.
    pub duration_ms: u64,
    /// Whether a mini-player should render.
    pub visible: bool,
}

impl PlayerSnapshot {
    /// Returns `true` when a track is attached to the session.
    pub fn has_track(&self) -> bool {
        self.active_track.is_some()
    }
}

/// Mutable session root. Only [`Core`] touches this, under its mutex.
#[derive(Default)]
struct Inner {
    active_track: Option<Track>,
    resource: Option<Arc<ResourceHandle>>,
    status: SessionStatus,
    visible: bool,
    state: SessionState,
    generation: u64,
    last_error: Option<String>,
}

impl Inner {
    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            active_track: self.active_track.clone(),
            state: self.state,
            playing: self.status.playing,
            position_ms: self.status.position_ms,
            duration_ms: self.status.duration_ms,
            visible: self.visible,
        }
    }

    fn track_id(&self) -> Option<String> {
        self.active_track.as_ref().map(|t| t.id.clone())
    }
}

struct Core {
    engine: Arc<dyn AudioEngine>,
    bus: EventBus,
    state: Mutex<Inner>,
    snapshot_tx: watch::Sender<PlayerSnapshot>,
}

/// The process-wide playback session.
///
/// Cheap to clone; all clones share the same session. Construct once at
/// application start and tear down on exit. Commands may be issued from any
/// task; internal async work runs on the ambient tokio runtime.
#[derive(Clone)]
pub struct PlayerSession {
    core: Arc<Core>,
}

impl PlayerSession {
    /// Create an idle session over the given engine.
    pub fn new(engine: Arc<dyn AudioEngine>, bus: EventBus) -> Self {
        let (snapshot_tx, _) = watch::channel(PlayerSnapshot::default());
        Self {
            core: Arc::new(Core {
                engine,
                bus,
                state: Mutex::new(Inner::default()),
                snapshot_tx,
            }),
        }
    }

    /// Subscribe to snapshot updates.
    ///
    /// The receiver immediately holds the current snapshot; every state change
    /// publishes a new one.
    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.core.snapshot_tx.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.core.snapshot_tx.borrow().clone()
    }

    /// Cause of the last failure, kept for diagnostics while the session is in
    /// the error state.
    pub fn last_error(&self) -> Option<String> {
        self.core.state.lock().last_error.clone()
    }

    /// Switch the session to `track`.
    ///
    /// Publishes the new track immediately (position zero, catalog duration if
    /// known) without waiting for the previous resource to finish closing,
    /// then opens a new engine session with autoplay in the background. A
    /// `load` issued while a previous one is still opening supersedes it: the
    /// older resource is closed and its outcome ignored.
    pub fn load(&self, track: Track) {
        let core = Arc::clone(&self.core);

        let (generation, superseded) = {
            let mut s = core.state.lock();
            s.generation += 1;
            let superseded = s.resource.take();
            s.active_track = Some(track.clone());
            s.visible = true;
            s.state = SessionState::Loading;
            s.status = SessionStatus::for_new_load(track.duration_ms());
            s.last_error = None;
            (s.generation, superseded)
        };

        core.publish();
        core.emit(PlaybackEvent::TrackLoading {
            track_id: track.id.clone(),
            title: track.title.clone(),
        });

        if let Some(old) = superseded {
            // Release the previous resource without delaying the new load.
            tokio::spawn(async move { close_quietly(old).await });
        }

        info!(track_id = %track.id, generation, "Loading track");
        tokio::spawn(async move { core.open_for(generation, track).await });
    }

    /// Toggle between playing and paused.
    ///
    /// No-op without an active resource. The command issued is derived from
    /// the *confirmed* playing flag, and the flag itself only changes once the
    /// engine confirms through a status snapshot, so two rapid toggles issue
    /// the same idempotent command and converge to a single toggle's outcome.
    pub async fn toggle_play_pause(&self) {
        let (generation, resource, playing) = {
            let s = self.core.state.lock();
            (s.generation, s.resource.clone(), s.status.playing)
        };

        let Some(resource) = resource else {
            debug!("Toggle ignored: no active resource");
            return;
        };

        let result = if playing {
            resource.pause().await
        } else {
            resource.play().await
        };

        match result {
            Ok(()) => {}
            Err(err) if err.is_invalid_state() => {
                debug!(error = %err, "Toggle raced resource teardown; ignoring");
            }
            Err(err) => {
                self.core.enter_error(generation, err.to_string()).await;
            }
        }
    }

    /// Seek to `position_ms`.
    ///
    /// No-op without an active resource. The published position is updated
    /// optimistically (clamped to the known duration) because position lag is
    /// visually significant; the engine confirms through subsequent snapshots.
    pub async fn seek(&self, position_ms: u64) {
        let (resource, clamped) = {
            let mut s = self.core.state.lock();
            let Some(resource) = s.resource.clone() else {
                debug!("Seek ignored: no active resource");
                return;
            };
            let clamped = position_ms.min(s.status.duration_ms);
            s.status.position_ms = clamped;
            (resource, clamped)
        };

        self.core.publish();

        if let Err(err) = resource.seek(Duration::from_millis(clamped)).await {
            warn!(error = %err, position_ms = clamped, "Seek failed");
        }
    }

    /// Show or hide the player UI without touching playback.
    pub fn set_visible(&self, visible: bool) {
        self.core.state.lock().visible = visible;
        self.core.publish();
    }

    /// Close any held resource and return to idle.
    ///
    /// Also supersedes an in-flight load, so an open resolving afterwards is
    /// discarded. Close failures are logged and never block the reset.
    pub async fn teardown(&self) {
        let (resource, track_id) = {
            let mut s = self.core.state.lock();
            s.generation += 1;
            let resource = s.resource.take();
            let track_id = s.track_id();
            s.active_track = None;
            s.state = SessionState::Idle;
            s.visible = false;
            s.status = SessionStatus::default();
            s.last_error = None;
            (resource, track_id)
        };

        self.core.publish();
        if track_id.is_some() {
            self.core.emit(PlaybackEvent::Stopped { track_id });
        }

        if let Some(handle) = resource {
            close_quietly(handle).await;
        }

        info!("Playback session torn down");
    }
}

impl Core {
    fn publish(&self) {
        let snapshot = self.state.lock().snapshot();
        self.snapshot_tx.send_replace(snapshot);
    }

    fn emit(&self, event: PlaybackEvent) {
        self.bus.emit(CoreEvent::Playback(event)).ok();
    }

    /// Open an engine session for `track` under `generation` and, if still
    /// current, install it and pump its status stream.
    async fn open_for(self: Arc<Self>, generation: u64, track: Track) {
        let request = OpenRequest::new(track.source_url.clone())
            .with_autoplay(true)
            .with_metadata(track.media_metadata());

        match ResourceHandle::open(Arc::clone(&self.engine), request).await {
            Ok(handle) => {
                let handle = Arc::new(handle);

                let superseded = {
                    let mut s = self.state.lock();
                    if s.generation != generation {
                        true
                    } else {
                        s.resource = Some(Arc::clone(&handle));
                        s.state = SessionState::Playing;
                        // Autoplay acknowledgment from the engine counts as
                        // confirmation; snapshots remain authoritative.
                        s.status.loaded = true;
                        s.status.playing = true;
                        false
                    }
                };

                if superseded {
                    debug!(generation, track_id = %track.id, "Open resolved after supersession; closing");
                    close_quietly(handle).await;
                    return;
                }

                self.publish();
                self.emit(PlaybackEvent::Started {
                    track_id: track.id.clone(),
                    title: track.title.clone(),
                });

                self.pump_status(generation, handle).await;
            }
            Err(err) => {
                warn!(error = %err, track_id = %track.id, "Failed to open track source");
                self.enter_error(generation, err.to_string()).await;
            }
        }
    }

    /// Consume status snapshots for one installed generation.
    async fn pump_status(self: &Arc<Self>, generation: u64, handle: Arc<ResourceHandle>) {
        let mut stream = handle.status_stream();

        loop {
            match stream.recv().await {
                Ok(event) => {
                    if !self.apply_status(generation, &event).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    // Status snapshots are cumulative; the next one catches up.
                    warn!(missed, "Status stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }

        debug!(generation, "Status pump finished");
    }

    /// Fold one engine snapshot into session state. Returns `false` when the
    /// pump for this generation should stop.
    async fn apply_status(&self, generation: u64, event: &EngineStatus) -> bool {
        let mut fatal: Option<String> = None;
        let mut events: Vec<PlaybackEvent> = Vec::new();

        {
            let mut s = self.state.lock();
            if s.generation != generation {
                // Stale generation: this resource was superseded, its events
                // no longer speak for the session.
                return false;
            }

            let track_id = s.track_id();

            match project(&s.status, event) {
                Projected::Fatal { message } => {
                    fatal = Some(message);
                }
                Projected::Pending { status } => {
                    s.status = status;
                }
                Projected::Live { status, finished } => {
                    let was_playing = s.status.playing;
                    s.status = status;

                    if finished {
                        s.state = SessionState::Finished;
                        if let Some(id) = &track_id {
                            events.push(PlaybackEvent::Completed {
                                track_id: id.clone(),
                            });
                        }
                    } else {
                        s.state = if status.playing {
                            SessionState::Playing
                        } else {
                            SessionState::Paused
                        };

                        if let Some(id) = &track_id {
                            if was_playing && !status.playing {
                                events.push(PlaybackEvent::Paused {
                                    track_id: id.clone(),
                                    position_ms: status.position_ms,
                                });
                            } else if !was_playing && status.playing {
                                events.push(PlaybackEvent::Resumed {
                                    track_id: id.clone(),
                                    position_ms: status.position_ms,
                                });
                            }
                            events.push(PlaybackEvent::PositionChanged {
                                track_id: id.clone(),
                                position_ms: status.position_ms,
                                duration_ms: status.duration_ms,
                            });
                        }
                    }
                }
            }
        }

        if let Some(message) = fatal {
            self.enter_error(generation, message).await;
            return false;
        }

        self.publish();
        for event in events {
            self.emit(event);
        }

        true
    }

    /// Move the session to the error state for `generation`, closing any held
    /// resource. Outcomes for superseded generations are ignored.
    async fn enter_error(&self, generation: u64, message: String) {
        let (resource, track_id) = {
            let mut s = self.state.lock();
            if s.generation != generation {
                debug!(generation, "Discarding failure from superseded load");
                return;
            }

            let track_id = s.track_id();
            s.active_track = None;
            s.visible = false;
            s.state = SessionState::Error;
            s.status = SessionStatus::default();
            s.last_error = Some(message.clone());
            (s.resource.take(), track_id)
        };

        self.publish();
        self.emit(PlaybackEvent::Error { track_id, message });

        if let Some(handle) = resource {
            close_quietly(handle).await;
        }
    }
}

/// Close a resource, logging failures instead of surfacing them. A session
/// that is moving on must never be blocked by teardown of the resource it is
/// leaving behind.
async fn close_quietly(handle: Arc<ResourceHandle>) {
    if let Err(err) = handle.close().await {
        match err {
            PlaybackError::InvalidState(_) => {}
            other => warn!(error = %other, "Failed to close playback resource"),
        }
    }
}
