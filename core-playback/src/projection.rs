//! Status projection.
//!
//! Pure mapping from raw engine status snapshots to the session's observable
//! status. Device callbacks can deliver partial or out-of-order data (missing
//! durations, positions past the end, negative values from integer wrap), so
//! everything here is deterministic, clamped, and side-effect-free. The whole
//! projection is testable without a real audio backend.

use bridge_traits::playback::EngineStatus;
use serde::{Deserialize, Serialize};

/// Observable playback status derived from engine snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Whether the active resource is decoded and controllable.
    pub loaded: bool,
    /// Current position in milliseconds; never exceeds `duration_ms`.
    pub position_ms: u64,
    /// Total duration in milliseconds; `0` while unknown.
    pub duration_ms: u64,
    /// Confirmed playing flag.
    pub playing: bool,
}

impl SessionStatus {
    /// Status published immediately when a new load begins: position zero,
    /// duration from the catalog when known.
    pub fn for_new_load(duration_ms: u64) -> Self {
        Self {
            loaded: false,
            position_ms: 0,
            duration_ms,
            playing: false,
        }
    }
}

/// Outcome of folding one engine snapshot into the session status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projected {
    /// The resource failed to load or the device faulted mid-playback. The
    /// caller transitions the session to its error state.
    Fatal {
        /// Device-reported failure description.
        message: String,
    },
    /// The resource is still being prepared; only `loaded` changes.
    Pending { status: SessionStatus },
    /// The resource is live. `finished` is set when the track just played to
    /// its natural end (and is not looping); `playing` is already forced off
    /// in that case.
    Live {
        status: SessionStatus,
        finished: bool,
    },
}

/// Fold a raw engine snapshot into the current observable status.
///
/// Rules:
/// - `loaded = false` with an error is fatal
/// - `loaded = false` without an error leaves everything but `loaded` intact
/// - otherwise `duration_ms = max(event.duration_ms, 0)` and `position_ms`
///   is clamped to `[0, duration_ms]`
/// - `finished` without looping forces `playing = false` while keeping the
///   last reported position
pub fn project(current: &SessionStatus, event: &EngineStatus) -> Projected {
    if !event.loaded {
        if let Some(message) = &event.error {
            return Projected::Fatal {
                message: message.clone(),
            };
        }

        return Projected::Pending {
            status: SessionStatus {
                loaded: false,
                ..*current
            },
        };
    }

    let duration_ms = event.duration_ms.max(0) as u64;
    let position_ms = event.position_ms.clamp(0, duration_ms as i64) as u64;
    let finished = event.finished && !event.looping;

    Projected::Live {
        status: SessionStatus {
            loaded: true,
            position_ms,
            duration_ms,
            playing: if finished { false } else { event.playing },
        },
        finished,
    }
}
