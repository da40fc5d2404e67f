//! Playback session demonstration.
//!
//! Drives the session state machine against a simulated audio engine and
//! prints every published snapshot.
//!
//! Run with:
//! ```bash
//! cargo run --example playback_demo
//! ```

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::playback::{AudioEngine, EngineSessionId, EngineStatus, OpenRequest};
use core_playback::{PlayerSession, SessionState, Track};
use core_runtime::events::EventBus;
use core_runtime::logging::{init_logging, LoggingConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Engine that "plays" any source as a ten-second clip, ticking once per
/// simulated second.
#[derive(Default)]
struct SimulatedEngine {
    sessions: Mutex<HashMap<EngineSessionId, broadcast::Sender<EngineStatus>>>,
}

const CLIP_MS: i64 = 10_000;

#[async_trait]
impl AudioEngine for SimulatedEngine {
    async fn open(&self, request: OpenRequest) -> BridgeResult<EngineSessionId> {
        tokio::time::sleep(Duration::from_millis(150)).await;

        let id = EngineSessionId::new();
        let (tx, _) = broadcast::channel(32);
        self.sessions.lock().insert(id, tx.clone());

        if request.autoplay {
            tokio::spawn(async move {
                for second in 0..=10_i64 {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    let position = second * 1_000;
                    let status = EngineStatus::live(position, CLIP_MS, position < CLIP_MS)
                        .with_finished(position >= CLIP_MS);
                    if tx.send(status).is_err() {
                        break;
                    }
                }
            });
        }

        Ok(id)
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

    async fn close(&self, session: EngineSessionId) -> BridgeResult<()> {
        self.sessions.lock().remove(&session);
        Ok(())
    }

    fn status_stream(&self, session: EngineSessionId) -> broadcast::Receiver<EngineStatus> {
        self.sessions
            .lock()
            .get(&session)
            .map(|tx| tx.subscribe())
            .unwrap_or_else(|| broadcast::channel(1).1)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default())?;

    let engine = Arc::new(SimulatedEngine::default());
    let bus = EventBus::new(64);
    let session = PlayerSession::new(engine, bus);

    let mut snapshots = session.subscribe();
    let printer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow().clone();
            println!(
                "[{:?}] track={:?} playing={} position={}ms/{}ms",
                snapshot.state,
                snapshot.active_track.as_ref().map(|t| t.title.as_str()),
                snapshot.playing,
                snapshot.position_ms,
                snapshot.duration_ms,
            );
            if snapshot.state == SessionState::Finished {
                break;
            }
        }
    });

    let track = Track::new(
        "demo-1",
        "Simulated Clip",
        "Demo Artist",
        "sim://clip/demo-1",
    )
    .with_duration(Duration::from_secs(10));

    session.load(track);

    printer.await?;
    session.teardown().await;

    Ok(())
}
