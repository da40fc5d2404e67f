//! Track descriptor supplied by library and search collaborators.

use bridge_traits::playback::MediaMetadata;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A playable track.
///
/// Immutable once constructed. The `source_url` is an opaque locator resolved
/// by the host audio engine; the core never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Backend identity of the track.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Display artist string.
    pub artist: String,
    /// Artwork reference, when available.
    pub artwork_url: Option<String>,
    /// Opaque source locator.
    pub source_url: String,
    /// Known duration, when the catalog provides one.
    pub duration: Option<Duration>,
}

impl Track {
    /// Construct a track with the required fields.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            artwork_url: None,
            source_url: source_url.into(),
            duration: None,
        }
    }

    /// Attach an artwork reference.
    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    /// Attach the catalog-known duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Known duration in milliseconds, `0` when unknown.
    pub fn duration_ms(&self) -> u64 {
        self.duration.map(|d| d.as_millis() as u64).unwrap_or(0)
    }

    /// Metadata handed to the engine for platform media sessions.
    pub fn media_metadata(&self) -> MediaMetadata {
        MediaMetadata {
            track_id: Some(self.id.clone()),
            title: Some(self.title.clone()),
            artist: Some(self.artist.clone()),
            artwork_url: self.artwork_url.clone(),
            extra: Default::default(),
        }
    }
}
