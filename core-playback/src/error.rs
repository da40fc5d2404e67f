//! # Playback Error Types
//!
//! Error taxonomy for playback session operations.

use thiserror::Error;

/// Errors that can occur during playback operations.
///
/// All variants are caught at the session boundary and converted into the
/// session's error state; they never surface to UI consumers as failures.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The source locator could not be opened (unreachable URI, unsupported
    /// format, network failure).
    #[error("Failed to open audio source: {0}")]
    ResourceOpen(String),

    /// An operation was issued against a closed or absent resource.
    #[error("Invalid resource state: {0}")]
    InvalidState(String),

    /// Device-level failure while a track was live.
    #[error("Playback runtime failure: {0}")]
    Runtime(String),
}

impl PlaybackError {
    /// Returns `true` if this error occurred while opening a source.
    pub fn is_open_failure(&self) -> bool {
        matches!(self, PlaybackError::ResourceOpen(_))
    }

    /// Returns `true` if this error is a stale-handle fault rather than a
    /// device problem.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, PlaybackError::InvalidState(_))
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
