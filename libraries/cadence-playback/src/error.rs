//! Error types for playback coordination

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Index does not address an entry of the playlist
    #[error("Index out of bounds: {index} (playlist length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Audio engine rejected an operation
    #[error("Audio engine error: {0}")]
    Engine(String),

    /// Session task is no longer running
    #[error("Playback session closed")]
    SessionClosed,
}

/// Reasons a duration probe can fail
///
/// Probe failures never escape the prober: they are logged and the track's
/// duration is recorded as unknown.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The audio resource could not be fetched
    #[error("Failed to fetch audio: {0}")]
    Fetch(String),

    /// The resource was fetched but its metadata could not be read
    #[error("Failed to read audio metadata: {0}")]
    Decode(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
