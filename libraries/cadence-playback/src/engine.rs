//! Platform-agnostic audio engine trait
//!
//! Abstracts decode/playback so the coordinator works with any backend
//! (a native decoder, a webview bridge, a test double).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies one loaded sound
///
/// Allocated by the coordinator and handed to the engine on `load`. The engine
/// tags every [`EngineEvent`] with it, which lets the coordinator drop
/// completions that belong to a sound it has already replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundHandle {
    /// Playlist load generation the sound was created under
    pub generation: u64,

    /// Monotonic counter across all loads
    pub serial: u64,
}

/// What happened to a loaded sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEventKind {
    /// Metadata decoded; the sound can start
    Loaded {
        /// Total length reported by the decoder
        duration: Duration,
    },

    /// Playback reached the natural end of the sound
    Ended,

    /// The source could not be loaded or played
    Failed { message: String },
}

/// Event emitted by the engine for one sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineEvent {
    pub handle: SoundHandle,
    pub kind: EngineEventKind,
}

impl EngineEvent {
    pub fn loaded(handle: SoundHandle, duration: Duration) -> Self {
        Self {
            handle,
            kind: EngineEventKind::Loaded { duration },
        }
    }

    pub fn ended(handle: SoundHandle) -> Self {
        Self {
            handle,
            kind: EngineEventKind::Ended,
        }
    }

    pub fn failed(handle: SoundHandle, message: impl Into<String>) -> Self {
        Self {
            handle,
            kind: EngineEventKind::Failed {
                message: message.into(),
            },
        }
    }
}

/// Platform audio engine
///
/// Implementors load sounds asynchronously and report progress through
/// [`EngineEvent`]s, delivered back to the coordinator by the host (usually a
/// channel into [`crate::PlaybackSession`]).
///
/// Transport calls for a handle that was never loaded or was already unloaded
/// must be ignored.
pub trait AudioEngine: Send {
    /// Prepare the output device
    ///
    /// Called once, on the first user gesture that requests playback. Hosts
    /// with autoplay restrictions cannot open output any earlier.
    fn initialize(&mut self) -> Result<()>;

    /// Start loading `url` under `handle`
    ///
    /// Must eventually emit `Loaded` or `Failed` for the handle.
    fn load(&mut self, handle: SoundHandle, url: &str) -> Result<()>;

    /// Stop and release a sound
    fn unload(&mut self, handle: SoundHandle);

    /// Start or resume a loaded sound
    fn play(&mut self, handle: SoundHandle);

    /// Pause a sound, keeping its position
    fn pause(&mut self, handle: SoundHandle);

    /// Seek to `seconds` from the start
    ///
    /// No validation happens before this call; out-of-range positions are the
    /// engine's to interpret.
    fn seek(&mut self, handle: SoundHandle, seconds: f64);

    /// Set the volume for a sound (0-100 nominal, passed through as given)
    fn set_volume(&mut self, handle: SoundHandle, level: u8);

    /// Current playback position of a sound
    fn position(&self, handle: SoundHandle) -> Option<Duration>;
}
