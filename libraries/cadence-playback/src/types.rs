//! Core types for playback coordination

use cadence_core::{Playlist, PlaylistEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Coarse playback state
///
/// ```text
///            load_playlist([])
///   Empty <────────────────────── (any)
///     │ load_playlist(non-empty)
///     ▼
///   Paused ──select_track / play / toggle──▶ Playing
///     ▲                                          │
///     └──────pause / toggle / end of last────────┘
///            track with repeat off
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No playlist loaded (or an empty one); every transport command is inert
    Empty,

    /// Playlist loaded, not playing
    Paused,

    /// Playlist loaded and the current track is playing
    Playing,
}

/// Duration knowledge for one playlist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackDuration {
    /// Not probed yet
    Pending,

    /// Probed (or reported by the engine); cached for the playlist's lifetime
    Known(Duration),

    /// Probe failed or timed out; rendered as `--:--`
    Unknown,
}

impl TrackDuration {
    /// Duration if known
    pub fn as_duration(self) -> Option<Duration> {
        match self {
            TrackDuration::Known(duration) => Some(duration),
            TrackDuration::Pending | TrackDuration::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, TrackDuration::Known(_))
    }
}

/// Configuration for the playback coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0-100, default: 100)
    pub volume: u8,

    /// Initial repeat flag (default: false)
    pub repeat: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 100,
            repeat: false,
        }
    }
}

/// Read-only view of the playback state
///
/// Cheap to clone: the playlist is shared, not copied.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    /// Load generation of the active playlist
    pub generation: u64,

    /// Active playlist
    pub playlist: Arc<Playlist>,

    /// Current index (`None` when the playlist is empty)
    pub index: Option<usize>,

    pub status: PlaybackStatus,

    /// Elapsed time in the current track
    pub elapsed: Duration,

    /// Volume as last set (0-100)
    pub volume: u8,

    pub repeat: bool,

    /// Per-entry duration knowledge, parallel to `playlist.entries`
    pub durations: Vec<TrackDuration>,
}

impl PlaybackSnapshot {
    /// Currently selected entry
    pub fn current_track(&self) -> Option<&PlaylistEntry> {
        self.index.and_then(|index| self.playlist.get(index))
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Duration of the entry at `index`, if known
    pub fn duration_of(&self, index: usize) -> Option<Duration> {
        self.durations
            .get(index)
            .and_then(|duration| duration.as_duration())
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            generation: 0,
            playlist: Arc::new(Playlist::empty()),
            index: None,
            status: PlaybackStatus::Empty,
            elapsed: Duration::ZERO,
            volume: PlaybackConfig::default().volume,
            repeat: false,
            durations: Vec::new(),
        }
    }
}
