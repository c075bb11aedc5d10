//! Playback Events
//!
//! Event-based communication for UI synchronization.
//! Events are emitted at key points:
//! - Playlist loads (including wholesale replacement)
//! - State changes (play/pause/stop at end of playlist)
//! - Track changes (select, next/previous, natural advance)
//! - Duration resolution (probe results and engine load reports)

use crate::types::PlaybackStatus;
use cadence_core::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Events emitted by the playback coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// A playlist replaced the previous one
    PlaylistLoaded {
        /// Load generation of the new playlist
        generation: u64,
        /// Number of entries
        length: usize,
        /// Display title
        title: String,
    },

    /// Playback status changed
    StateChanged {
        /// The new status
        status: PlaybackStatus,
    },

    /// Current track changed
    TrackChanged {
        /// Index of the new current entry
        index: usize,
        /// Id of the new current entry (placeholders may have none)
        track_id: Option<TrackId>,
        /// Index before the change (`None` right after a playlist load)
        previous_index: Option<usize>,
    },

    /// Duration of an entry became known (or was given up on)
    DurationResolved {
        index: usize,
        /// `None` means unknown
        duration: Option<Duration>,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level, as given
        level: u8,
    },

    /// Repeat flag toggled
    RepeatChanged { enabled: bool },

    /// Something went wrong that the UI may want to surface
    Error {
        /// Error message
        message: String,
    },
}
