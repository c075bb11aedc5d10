//! Cadence - Playback Coordination
//!
//! Platform-agnostic playback coordination for Cadence.
//!
//! This crate provides:
//! - A single-writer playback coordinator (playlist, index, play/pause, volume, repeat)
//! - Wraparound navigation and end-of-track policy
//! - An audio engine trait with generation-tagged sound handles
//! - Lazy, bounded, cancellable duration probing
//! - A session actor publishing snapshots and events to UI layers
//!
//! # Architecture
//!
//! `cadence-playback` knows nothing about audio decoding or the CMS. The
//! platform supplies an [`AudioEngine`] and, optionally, a [`DurationProbe`].
//! Everything asynchronous reported back (sound loaded, track ended, probe
//! finished) carries the playlist load generation it was started for, and is
//! discarded if the playlist has been replaced since.
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Playlist, Track, TrackId};
//! use cadence_playback::{
//!     AudioEngine, PlaybackConfig, PlaybackCoordinator, PlaybackStatus, Result, SoundHandle,
//! };
//! use std::time::Duration;
//!
//! struct Silent;
//!
//! impl AudioEngine for Silent {
//!     fn initialize(&mut self) -> Result<()> { Ok(()) }
//!     fn load(&mut self, _: SoundHandle, _: &str) -> Result<()> { Ok(()) }
//!     fn unload(&mut self, _: SoundHandle) {}
//!     fn play(&mut self, _: SoundHandle) {}
//!     fn pause(&mut self, _: SoundHandle) {}
//!     fn seek(&mut self, _: SoundHandle, _: f64) {}
//!     fn set_volume(&mut self, _: SoundHandle, _: u8) {}
//!     fn position(&self, _: SoundHandle) -> Option<Duration> { None }
//! }
//!
//! let mut coordinator = PlaybackCoordinator::new(Box::new(Silent), PlaybackConfig::default());
//!
//! let playlist = Playlist::all_songs(vec![
//!     Track::new(TrackId::new(1), "Intro", "Band", "http://cms/uploads/1.mp3").into(),
//!     Track::new(TrackId::new(2), "Outro", "Band", "http://cms/uploads/2.mp3").into(),
//! ]);
//!
//! coordinator.load_playlist(playlist);
//! assert_eq!(coordinator.status(), PlaybackStatus::Paused);
//!
//! coordinator.select_track(1, None).unwrap();
//! assert_eq!(coordinator.status(), PlaybackStatus::Playing);
//!
//! // Manual navigation wraps
//! coordinator.next();
//! assert_eq!(coordinator.current_index(), Some(0));
//! ```

pub mod coordinator;
pub mod engine;
pub mod error;
pub mod events;
pub mod probe;
pub mod session;
pub mod types;

pub use coordinator::PlaybackCoordinator;
pub use engine::{AudioEngine, EngineEvent, EngineEventKind, SoundHandle};
pub use error::{PlaybackError, ProbeError, Result};
pub use events::PlaybackEvent;
pub use probe::{
    DurationProbe, DurationProber, ProbeConfig, ProbeOutcome, ProbeRequest, ProbeTarget,
    ProbeTask,
};
pub use session::{PlaybackSession, SessionCommand, SessionConfig, SessionHandle};
pub use types::{PlaybackConfig, PlaybackSnapshot, PlaybackStatus, TrackDuration};
