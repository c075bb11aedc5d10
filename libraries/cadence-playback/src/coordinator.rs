//! Playback coordinator - single owner of the playback state
//!
//! Mediates between selection commands (from any UI layer) and the audio
//! engine: tracks the active playlist, the current index, the playing flag,
//! volume and repeat, and keeps at most one sound loaded at a time.

use crate::{
    engine::{AudioEngine, EngineEvent, EngineEventKind, SoundHandle},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    probe::{ProbeOutcome, ProbeRequest, ProbeTarget},
    types::{PlaybackConfig, PlaybackSnapshot, PlaybackStatus, TrackDuration},
};
use cadence_core::{Playlist, PlaylistEntry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The sound currently handed to the engine
#[derive(Debug, Clone, Copy)]
struct CurrentSound {
    handle: SoundHandle,
    /// Playlist index the sound was loaded for
    index: usize,
    /// Engine reported `Loaded`
    loaded: bool,
}

/// Playback coordinator
///
/// All mutation goes through `&mut self`; hand it to a
/// [`crate::PlaybackSession`] to share it between tasks.
pub struct PlaybackCoordinator {
    engine: Box<dyn AudioEngine>,
    engine_initialized: bool,

    playlist: Arc<Playlist>,
    durations: Vec<TrackDuration>,
    default_collection: Option<Arc<Playlist>>,

    index: Option<usize>,
    playing: bool,
    elapsed: Duration,
    volume: u8,
    repeat: bool,

    /// Bumped on every playlist load
    generation: u64,
    sound: Option<CurrentSound>,
    next_serial: u64,

    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackCoordinator {
    /// Create an empty coordinator
    ///
    /// The engine is not initialized until the first play gesture.
    pub fn new(engine: Box<dyn AudioEngine>, config: PlaybackConfig) -> Self {
        Self {
            engine,
            engine_initialized: false,
            playlist: Arc::new(Playlist::empty()),
            durations: Vec::new(),
            default_collection: None,
            index: None,
            playing: false,
            elapsed: Duration::ZERO,
            volume: config.volume,
            repeat: config.repeat,
            generation: 0,
            sound: None,
            next_serial: 0,
            pending_events: Vec::new(),
        }
    }

    // ===== Playlist =====

    /// Replace the active playlist
    ///
    /// Resets the index to 0 (or none for an empty playlist) and leaves
    /// playback paused. Durations carried by the entries are cached; the rest
    /// are pending until probed.
    pub fn load_playlist(&mut self, playlist: impl Into<Arc<Playlist>>) {
        let playlist = playlist.into();

        self.unload_sound();
        self.generation += 1;
        self.durations = playlist
            .entries
            .iter()
            .map(|entry| {
                entry
                    .known_duration()
                    .map_or(TrackDuration::Pending, TrackDuration::Known)
            })
            .collect();
        self.index = (!playlist.is_empty()).then_some(0);
        self.playing = false;
        self.elapsed = Duration::ZERO;
        self.playlist = playlist;

        info!(
            generation = self.generation,
            length = self.playlist.len(),
            title = %self.playlist.title(),
            "Loaded playlist"
        );

        self.pending_events.push(PlaybackEvent::PlaylistLoaded {
            generation: self.generation,
            length: self.playlist.len(),
            title: self.playlist.title().to_string(),
        });
        self.pending_events.push(PlaybackEvent::StateChanged {
            status: self.status(),
        });

        if let Some(index) = self.index {
            self.pending_events.push(PlaybackEvent::TrackChanged {
                index,
                track_id: self.playlist.get(index).and_then(PlaylistEntry::id),
                previous_index: None,
            });

            if self.engine_initialized {
                self.load_current_sound();
            }
        }
    }

    /// Remember the default "all songs" collection
    ///
    /// Loaded right away when nothing else has been loaded yet.
    pub fn set_default_collection(&mut self, playlist: impl Into<Arc<Playlist>>) {
        let playlist = playlist.into();
        self.default_collection = Some(Arc::clone(&playlist));

        if self.playlist.is_empty() {
            self.load_playlist(playlist);
        }
    }

    /// Reload the default collection
    ///
    /// No-op when no default collection has been set.
    pub fn reset_to_all_songs(&mut self) {
        match self.default_collection.clone() {
            Some(playlist) => self.load_playlist(playlist),
            None => debug!("No default collection to reset to"),
        }
    }

    // ===== Selection =====

    /// Make `index` the current track, optionally replacing the playlist first
    ///
    /// The index is validated against the playlist it will address before
    /// anything changes. Does not touch the playing flag.
    pub fn select_index(&mut self, index: usize, playlist: Option<Arc<Playlist>>) -> Result<()> {
        let len = playlist
            .as_ref()
            .map_or_else(|| self.playlist.len(), |playlist| playlist.len());
        if index >= len {
            return Err(PlaybackError::IndexOutOfBounds { index, len });
        }

        if let Some(playlist) = playlist {
            self.load_playlist(playlist);
        }

        if self.index != Some(index) {
            self.change_track(index);
        }

        Ok(())
    }

    /// Select a track and start playing it
    pub fn select_track(&mut self, index: usize, playlist: Option<Arc<Playlist>>) -> Result<()> {
        self.select_index(index, playlist)?;
        self.play();
        Ok(())
    }

    /// Move to the next track, wrapping to the first
    ///
    /// Manual navigation ignores the repeat flag. No-op on an empty playlist.
    pub fn next(&mut self) {
        let len = self.playlist.len();
        if let Some(index) = self.index {
            self.change_track((index + 1) % len);
        }
    }

    /// Move to the previous track, wrapping to the last
    pub fn previous(&mut self) {
        let len = self.playlist.len();
        if let Some(index) = self.index {
            self.change_track((index + len - 1) % len);
        }
    }

    /// Natural end of the current track
    ///
    /// Advances and keeps playing unless this was the last track with repeat
    /// off, in which case playback stops on the last track, rewound to 0.
    pub fn track_ended(&mut self) {
        let Some(index) = self.index else {
            return;
        };

        if index + 1 < self.playlist.len() {
            self.change_track(index + 1);
            self.set_playing(true);
        } else if self.repeat {
            debug!("End of playlist, repeating");
            self.change_track(0);
            self.set_playing(true);
        } else {
            debug!("End of playlist, stopping");
            self.set_playing(false);
            // Rewind so the next play starts the last track over
            self.seek(0.0);
        }
    }

    // ===== Transport =====

    /// Start playback of the current track
    ///
    /// Initializes the engine on first use. If initialization fails the error
    /// is logged and playback stays paused.
    pub fn play(&mut self) {
        if self.index.is_none() {
            return;
        }
        if !self.ensure_engine() {
            return;
        }
        if self.sound.is_none() {
            self.load_current_sound();
        }

        self.set_playing(true);
    }

    /// Pause playback, keeping the position
    pub fn pause(&mut self) {
        self.set_playing(false);
    }

    /// Flip between playing and paused
    pub fn toggle_play_pause(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Set the volume (passed to the engine as given)
    pub fn set_volume(&mut self, level: u8) {
        self.volume = level;
        if let Some(sound) = self.sound {
            self.engine.set_volume(sound.handle, level);
        }
        self.pending_events
            .push(PlaybackEvent::VolumeChanged { level });
    }

    /// Seek within the current track (passed to the engine as given)
    pub fn seek(&mut self, seconds: f64) {
        if self.index.is_none() {
            return;
        }
        self.elapsed = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO);
        if let Some(sound) = self.sound {
            self.engine.seek(sound.handle, seconds);
        }
    }

    /// Flip the repeat flag (only affects the end of the last track)
    pub fn toggle_repeat(&mut self) {
        self.repeat = !self.repeat;
        self.pending_events.push(PlaybackEvent::RepeatChanged {
            enabled: self.repeat,
        });
    }

    // ===== Engine =====

    /// Apply an event reported by the engine
    ///
    /// Events for any sound other than the current one are discarded.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        let Some(sound) = self.sound.filter(|sound| sound.handle == event.handle) else {
            debug!(
                generation = event.handle.generation,
                serial = event.handle.serial,
                "Discarding engine event for stale sound"
            );
            return;
        };

        match event.kind {
            EngineEventKind::Loaded { duration } => {
                self.sound = Some(CurrentSound {
                    loaded: true,
                    ..sound
                });
                self.resolve_duration(sound.index, Some(duration));

                if self.playing {
                    self.engine.play(sound.handle);
                }
            }
            EngineEventKind::Ended => self.track_ended(),
            EngineEventKind::Failed { message } => {
                warn!(index = sound.index, error = %message, "Audio engine failed to play track");
                self.pending_events.push(PlaybackEvent::Error { message });
            }
        }
    }

    /// Refresh elapsed time from the engine position
    pub fn update_elapsed(&mut self) -> Duration {
        if let Some(sound) = self.sound.filter(|sound| sound.loaded) {
            if let Some(position) = self.engine.position(sound.handle) {
                self.elapsed = position;
            }
        }
        self.elapsed
    }

    // ===== Duration probing =====

    /// Entries of the active playlist whose duration is not known yet
    pub fn probe_request(&self) -> ProbeRequest {
        let targets = self
            .durations
            .iter()
            .enumerate()
            .filter(|(_, duration)| !duration.is_known())
            .filter_map(|(index, _)| {
                self.playlist.get(index).map(|entry| ProbeTarget {
                    index,
                    url: entry.audio_url().map(str::to_string),
                })
            })
            .collect();

        ProbeRequest {
            generation: self.generation,
            targets,
        }
    }

    /// Record a probe result
    ///
    /// Returns `false` when the outcome was discarded: it belongs to an older
    /// playlist load, addresses no entry, or the duration is already known.
    pub fn apply_probe_outcome(&mut self, outcome: ProbeOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                outcome_generation = outcome.generation,
                generation = self.generation,
                "Discarding stale probe outcome"
            );
            return false;
        }

        self.resolve_duration(outcome.index, outcome.duration)
    }

    // ===== Queries =====

    pub fn status(&self) -> PlaybackStatus {
        if self.index.is_none() {
            PlaybackStatus::Empty
        } else if self.playing {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Paused
        }
    }

    pub fn current_track(&self) -> Option<&PlaylistEntry> {
        self.index.and_then(|index| self.playlist.get(index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    pub fn playlist(&self) -> &Arc<Playlist> {
        &self.playlist
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn durations(&self) -> &[TrackDuration] {
        &self.durations
    }

    /// Read-only copy of the whole state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            generation: self.generation,
            playlist: Arc::clone(&self.playlist),
            index: self.index,
            status: self.status(),
            elapsed: self.elapsed,
            volume: self.volume,
            repeat: self.repeat,
            durations: self.durations.clone(),
        }
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internal =====

    fn change_track(&mut self, index: usize) {
        let previous_index = self.index;

        self.unload_sound();
        self.index = Some(index);
        self.elapsed = Duration::ZERO;

        if self.engine_initialized {
            self.load_current_sound();
        }

        self.pending_events.push(PlaybackEvent::TrackChanged {
            index,
            track_id: self.playlist.get(index).and_then(PlaylistEntry::id),
            previous_index,
        });
    }

    fn set_playing(&mut self, playing: bool) {
        if let Some(sound) = self.sound.filter(|sound| sound.loaded) {
            if playing {
                self.engine.play(sound.handle);
            } else {
                self.engine.pause(sound.handle);
            }
        }

        if self.playing != playing {
            self.playing = playing;
            self.pending_events.push(PlaybackEvent::StateChanged {
                status: self.status(),
            });
        }
    }

    fn ensure_engine(&mut self) -> bool {
        if self.engine_initialized {
            return true;
        }

        match self.engine.initialize() {
            Ok(()) => {
                info!("Audio engine initialized");
                self.engine_initialized = true;
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to initialize audio engine");
                self.pending_events.push(PlaybackEvent::Error {
                    message: e.to_string(),
                });
                false
            }
        }
    }

    fn load_current_sound(&mut self) {
        let Some(index) = self.index else {
            return;
        };
        let Some(url) = self
            .playlist
            .get(index)
            .and_then(PlaylistEntry::audio_url)
            .map(str::to_string)
        else {
            warn!(index, "Track has no audio source, not loading");
            self.pending_events.push(PlaybackEvent::Error {
                message: format!("Track {} has no audio source", index + 1),
            });
            return;
        };

        self.next_serial += 1;
        let handle = SoundHandle {
            generation: self.generation,
            serial: self.next_serial,
        };

        debug!(index, url = %url, serial = handle.serial, "Loading sound");
        match self.engine.load(handle, &url) {
            Ok(()) => {
                self.engine.set_volume(handle, self.volume);
                self.sound = Some(CurrentSound {
                    handle,
                    index,
                    loaded: false,
                });
            }
            Err(e) => {
                warn!(index, url = %url, error = %e, "Audio engine rejected track");
                self.pending_events.push(PlaybackEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    fn unload_sound(&mut self) {
        if let Some(sound) = self.sound.take() {
            self.engine.unload(sound.handle);
        }
    }

    fn resolve_duration(&mut self, index: usize, duration: Option<Duration>) -> bool {
        let Some(slot) = self.durations.get_mut(index) else {
            return false;
        };
        if slot.is_known() {
            return false;
        }

        *slot = duration.map_or(TrackDuration::Unknown, TrackDuration::Known);
        self.pending_events
            .push(PlaybackEvent::DurationResolved { index, duration });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{Track, TrackId};

    /// Engine that accepts everything and records nothing
    struct NullEngine;

    impl AudioEngine for NullEngine {
        fn initialize(&mut self) -> Result<()> {
            Ok(())
        }
        fn load(&mut self, _handle: SoundHandle, _url: &str) -> Result<()> {
            Ok(())
        }
        fn unload(&mut self, _handle: SoundHandle) {}
        fn play(&mut self, _handle: SoundHandle) {}
        fn pause(&mut self, _handle: SoundHandle) {}
        fn seek(&mut self, _handle: SoundHandle, _seconds: f64) {}
        fn set_volume(&mut self, _handle: SoundHandle, _level: u8) {}
        fn position(&self, _handle: SoundHandle) -> Option<Duration> {
            None
        }
    }

    fn playlist(len: i64) -> Playlist {
        Playlist::adhoc(
            (1..=len)
                .map(|id| {
                    Track::new(
                        TrackId::new(id),
                        format!("Song {}", id),
                        "Artist",
                        format!("http://cms/uploads/{}.mp3", id),
                    )
                    .into()
                })
                .collect(),
        )
    }

    fn coordinator() -> PlaybackCoordinator {
        PlaybackCoordinator::new(Box::new(NullEngine), PlaybackConfig::default())
    }

    #[test]
    fn starts_empty() {
        let coordinator = coordinator();
        assert_eq!(coordinator.status(), PlaybackStatus::Empty);
        assert_eq!(coordinator.volume(), 100);
        assert!(coordinator.current_track().is_none());
    }

    #[test]
    fn load_resets_index_and_pauses() {
        let mut coordinator = coordinator();
        coordinator.load_playlist(playlist(3));
        coordinator.select_track(2, None).unwrap();
        assert!(coordinator.is_playing());

        coordinator.load_playlist(playlist(2));
        assert_eq!(coordinator.current_index(), Some(0));
        assert_eq!(coordinator.status(), PlaybackStatus::Paused);
        assert_eq!(coordinator.generation(), 2);
    }

    #[test]
    fn out_of_range_selection_leaves_state_untouched() {
        let mut coordinator = coordinator();
        coordinator.load_playlist(playlist(2));
        let before = coordinator.snapshot();

        let result = coordinator.select_track(5, Some(Arc::new(playlist(3))));
        assert!(matches!(
            result,
            Err(PlaybackError::IndexOutOfBounds { index: 5, len: 3 })
        ));
        assert_eq!(coordinator.snapshot(), before);
    }

    #[test]
    fn select_index_does_not_start_playback() {
        let mut coordinator = coordinator();
        coordinator.load_playlist(playlist(3));
        coordinator.select_index(1, None).unwrap();
        assert_eq!(coordinator.current_index(), Some(1));
        assert!(!coordinator.is_playing());
    }

    #[test]
    fn repeat_toggles() {
        let mut coordinator = coordinator();
        coordinator.toggle_repeat();
        assert!(coordinator.repeat());
        coordinator.toggle_repeat();
        assert!(!coordinator.repeat());
        assert_eq!(
            coordinator.drain_events(),
            vec![
                PlaybackEvent::RepeatChanged { enabled: true },
                PlaybackEvent::RepeatChanged { enabled: false },
            ]
        );
    }

    #[test]
    fn known_durations_are_not_requested() {
        let mut coordinator = coordinator();
        let mut list = playlist(2);
        if let PlaylistEntry::Track(track) = &mut list.entries[0] {
            track.duration = Some(Duration::from_secs(200));
        }
        coordinator.load_playlist(list);

        let request = coordinator.probe_request();
        assert_eq!(request.generation, 1);
        assert_eq!(request.targets.len(), 1);
        assert_eq!(request.targets[0].index, 1);
    }
}
