//! End-to-end tests for the playback coordinator
//!
//! Drives the coordinator the way a UI would, with a recording engine standing
//! in for real audio output.

use cadence_core::{
    PlaceholderTrack, Playlist, PlaylistEntry, RawTrack, Track, TrackId, UNKNOWN_ARTIST,
};
use cadence_playback::{
    AudioEngine, EngineEvent, PlaybackConfig, PlaybackCoordinator, PlaybackError, PlaybackEvent,
    PlaybackStatus, ProbeOutcome, Result, SoundHandle, TrackDuration,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ===== Test Helpers =====

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Initialize,
    Load(SoundHandle, String),
    Unload(SoundHandle),
    Play(SoundHandle),
    Pause(SoundHandle),
    Seek(SoundHandle, f64),
    SetVolume(SoundHandle, u8),
}

/// Engine that records every call
#[derive(Clone, Default)]
struct RecordingEngine {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_initialize: bool,
    position: Option<Duration>,
}

impl RecordingEngine {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn last_loaded(&self) -> Option<(SoundHandle, String)> {
        self.calls().into_iter().rev().find_map(|call| match call {
            Call::Load(handle, url) => Some((handle, url)),
            _ => None,
        })
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AudioEngine for RecordingEngine {
    fn initialize(&mut self) -> Result<()> {
        self.record(Call::Initialize);
        if self.fail_initialize {
            return Err(PlaybackError::Engine("output device unavailable".into()));
        }
        Ok(())
    }

    fn load(&mut self, handle: SoundHandle, url: &str) -> Result<()> {
        self.record(Call::Load(handle, url.to_string()));
        Ok(())
    }

    fn unload(&mut self, handle: SoundHandle) {
        self.record(Call::Unload(handle));
    }

    fn play(&mut self, handle: SoundHandle) {
        self.record(Call::Play(handle));
    }

    fn pause(&mut self, handle: SoundHandle) {
        self.record(Call::Pause(handle));
    }

    fn seek(&mut self, handle: SoundHandle, seconds: f64) {
        self.record(Call::Seek(handle, seconds));
    }

    fn set_volume(&mut self, handle: SoundHandle, level: u8) {
        self.record(Call::SetVolume(handle, level));
    }

    fn position(&self, _handle: SoundHandle) -> Option<Duration> {
        self.position
    }
}

fn track(id: i64) -> PlaylistEntry {
    Track::new(
        TrackId::new(id),
        format!("Song {}", id),
        "Artist",
        format!("http://cms/uploads/{}.mp3", id),
    )
    .into()
}

fn playlist(ids: &[i64]) -> Playlist {
    Playlist::adhoc(ids.iter().copied().map(track).collect())
}

fn coordinator() -> (PlaybackCoordinator, RecordingEngine) {
    let engine = RecordingEngine::default();
    let coordinator = PlaybackCoordinator::new(Box::new(engine.clone()), PlaybackConfig::default());
    (coordinator, engine)
}

/// Coordinator with a loaded playlist, playing `index`, sound reported loaded
fn playing(ids: &[i64], index: usize) -> (PlaybackCoordinator, RecordingEngine) {
    let (mut coordinator, engine) = coordinator();
    coordinator.load_playlist(playlist(ids));
    coordinator.select_track(index, None).unwrap();
    let (handle, _) = engine.last_loaded().unwrap();
    coordinator.handle_engine_event(EngineEvent::loaded(handle, Duration::from_secs(180)));
    coordinator.drain_events();
    (coordinator, engine)
}

// ===== Scenarios =====

#[test]
fn natural_end_of_first_track_advances_and_keeps_playing() {
    let (mut coordinator, engine) = playing(&[1, 2], 0);
    let (handle, _) = engine.last_loaded().unwrap();

    coordinator.handle_engine_event(EngineEvent::ended(handle));

    assert_eq!(coordinator.current_index(), Some(1));
    assert_eq!(coordinator.status(), PlaybackStatus::Playing);
    assert_eq!(
        coordinator.current_track().and_then(PlaylistEntry::id),
        Some(TrackId::new(2))
    );

    let (next_handle, url) = engine.last_loaded().unwrap();
    assert_ne!(next_handle, handle);
    assert_eq!(url, "http://cms/uploads/2.mp3");
    assert!(engine.calls().contains(&Call::Unload(handle)));
}

#[test]
fn natural_end_of_last_track_without_repeat_stops() {
    let (mut coordinator, engine) = playing(&[1, 2], 1);
    let (handle, _) = engine.last_loaded().unwrap();

    coordinator.handle_engine_event(EngineEvent::ended(handle));

    assert_eq!(coordinator.current_index(), Some(1));
    assert!(!coordinator.is_playing());
    assert_eq!(coordinator.status(), PlaybackStatus::Paused);
    assert_eq!(
        coordinator.drain_events(),
        vec![PlaybackEvent::StateChanged {
            status: PlaybackStatus::Paused
        }]
    );
}

#[test]
fn replay_after_last_track_ended_starts_from_the_top() {
    let (mut coordinator, engine) = playing(&[1, 2], 1);
    let (handle, _) = engine.last_loaded().unwrap();
    engine.clear();

    coordinator.handle_engine_event(EngineEvent::ended(handle));

    assert_eq!(coordinator.elapsed(), Duration::ZERO);
    assert_eq!(
        engine.calls(),
        vec![Call::Pause(handle), Call::Seek(handle, 0.0)]
    );

    coordinator.toggle_play_pause();

    assert_eq!(coordinator.status(), PlaybackStatus::Playing);
    assert_eq!(coordinator.current_index(), Some(1));
    assert_eq!(engine.calls().last(), Some(&Call::Play(handle)));
    assert_eq!(engine.last_loaded().map(|(h, _)| h), Some(handle));
}

#[test]
fn natural_end_of_last_track_with_repeat_wraps() {
    let (mut coordinator, engine) = playing(&[1, 2], 1);
    coordinator.toggle_repeat();
    let (handle, _) = engine.last_loaded().unwrap();

    coordinator.handle_engine_event(EngineEvent::ended(handle));

    assert_eq!(coordinator.current_index(), Some(0));
    assert!(coordinator.is_playing());
}

#[test]
fn empty_playlist_is_inert() {
    let (mut coordinator, engine) = coordinator();
    coordinator.load_playlist(Playlist::empty());

    assert_eq!(coordinator.status(), PlaybackStatus::Empty);

    coordinator.next();
    coordinator.previous();
    coordinator.toggle_play_pause();
    coordinator.play();
    coordinator.track_ended();
    coordinator.seek(10.0);

    assert_eq!(coordinator.status(), PlaybackStatus::Empty);
    assert_eq!(coordinator.current_index(), None);
    assert!(engine.calls().is_empty());
    assert!(matches!(
        coordinator.select_track(0, None),
        Err(PlaybackError::IndexOutOfBounds { index: 0, len: 0 })
    ));
}

#[test]
fn failed_probe_marks_only_that_track_unknown() {
    let (mut coordinator, _engine) = coordinator();
    coordinator.load_playlist(playlist(&[1, 2, 3]));
    let generation = coordinator.generation();

    assert!(coordinator.apply_probe_outcome(ProbeOutcome {
        generation,
        index: 0,
        duration: Some(Duration::from_secs(201)),
    }));
    assert!(coordinator.apply_probe_outcome(ProbeOutcome {
        generation,
        index: 1,
        duration: None,
    }));

    let snapshot = coordinator.snapshot();
    assert_eq!(
        snapshot.durations,
        vec![
            TrackDuration::Known(Duration::from_secs(201)),
            TrackDuration::Unknown,
            TrackDuration::Pending,
        ]
    );
    assert_eq!(
        cadence_core::format_duration(snapshot.duration_of(1)),
        cadence_core::UNKNOWN_DURATION
    );
    assert_eq!(cadence_core::format_duration(snapshot.duration_of(0)), "3:21");
}

// ===== Selection =====

#[test]
fn select_track_with_playlist_replaces_and_plays() {
    let (mut coordinator, engine) = coordinator();
    coordinator.load_playlist(playlist(&[1, 2]));

    let replacement = Arc::new(playlist(&[7, 8, 9]));
    coordinator
        .select_track(2, Some(Arc::clone(&replacement)))
        .unwrap();

    assert_eq!(coordinator.current_index(), Some(2));
    assert_eq!(coordinator.playlist().track_ids(), replacement.track_ids());
    assert!(coordinator.is_playing());
    assert_eq!(engine.calls()[0], Call::Initialize);
    assert_eq!(
        engine.last_loaded().map(|(_, url)| url),
        Some("http://cms/uploads/9.mp3".to_string())
    );
}

#[test]
fn first_play_initializes_engine_once() {
    let (mut coordinator, engine) = coordinator();
    coordinator.load_playlist(playlist(&[1, 2]));
    assert!(engine.calls().is_empty(), "nothing loads before a play gesture");

    coordinator.toggle_play_pause();
    coordinator.toggle_play_pause();
    coordinator.toggle_play_pause();

    let initializations = engine
        .calls()
        .iter()
        .filter(|call| **call == Call::Initialize)
        .count();
    assert_eq!(initializations, 1);
    assert!(coordinator.is_playing());
}

#[test]
fn failed_engine_initialization_stays_paused() {
    let engine = RecordingEngine {
        fail_initialize: true,
        ..Default::default()
    };
    let mut coordinator =
        PlaybackCoordinator::new(Box::new(engine.clone()), PlaybackConfig::default());
    coordinator.load_playlist(playlist(&[1]));
    coordinator.drain_events();

    coordinator.play();

    assert_eq!(coordinator.status(), PlaybackStatus::Paused);
    assert_eq!(engine.calls(), vec![Call::Initialize]);
    assert!(matches!(
        coordinator.drain_events().as_slice(),
        [PlaybackEvent::Error { .. }]
    ));
}

#[test]
fn sound_starts_only_after_engine_reports_loaded() {
    let (mut coordinator, engine) = coordinator();
    coordinator.load_playlist(playlist(&[1]));
    coordinator.play();

    let (handle, _) = engine.last_loaded().unwrap();
    assert!(!engine.calls().contains(&Call::Play(handle)));

    coordinator.handle_engine_event(EngineEvent::loaded(handle, Duration::from_secs(95)));

    assert!(engine.calls().contains(&Call::Play(handle)));
    assert_eq!(
        coordinator.durations()[0],
        TrackDuration::Known(Duration::from_secs(95))
    );
}

// ===== Navigation =====

#[test]
fn manual_navigation_keeps_playing_flag() {
    let (mut coordinator, _engine) = playing(&[1, 2, 3], 0);
    coordinator.next();
    assert!(coordinator.is_playing());

    coordinator.pause();
    coordinator.previous();
    coordinator.previous();
    assert_eq!(coordinator.current_index(), Some(2));
    assert!(!coordinator.is_playing());
}

#[test]
fn track_changed_events_report_previous_index() {
    let (mut coordinator, _engine) = playing(&[1, 2, 3], 0);
    coordinator.previous();

    assert_eq!(
        coordinator.drain_events(),
        vec![PlaybackEvent::TrackChanged {
            index: 2,
            track_id: Some(TrackId::new(3)),
            previous_index: Some(0),
        }]
    );
}

// ===== Engine events =====

#[test]
fn stale_engine_events_are_discarded() {
    let (mut coordinator, engine) = playing(&[1, 2, 3], 0);
    let (old_handle, _) = engine.last_loaded().unwrap();

    coordinator.next();
    coordinator.handle_engine_event(EngineEvent::ended(old_handle));

    assert_eq!(coordinator.current_index(), Some(1));

    // Old playlist load
    coordinator.load_playlist(playlist(&[4, 5]));
    coordinator.handle_engine_event(EngineEvent::failed(old_handle, "404"));
    assert!(!coordinator
        .drain_events()
        .iter()
        .any(|event| matches!(event, PlaybackEvent::Error { .. })));
}

#[test]
fn engine_failure_is_reported_without_changing_state() {
    let (mut coordinator, engine) = playing(&[1, 2], 0);
    let (handle, _) = engine.last_loaded().unwrap();
    let before = coordinator.snapshot();

    coordinator.handle_engine_event(EngineEvent::failed(handle, "decode error"));

    assert_eq!(coordinator.snapshot(), before);
    assert_eq!(
        coordinator.drain_events(),
        vec![PlaybackEvent::Error {
            message: "decode error".to_string()
        }]
    );
}

#[test]
fn placeholder_without_audio_is_not_loaded() {
    let (mut coordinator, engine) = coordinator();
    let placeholder = RawTrack {
        id: Some(9),
        name: Some("Broken".into()),
        ..Default::default()
    }
    .normalize("http://cms");
    assert!(matches!(
        &placeholder,
        PlaylistEntry::Placeholder(PlaceholderTrack { artist, .. }) if artist == UNKNOWN_ARTIST
    ));

    coordinator.load_playlist(Playlist::adhoc(vec![placeholder, track(2)]));
    coordinator.drain_events();
    coordinator.play();

    assert!(coordinator.is_playing());
    assert_eq!(engine.last_loaded(), None);
    assert!(coordinator
        .drain_events()
        .iter()
        .any(|event| matches!(event, PlaybackEvent::Error { message } if message.contains("no audio source"))));

    coordinator.next();
    assert_eq!(
        engine.last_loaded().map(|(_, url)| url),
        Some("http://cms/uploads/2.mp3".to_string())
    );
}

// ===== Volume, seek, elapsed =====

#[test]
fn volume_and_seek_pass_through_unvalidated() {
    let (mut coordinator, engine) = playing(&[1], 0);
    let (handle, _) = engine.last_loaded().unwrap();
    engine.clear();

    coordinator.set_volume(250);
    coordinator.seek(-4.0);
    coordinator.seek(99_999.0);

    assert_eq!(coordinator.volume(), 250);
    assert_eq!(
        engine.calls(),
        vec![
            Call::SetVolume(handle, 250),
            Call::Seek(handle, -4.0),
            Call::Seek(handle, 99_999.0),
        ]
    );
}

#[test]
fn new_sounds_receive_current_volume() {
    let (mut coordinator, engine) = playing(&[1, 2], 0);
    coordinator.set_volume(40);
    coordinator.next();

    let (handle, _) = engine.last_loaded().unwrap();
    assert!(engine.calls().contains(&Call::SetVolume(handle, 40)));
}

#[test]
fn elapsed_follows_engine_position() {
    let engine = RecordingEngine {
        position: Some(Duration::from_secs(42)),
        ..Default::default()
    };
    let mut coordinator =
        PlaybackCoordinator::new(Box::new(engine.clone()), PlaybackConfig::default());
    coordinator.load_playlist(playlist(&[1, 2]));
    coordinator.play();
    assert_eq!(coordinator.update_elapsed(), Duration::ZERO, "not loaded yet");

    let (handle, _) = engine.last_loaded().unwrap();
    coordinator.handle_engine_event(EngineEvent::loaded(handle, Duration::from_secs(100)));
    assert_eq!(coordinator.update_elapsed(), Duration::from_secs(42));

    coordinator.next();
    assert_eq!(coordinator.elapsed(), Duration::ZERO);
}

// ===== Default collection =====

#[test]
fn default_collection_loads_when_empty_and_resets() {
    let (mut coordinator, _engine) = coordinator();
    let all_songs = Arc::new(Playlist::all_songs(vec![track(1), track(2), track(3)]));

    coordinator.set_default_collection(Arc::clone(&all_songs));
    assert_eq!(coordinator.playlist().title(), "All Songs");

    coordinator.load_playlist(playlist(&[8]));
    coordinator.set_default_collection(Arc::clone(&all_songs));
    assert_eq!(coordinator.playlist().len(), 1, "does not replace a loaded playlist");

    coordinator.reset_to_all_songs();
    assert_eq!(coordinator.playlist().len(), 3);
    assert_eq!(coordinator.current_index(), Some(0));
}

// ===== Probing =====

#[test]
fn stale_probe_outcomes_are_discarded() {
    let (mut coordinator, _engine) = coordinator();
    coordinator.load_playlist(playlist(&[1, 2]));
    let old_generation = coordinator.generation();
    coordinator.load_playlist(playlist(&[3, 4]));

    let applied = coordinator.apply_probe_outcome(ProbeOutcome {
        generation: old_generation,
        index: 0,
        duration: Some(Duration::from_secs(10)),
    });

    assert!(!applied);
    assert_eq!(coordinator.durations()[0], TrackDuration::Pending);
}

#[test]
fn known_durations_are_never_overwritten() {
    let (mut coordinator, engine) = playing(&[1, 2], 0);
    let generation = coordinator.generation();
    assert!(engine.last_loaded().is_some());

    // Loaded event in `playing` already cached 180s for index 0
    let applied = coordinator.apply_probe_outcome(ProbeOutcome {
        generation,
        index: 0,
        duration: None,
    });
    assert!(!applied);
    assert_eq!(
        coordinator.durations()[0],
        TrackDuration::Known(Duration::from_secs(180))
    );

    let request = coordinator.probe_request();
    assert_eq!(request.targets.len(), 1);
    assert_eq!(request.targets[0].index, 1);
}
