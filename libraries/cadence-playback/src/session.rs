//! Playback session actor
//!
//! Runs a [`PlaybackCoordinator`] on its own task. UI layers talk to it
//! through a cloneable [`SessionHandle`]: commands go in over an mpsc
//! channel, state comes out as [`PlaybackSnapshot`]s on a watch channel and
//! [`PlaybackEvent`]s on a broadcast channel.

use crate::{
    coordinator::PlaybackCoordinator,
    engine::EngineEvent,
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    probe::{DurationProber, ProbeOutcome, ProbeTask},
    types::PlaybackSnapshot,
};
use cadence_core::Playlist;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Session tuning
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How often elapsed time is refreshed while playing (default: 1s)
    pub elapsed_tick: Duration,

    /// Command channel capacity (default: 32)
    pub command_buffer: usize,

    /// Event broadcast capacity (default: 64)
    pub event_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            elapsed_tick: Duration::from_secs(1),
            command_buffer: 32,
            event_buffer: 64,
        }
    }
}

type PendingReply = (oneshot::Sender<Result<()>>, Result<()>);

/// Commands accepted by the session
#[derive(Debug)]
pub enum SessionCommand {
    LoadPlaylist(Arc<Playlist>),
    SetDefaultCollection(Arc<Playlist>),
    ResetToAllSongs,
    SelectTrack {
        index: usize,
        playlist: Option<Arc<Playlist>>,
        reply: oneshot::Sender<Result<()>>,
    },
    SelectIndex {
        index: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    Play,
    Pause,
    TogglePlayPause,
    Next,
    Previous,
    ToggleRepeat,
    SetVolume(u8),
    Seek(f64),
    Shutdown,
}

/// Task owning the coordinator
pub struct PlaybackSession {
    coordinator: PlaybackCoordinator,
    prober: Option<DurationProber>,
    probe_task: Option<ProbeTask>,
    probed_generation: u64,
    probe_tx: mpsc::UnboundedSender<ProbeOutcome>,
    probe_rx: mpsc::UnboundedReceiver<ProbeOutcome>,
    commands: mpsc::Receiver<SessionCommand>,
    engine_events: mpsc::UnboundedReceiver<EngineEvent>,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
    event_tx: broadcast::Sender<PlaybackEvent>,
    config: SessionConfig,
}

impl PlaybackSession {
    /// Start the session task
    ///
    /// `engine_events` is the receiving end of whatever channel the audio
    /// engine reports into. Without a prober, durations stay pending.
    pub fn spawn(
        coordinator: PlaybackCoordinator,
        prober: Option<DurationProber>,
        engine_events: mpsc::UnboundedReceiver<EngineEvent>,
        config: SessionConfig,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (command_tx, commands) = mpsc::channel(config.command_buffer.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(coordinator.snapshot());
        let (event_tx, _) = broadcast::channel(config.event_buffer.max(1));
        let (probe_tx, probe_rx) = mpsc::unbounded_channel();

        let handle = SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            events: event_tx.clone(),
        };

        let session = Self {
            coordinator,
            prober,
            probe_task: None,
            probed_generation: 0,
            probe_tx,
            probe_rx,
            commands,
            engine_events,
            snapshot_tx,
            event_tx,
            config,
        };

        (handle, tokio::spawn(session.run()))
    }

    async fn run(mut self) {
        info!("Playback session started");

        let mut ticker = tokio::time::interval(self.config.elapsed_tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut engine_open = true;

        // A coordinator may arrive with a playlist already loaded
        self.after_update();

        loop {
            let mut reply = None;

            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(SessionCommand::Shutdown) | None => break,
                        Some(command) => reply = self.handle_command(command),
                    }
                }
                event = self.engine_events.recv(), if engine_open => {
                    match event {
                        Some(event) => self.coordinator.handle_engine_event(event),
                        None => {
                            debug!("Engine event channel closed");
                            engine_open = false;
                        }
                    }
                }
                Some(outcome) = self.probe_rx.recv() => {
                    self.coordinator.apply_probe_outcome(outcome);
                }
                _ = ticker.tick() => {
                    if self.coordinator.is_playing() {
                        self.coordinator.update_elapsed();
                    }
                }
            }

            self.after_update();

            // Reply only once the resulting state is published
            if let Some((tx, result)) = reply {
                let _ = tx.send(result);
            }
        }

        self.probe_task = None;
        info!("Playback session stopped");
    }

    fn handle_command(&mut self, command: SessionCommand) -> Option<PendingReply> {
        let coordinator = &mut self.coordinator;
        match command {
            SessionCommand::LoadPlaylist(playlist) => coordinator.load_playlist(playlist),
            SessionCommand::SetDefaultCollection(playlist) => {
                coordinator.set_default_collection(playlist);
            }
            SessionCommand::ResetToAllSongs => coordinator.reset_to_all_songs(),
            SessionCommand::SelectTrack {
                index,
                playlist,
                reply,
            } => return Some((reply, coordinator.select_track(index, playlist))),
            SessionCommand::SelectIndex { index, reply } => {
                return Some((reply, coordinator.select_index(index, None)));
            }
            SessionCommand::Play => coordinator.play(),
            SessionCommand::Pause => coordinator.pause(),
            SessionCommand::TogglePlayPause => coordinator.toggle_play_pause(),
            SessionCommand::Next => coordinator.next(),
            SessionCommand::Previous => coordinator.previous(),
            SessionCommand::ToggleRepeat => coordinator.toggle_repeat(),
            SessionCommand::SetVolume(level) => coordinator.set_volume(level),
            SessionCommand::Seek(seconds) => coordinator.seek(seconds),
            SessionCommand::Shutdown => {}
        }
        None
    }

    /// Restart probing on a new generation, then publish state and events
    fn after_update(&mut self) {
        let generation = self.coordinator.generation();

        if generation != self.probed_generation {
            self.probed_generation = generation;
            // Dropping the previous task cancels it
            self.probe_task = None;
            if let Some(prober) = &self.prober {
                let request = self.coordinator.probe_request();
                if !request.is_empty() {
                    self.probe_task = Some(prober.spawn(request, self.probe_tx.clone()));
                }
            }
        }

        let snapshot = self.coordinator.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });

        for event in self.coordinator.drain_events() {
            // No subscribers is fine
            let _ = self.event_tx.send(event);
        }
    }
}

/// Cloneable front end of a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl SessionHandle {
    /// Latest published state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch state changes
    pub fn watch(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }

    /// Subscribe to playback events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    pub async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands.send(command).await.map_err(|_| {
            warn!("Playback session is closed");
            PlaybackError::SessionClosed
        })
    }

    pub async fn load_playlist(&self, playlist: impl Into<Arc<Playlist>>) -> Result<()> {
        self.send(SessionCommand::LoadPlaylist(playlist.into())).await
    }

    pub async fn set_default_collection(&self, playlist: impl Into<Arc<Playlist>>) -> Result<()> {
        self.send(SessionCommand::SetDefaultCollection(playlist.into()))
            .await
    }

    pub async fn reset_to_all_songs(&self) -> Result<()> {
        self.send(SessionCommand::ResetToAllSongs).await
    }

    /// Select a track (optionally in a new playlist) and start playing it
    pub async fn select_track(&self, index: usize, playlist: Option<Arc<Playlist>>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::SelectTrack {
            index,
            playlist,
            reply,
        })
        .await?;
        rx.await.map_err(|_| PlaybackError::SessionClosed)?
    }

    /// Select a track in the current playlist without starting playback
    pub async fn select_index(&self, index: usize) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::SelectIndex { index, reply })
            .await?;
        rx.await.map_err(|_| PlaybackError::SessionClosed)?
    }

    pub async fn play(&self) -> Result<()> {
        self.send(SessionCommand::Play).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(SessionCommand::Pause).await
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.send(SessionCommand::TogglePlayPause).await
    }

    pub async fn next(&self) -> Result<()> {
        self.send(SessionCommand::Next).await
    }

    pub async fn previous(&self) -> Result<()> {
        self.send(SessionCommand::Previous).await
    }

    pub async fn toggle_repeat(&self) -> Result<()> {
        self.send(SessionCommand::ToggleRepeat).await
    }

    pub async fn set_volume(&self, level: u8) -> Result<()> {
        self.send(SessionCommand::SetVolume(level)).await
    }

    pub async fn seek(&self, seconds: f64) -> Result<()> {
        self.send(SessionCommand::Seek(seconds)).await
    }

    /// Stop the session task
    pub async fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown).await
    }
}
