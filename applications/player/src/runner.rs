//! Session runner
//!
//! Wires a [`PlaylistSource`] to a running [`PlaybackSession`] and drives it
//! the way a front end would: load a collection, wait for probed durations,
//! play through.

use crate::config::PlayerConfig;
use crate::engine::HeadlessEngine;
use crate::error::Result;
use crate::probe::HttpDurationProbe;
use cadence_cms_client::{CmsClient, PlaylistSource};
use cadence_core::{format_duration, AlbumId, AuthorId, Playlist, PlaylistId};
use cadence_playback::{
    DurationProbe, DurationProber, EngineEvent, PlaybackCoordinator, PlaybackError,
    PlaybackEvent, PlaybackSession, PlaybackSnapshot, PlaybackStatus, SessionConfig,
    SessionHandle, TrackDuration,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct Player {
    source: Arc<dyn PlaylistSource>,
    session: SessionHandle,
    task: JoinHandle<()>,
}

impl Player {
    /// Build the CMS client, headless engine and session from configuration
    ///
    /// Must be called inside a tokio runtime.
    pub fn from_config(config: &PlayerConfig) -> Result<Self> {
        let client = CmsClient::new(config.client_config())?;
        let probe: Arc<dyn DurationProbe> = Arc::new(HttpDurationProbe::default());

        let (engine_tx, engine_rx) = mpsc::unbounded_channel();
        let engine = HeadlessEngine::new(Arc::clone(&probe), engine_tx);
        let coordinator = PlaybackCoordinator::new(Box::new(engine), config.playback_config());
        let prober = DurationProber::new(probe, config.probe_config());

        info!(cms = %client.url(), "Player configured");
        Ok(Self::start(
            Arc::new(client),
            coordinator,
            Some(prober),
            engine_rx,
        ))
    }

    /// Spawn a session around an existing coordinator
    pub fn start(
        source: Arc<dyn PlaylistSource>,
        coordinator: PlaybackCoordinator,
        prober: Option<DurationProber>,
        engine_events: mpsc::UnboundedReceiver<EngineEvent>,
    ) -> Self {
        let (session, task) = PlaybackSession::spawn(
            coordinator,
            prober,
            engine_events,
            SessionConfig::default(),
        );
        Self {
            source,
            session,
            task,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Fetch every song and make it the current (and default) collection
    pub async fn load_all_songs(&self) -> Result<PlaybackSnapshot> {
        let playlist = Arc::new(self.source.all_songs().await?);
        let before = self.session.snapshot();

        self.session
            .set_default_collection(Arc::clone(&playlist))
            .await?;
        // The default collection only loads itself into an empty player
        if !before.playlist.is_empty() {
            self.session.reset_to_all_songs().await?;
        }

        self.wait_for_load(before.generation).await
    }

    /// Fetch a named playlist and load it
    pub async fn load_playlist(&self, id: PlaylistId) -> Result<PlaybackSnapshot> {
        let playlist = self.source.playlist(id).await?;
        self.replace_playlist(playlist).await
    }

    /// Fetch an album and load it
    pub async fn load_album(&self, id: AlbumId) -> Result<PlaybackSnapshot> {
        let playlist = self.source.album(id).await?;
        self.replace_playlist(playlist).await
    }

    /// Fetch every song on an author's albums and load them
    pub async fn load_artist(&self, id: AuthorId) -> Result<PlaybackSnapshot> {
        let playlist = self.source.artist(id).await?;
        self.replace_playlist(playlist).await
    }

    async fn replace_playlist(&self, playlist: Playlist) -> Result<PlaybackSnapshot> {
        let before = self.session.snapshot().generation;
        self.session.load_playlist(playlist).await?;
        self.wait_for_load(before).await
    }

    async fn wait_for_load(&self, previous_generation: u64) -> Result<PlaybackSnapshot> {
        let mut snapshots = self.session.watch();
        let snapshot = snapshots
            .wait_for(|snapshot| snapshot.generation > previous_generation)
            .await
            .map_err(|_| PlaybackError::SessionClosed)?;
        Ok((*snapshot).clone())
    }

    /// Wait until no duration is pending, or `limit` elapses
    pub async fn wait_for_durations(&self, limit: Duration) -> PlaybackSnapshot {
        let mut snapshots = self.session.watch();
        let settled = tokio::time::timeout(
            limit,
            snapshots.wait_for(|snapshot| !snapshot.durations.contains(&TrackDuration::Pending)),
        )
        .await;

        match settled {
            Ok(Ok(snapshot)) => (*snapshot).clone(),
            Ok(Err(_)) => self.session.snapshot(),
            Err(_) => {
                debug!(limit = ?limit, "Gave up waiting for durations");
                self.session.snapshot()
            }
        }
    }

    /// Play from `index` until playback stops on its own, fails, or `until`
    /// resolves
    pub async fn play_through(
        &self,
        index: usize,
        until: impl Future<Output = ()>,
    ) -> Result<PlaybackSnapshot> {
        let mut events = self.session.subscribe();
        self.session.select_track(index, None).await?;
        tokio::pin!(until);

        loop {
            tokio::select! {
                () = &mut until => {
                    info!("Playback interrupted");
                    break;
                }
                event = events.recv() => match event {
                    Ok(PlaybackEvent::StateChanged { status: PlaybackStatus::Paused }) => {
                        info!("Reached the end of the playlist");
                        break;
                    }
                    // No retry or skip: an unplayable track ends the run
                    Ok(PlaybackEvent::Error { message }) => {
                        warn!(message = %message, "Playback stopped on error");
                        break;
                    }
                    Ok(event) => self.log_event(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Playback events lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        Ok(self.session.snapshot())
    }

    fn log_event(&self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::TrackChanged { index, .. } => {
                let snapshot = self.session.snapshot();
                if let Some(entry) = snapshot.playlist.get(*index) {
                    info!(
                        index,
                        title = %entry.title(),
                        artist = %entry.artist(),
                        duration = %format_duration(snapshot.duration_of(*index)),
                        "Now playing"
                    );
                }
            }
            PlaybackEvent::Error { message } => warn!(message = %message, "Playback error"),
            other => debug!(event = ?other, "Playback event"),
        }
    }

    /// Stop the session and wait for its task
    pub async fn shutdown(self) -> Result<()> {
        self.session.shutdown().await?;
        if let Err(e) = self.task.await {
            warn!(error = %e, "Playback session task failed");
        }
        Ok(())
    }
}

/// One line per entry: position marker, number, title, artist, duration
pub fn render_listing(snapshot: &PlaybackSnapshot) -> Vec<String> {
    snapshot
        .playlist
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let marker = if snapshot.index == Some(index) { '>' } else { ' ' };
            let mut line = format!(
                "{} {:>3}. {} - {} [{}]",
                marker,
                index + 1,
                entry.title(),
                entry.artist(),
                format_duration(snapshot.duration_of(index))
            );
            if entry.is_placeholder() {
                line.push_str(" (unavailable)");
            }
            line
        })
        .collect()
}
