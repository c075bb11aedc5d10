//! Headless audio engine
//!
//! Produces no sound. Each loaded source is measured with a
//! [`DurationProbe`] and then played back against the tokio clock, so the
//! session sees the same `Loaded` / `Ended` lifecycle a real output would
//! produce.

use cadence_playback::{AudioEngine, DurationProbe, EngineEvent, Result, SoundHandle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct Sound {
    /// Known once loading finished
    length: Option<Duration>,
    /// Position accumulated before the current run
    offset: Duration,
    /// Set while playing
    started: Option<Instant>,
    /// Fires `Ended` at the end of the current run
    end_timer: Option<JoinHandle<()>>,
    loader: Option<JoinHandle<()>>,
}

impl Sound {
    fn position(&self) -> Duration {
        let running = self
            .started
            .map_or(Duration::ZERO, |started| started.elapsed());
        let position = self.offset + running;
        self.length.map_or(position, |length| position.min(length))
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.end_timer.take() {
            timer.abort();
        }
    }
}

type Sounds = Arc<Mutex<HashMap<SoundHandle, Sound>>>;

/// [`AudioEngine`] that simulates playback
///
/// Must be driven from inside a tokio runtime: loading and end-of-track
/// timers run as spawned tasks.
pub struct HeadlessEngine {
    probe: Arc<dyn DurationProbe>,
    events: mpsc::UnboundedSender<EngineEvent>,
    sounds: Sounds,
    initialized: bool,
}

impl HeadlessEngine {
    pub fn new(probe: Arc<dyn DurationProbe>, events: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self {
            probe,
            events,
            sounds: Arc::new(Mutex::new(HashMap::new())),
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn sounds(&self) -> MutexGuard<'_, HashMap<SoundHandle, Sound>> {
        lock(&self.sounds)
    }

    fn arm_end_timer(&self, handle: SoundHandle, sound: &mut Sound) {
        sound.stop_timer();
        let Some(length) = sound.length else {
            return;
        };

        let remaining = length.saturating_sub(sound.offset);
        let sounds = Arc::clone(&self.sounds);
        let events = self.events.clone();
        sound.end_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            {
                let mut sounds = lock(&sounds);
                let Some(sound) = sounds.get_mut(&handle) else {
                    return;
                };
                // Re-armed by a seek or play that won the lock
                if sound.position() < length {
                    return;
                }
                // Stopped and rewound, the next play starts over
                sound.offset = Duration::ZERO;
                sound.started = None;
                sound.end_timer = None;
            }
            let _ = events.send(EngineEvent::ended(handle));
        }));
    }
}

fn lock(sounds: &Sounds) -> MutexGuard<'_, HashMap<SoundHandle, Sound>> {
    sounds
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl AudioEngine for HeadlessEngine {
    fn initialize(&mut self) -> Result<()> {
        self.initialized = true;
        info!("Headless output ready");
        Ok(())
    }

    fn load(&mut self, handle: SoundHandle, url: &str) -> Result<()> {
        debug!(?handle, url = %url, "Loading sound");

        self.sounds().insert(handle, Sound::default());

        let probe = Arc::clone(&self.probe);
        let sounds = Arc::clone(&self.sounds);
        let events = self.events.clone();
        let url = url.to_string();

        let loader = tokio::spawn(async move {
            let event = match probe.probe(&url).await {
                Ok(length) => {
                    let mut sounds = lock(&sounds);
                    let Some(sound) = sounds.get_mut(&handle) else {
                        return;
                    };
                    sound.length = Some(length);
                    EngineEvent::loaded(handle, length)
                }
                Err(e) => {
                    warn!(?handle, url = %url, error = %e, "Failed to load sound");
                    EngineEvent::failed(handle, e.to_string())
                }
            };
            let _ = events.send(event);
        });

        if let Some(sound) = self.sounds().get_mut(&handle) {
            sound.loader = Some(loader);
        }
        Ok(())
    }

    fn unload(&mut self, handle: SoundHandle) {
        if let Some(mut sound) = self.sounds().remove(&handle) {
            sound.stop_timer();
            if let Some(loader) = sound.loader.take() {
                loader.abort();
            }
            debug!(?handle, "Unloaded sound");
        }
    }

    fn play(&mut self, handle: SoundHandle) {
        let mut sounds = lock(&self.sounds);
        let Some(sound) = sounds.get_mut(&handle) else {
            return;
        };
        if sound.started.is_some() {
            return;
        }

        sound.started = Some(Instant::now());
        self.arm_end_timer(handle, sound);
        debug!(?handle, position = ?sound.offset, "Playing");
    }

    fn pause(&mut self, handle: SoundHandle) {
        let mut sounds = self.sounds();
        let Some(sound) = sounds.get_mut(&handle) else {
            return;
        };

        sound.offset = sound.position();
        sound.started = None;
        sound.stop_timer();
        debug!(?handle, position = ?sound.offset, "Paused");
    }

    fn seek(&mut self, handle: SoundHandle, seconds: f64) {
        let mut sounds = lock(&self.sounds);
        let Some(sound) = sounds.get_mut(&handle) else {
            return;
        };

        let target = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO);
        sound.offset = sound.length.map_or(target, |length| target.min(length));
        if sound.started.is_some() {
            sound.started = Some(Instant::now());
            self.arm_end_timer(handle, sound);
        }
        debug!(?handle, position = ?sound.offset, "Seeked");
    }

    fn set_volume(&mut self, handle: SoundHandle, level: u8) {
        debug!(?handle, level, "Volume set");
    }

    fn position(&self, handle: SoundHandle) -> Option<Duration> {
        self.sounds().get(&handle).map(Sound::position)
    }
}

impl Drop for HeadlessEngine {
    fn drop(&mut self) {
        for (_, mut sound) in self.sounds().drain() {
            sound.stop_timer();
            if let Some(loader) = sound.loader.take() {
                loader.abort();
            }
        }
    }
}
