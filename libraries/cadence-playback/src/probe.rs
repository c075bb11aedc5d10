//! Lazy duration probing
//!
//! Tracks rarely arrive with a duration. After a playlist loads, every entry
//! without one is probed in the background: a bounded number at a time, each
//! with its own timeout. A failed, timed-out or impossible probe resolves to
//! `None` (unknown) and never affects sibling probes.

use crate::error::ProbeError;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Reads the length of an audio resource without playing it
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn probe(&self, url: &str) -> std::result::Result<Duration, ProbeError>;
}

/// Prober limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Probes in flight at once (default: 4)
    pub max_concurrent: usize,

    /// Per-probe deadline (default: 5s)
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            timeout: Duration::from_millis(5000),
        }
    }
}

/// One entry to probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    /// Playlist index
    pub index: usize,

    /// Audio URL (`None` resolves to unknown without probing)
    pub url: Option<String>,
}

/// Everything to probe for one playlist load
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeRequest {
    pub generation: u64,
    pub targets: Vec<ProbeTarget>,
}

impl ProbeRequest {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Result of one probe, tagged with the load generation it was started for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub generation: u64,
    pub index: usize,
    /// `None` means unknown
    pub duration: Option<Duration>,
}

/// Runs probes with bounded concurrency and per-probe timeouts
#[derive(Clone)]
pub struct DurationProber {
    probe: Arc<dyn DurationProbe>,
    config: ProbeConfig,
}

impl DurationProber {
    pub fn new(probe: Arc<dyn DurationProbe>, config: ProbeConfig) -> Self {
        Self { probe, config }
    }

    pub fn config(&self) -> ProbeConfig {
        self.config
    }

    /// Stream outcomes in completion order
    ///
    /// Probes are started in playlist order. The stream ends early, without
    /// yielding anything further, once `cancel` fires.
    pub fn stream(
        &self,
        request: ProbeRequest,
        cancel: CancellationToken,
    ) -> BoxStream<'static, ProbeOutcome> {
        let ProbeRequest {
            generation,
            targets,
        } = request;
        let probe = Arc::clone(&self.probe);
        let timeout = self.config.timeout;

        stream::iter(targets)
            .map(move |target| {
                let probe = Arc::clone(&probe);
                async move {
                    let duration = probe_one(probe.as_ref(), &target, timeout).await;
                    ProbeOutcome {
                        generation,
                        index: target.index,
                        duration,
                    }
                }
            })
            .buffer_unordered(self.config.max_concurrent.max(1))
            .take_until(cancel.cancelled_owned())
            .boxed()
    }

    /// Run a request to completion, outcomes sorted by index
    pub async fn run(&self, request: ProbeRequest, cancel: CancellationToken) -> Vec<ProbeOutcome> {
        let mut outcomes: Vec<ProbeOutcome> = self.stream(request, cancel).collect().await;
        outcomes.sort_by_key(|outcome| outcome.index);
        outcomes
    }

    /// Run a request in the background, sending outcomes as they complete
    ///
    /// The returned task cancels the run when dropped.
    pub fn spawn(&self, request: ProbeRequest, tx: mpsc::UnboundedSender<ProbeOutcome>) -> ProbeTask {
        let cancel = CancellationToken::new();
        let generation = request.generation;
        let count = request.targets.len();
        let mut outcomes = self.stream(request, cancel.clone());

        debug!(generation, count, "Starting duration probes");

        let handle = tokio::spawn(async move {
            while let Some(outcome) = outcomes.next().await {
                if tx.send(outcome).is_err() {
                    break;
                }
            }
            debug!(generation, "Duration probes finished");
        });

        ProbeTask {
            generation,
            cancel,
            handle,
        }
    }
}

async fn probe_one(
    probe: &dyn DurationProbe,
    target: &ProbeTarget,
    timeout: Duration,
) -> Option<Duration> {
    let Some(url) = target.url.as_deref() else {
        debug!(index = target.index, "No audio source, duration unknown");
        return None;
    };

    match tokio::time::timeout(timeout, probe.probe(url)).await {
        Ok(Ok(duration)) => {
            debug!(index = target.index, url = %url, ?duration, "Probed duration");
            Some(duration)
        }
        Ok(Err(e)) => {
            warn!(index = target.index, url = %url, error = %e, "Duration probe failed");
            None
        }
        Err(_) => {
            warn!(
                index = target.index,
                url = %url,
                timeout_ms = timeout.as_millis() as u64,
                "Duration probe timed out"
            );
            None
        }
    }
}

/// Handle to a background probe run
///
/// Dropping the task cancels it.
pub struct ProbeTask {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProbeTask {
    /// Generation the run was started for
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ProbeTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
