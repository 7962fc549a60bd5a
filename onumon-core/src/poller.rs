//! Poll scheduler and last-known-good snapshot cache
//!
//! Re-runs the fetch cycle on a mutable interval. The loop is a single
//! task that awaits each cycle before the next tick, so at most one fetch
//! is ever in flight. Completed cycles swap the cached snapshot
//! atomically; a failed cycle keeps the previous snapshot (stale but
//! available) and clears the success flag.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::config::{self, ResolvedConfig};
use crate::error::FetchResult;
use crate::fetch;
use crate::session::CommandRunner;
use crate::snapshot::TelemetrySnapshot;

/// Events emitted by the poller.
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// A cycle completed and produced a fresh snapshot
    Snapshot(TelemetrySnapshot),
    /// A cycle failed; the cached snapshot is unchanged
    CycleFailed(String),
    /// The poller stopped
    Stopped,
}

/// Scheduler-owned state exposed to consumers.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// Last successful snapshot, `None` until the first success
    pub snapshot: Option<TelemetrySnapshot>,
    /// Whether the most recent cycle succeeded
    pub last_success: bool,
    /// Current poll interval in seconds
    pub interval_secs: u32,
}

impl PollState {
    fn record(&mut self, result: FetchResult<TelemetrySnapshot>) -> PollEvent {
        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot.clone());
                self.last_success = true;
                PollEvent::Snapshot(snapshot)
            }
            Err(err) => {
                self.last_success = false;
                PollEvent::CycleFailed(err.to_string())
            }
        }
    }
}

/// Handle to a running poller.
#[derive(Debug, Clone)]
pub struct PollerHandle {
    stop_tx: mpsc::Sender<()>,
    interval_tx: mpsc::Sender<u32>,
    state: Arc<RwLock<PollState>>,
}

impl PollerHandle {
    /// Signals the poller to stop.
    pub async fn stop(&self) {
        let _ = self.stop_tx.send(()).await;
    }

    /// Reconfigures the poll interval (clamped to the allowed range).
    ///
    /// Takes effect on the next scheduling decision; an in-flight or
    /// already-due cycle is not cut short.
    pub async fn set_interval(&self, secs: u32) {
        let _ = self.interval_tx.send(config::clamp_interval(secs)).await;
    }

    /// Returns the last successful snapshot, if any.
    #[must_use]
    pub fn latest(&self) -> Option<TelemetrySnapshot> {
        self.state.read().ok().and_then(|s| s.snapshot.clone())
    }

    /// Returns whether the most recent cycle succeeded.
    #[must_use]
    pub fn last_success(&self) -> bool {
        self.state.read().map(|s| s.last_success).unwrap_or(false)
    }

    /// Returns a copy of the full poll state.
    #[must_use]
    pub fn state(&self) -> PollState {
        self.state.read().map(|s| s.clone()).unwrap_or_default()
    }
}

/// Starts the poll loop.
///
/// The first cycle runs immediately; subsequent cycles follow the
/// configured interval. Returns a control handle and the event stream.
#[must_use]
pub fn start_poller(
    config: ResolvedConfig,
    runner: Arc<dyn CommandRunner>,
) -> (PollerHandle, mpsc::Receiver<PollEvent>) {
    let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
    let (interval_tx, mut interval_rx) = mpsc::channel::<u32>(1);
    let (event_tx, event_rx) = mpsc::channel::<PollEvent>(8);

    let state = Arc::new(RwLock::new(PollState {
        snapshot: None,
        last_success: false,
        interval_secs: config.poll_interval_secs,
    }));

    let handle = PollerHandle {
        stop_tx,
        interval_tx,
        state: Arc::clone(&state),
    };

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(u64::from(
            config.poll_interval_secs,
        )));
        // A slow cycle must not cause a burst of catch-up ticks
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = stop_rx.recv() => {
                    let _ = event_tx.send(PollEvent::Stopped).await;
                    break;
                }
                Some(secs) = interval_rx.recv() => {
                    tracing::info!(interval_secs = secs, "poll interval updated");
                    if let Ok(mut s) = state.write() {
                        s.interval_secs = secs;
                    }
                    let period = Duration::from_secs(u64::from(secs));
                    // interval_at so the change waits for the next tick
                    // instead of firing immediately
                    ticker = tokio::time::interval_at(
                        tokio::time::Instant::now() + period,
                        period,
                    );
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                }
                _ = ticker.tick() => {
                    let result = fetch::fetch_snapshot(runner.as_ref(), &config).await;
                    if let Err(ref err) = result {
                        tracing::warn!(host = %config.host, error = %err, "fetch cycle failed");
                    }
                    let event = match state.write() {
                        Ok(mut s) => s.record(result),
                        Err(_) => break,
                    };
                    if event_tx.send(event).await.is_err() {
                        break; // receiver dropped
                    }
                }
            }
        }
    });

    (handle, event_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    fn sample_snapshot() -> TelemetrySnapshot {
        let segments = vec![String::new(); crate::batch::BATCH_COMMANDS.len()];
        crate::fetch::assemble(&segments, "192.168.11.1")
    }

    #[test]
    fn test_record_success_swaps_snapshot() {
        let mut state = PollState::default();
        let event = state.record(Ok(sample_snapshot()));
        assert!(matches!(event, PollEvent::Snapshot(_)));
        assert!(state.last_success);
        assert!(state.snapshot.is_some());
    }

    #[test]
    fn test_record_failure_keeps_stale_snapshot() {
        let mut state = PollState::default();
        let _ = state.record(Ok(sample_snapshot()));
        let previous = state.snapshot.clone();

        let event = state.record(Err(FetchError::NoOutput));
        assert!(matches!(event, PollEvent::CycleFailed(_)));
        assert!(!state.last_success);
        assert_eq!(state.snapshot, previous);
    }

    #[test]
    fn test_record_failure_before_first_success() {
        let mut state = PollState::default();
        let _ = state.record(Err(FetchError::NoOutput));
        assert!(!state.last_success);
        assert!(state.snapshot.is_none());
    }
}
