//! Background location tracking
//!
//! The tracker is a single tokio task that repeatedly:
//! - Fetches the traveler roster from the store
//! - Tracks each traveler in turn (fetch location, append, reward)
//! - Sleeps for the poll interval, waking early on stop
//!
//! A traveler whose tracking fails is logged and counted, and the pass moves
//! on. Stop is checked before each pass and between travelers; the traveler
//! in flight always finishes.


use crate::infra::metrics::Metrics;
use crate::services::tour_guide::TourGuide;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{info, warn};

/// Lifecycle of the tracking task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TrackerState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl TrackerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TrackerState::Idle,
            1 => TrackerState::Running,
            2 => TrackerState::Stopping,
            _ => TrackerState::Stopped,
        }
    }
}

/// Counts for one completed pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub tracked: usize,
    pub failures: usize,
    pub interrupted: bool,
}

pub struct LocationTracker {
    guide: Arc<TourGuide>,
    poll_interval: Duration,
    metrics: Arc<Metrics>,
    state: Arc<AtomicU8>,
    stop_rx: watch::Receiver<bool>,
}

impl LocationTracker {
    /// Start tracking immediately on a dedicated task
    pub fn spawn(guide: Arc<TourGuide>, poll_interval: Duration) -> TrackerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let state = Arc::new(AtomicU8::new(TrackerState::Idle as u8));
        let tracker = LocationTracker {
            metrics: guide.metrics().clone(),
            guide,
            poll_interval,
            state: state.clone(),
            stop_rx,
        };
        let task = tokio::spawn(tracker.run());
        TrackerHandle { stop_tx, state, task: Some(task) }
    }

    fn stop_requested(&self) -> bool {
        *self.stop_rx.borrow()
    }

    async fn run(mut self) {
        // A stop issued before the task got scheduled leaves Stopping in place
        let started = self
            .state
            .compare_exchange(
                TrackerState::Idle as u8,
                TrackerState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if started {
            info!(poll_interval_secs = %self.poll_interval.as_secs(), "tracker_started");
        }

        while started && !self.stop_requested() {
            let summary = self.run_pass().await;
            if summary.interrupted {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = self.stop_rx.changed() => {
                    // Sender gone means the handle is gone
                    if changed.is_err() || *self.stop_rx.borrow() {
                        break;
                    }
                }
            }
        }

        self.state.store(TrackerState::Stopped as u8, Ordering::Release);
        info!("tracker_stopped");
    }

    /// Track every traveler once, sequentially
    async fn run_pass(&self) -> PassSummary {
        let start = Instant::now();
        let travelers = self.guide.all_travelers();
        let mut summary = PassSummary::default();

        for traveler in &travelers {
            if self.stop_requested() {
                summary.interrupted = true;
                break;
            }
            match self.guide.track_location(traveler).await {
                Ok(_) => summary.tracked += 1,
                Err(e) => {
                    summary.failures += 1;
                    self.metrics.record_tracking_failure();
                    warn!(traveler = %traveler.name(), error = %e, "tracker_traveler_failed");
                }
            }
        }

        let elapsed = start.elapsed();
        self.metrics.record_tracker_pass(elapsed);
        info!(
            travelers = %travelers.len(),
            tracked = %summary.tracked,
            failures = %summary.failures,
            interrupted = %summary.interrupted,
            elapsed_ms = %elapsed.as_millis(),
            "tracker_pass_completed"
        );
        summary
    }
}

/// Owner's side of a running tracker; dropping it stops the tracker
pub struct TrackerHandle {
    stop_tx: watch::Sender<bool>,
    state: Arc<AtomicU8>,
    task: Option<JoinHandle<()>>,
}

impl TrackerHandle {
    /// Ask the tracker to stop; safe to call any number of times
    pub fn stop(&self) {
        let _ = self.state.compare_exchange(
            TrackerState::Running as u8,
            TrackerState::Stopping as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        let _ = self.state.compare_exchange(
            TrackerState::Idle as u8,
            TrackerState::Stopping as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.stop_tx.send_replace(true);
    }

    pub fn state(&self) -> TrackerState {
        TrackerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Stop and wait for the task to exit
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "tracker_task_join_failed");
            }
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
