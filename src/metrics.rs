// Performance metrics module
//
// Lightweight counters for runs and frames, logged on shutdown

use crate::models::{RunOutcome, RunReport};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Global run and render metrics
///
/// Uses atomic operations for thread-safe tracking without locks. Sort tasks
/// record run results; the render bridge records frame requests.
#[derive(Debug)]
pub struct Metrics {
    /// Runs launched
    pub runs_started: AtomicU64,

    /// Runs that exhausted their algorithm
    pub runs_completed: AtomicU64,

    /// Runs ended by a stop request
    pub runs_cancelled: AtomicU64,

    /// Launches refused because a run was active
    pub runs_rejected: AtomicU64,

    /// Animated steps across all runs
    pub steps: AtomicU64,

    /// Frames queued on the UI event loop
    pub frames_requested: AtomicU64,

    /// Redraw requests folded into an already pending frame
    pub frames_coalesced: AtomicU64,

    /// Application start time
    start_time: Instant,
}

/// Plain copy of the counters at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub runs_started: u64,
    pub runs_completed: u64,
    pub runs_cancelled: u64,
    pub runs_rejected: u64,
    pub steps: u64,
    pub frames_requested: u64,
    pub frames_coalesced: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            runs_completed: AtomicU64::new(0),
            runs_cancelled: AtomicU64::new(0),
            runs_rejected: AtomicU64::new(0),
            steps: AtomicU64::new(0),
            frames_requested: AtomicU64::new(0),
            frames_coalesced: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_run_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the terminal state and step count of a run
    pub fn record_run_finished(&self, report: &RunReport) {
        match report.outcome {
            RunOutcome::Completed => self.runs_completed.fetch_add(1, Ordering::Relaxed),
            RunOutcome::Cancelled => self.runs_cancelled.fetch_add(1, Ordering::Relaxed),
        };
        self.steps
            .fetch_add(report.stats.steps as u64, Ordering::Relaxed);
    }

    pub fn record_run_rejected(&self) {
        self.runs_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_requested(&self) {
        self.frames_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_coalesced(&self) {
        self.frames_coalesced.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            runs_completed: self.runs_completed.load(Ordering::Relaxed),
            runs_cancelled: self.runs_cancelled.load(Ordering::Relaxed),
            runs_rejected: self.runs_rejected.load(Ordering::Relaxed),
            steps: self.steps.load(Ordering::Relaxed),
            frames_requested: self.frames_requested.load(Ordering::Relaxed),
            frames_coalesced: self.frames_coalesced.load(Ordering::Relaxed),
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        tracing::info!("=== Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Runs: {} started, {} completed, {} cancelled, {} rejected",
            snapshot.runs_started,
            snapshot.runs_completed,
            snapshot.runs_cancelled,
            snapshot.runs_rejected
        );
        tracing::info!("Steps animated: {}", snapshot.steps);
        tracing::info!(
            "Frames: {} requested, {} coalesced",
            snapshot.frames_requested,
            snapshot.frames_coalesced
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
