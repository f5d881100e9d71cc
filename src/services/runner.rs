use crate::metrics::Metrics;
use crate::models::{Algorithm, MAX_CONCURRENT_RUNS, RunOutcome, RunReport};
use crate::services::generator::ValueSource;
use crate::services::sorting;
use crate::state::StateManager;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Errors surfaced by the run controls
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("{0} is already running; stop it before starting another sort")]
    AlreadyRunning(Algorithm),

    #[error("Sort task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// The run currently owning the bars
struct ActiveRun {
    algorithm: Algorithm,
    /// Send `true` to request cancellation of this run only
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<RunReport>,
}

/// Launches, cancels and awaits sort runs.
///
/// Each run gets its own cancellation token, so stopping (or finishing) one
/// run can never cancel or resurrect another. At most
/// [`MAX_CONCURRENT_RUNS`] run is active; further launches are rejected with
/// [`RunnerError::AlreadyRunning`] and leave the active run untouched.
///
/// # Example
/// ```ignore
/// let runner = SortRunner::new(state_manager, runtime.handle().clone(), metrics);
/// runner.start(Algorithm::Merge)?;
/// // later, from a UI callback
/// runner.request_stop();
/// ```
pub struct SortRunner {
    state: Arc<StateManager>,
    tokio_handle: tokio::runtime::Handle,
    metrics: Arc<Metrics>,
    active: Mutex<Option<ActiveRun>>,
}

impl SortRunner {
    pub fn new(
        state: Arc<StateManager>,
        tokio_handle: tokio::runtime::Handle,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            state,
            tokio_handle,
            metrics,
            active: Mutex::new(None),
        }
    }

    /// Whether a run is active and has not finished yet
    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|run| self.is_live(run))
    }

    /// Launch `algorithm` on the bars.
    ///
    /// The run flag is raised before this returns; the steps execute on the
    /// tokio runtime.
    ///
    /// # Errors
    /// [`RunnerError::AlreadyRunning`] if another run is still active.
    pub fn start(&self, algorithm: Algorithm) -> Result<(), RunnerError> {
        let mut active = self.active.lock().unwrap();

        if let Some(run) = active.as_ref().filter(|run| self.is_live(run)) {
            tracing::warn!(
                "Rejected {}: {} is still running (max concurrent runs: {})",
                algorithm,
                run.algorithm,
                MAX_CONCURRENT_RUNS
            );
            self.metrics.record_run_rejected();
            return Err(RunnerError::AlreadyRunning(run.algorithm));
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let delay = self.state.read(|s| s.settings.step_delay);

        self.state.begin_run(algorithm);
        self.metrics.record_run_started();
        tracing::info!("Starting {} (step delay {:?})", algorithm, delay);

        let state = Arc::clone(&self.state);
        let metrics = Arc::clone(&self.metrics);
        let task = self.tokio_handle.spawn(async move {
            let report = sorting::drive_run(&state, algorithm, cancel_rx, delay).await;
            metrics.record_run_finished(&report);
            tracing::info!("{}", report.summary());
            state.finish_run(report.clone());
            report
        });

        *active = Some(ActiveRun {
            algorithm,
            cancel_tx,
            task,
        });

        Ok(())
    }

    /// Ask the active run to stop without waiting for it.
    ///
    /// # Returns
    /// `false` when nothing was running; the state is left as it is.
    pub fn request_stop(&self) -> bool {
        let active = self.active.lock().unwrap();
        match active.as_ref() {
            Some(run) if self.is_live(run) => {
                tracing::info!("Stop requested for {}", run.algorithm);
                // The receiver lives in the task; a send error means it already ended
                let _ = run.cancel_tx.send(true);
                true
            }
            _ => {
                tracing::debug!("Stop requested with no active run - ignoring");
                false
            }
        }
    }

    /// Cancel the active run and wait for its cleanup.
    ///
    /// # Returns
    /// The report of the run that was active, `None` if there was none.
    pub async fn stop(&self) -> Result<Option<RunReport>, RunnerError> {
        let Some(run) = self.take_active() else {
            return Ok(None);
        };

        let _ = run.cancel_tx.send(true);
        let report = run.task.await?;
        Ok(Some(report))
    }

    /// Wait for the active run to end on its own.
    pub async fn join(&self) -> Result<Option<RunReport>, RunnerError> {
        let Some(run) = self.take_active() else {
            return Ok(None);
        };

        // Keep the sender alive while waiting; dropping it would cancel the run
        let ActiveRun { cancel_tx, task, .. } = run;
        let report = task.await?;
        drop(cancel_tx);
        Ok(Some(report))
    }

    /// Stop any active run, then replace the bars with values from `source`.
    pub async fn regenerate(&self, source: &dyn ValueSource) -> Result<(), RunnerError> {
        if let Some(report) = self.stop().await? {
            if report.outcome == RunOutcome::Cancelled {
                tracing::info!("{} stopped to regenerate the array", report.algorithm);
            }
        }

        self.state.regenerate(source);
        Ok(())
    }

    /// A run stops owning the bars once `finish_run` lowers the run flag,
    /// even if its task has not returned yet
    fn is_live(&self, run: &ActiveRun) -> bool {
        !run.task.is_finished() && self.state.read(|s| s.is_sorting)
    }

    fn take_active(&self) -> Option<ActiveRun> {
        self.active.lock().unwrap().take()
    }
}

impl Drop for SortRunner {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(run) = active.take() {
                let _ = run.cancel_tx.send(true);
            }
        }
    }
}
