//! Sortviz - Animated bar-chart visualizer for classic sorting algorithms
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! This binary crate provides the Slint GUI frontend. It initializes:
//! - Configuration loading ([`ConfigManager`])
//! - Logging infrastructure (daily file rotation, console in debug mode)
//! - Tokio async runtime (sort tasks and their step delays)
//! - State management ([`StateManager`]) and run control ([`SortRunner`])
//! - GUI controller ([`GuiController`] - bridges Slint UI with the runner)
//!
//! The application uses a hybrid threading model:
//! - **Main thread**: Runs the Slint event loop (blocking, synchronous)
//! - **Tokio workers**: Run the active sort and its paced pauses
//! - **State listener**: Background std::thread that schedules redraws
//!
//! # Execution Flow
//!
//! 1. Load `config/Sorting Visualizer.yaml` (plus `SORTVIZ_*` overrides)
//! 2. Initialize logging → `<log_dir>/sortviz.YYYY-MM-DD`
//! 3. Create tokio runtime with 2 worker threads
//! 4. Create StateManager, apply settings and generate the first array
//! 5. Create GuiController and run the Slint event loop until the window closes
//! 6. Cancel any active run, await its cleanup, shut the runtime down

use anyhow::Result;
use sortviz::logging::{self, LOG_PREFIX};
use sortviz::services::RandomSource;
use sortviz::ui::GuiController;
use sortviz::{APP_NAME, ConfigManager, Metrics, SortRunner, StateManager, VERSION};
use std::sync::Arc;
use std::time::Duration;

const CONFIG_DIR: &str = "config";
const WORKER_THREADS: usize = 2;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new(CONFIG_DIR)?;
    let config = config_manager.load_config()?;

    // Held until main returns so buffered log lines are flushed
    let _log_guard = logging::setup_logging_with_console(
        &config.log_dir,
        LOG_PREFIX,
        config.debug_mode,
        config.debug_mode,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Config from {}: {} bars in {}..{}, {}ms per step",
        config_manager.config_path(),
        config.array_len,
        config.min_value,
        config.max_value,
        config.step_delay_ms
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(WORKER_THREADS)
        .thread_name("sortviz-worker")
        .build()?;

    tracing::info!(
        "Tokio runtime initialized with {} worker threads",
        WORKER_THREADS
    );

    let state_manager = Arc::new(StateManager::new());
    state_manager.apply_settings(&config);
    state_manager.regenerate(&RandomSource);

    let metrics = Arc::new(Metrics::new());
    let runner = Arc::new(SortRunner::new(
        Arc::clone(&state_manager),
        runtime.handle().clone(),
        Arc::clone(&metrics),
    ));

    let gui_controller = GuiController::new(
        Arc::clone(&state_manager),
        Arc::clone(&runner),
        Arc::clone(&metrics),
        runtime.handle().clone(),
    )?;

    tracing::info!("GUI controller initialized, launching window");

    // Blocks until the window is closed
    let result = gui_controller.run();

    tracing::info!("GUI closed, shutting down");

    match runtime.block_on(runner.stop()) {
        Ok(Some(report)) => tracing::info!("Active run ended on exit: {}", report.summary()),
        Ok(None) => {}
        Err(e) => tracing::error!("Failed to stop active run: {}", e),
    }

    metrics.log_summary();

    runtime.shutdown_timeout(Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}
