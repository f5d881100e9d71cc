// GUI Controller - Bridges Slint UI with the sort runner and visual state
//
// It handles:
// - Setting up UI callbacks → runner operations
// - Subscribing to state changes → coalesced redraws of the bar chart
// - Stopping the active run when the window closes

use crate::metrics::Metrics;
use crate::models::{Algorithm, VisualState};
use crate::services::generator::RandomSource;
use crate::services::runner::SortRunner;
use crate::state::{StateChange, StateManager};
use crate::ui::bridge::{EventLoopBridge, EventLoopBridgeHandle};
use anyhow::{Context, Result};
use slint::{ModelRc, VecModel};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::RecvError;

// Include the generated Slint code
slint::include_modules!();

/// One-off message shown instead of the derived status line until the next
/// run starts or finishes, or the array is regenerated
type Notice = Arc<Mutex<Option<String>>>;

/// Whether `change` makes a pending notice stale
fn clears_notice(change: &StateChange) -> bool {
    matches!(
        change,
        StateChange::SortStarted { .. }
            | StateChange::SortFinished { .. }
            | StateChange::ArrayRegenerated { .. }
    )
}

fn status_text(state: &VisualState, notice: Option<&str>) -> String {
    notice.map_or_else(|| state.status_line(), str::to_string)
}

/// Bar heights are `int` on the Slint side; saturate instead of wrapping
fn chart_units(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// GUI Controller that wires up the Slint UI with the runner and state
///
/// # Example
/// ```ignore
/// let controller = GuiController::new(state_manager, runner, metrics, runtime.handle().clone())?;
/// controller.run()?;  // Blocks until window is closed
/// ```
pub struct GuiController {
    /// The Slint UI window
    ui: MainWindow,

    /// Keeps the bridge handler thread fed for the lifetime of the window
    _bridge: EventLoopBridge<MainWindow>,
}

impl GuiController {
    /// Create a new GUI controller
    ///
    /// # Arguments
    /// * `state_manager` - Shared visual state
    /// * `runner` - Run controls invoked by the buttons
    /// * `metrics` - Frame counters are recorded here
    /// * `tokio_handle` - Handle to the tokio runtime for spawning async tasks
    pub fn new(
        state_manager: Arc<StateManager>,
        runner: Arc<SortRunner>,
        metrics: Arc<Metrics>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;
        let bridge = EventLoopBridge::new(&ui, tokio_handle, metrics);
        let notice: Notice = Arc::new(Mutex::new(None));

        Self::render(&ui, &state_manager.snapshot(), None);
        Self::setup_callbacks(&ui, &bridge, &state_manager, &runner, &notice);
        Self::setup_state_subscription(&bridge, &state_manager, &notice);
        Self::setup_close_handler(&ui, &runner);

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            _bridge: bridge,
        })
    }

    /// Run the GUI (blocks until window is closed)
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        self.ui.run()
    }

    /// Paint one frame from a state snapshot
    fn render(ui: &MainWindow, state: &VisualState, notice: Option<&str>) {
        let bars: Vec<Bar> = state
            .values
            .iter()
            .enumerate()
            .map(|(index, &value)| Bar {
                value: chart_units(value),
                highlighted: state.is_highlighted(index),
            })
            .collect();

        ui.set_bars(ModelRc::new(VecModel::from(bars)));
        ui.set_max_value(chart_units(state.chart_ceiling()));
        ui.set_is_sorting(state.is_sorting);

        ui.set_status_message(status_text(state, notice).into());
    }

    /// Queue a redraw that reads the state when it runs
    fn request_redraw(
        bridge: &EventLoopBridgeHandle<MainWindow>,
        state_manager: &Arc<StateManager>,
        notice: &Notice,
    ) {
        let state_manager = Arc::clone(state_manager);
        let notice = Arc::clone(notice);
        bridge.request_frame(move |ui| {
            let state = state_manager.snapshot();
            let notice = notice.lock().unwrap().clone();
            Self::render(ui, &state, notice.as_deref());
        });
    }

    /// Set up Slint UI callbacks
    fn setup_callbacks(
        ui: &MainWindow,
        bridge: &EventLoopBridge<MainWindow>,
        state_manager: &Arc<StateManager>,
        runner: &Arc<SortRunner>,
        notice: &Notice,
    ) {
        let bridge_handle = bridge.clone_handle();
        let runner_clone = Arc::clone(runner);

        // Generate: stop any run, then draw a fresh array
        ui.on_generate(move || {
            tracing::info!("Generate button clicked");

            let runner = Arc::clone(&runner_clone);
            bridge_handle.spawn_async(move || async move {
                if let Err(e) = runner.regenerate(&RandomSource).await {
                    tracing::error!("Failed to regenerate array: {}", e);
                }
            });
        });

        let bridge_handle = bridge.clone_handle();
        let state = Arc::clone(state_manager);
        let runner_clone = Arc::clone(runner);
        let notice_clone = Arc::clone(notice);

        ui.on_run_sort(move |name| {
            tracing::info!("Run button clicked: {}", name);

            let message = match name.parse::<Algorithm>() {
                Ok(algorithm) => match runner_clone.start(algorithm) {
                    Ok(()) => return,
                    Err(e) => e.to_string(),
                },
                Err(e) => {
                    tracing::warn!("{}", e);
                    e.to_string()
                }
            };

            *notice_clone.lock().unwrap() = Some(message);
            Self::request_redraw(&bridge_handle, &state, &notice_clone);
        });

        let runner_clone = Arc::clone(runner);

        ui.on_stop_sort(move || {
            tracing::info!("Stop button clicked");
            runner_clone.request_stop();
        });
    }

    /// Stop the active run when the user closes the window
    fn setup_close_handler(ui: &MainWindow, runner: &Arc<SortRunner>) {
        let runner = Arc::clone(runner);
        ui.window().on_close_requested(move || {
            if runner.request_stop() {
                tracing::warn!("Window closed during a run - cancelling");
            }
            slint::CloseRequestResponse::HideWindow
        });
    }

    /// Subscribe to state changes and redraw accordingly
    ///
    /// This spawns a background thread that listens for state change events.
    /// Every event requests a frame; the bridge folds bursts into one.
    fn setup_state_subscription(
        bridge: &EventLoopBridge<MainWindow>,
        state_manager: &Arc<StateManager>,
        notice: &Notice,
    ) {
        let bridge_handle = bridge.clone_handle();
        let state_manager = Arc::clone(state_manager);
        let notice = Arc::clone(notice);
        let mut rx = state_manager.subscribe();

        let spawned = std::thread::Builder::new()
            .name("state-subscription".to_string())
            .spawn(move || {
                tracing::debug!("State subscription thread started");

                loop {
                    match rx.blocking_recv() {
                        Ok(change) => {
                            tracing::trace!("State change received: {:?}", change);

                            match &change {
                                StateChange::SortStarted { algorithm } => {
                                    tracing::debug!("{} started", algorithm);
                                }
                                StateChange::ArrayRegenerated { len } => {
                                    tracing::debug!("Array regenerated with {} bars", len);
                                }
                                StateChange::SortFinished {
                                    report: Some(report),
                                } => {
                                    tracing::debug!("Run finished: {}", report.outcome);
                                }
                                _ => {}
                            }

                            if clears_notice(&change) {
                                *notice.lock().unwrap() = None;
                            }

                            Self::request_redraw(&bridge_handle, &state_manager, &notice);
                        }
                        Err(RecvError::Closed) => {
                            tracing::info!(
                                "State broadcast channel closed - shutting down subscription thread"
                            );
                            break;
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            // Frames read the latest state, so one redraw covers the gap
                            tracing::debug!("State subscription lagged by {} events", skipped);
                            Self::request_redraw(&bridge_handle, &state_manager, &notice);
                        }
                    }
                }

                tracing::debug!("State subscription thread terminated gracefully");
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn state subscription thread: {}", e);
        }
    }
}
