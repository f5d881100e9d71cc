//! Data models for the sorting visualizer.
//!
//! - [`VisualState`]: the bars, the highlight pair, the run flag and run statistics
//! - [`Algorithm`], [`RunOutcome`], [`RunStats`], [`RunReport`]: what a run is and how it ended
//! - [`VisualizerConfig`]: user settings loaded from `Sorting Visualizer.yaml`
//! - [`MAX_CONCURRENT_RUNS`]: how many runs may animate the array at once (always 1)
//!
//! # Architecture Note
//!
//! `VisualState` is wrapped in `Arc<RwLock<>>` by
//! [`StateManager`](crate::state::StateManager); all mutations go through its
//! `update()` so every change is broadcast to the render surface.

pub mod config;
pub mod run;
pub mod visual_state;

pub use config::{ConfigError, VisualizerConfig};
pub use run::{Algorithm, ParseAlgorithmError, RunOutcome, RunReport, RunStats};
pub use visual_state::{Highlight, MAX_CONCURRENT_RUNS, SortSettings, VisualState};
