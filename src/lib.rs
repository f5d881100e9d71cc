// Sortviz - Animated bar-chart visualizer for classic sorting algorithms
//
// This is the library crate containing the algorithms, state and run control.
// The binary crate (main.rs) provides the GUI entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{Algorithm, RunOutcome, RunReport, VisualState, VisualizerConfig};
pub use services::SortRunner;
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
