use super::config::{DEFAULT_ARRAY_LEN, VisualizerConfig};
use super::run::{Algorithm, RunReport, RunStats};
use std::ops::Range;
use std::time::Duration;

/// Maximum number of sort runs animating the same array at once.
///
/// Two runs writing the same bars would interleave their swaps and leave the
/// array in an order neither algorithm produced, so the runner rejects a
/// launch while another run is active.
///
/// # See Also
///
/// - [`crate::services::runner::SortRunner`] - Enforces the limit
pub const MAX_CONCURRENT_RUNS: usize = 1;

/// Two bar indices drawn in the highlight color
pub type Highlight = (usize, usize);

/// Generation and pacing settings, loaded from [`VisualizerConfig`]
#[derive(Clone, Debug, PartialEq)]
pub struct SortSettings {
    pub array_len: usize,
    pub value_range: Range<u32>,
    pub step_delay: Duration,
}

impl Default for SortSettings {
    fn default() -> Self {
        Self::from(&VisualizerConfig::default())
    }
}

impl From<&VisualizerConfig> for SortSettings {
    fn from(config: &VisualizerConfig) -> Self {
        Self {
            array_len: config.array_len,
            value_range: config.value_range(),
            step_delay: config.step_delay(),
        }
    }
}

/// Everything the render surface needs to draw a frame.
///
/// # Thread Safety
///
/// `VisualState` is wrapped in `Arc<RwLock<VisualState>>` by
/// [`crate::state::StateManager`]. Mutate it only through the manager so that
/// every change produces a [`crate::state::StateChange`] event.
#[derive(Clone, Debug)]
pub struct VisualState {
    /// Bar heights
    pub values: Vec<u32>,

    /// Indices touched by the most recent step, `None` while idle
    pub highlight: Option<Highlight>,

    // Run state
    pub is_sorting: bool,
    pub active_algorithm: Option<Algorithm>,
    pub stats: RunStats,
    pub last_run: Option<RunReport>,

    pub settings: SortSettings,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            values: Vec::with_capacity(DEFAULT_ARRAY_LEN),
            highlight: None,
            is_sorting: false,
            active_algorithm: None,
            stats: RunStats::default(),
            last_run: None,
            settings: SortSettings::default(),
        }
    }
}

impl VisualState {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether bar `index` should be drawn in the highlight color
    pub fn is_highlighted(&self, index: usize) -> bool {
        matches!(self.highlight, Some((a, b)) if a == index || b == index)
    }

    /// True when the bars are in non-decreasing order
    pub fn is_sorted(&self) -> bool {
        self.values.windows(2).all(|pair| pair[0] <= pair[1])
    }

    /// Largest value the chart has to fit, at least the configured maximum
    pub fn chart_ceiling(&self) -> u32 {
        let configured = self.settings.value_range.end;
        self.values.iter().copied().max().unwrap_or(0).max(configured)
    }

    /// Drop everything belonging to a run, keeping the bars.
    pub fn reset_run_state(&mut self) {
        self.is_sorting = false;
        self.active_algorithm = None;
        self.highlight = None;
    }

    /// Status bar text for the current state
    pub fn status_line(&self) -> String {
        if let (true, Some(algorithm)) = (self.is_sorting, self.active_algorithm) {
            format!(
                "{} running: {} steps, {} comparisons, {} writes",
                algorithm, self.stats.steps, self.stats.comparisons, self.stats.writes
            )
        } else if let Some(ref report) = self.last_run {
            report.summary()
        } else if self.is_empty() {
            "No data - press Generate".to_string()
        } else {
            format!("Ready - {} bars", self.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunOutcome;

    #[test]
    fn test_default_state() {
        let state = VisualState::default();
        assert!(state.is_empty());
        assert!(state.highlight.is_none());
        assert!(!state.is_sorting);
        assert_eq!(state.settings.array_len, 80);
        assert_eq!(state.settings.value_range, 20..420);
        assert_eq!(state.settings.step_delay, Duration::from_millis(30));
        assert_eq!(MAX_CONCURRENT_RUNS, 1);
    }

    #[test]
    fn test_is_highlighted() {
        let mut state = VisualState {
            values: vec![4, 3, 2, 1],
            ..VisualState::default()
        };
        assert!(!state.is_highlighted(0));

        state.highlight = Some((1, 3));
        assert!(state.is_highlighted(1));
        assert!(state.is_highlighted(3));
        assert!(!state.is_highlighted(2));
    }

    #[test]
    fn test_is_sorted() {
        let mut state = VisualState::default();
        assert!(state.is_sorted());

        state.values = vec![1, 2, 2, 9];
        assert!(state.is_sorted());

        state.values = vec![1, 3, 2];
        assert!(!state.is_sorted());
    }

    #[test]
    fn test_chart_ceiling() {
        let mut state = VisualState {
            values: vec![30, 100],
            ..VisualState::default()
        };
        assert_eq!(state.chart_ceiling(), 420);

        state.values.push(900);
        assert_eq!(state.chart_ceiling(), 900);
    }

    #[test]
    fn test_reset_run_state_keeps_values() {
        let mut state = VisualState {
            values: vec![3, 1, 2],
            highlight: Some((0, 1)),
            is_sorting: true,
            active_algorithm: Some(Algorithm::Quick),
            ..VisualState::default()
        };

        state.reset_run_state();

        assert_eq!(state.values, vec![3, 1, 2]);
        assert!(state.highlight.is_none());
        assert!(!state.is_sorting);
        assert!(state.active_algorithm.is_none());
    }

    #[test]
    fn test_status_line() {
        let mut state = VisualState::default();
        assert_eq!(state.status_line(), "No data - press Generate");

        state.values = vec![1, 2, 3];
        assert_eq!(state.status_line(), "Ready - 3 bars");

        state.is_sorting = true;
        state.active_algorithm = Some(Algorithm::Bubble);
        state.stats.steps = 4;
        assert_eq!(
            state.status_line(),
            "Bubble sort running: 4 steps, 0 comparisons, 0 writes"
        );

        state.reset_run_state();
        state.last_run = Some(RunReport {
            algorithm: Algorithm::Bubble,
            outcome: RunOutcome::Completed,
            stats: state.stats,
            elapsed: Duration::from_secs(2),
        });
        assert!(state.status_line().starts_with("Bubble sort completed"));
    }
}
