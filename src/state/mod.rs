// State management module
//
// This module provides the StateManager which wraps VisualState with thread-safe access
// using Arc<RwLock<T>> and emits change events for the render surface.

use crate::models::{
    Algorithm, Highlight, RunReport, RunStats, SortSettings, VisualState, VisualizerConfig,
};
use crate::services::generator::ValueSource;
use std::ops::RangeInclusive;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// The render surface subscribes to these instead of being repainted directly
/// by the sorting task.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The array was replaced wholesale
    ArrayRegenerated { len: usize },

    /// One or more bar heights changed
    ValuesChanged,

    /// The highlighted pair moved or was cleared
    HighlightChanged { highlight: Option<Highlight> },

    /// A run was launched
    SortStarted { algorithm: Algorithm },

    /// A run reached `Completed` or `Cancelled` and was cleaned up
    SortFinished { report: Option<RunReport> },

    /// Step counters of the active run advanced
    StatsUpdated {
        steps: usize,
        comparisons: usize,
        writes: usize,
    },

    /// Generation or pacing settings were updated
    SettingsChanged,
}

/// Thread-safe state manager with event emission
///
/// This is the Visual State Holder:
/// - Provides thread-safe access to [`VisualState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Exposes the element accessors the sorting algorithms use
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Related Types
///
/// - [`crate::services::sorting::SortContext`]: Drives algorithms against this manager
/// - [`crate::services::runner::SortRunner`]: Owns the run lifecycle
/// - [`crate::ui::controller::GuiController`]: Primary consumer of state events
pub struct StateManager {
    /// The visual state protected by RwLock for thread-safe access
    state: Arc<RwLock<VisualState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state and no bars
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 256 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(256);
        Self {
            state: Arc::new(RwLock::new(VisualState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state
    pub fn snapshot(&self) -> VisualState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let sorting = state_manager.read(|state| state.is_sorting);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&VisualState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// Captures the old state, applies `update_fn`, diffs the two and
    /// broadcasts one event per detected change.
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut VisualState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = self.detect_changes(&old_state, &state);
        drop(state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Emit an event that cannot be derived from a state diff
    fn emit(&self, change: StateChange, changes: &mut Vec<StateChange>) {
        let _ = self.state_tx.send(change.clone());
        changes.push(change);
    }

    fn detect_changes(&self, old: &VisualState, new: &VisualState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.is_sorting != new.is_sorting {
            if new.is_sorting {
                if let Some(algorithm) = new.active_algorithm {
                    changes.push(StateChange::SortStarted { algorithm });
                }
            } else {
                changes.push(StateChange::SortFinished {
                    report: new.last_run.clone(),
                });
            }
        }

        if old.values != new.values {
            changes.push(StateChange::ValuesChanged);
        }

        if old.highlight != new.highlight {
            changes.push(StateChange::HighlightChanged {
                highlight: new.highlight,
            });
        }

        if old.stats != new.stats {
            changes.push(StateChange::StatsUpdated {
                steps: new.stats.steps,
                comparisons: new.stats.comparisons,
                writes: new.stats.writes,
            });
        }

        if old.settings != new.settings {
            changes.push(StateChange::SettingsChanged);
        }

        changes
    }

    // Array lifecycle

    /// Replace the bars with fresh values drawn from `source`.
    ///
    /// Uses the configured length and value range. Clears the highlight,
    /// marks no run active and resets the statistics.
    pub fn regenerate(&self, source: &dyn ValueSource) -> Vec<StateChange> {
        let (len, range) = self.read(|s| (s.settings.array_len, s.settings.value_range.clone()));
        let values = source.fill(len, range);
        tracing::debug!("Regenerated {} bars", values.len());
        self.load_values(values)
    }

    /// Replace the bars with explicit values
    pub fn load_values(&self, values: Vec<u32>) -> Vec<StateChange> {
        let len = values.len();
        let mut changes = self.update(|state| {
            state.values = values;
            state.reset_run_state();
            state.stats = RunStats::default();
            state.last_run = None;
        });

        self.emit(StateChange::ArrayRegenerated { len }, &mut changes);
        changes
    }

    /// Load generation and pacing settings from the user configuration
    pub fn apply_settings(&self, config: &VisualizerConfig) -> Vec<StateChange> {
        let settings = SortSettings::from(config);
        tracing::info!(
            "Applied settings: len={}, range={:?}, delay={:?}",
            settings.array_len,
            settings.value_range,
            settings.step_delay
        );
        self.update(|state| state.settings = settings)
    }

    // Element access used by the algorithms. Indices are valid by construction;
    // an out-of-range index is a bug and panics.

    pub fn len(&self) -> usize {
        self.read(|s| s.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|s| s.values.is_empty())
    }

    pub fn value_at(&self, index: usize) -> u32 {
        self.read(|s| s.values[index])
    }

    /// Copy of the bars in `range`
    pub fn values_in(&self, range: RangeInclusive<usize>) -> Vec<u32> {
        self.read(|s| s.values[range].to_vec())
    }

    /// Swap two bars; returns whether any bar height changed
    pub fn swap(&self, i: usize, j: usize) -> bool {
        let mut changed = false;
        self.update(|state| {
            if state.values[i] != state.values[j] {
                state.values.swap(i, j);
                changed = true;
            }
        });
        changed
    }

    /// Write one bar; returns whether its height changed
    pub fn set_value(&self, index: usize, value: u32) -> bool {
        let mut changed = false;
        self.update(|state| {
            if state.values[index] != value {
                state.values[index] = value;
                changed = true;
            }
        });
        changed
    }

    pub fn set_highlight(&self, first: usize, second: usize) -> Vec<StateChange> {
        self.update(|state| state.highlight = Some((first, second)))
    }

    pub fn clear_highlight(&self) -> Vec<StateChange> {
        self.update(|state| state.highlight = None)
    }

    // Run lifecycle

    /// Mark a run as active
    pub fn begin_run(&self, algorithm: Algorithm) -> Vec<StateChange> {
        self.update(|state| {
            state.is_sorting = true;
            state.active_algorithm = Some(algorithm);
            state.highlight = None;
            state.stats = RunStats::default();
        })
    }

    /// Publish the counters of the active run
    pub fn record_step(&self, stats: RunStats) -> Vec<StateChange> {
        self.update(|state| state.stats = stats)
    }

    /// Shared cleanup for both terminal states: run flag off, highlight
    /// cleared, report stored. The resulting `SortFinished` event is the
    /// final redraw request of the run.
    pub fn finish_run(&self, report: RunReport) -> Vec<StateChange> {
        self.update(|state| {
            state.stats = report.stats;
            state.last_run = Some(report);
            state.reset_run_state();
        })
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunOutcome;
    use crate::services::generator::MockValueSource;
    use std::time::Duration;

    fn manager_with(values: Vec<u32>) -> StateManager {
        let manager = StateManager::new();
        manager.load_values(values);
        manager
    }

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(state.is_empty());
        assert!(!state.is_sorting);
        assert!(state.highlight.is_none());
    }

    #[test]
    fn test_regenerate_uses_settings() {
        let manager = StateManager::new();
        let mut source = MockValueSource::new();
        source
            .expect_fill()
            .withf(|len, range| *len == 80 && *range == (20..420))
            .times(1)
            .returning(|len, range| vec![range.start; len]);

        let changes = manager.regenerate(&source);

        assert!(changes.contains(&StateChange::ValuesChanged));
        assert!(changes.contains(&StateChange::ArrayRegenerated { len: 80 }));
        assert_eq!(manager.len(), 80);
    }

    #[test]
    fn test_load_values_resets_run_state() {
        let manager = manager_with(vec![3, 2, 1]);
        manager.begin_run(Algorithm::Bubble);
        manager.set_highlight(0, 1);

        manager.load_values(vec![9, 8]);

        let state = manager.snapshot();
        assert_eq!(state.values, vec![9, 8]);
        assert!(!state.is_sorting);
        assert!(state.highlight.is_none());
        assert!(state.active_algorithm.is_none());
    }

    #[test]
    fn test_swap_reports_changes() {
        let manager = manager_with(vec![5, 3, 5]);

        assert!(manager.swap(0, 1));
        assert_eq!(manager.snapshot().values, vec![3, 5, 5]);

        // Equal heights: nothing moves, nothing is emitted
        let mut rx = manager.subscribe();
        assert!(!manager.swap(1, 2));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_set_value() {
        let manager = manager_with(vec![1, 2, 3]);

        assert!(manager.set_value(2, 7));
        assert!(!manager.set_value(2, 7));
        assert_eq!(manager.value_at(2), 7);
        assert_eq!(manager.values_in(1..=2), vec![2, 7]);
    }

    #[test]
    fn test_highlight_events() {
        let manager = manager_with(vec![1, 2, 3]);

        let changes = manager.set_highlight(0, 2);
        assert_eq!(
            changes,
            vec![StateChange::HighlightChanged {
                highlight: Some((0, 2))
            }]
        );

        let changes = manager.clear_highlight();
        assert_eq!(
            changes,
            vec![StateChange::HighlightChanged { highlight: None }]
        );
    }

    #[test]
    fn test_begin_run() {
        let manager = manager_with(vec![2, 1]);

        let changes = manager.begin_run(Algorithm::Quick);

        assert_eq!(
            changes[0],
            StateChange::SortStarted {
                algorithm: Algorithm::Quick
            }
        );
        let state = manager.snapshot();
        assert!(state.is_sorting);
        assert_eq!(state.active_algorithm, Some(Algorithm::Quick));
    }

    #[test]
    fn test_finish_run_converges_cleanup() {
        let manager = manager_with(vec![2, 1]);
        manager.begin_run(Algorithm::Insertion);
        manager.set_highlight(0, 1);

        let report = RunReport {
            algorithm: Algorithm::Insertion,
            outcome: RunOutcome::Cancelled,
            stats: RunStats {
                steps: 1,
                comparisons: 1,
                writes: 0,
            },
            elapsed: Duration::from_millis(30),
        };
        let changes = manager.finish_run(report.clone());

        assert!(changes.contains(&StateChange::SortFinished {
            report: Some(report.clone())
        }));
        assert!(changes.contains(&StateChange::HighlightChanged { highlight: None }));

        let state = manager.snapshot();
        assert!(!state.is_sorting);
        assert!(state.highlight.is_none());
        assert_eq!(state.last_run, Some(report));
    }

    #[test]
    fn test_record_step_emits_stats() {
        let manager = manager_with(vec![2, 1]);
        let stats = RunStats {
            steps: 3,
            comparisons: 2,
            writes: 1,
        };

        let changes = manager.record_step(stats);

        assert_eq!(
            changes,
            vec![StateChange::StatsUpdated {
                steps: 3,
                comparisons: 2,
                writes: 1
            }]
        );
    }

    #[test]
    fn test_apply_settings() {
        let manager = StateManager::new();
        let config = VisualizerConfig {
            array_len: 10,
            step_delay_ms: 1,
            ..VisualizerConfig::default()
        };

        let changes = manager.apply_settings(&config);

        assert_eq!(changes, vec![StateChange::SettingsChanged]);
        let settings = manager.read(|s| s.settings.clone());
        assert_eq!(settings.array_len, 10);
        assert_eq!(settings.step_delay, Duration::from_millis(1));
    }

    #[test]
    fn test_multiple_subscribers() {
        let manager = StateManager::new();
        let mut rx1 = manager.subscribe();
        let mut rx2 = manager.subscribe();

        manager.load_values(vec![1]);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_clone_state_manager() {
        let manager1 = manager_with(vec![1, 2]);
        let manager2 = manager1.clone();

        manager1.set_value(0, 10);

        assert_eq!(manager2.value_at(0), 10);
    }
}
