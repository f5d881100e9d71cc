use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// The sorting algorithms the visualizer can animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Bubble,
    Selection,
    Insertion,
    Merge,
    Quick,
}

impl Algorithm {
    /// Every algorithm, in button order.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Bubble,
        Algorithm::Selection,
        Algorithm::Insertion,
        Algorithm::Merge,
        Algorithm::Quick,
    ];

    /// Lowercase command name (`bubble`, `selection`, ...)
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Selection => "selection",
            Algorithm::Insertion => "insertion",
            Algorithm::Merge => "merge",
            Algorithm::Quick => "quick",
        }
    }

    /// Human-readable label used in the status line
    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Bubble => "Bubble sort",
            Algorithm::Selection => "Selection sort",
            Algorithm::Insertion => "Insertion sort",
            Algorithm::Merge => "Merge sort",
            Algorithm::Quick => "Quick sort",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a command names an algorithm that does not exist
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown sorting algorithm: {0}")]
pub struct ParseAlgorithmError(pub String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == name)
            .ok_or_else(|| ParseAlgorithmError(s.to_string()))
    }
}

/// Terminal state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Loops and recursion exhausted normally
    Completed,
    /// A step observed the cancellation token
    Cancelled,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Completed => f.write_str("completed"),
            RunOutcome::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Counters accumulated by a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Suspension points reached (one per animated step)
    pub steps: usize,
    /// Element comparisons performed
    pub comparisons: usize,
    /// Writes that changed the value stored at an index
    pub writes: usize,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub algorithm: Algorithm,
    pub outcome: RunOutcome,
    pub stats: RunStats,
    pub elapsed: Duration,
}

impl RunReport {
    /// One-line summary for the status bar and logs
    pub fn summary(&self) -> String {
        format!(
            "{} {} after {} steps ({} comparisons, {} writes) in {:.1}s",
            self.algorithm,
            self.outcome,
            self.stats.steps,
            self.stats.comparisons,
            self.stats.writes,
            self.elapsed.as_secs_f32()
        )
    }
}
