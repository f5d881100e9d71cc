use crate::models::{Algorithm, RunOutcome, RunReport, RunStats};
use crate::state::StateManager;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;

/// A step observed the run's cancellation token.
///
/// Not a failure: the runner maps it to [`RunOutcome::Cancelled`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("sort run cancelled")]
pub struct Cancelled;

/// Boxed future for the recursive algorithms (merge and quick sort)
type Step<'c> = Pin<Box<dyn Future<Output = Result<(), Cancelled>> + Send + 'c>>;

/// Execution context of one run.
///
/// Algorithms read and write bars only through the context, so every access
/// lands on the [`StateManager`] (and emits change events) and every step is
/// counted.
///
/// # Cancellation
///
/// [`checkpoint`](Self::checkpoint) is polled at the top of every loop
/// iteration and recursion entry. [`pause`](Self::pause) races the step delay
/// against the token with `tokio::select!`, so a stop request ends the wait
/// immediately instead of after the delay.
pub struct SortContext<'a> {
    state: &'a StateManager,
    cancel_rx: watch::Receiver<bool>,
    delay: Duration,
    stats: RunStats,
}

impl<'a> SortContext<'a> {
    /// # Arguments
    /// * `state` - Holder of the bars being sorted
    /// * `cancel_rx` - Per-run token; `true` (or a dropped sender) cancels
    /// * `delay` - Suspension between steps; zero only yields to the scheduler
    pub fn new(state: &'a StateManager, cancel_rx: watch::Receiver<bool>, delay: Duration) -> Self {
        Self {
            state,
            cancel_rx,
            delay,
            stats: RunStats::default(),
        }
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Fail with [`Cancelled`] once stop has been requested
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        // A closed channel means the owner of the run is gone
        if *self.cancel_rx.borrow() || self.cancel_rx.has_changed().is_err() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// End the current step: publish counters, then wait for the step delay.
    pub async fn pause(&mut self) -> Result<(), Cancelled> {
        self.stats.steps += 1;
        self.state.record_step(self.stats);

        if self.delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                _ = tokio::time::sleep(self.delay) => {}
                _ = self.cancel_rx.changed() => {
                    tracing::trace!("Step delay interrupted after {} steps", self.stats.steps);
                    return Err(Cancelled);
                }
            }
        }

        self.checkpoint()
    }

    fn get(&self, index: usize) -> u32 {
        self.state.value_at(index)
    }

    fn compare(&mut self) {
        self.stats.comparisons += 1;
    }

    fn highlight(&self, first: usize, second: usize) {
        self.state.set_highlight(first, second);
    }

    fn swap(&mut self, i: usize, j: usize) {
        if self.state.swap(i, j) {
            self.stats.writes += 2;
        }
    }

    fn write(&mut self, index: usize, value: u32) {
        if self.state.set_value(index, value) {
            self.stats.writes += 1;
        }
    }
}

/// Run `algorithm` to completion or cancellation against the context's bars.
pub async fn execute(algorithm: Algorithm, ctx: &mut SortContext<'_>) -> Result<(), Cancelled> {
    let last = ctx.len().saturating_sub(1);
    match algorithm {
        Algorithm::Bubble => bubble_sort(ctx).await,
        Algorithm::Selection => selection_sort(ctx).await,
        Algorithm::Insertion => insertion_sort(ctx).await,
        Algorithm::Merge => merge_sort_range(ctx, 0, last).await,
        Algorithm::Quick => quick_sort_range(ctx, 0, last).await,
    }
}

/// Execute one run without touching the run flag.
///
/// The caller owns the lifecycle (`begin_run` / `finish_run`).
pub async fn drive_run(
    state: &StateManager,
    algorithm: Algorithm,
    cancel_rx: watch::Receiver<bool>,
    delay: Duration,
) -> RunReport {
    let started = Instant::now();
    let mut ctx = SortContext::new(state, cancel_rx, delay);

    let outcome = match execute(algorithm, &mut ctx).await {
        Ok(()) => RunOutcome::Completed,
        Err(Cancelled) => RunOutcome::Cancelled,
    };

    RunReport {
        algorithm,
        outcome,
        stats: ctx.stats(),
        elapsed: started.elapsed(),
    }
}

/// Full run lifecycle: `Idle -> Running -> {Completed, Cancelled}` followed by
/// the shared cleanup.
pub async fn run_sort(
    state: &StateManager,
    algorithm: Algorithm,
    cancel_rx: watch::Receiver<bool>,
    delay: Duration,
) -> RunReport {
    state.begin_run(algorithm);
    let report = drive_run(state, algorithm, cancel_rx, delay).await;
    state.finish_run(report.clone());
    report
}

async fn bubble_sort(ctx: &mut SortContext<'_>) -> Result<(), Cancelled> {
    let n = ctx.len();

    for i in 0..n.saturating_sub(1) {
        ctx.checkpoint()?;
        for j in 0..n - i - 1 {
            ctx.checkpoint()?;
            ctx.highlight(j, j + 1);

            ctx.compare();
            if ctx.get(j) > ctx.get(j + 1) {
                ctx.swap(j, j + 1);
            }

            ctx.pause().await?;
        }
    }

    Ok(())
}

async fn selection_sort(ctx: &mut SortContext<'_>) -> Result<(), Cancelled> {
    let n = ctx.len();

    for i in 0..n {
        ctx.checkpoint()?;
        let mut min = i;

        for j in i + 1..n {
            ctx.checkpoint()?;
            ctx.highlight(min, j);

            ctx.compare();
            if ctx.get(j) < ctx.get(min) {
                min = j;
            }

            ctx.pause().await?;
        }

        // One swap per pass, even when min == i
        ctx.swap(i, min);
    }

    Ok(())
}

async fn insertion_sort(ctx: &mut SortContext<'_>) -> Result<(), Cancelled> {
    let n = ctx.len();

    for i in 1..n {
        ctx.checkpoint()?;
        let key = ctx.get(i);
        // Slot the key will land in; everything right of it up to i is shifted.
        let mut hole = i;

        let shifted = loop {
            if hole == 0 {
                break Ok(());
            }
            if let Err(cancelled) = ctx.checkpoint() {
                break Err(cancelled);
            }

            ctx.compare();
            let source = ctx.get(hole - 1);
            if source <= key {
                break Ok(());
            }

            ctx.highlight(hole - 1, hole);
            ctx.write(hole, source);
            hole -= 1;

            if let Err(cancelled) = ctx.pause().await {
                break Err(cancelled);
            }
        };

        // The key is held outside the array; put it back even when cancelled.
        ctx.write(hole, key);
        shifted?;
    }

    Ok(())
}

fn merge_sort_range<'c>(ctx: &'c mut SortContext<'_>, left: usize, right: usize) -> Step<'c> {
    Box::pin(async move {
        if left >= right {
            return Ok(());
        }
        ctx.checkpoint()?;

        let mid = left + (right - left) / 2;
        merge_sort_range(&mut *ctx, left, mid).await?;
        merge_sort_range(&mut *ctx, mid + 1, right).await?;
        merge(ctx, left, mid, right).await
    })
}

async fn merge(
    ctx: &mut SortContext<'_>,
    left: usize,
    mid: usize,
    right: usize,
) -> Result<(), Cancelled> {
    ctx.checkpoint()?;

    let lower = ctx.state.values_in(left..=mid);
    let upper = ctx.state.values_in(mid + 1..=right);
    let (mut i, mut j, mut k) = (0, 0, left);
    let mut outcome = Ok(());

    while k <= right {
        if let Err(cancelled) = ctx.checkpoint() {
            outcome = Err(cancelled);
            break;
        }

        let value = if i < lower.len() && j < upper.len() {
            ctx.highlight(left + i, mid + 1 + j);
            ctx.compare();
            if lower[i] <= upper[j] {
                i += 1;
                lower[i - 1]
            } else {
                j += 1;
                upper[j - 1]
            }
        } else if i < lower.len() {
            ctx.highlight(k, k);
            i += 1;
            lower[i - 1]
        } else {
            ctx.highlight(k, k);
            j += 1;
            upper[j - 1]
        };

        ctx.write(k, value);
        k += 1;

        if let Err(cancelled) = ctx.pause().await {
            outcome = Err(cancelled);
            break;
        }
    }

    if outcome.is_err() {
        // Buffered values would be lost otherwise; write them back unanimated.
        for &value in lower[i..].iter().chain(&upper[j..]) {
            ctx.write(k, value);
            k += 1;
        }
    }

    outcome
}

fn quick_sort_range<'c>(ctx: &'c mut SortContext<'_>, low: usize, high: usize) -> Step<'c> {
    Box::pin(async move {
        if low >= high {
            return Ok(());
        }
        ctx.checkpoint()?;

        let pivot_index = partition(&mut *ctx, low, high).await?;
        if pivot_index > low {
            quick_sort_range(&mut *ctx, low, pivot_index - 1).await?;
        }
        quick_sort_range(ctx, pivot_index + 1, high).await
    })
}

/// Lomuto partition around `values[high]`
async fn partition(ctx: &mut SortContext<'_>, low: usize, high: usize) -> Result<usize, Cancelled> {
    let pivot = ctx.get(high);
    let mut boundary = low;

    for j in low..high {
        ctx.checkpoint()?;
        ctx.highlight(j, high);

        ctx.compare();
        if ctx.get(j) < pivot {
            ctx.swap(boundary, j);
            boundary += 1;
        }

        ctx.pause().await?;
    }

    ctx.swap(boundary, high);
    Ok(boundary)
}
