//! Services module - sorting algorithms, array generation and run control.
//!
//! The services are **framework-agnostic**: they talk to the
//! [`StateManager`](crate::state::StateManager) and never to the UI, so every
//! algorithm can be driven and asserted on in plain tokio tests.
//!
//! # Components
//!
//! - [`sorting`]: The five algorithms as async step machines over a
//!   [`SortContext`]. Every comparison or write is followed by a paced pause
//!   that doubles as a cancellation point.
//! - [`generator`]: [`ValueSource`] and the random implementation used by the
//!   Generate button.
//! - [`runner`]: [`SortRunner`], which owns the run lifecycle: launching,
//!   rejecting a second concurrent run, stopping and regenerating.
//!
//! # Usage Example
//!
//! ```ignore
//! use sortviz::services::{RandomSource, SortRunner};
//! use sortviz::Algorithm;
//!
//! let runner = SortRunner::new(state, runtime.handle().clone(), metrics);
//! runner.start(Algorithm::Quick)?;
//!
//! // Generate while the run is active: the run is stopped and awaited first
//! runner.regenerate(&RandomSource).await?;
//! ```

pub mod generator;
pub mod runner;
pub mod sorting;

pub use generator::{RandomSource, ValueSource};
pub use runner::{RunnerError, SortRunner};
pub use sorting::{Cancelled, SortContext, drive_run, execute, run_sort};
