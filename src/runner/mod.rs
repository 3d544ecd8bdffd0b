//! Step orchestration.
//!
//! [`StepTable`] declares the steps and their dependencies,
//! [`ProgressTracker`] owns their persisted lifecycle, and
//! [`StepExecutor`] drives the tracker by running the body bound to each
//! eligible step. [`SetupContext`] carries configuration between steps
//! and across runs.

pub mod context;
pub mod definition;
pub mod dependency;
pub mod executor;
pub mod report;
pub mod tracker;

pub use context::{SetupContext, CONFIG_KEY, SUGGESTIONS_KEY};
pub use definition::{StepDefinition, StepTable, StepTableBuilder};
pub use dependency::{DependencyGraph, DependencyGraphBuilder};
pub use executor::{RunOutcome, StepExecutor, WARNINGS_KEY};
pub use report::{ProgressSnapshot, ProgressSummary, StepSnapshot};
pub use tracker::ProgressTracker;
