//! Autosetup - resumable, dependency-aware project provisioning.
//!
//! Autosetup walks a fixed table of setup steps (prerequisite checks,
//! environment detection, prompts, workspace resource creation, deployment,
//! verification), records each step's lifecycle in a progress file, and
//! resumes from the first step that is not done after an interruption.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Step table, dependency graph, progress tracking and execution
//! - [`shell`] - Shell command execution
//! - [`state`] - Persisted workflow state and storage backends
//! - [`steps`] - Built-in step bodies and their registry
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use autosetup::config::{resolve_string, InterpolationContext};
//!
//! let mut values = BTreeMap::new();
//! values.insert("APP_NAME".to_string(), "demo".to_string());
//! let ctx = InterpolationContext::new(&values);
//! let command = resolve_string("databricks apps create ${APP_NAME}", &ctx).unwrap();
//! assert_eq!(command, "databricks apps create demo");
//! ```
//!
//! For file-based config loading, see the integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod shell;
pub mod state;
pub mod steps;
pub mod ui;

pub use error::{Result, SetupError};
