//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Every command that needs the
//! project loads it through [`project::Project`], so configuration errors
//! surface the same way everywhere.

pub mod clean;
pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod project;
pub mod report;
pub mod reset;
pub mod run;
pub mod status;
pub mod steps;
pub mod validate;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
