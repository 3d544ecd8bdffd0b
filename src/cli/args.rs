//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Autosetup - resumable provisioning of a project and its workspace resources.
#[derive(Debug, Parser)]
#[command(name = "autosetup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .autosetup/config.yml and its local overrides)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output, including command output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the setup workflow (default if no command specified)
    Run(RunArgs),

    /// Show setup progress
    Status(StatusArgs),

    /// Export a progress report
    Report(ReportArgs),

    /// Return steps to pending
    Reset(ResetArgs),

    /// Delete the saved progress file
    Clean,

    /// List the workflow steps and their dependencies
    Steps(StepsArgs),

    /// Check prerequisites and configuration without changing anything
    Validate,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Commands {
    /// Whether the command may prompt the operator.
    pub fn is_interactive(&self) -> bool {
        match self {
            Commands::Run(args) => !args.non_interactive,
            _ => true,
        }
    }
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Show saved progress before continuing
    #[arg(long)]
    pub resume: bool,

    /// Describe what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Use defaults and AUTOSETUP_PROMPT_* variables, no prompts
    #[arg(long)]
    pub non_interactive: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show status for specific step
    #[arg(long)]
    pub step: Option<String>,
}

/// Arguments for the `report` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ReportArgs {
    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `reset` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ResetArgs {
    /// Step to reset
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub step: Option<String>,

    /// Reset every step
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the `steps` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StepsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
