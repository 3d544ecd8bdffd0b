//! Run command implementation.
//!
//! The `autosetup run` command drives the workflow from the first step
//! that is not yet done.

use std::path::{Path, PathBuf};

use crate::cli::args::RunArgs;
use crate::error::Result;
use crate::runner::StepExecutor;
use crate::steps::StepRegistry;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = Project::load(&self.project_root, self.config_override.as_deref())?;
        let mut tracker = if self.args.dry_run {
            project.read_only_tracker()
        } else {
            project.tracker()
        };

        let title = if self.args.dry_run {
            format!("{} (dry run)", project.config.display_name())
        } else {
            project.config.display_name().to_string()
        };
        ui.show_header(&title);

        if self.args.resume {
            if tracker.list_completed().is_empty() && tracker.list_failed().is_empty() {
                ui.message("No saved progress found; starting from the beginning.");
            } else {
                ui.message(&tracker.detailed_report());
            }
        }

        let registry = StepRegistry::builtin();
        let outcome = StepExecutor::new(&registry, &project.config, &project.root)
            .dry_run(self.args.dry_run)
            .run(&mut tracker, ui)?;

        tracing::info!(
            "Run finished: success={}, steps executed={}",
            outcome.success,
            outcome.executed.len()
        );

        if outcome.success {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
