//! Reset command implementation.
//!
//! The `autosetup reset` command returns one step, or every step, to
//! pending. Nothing on the platform is touched.

use std::path::{Path, PathBuf};

use crate::cli::args::ResetArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The reset command implementation.
pub struct ResetCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: ResetArgs,
}

impl ResetCommand {
    /// Create a new reset command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: ResetArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for ResetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = Project::load(&self.project_root, self.config_override.as_deref())?;
        let mut tracker = project.tracker();

        if self.args.all {
            tracker.reset_all();
            ui.success("All steps reset to pending");
            return Ok(CommandResult::success());
        }

        let Some(step) = &self.args.step else {
            ui.error("Name a step to reset, or pass --all");
            return Ok(CommandResult::failure(1));
        };
        tracker.reset(step)?;
        ui.success(&format!("Reset '{}'", step));

        let blocked: Vec<_> = project
            .table
            .graph()
            .transitive_dependents(step)
            .into_iter()
            .filter(|id| tracker.list_completed().contains(&id.as_str()))
            .collect();
        if !blocked.is_empty() {
            ui.show_hint(&format!(
                "Completed steps that depend on it will not be re-run: {}",
                blocked.join(", ")
            ));
        }

        Ok(CommandResult::success())
    }
}
