//! Clean command implementation.
//!
//! The `autosetup clean` command deletes the progress file so the next run
//! starts from the first step.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The clean command implementation.
pub struct CleanCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
}

impl CleanCommand {
    /// Create a new clean command.
    pub fn new(project_root: &Path, config_override: Option<&Path>) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
        }
    }
}

impl Command for CleanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = Project::load(&self.project_root, self.config_override.as_deref())?;
        let path = project.state_path();

        if !path.exists() {
            ui.message("No progress file to remove");
            return Ok(CommandResult::success());
        }

        project.tracker().wipe_state()?;
        ui.success(&format!("Removed progress file {}", path.display()));
        Ok(CommandResult::success())
    }
}
