//! Report command implementation.
//!
//! The `autosetup report` command renders the progress report, either to
//! stdout or to a file.

use std::path::{Path, PathBuf};

use crate::cli::args::ReportArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The report command implementation.
pub struct ReportCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: ReportArgs,
}

impl ReportCommand {
    /// Create a new report command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: ReportArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for ReportCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = Project::load(&self.project_root, self.config_override.as_deref())?;
        let tracker = project.read_only_tracker();

        match &self.args.output {
            Some(output) => {
                let destination = if output.is_absolute() {
                    output.clone()
                } else {
                    project.root.join(output)
                };
                tracker.export_report(&destination)?;
                ui.success(&format!("Report saved to {}", destination.display()));
            }
            None => println!("{}", tracker.render_report()),
        }

        Ok(CommandResult::success())
    }
}
