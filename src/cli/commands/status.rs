//! Status command implementation.
//!
//! The `autosetup status` command shows saved progress without changing it.

use std::path::{Path, PathBuf};

use crate::cli::args::StatusArgs;
use crate::error::{Result, SetupError};
use crate::runner::ProgressTracker;
use crate::ui::{format_duration, format_relative_time, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::display;
use super::project::Project;

/// The status command implementation.
pub struct StatusCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: StatusArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }

    fn show_step(&self, tracker: &ProgressTracker, id: &str, ui: &mut dyn UserInterface) -> Result<()> {
        let def = tracker.table().get(id).ok_or_else(|| SetupError::UnknownStep {
            step: id.to_string(),
        })?;
        let state = tracker.step(id).cloned().unwrap_or_default();

        display::show_step_status(ui, &def.name, state.status);
        ui.message(&format!("    {}", def.description));
        if !def.dependencies.is_empty() {
            ui.message(&format!("    Depends on: {}", def.dependencies.join(", ")));
        }
        if let Some(start) = state.start_time {
            ui.message(&format!("    Started: {}", format_relative_time(start)));
        }
        if let Some(duration) = state.duration() {
            ui.message(&format!("    Duration: {}", format_duration(duration)));
        }
        if let Some(message) = &state.error_message {
            ui.message(&format!("    {}", message));
        }
        if let Some(data) = &state.result_data {
            if let Ok(json) = serde_json::to_string_pretty(data) {
                ui.message(&format!("    Result: {}", json));
            }
        }
        Ok(())
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = Project::load(&self.project_root, self.config_override.as_deref())?;
        let tracker = project.read_only_tracker();

        if self.args.json {
            let json = serde_json::to_string_pretty(&tracker.snapshot())
                .map_err(anyhow::Error::from)?;
            println!("{}", json);
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("{} - Status", project.config.display_name()));

        if let Some(id) = &self.args.step {
            self.show_step(&tracker, id, ui)?;
            return Ok(CommandResult::success());
        }

        if let Some(updated) = tracker.state().last_updated {
            ui.message(&format!("Last updated: {}", format_relative_time(updated)));
        }
        ui.message(&tracker.detailed_report());

        if tracker.is_complete() {
            ui.success("Setup is complete");
        } else if let Some(next) = tracker.next_eligible_step() {
            let verb = if tracker.list_failed().contains(&next) {
                "retry"
            } else {
                "continue with"
            };
            ui.show_hint(&format!(
                "Run 'autosetup run --resume' to {} '{}'",
                verb, next
            ));
        }

        Ok(CommandResult::success())
    }
}
