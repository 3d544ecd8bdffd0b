//! Steps command implementation.
//!
//! The `autosetup steps` command lists the step table in declaration order.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::StepsArgs;
use crate::error::Result;
use crate::ui::theme::SetupTheme;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display;
use super::project::Project;

/// One row of `autosetup steps --json`.
#[derive(Debug, Serialize)]
struct StepListing<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    dependencies: &'a [String],
    skipped_by_config: bool,
}

/// The steps command implementation.
pub struct StepsCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
    args: StepsArgs,
}

impl StepsCommand {
    /// Create a new steps command.
    pub fn new(project_root: &Path, config_override: Option<&Path>, args: StepsArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
            args,
        }
    }
}

impl Command for StepsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = Project::load(&self.project_root, self.config_override.as_deref())?;

        if self.args.json {
            let listing: Vec<_> = project
                .table
                .iter()
                .map(|def| StepListing {
                    id: &def.id,
                    name: &def.name,
                    description: &def.description,
                    dependencies: &def.dependencies,
                    skipped_by_config: project.config.is_skipped(&def.id),
                })
                .collect();
            let json = serde_json::to_string_pretty(&listing).map_err(anyhow::Error::from)?;
            println!("{}", json);
            return Ok(CommandResult::success());
        }

        let tracker = project.read_only_tracker();
        let theme = SetupTheme::new();

        ui.message(&format!("  {}", theme.key.apply_to("Steps:")));
        for (i, def) in project.table.iter().enumerate() {
            let status = tracker.status(&def.id).unwrap_or_default();
            let mut line = format!(
                "  {:>2}. {} {} {}",
                i + 1,
                display::status_icon(status),
                theme.highlight.apply_to(&def.name),
                theme.dim.apply_to(format!("({})", def.id))
            );
            if project.config.is_skipped(&def.id) {
                line.push_str(&format!(" {}", theme.warning.apply_to("[skipped by config]")));
            }
            ui.message(&line);
            ui.message(&format!("      {}", theme.dim.apply_to(&def.description)));
            if !def.dependencies.is_empty() {
                ui.message(&format!(
                    "      {}",
                    theme
                        .dim
                        .apply_to(format!("depends on: {}", def.dependencies.join(", ")))
                ));
            }
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn lists_every_step_in_order() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        StepsCommand::new(temp.path(), None, StepsArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_message("validate_prerequisites"));
        assert!(ui.has_message("run_integration_tests"));
        assert!(ui.has_message("depends on: validate_prerequisites"));
        let first = ui
            .messages()
            .iter()
            .position(|m| m.contains("create_catalog_schema"))
            .unwrap();
        let later = ui
            .messages()
            .iter()
            .position(|m| m.contains("deploy_app"))
            .unwrap();
        assert!(first < later);
    }

    #[test]
    fn marks_configured_skips() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".autosetup")).unwrap();
        std::fs::write(
            temp.path().join(".autosetup/config.yml"),
            "skip_steps: [load_sample_data]\n",
        )
        .unwrap();
        let mut ui = MockUI::new();

        StepsCommand::new(temp.path(), None, StepsArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(ui
            .messages()
            .iter()
            .any(|m| m.contains("load_sample_data") && m.contains("[skipped by config]")));
    }
}
