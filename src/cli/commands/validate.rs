//! Validate command implementation.
//!
//! The `autosetup validate` command checks the configuration and the local
//! prerequisites without running any step or touching saved progress.

use std::path::{Path, PathBuf};

use crate::config::{load_config, validate_config};
use crate::error::Result;
use crate::runner::StepTable;
use crate::steps::{check_prerequisites, StepRegistry};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The validate command implementation.
pub struct ValidateCommand {
    project_root: PathBuf,
    config_override: Option<PathBuf>,
}

impl ValidateCommand {
    /// Create a new validate command.
    pub fn new(project_root: &Path, config_override: Option<&Path>) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_override: config_override.map(Path::to_path_buf),
        }
    }
}

impl Command for ValidateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.project_root, self.config_override.as_deref())?;
        let table = StepTable::builtin()?;
        StepRegistry::builtin().validate(&table)?;

        let errors = validate_config(&config, &table);
        if !errors.is_empty() {
            for error in &errors {
                match &error.step {
                    Some(step) => ui.error(&format!("[{}] {}: {}", error.rule, step, error.message)),
                    None => ui.error(&format!("[{}] {}", error.rule, error.message)),
                }
            }
            ui.error(&format!("{} configuration error(s)", errors.len()));
            return Ok(CommandResult::failure(2));
        }
        ui.success(&format!("Configuration is valid ({} steps)", table.len()));

        let report = check_prerequisites(&config, &self.project_root);
        for (tool, path) in &report.found {
            ui.success(&format!("{} found at {}", tool, path.display()));
        }
        for check in &report.passed_checks {
            ui.success(&format!("{} passed", check));
        }
        if !report.is_ok() {
            for problem in report.problems() {
                ui.error(&problem);
            }
            return Ok(CommandResult::failure(1));
        }

        ui.success("Prerequisites satisfied");
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn project(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".autosetup")).unwrap();
        std::fs::write(temp.path().join(".autosetup/config.yml"), config).unwrap();
        temp
    }

    #[test]
    fn valid_config_without_requirements() {
        let temp = project("requires: []\nchecks: []\n");
        let mut ui = MockUI::new();

        let result = ValidateCommand::new(temp.path(), None)
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_success("Configuration is valid (16 steps)"));
        assert!(ui.has_success("Prerequisites satisfied"));
        assert!(!temp.path().join(".setup_progress.json").exists());
    }

    #[test]
    fn rule_violations_exit_with_two() {
        let temp = project("requires: []\nchecks: []\nskip_steps: [nope]\n");
        let mut ui = MockUI::new();

        let result = ValidateCommand::new(temp.path(), None)
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("unknown step 'nope'"));
    }

    #[test]
    fn missing_tool_exits_with_one() {
        let temp = project("requires: [autosetup-no-such-tool]\nchecks: []\n");
        let mut ui = MockUI::new();

        let result = ValidateCommand::new(temp.path(), None)
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("Missing required tools: autosetup-no-such-tool"));
    }
}
