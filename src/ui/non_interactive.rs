//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{Result, SetupError};

use super::theme::SetupTheme;
use super::{OutputMode, Prompt, PromptResult, SpinnerHandle, UserInterface, PROMPT_ENV_PREFIX};

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `AUTOSETUP_PROMPT_<KEY>` environment
/// variables, then from the prompt default; a prompt with neither is an
/// error. In CI spinner start lines are suppressed.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
    is_ci: bool,
    theme: SetupTheme,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
            is_ci: crate::shell::is_ci(),
            theme: SetupTheme::plain(),
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
            is_ci: false,
            theme: SetupTheme::plain(),
        }
    }

    fn answer(&self, prompt: &Prompt) -> Option<String> {
        self.env_overrides
            .get(&prompt.env_key())
            .or(prompt.default.as_ref())
            .cloned()
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_messages() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        println!("{}", self.theme.format_success(msg));
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_warning(msg));
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        match self.answer(prompt) {
            Some(answer) => {
                if self.mode.shows_messages() {
                    println!("{}: {}", prompt.question, answer);
                }
                Ok(PromptResult::from_answer(&prompt.prompt_type, &answer))
            }
            None => Err(SetupError::StepExecutionError {
                step: prompt.key.clone(),
                message: format!(
                    "Cannot prompt for '{}' in non-interactive mode (set {})",
                    prompt.key,
                    prompt.env_key()
                ),
            }),
        }
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_messages() && !self.is_ci {
            println!("  {}", message);
        }
        Box::new(LineSpinner {
            theme: self.theme.clone(),
            echo_output: self.mode.shows_command_output(),
        })
    }

    fn show_header(&mut self, title: &str) {
        println!("\n{}\n", self.theme.format_header(title));
    }

    fn show_step(&mut self, current: usize, total: usize, name: &str, description: &str) {
        if self.mode.shows_messages() {
            println!("\n[{}/{}] {}", current, total, self.theme.format_step(name, description));
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_messages() {
            println!("  Hint: {}", hint);
        }
    }

    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>) {
        eprintln!("    ┌─ Command ─────────────────────────");
        eprintln!("    │ {}", command);
        if !output.is_empty() {
            eprintln!("    ├─ Output ──────────────────────────");
            for line in output.lines() {
                eprintln!("    │ {}", line);
            }
        }
        eprintln!("    └───────────────────────────────────");
        if let Some(h) = hint {
            eprintln!("    Hint: {}", h);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner replacement that prints one line per outcome.
struct LineSpinner {
    theme: SetupTheme,
    echo_output: bool,
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn output_line(&mut self, line: &str) {
        if self.echo_output {
            println!("    {}", line);
        }
    }

    fn finish_success(&mut self, msg: &str) {
        println!("  {}", self.theme.format_success(msg));
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("  {}", self.theme.format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        println!("  {}", self.theme.format_skipped(msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PromptType;

    fn ui_with(pairs: &[(&str, &str)]) -> NonInteractiveUI {
        let overrides = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NonInteractiveUI::with_overrides(OutputMode::Quiet, overrides)
    }

    #[test]
    fn is_not_interactive() {
        assert!(!NonInteractiveUI::new(OutputMode::Normal).is_interactive());
    }

    #[test]
    fn prompt_uses_default() {
        let mut ui = ui_with(&[]);
        let result = ui
            .prompt(&Prompt::input("UC_SCHEMA", "Schema", Some("default")))
            .unwrap();
        assert_eq!(result, PromptResult::String("default".to_string()));
    }

    #[test]
    fn env_override_beats_default() {
        let mut ui = ui_with(&[("AUTOSETUP_PROMPT_UC_SCHEMA", "demo")]);
        let result = ui
            .prompt(&Prompt::input("UC_SCHEMA", "Schema", Some("default")))
            .unwrap();
        assert_eq!(result.as_string(), "demo");
    }

    #[test]
    fn confirm_override_parses_yes_no() {
        let mut ui = ui_with(&[("AUTOSETUP_PROMPT_CONFIRM_INSTALL", "no")]);
        let result = ui
            .prompt(&Prompt::confirm("confirm_install", "Continue?", true))
            .unwrap();
        assert_eq!(result, PromptResult::Bool(false));
    }

    #[test]
    fn confirm_default_is_used() {
        let mut ui = ui_with(&[]);
        let result = ui
            .prompt(&Prompt::confirm("confirm_install", "Continue?", true))
            .unwrap();
        assert!(result.is_affirmative());
    }

    #[test]
    fn missing_answer_is_error_naming_variable() {
        let mut ui = ui_with(&[]);
        let err = ui
            .prompt(&Prompt {
                key: "databricks_host".to_string(),
                question: "Host".to_string(),
                prompt_type: PromptType::Input,
                default: None,
            })
            .unwrap_err();
        assert!(err.to_string().contains("AUTOSETUP_PROMPT_DATABRICKS_HOST"));
    }
}
