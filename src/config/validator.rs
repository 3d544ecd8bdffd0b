//! Configuration validation rules.
//!
//! Checks a loaded [`SetupConfig`] against the step table:
//! - `commands` and `skip_steps` must name declared steps
//! - input keys must be unique
//! - every regex must compile
//! - command lines must not be empty
//! - a default must be one of the declared choices

use crate::config::schema::SetupConfig;
use crate::error::{Result, SetupError};
use crate::runner::StepTable;
use regex::Regex;
use std::collections::HashSet;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: &'static str,
    /// Human-readable error message
    pub message: String,
    /// Step id if the error is step-specific
    pub step: Option<String>,
}

impl ValidationError {
    fn new(rule: &'static str, message: String) -> Self {
        Self {
            rule,
            message,
            step: None,
        }
    }

    fn for_step(rule: &'static str, step: &str, message: String) -> Self {
        Self {
            rule,
            message,
            step: Some(step.to_string()),
        }
    }
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &SetupConfig, table: &StepTable) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    errors.extend(validate_step_references(config, table));
    errors.extend(validate_inputs(config));
    errors.extend(validate_patterns(config));
    errors
}

fn validate_step_references(config: &SetupConfig, table: &StepTable) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (step, spec) in &config.commands {
        if !table.contains(step) {
            errors.push(ValidationError::for_step(
                "unknown-command-step",
                step,
                format!("Command configured for unknown step '{}'", step),
            ));
        }
        if spec.run.trim().is_empty() {
            errors.push(ValidationError::for_step(
                "empty-command",
                step,
                format!("Command for step '{}' is empty", step),
            ));
        }
    }

    for step in &config.skip_steps {
        if !table.contains(step) {
            errors.push(ValidationError::for_step(
                "unknown-skip-step",
                step,
                format!("skip_steps names unknown step '{}'", step),
            ));
        }
    }

    errors
}

fn validate_inputs(config: &SetupConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for input in &config.inputs {
        if !seen.insert(input.key.as_str()) {
            errors.push(ValidationError::new(
                "duplicate-input",
                format!("Input '{}' is declared more than once", input.key),
            ));
        }
        if let Some(default) = &input.default {
            if !input.choices.is_empty() && !input.choices.contains(default) {
                errors.push(ValidationError::new(
                    "invalid-default",
                    format!(
                        "Default '{}' for input '{}' is not one of its choices",
                        default, input.key
                    ),
                ));
            }
        }
    }

    errors
}

fn validate_patterns(config: &SetupConfig) -> Vec<ValidationError> {
    let inputs = config
        .inputs
        .iter()
        .filter_map(|i| i.pattern.as_deref().map(|p| (i.key.as_str(), p)));
    let detect = config
        .detect
        .iter()
        .filter_map(|(k, d)| d.pattern.as_deref().map(|p| (k.as_str(), p)));

    inputs
        .chain(detect)
        .filter_map(|(key, pattern)| {
            Regex::new(pattern).err().map(|e| {
                ValidationError::new(
                    "invalid-pattern",
                    format!("Invalid pattern for '{}': {}", key, e),
                )
            })
        })
        .collect()
}

/// Validate and return Result (for convenience).
///
/// # Errors
///
/// Returns `ConfigValidationError` joining every failed rule.
pub fn validate(config: &SetupConfig, table: &StepTable) -> Result<()> {
    let errors = validate_config(config, table);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        Err(SetupError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{CommandSpec, DetectConfig, InputConfig};

    fn table() -> StepTable {
        StepTable::builtin().unwrap()
    }

    fn input(key: &str) -> InputConfig {
        InputConfig {
            key: key.to_string(),
            question: key.to_string(),
            default: None,
            choices: Vec::new(),
            pattern: None,
            hint: None,
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&SetupConfig::default(), &table()).is_ok());
    }

    #[test]
    fn rejects_command_for_unknown_step() {
        let mut config = SetupConfig::default();
        config
            .commands
            .insert("launch_rocket".to_string(), CommandSpec::new("echo"));

        let errors = validate_config(&config, &table());
        assert!(errors
            .iter()
            .any(|e| e.rule == "unknown-command-step" && e.step.as_deref() == Some("launch_rocket")));
    }

    #[test]
    fn rejects_empty_command() {
        let mut config = SetupConfig::default();
        config
            .commands
            .insert("deploy_app".to_string(), CommandSpec::new("  "));

        let errors = validate_config(&config, &table());
        assert!(errors.iter().any(|e| e.rule == "empty-command"));
    }

    #[test]
    fn rejects_unknown_skip_step() {
        let mut config = SetupConfig::default();
        config.skip_steps.push("nope".to_string());

        let errors = validate_config(&config, &table());
        assert!(errors.iter().any(|e| e.rule == "unknown-skip-step"));
    }

    #[test]
    fn rejects_duplicate_inputs() {
        let mut config = SetupConfig::default();
        config.inputs = vec![input("A"), input("A")];

        let errors = validate_config(&config, &table());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule, "duplicate-input");
    }

    #[test]
    fn rejects_default_outside_choices() {
        let mut config = SetupConfig::default();
        config.inputs = vec![InputConfig {
            choices: vec!["us".to_string(), "eu".to_string()],
            default: Some("ap".to_string()),
            ..input("REGION")
        }];

        let errors = validate_config(&config, &table());
        assert!(errors.iter().any(|e| e.rule == "invalid-default"));
    }

    #[test]
    fn rejects_bad_patterns() {
        let mut config = SetupConfig::default();
        config.inputs = vec![InputConfig {
            pattern: Some("([a-z".to_string()),
            ..input("NAME")
        }];
        config.detect.insert(
            "HOST".to_string(),
            DetectConfig {
                run: "echo".to_string(),
                pattern: Some("[".to_string()),
            },
        );

        let errors = validate_config(&config, &table());
        assert_eq!(errors.iter().filter(|e| e.rule == "invalid-pattern").count(), 2);
    }

    #[test]
    fn validate_joins_messages() {
        let mut config = SetupConfig::default();
        config.skip_steps = vec!["x".to_string(), "y".to_string()];

        let err = validate(&config, &table()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'x'"));
        assert!(msg.contains("'y'"));
        assert!(err.is_configuration());
    }
}
