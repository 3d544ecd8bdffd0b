//! Shell commands for platform actions.
//!
//! Each command step runs the [`CommandSpec`] bound to its id. `${KEY}`
//! placeholders resolve against the collected configuration, then the
//! process environment; the configuration is also exported to the
//! command's environment.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::config::{resolve_string, resolve_string_with_default, CommandSpec, InterpolationContext};
use crate::error::Result;
use crate::runner::CONFIG_KEY;
use crate::shell::{execute_streaming, CommandOptions, CommandResult};

use super::{StepBody, StepContext, StepOutcome};

/// Lines of output shown when a command fails.
const ERROR_TAIL_LINES: usize = 20;

/// Body of the command-driven steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandBody;

impl StepBody for CommandBody {
    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        match ctx.config.command(&ctx.step.id) {
            Some(spec) => run_command(ctx, &spec),
            None => Ok(StepOutcome::skipped("No command configured")),
        }
    }
}

/// Run `spec` for the current step.
pub(crate) fn run_command(ctx: &mut StepContext<'_>, spec: &CommandSpec) -> Result<StepOutcome> {
    let interpolation = InterpolationContext::new(ctx.setup.config())
        .with_env(std::env::vars().collect());

    if ctx.dry_run {
        let preview = resolve_string_with_default(&spec.run, &interpolation, "<unset>");
        ctx.ui.message(&format!("Would run: {}", preview));
        return Ok(StepOutcome::success());
    }

    let command = match resolve_string(&spec.run, &interpolation) {
        Ok(command) => command,
        Err(e) => return Ok(StepOutcome::failed(e.to_string())),
    };

    let options = CommandOptions {
        cwd: Some(match &spec.cwd {
            Some(cwd) => ctx.project_path(cwd),
            None => ctx.project_root.to_path_buf(),
        }),
        env: ctx
            .setup
            .config()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<HashMap<_, _>>(),
        timeout: spec.timeout,
    };

    let mut spinner = ctx.ui.start_spinner(&format!("{}...", ctx.step.name));
    let result = execute_streaming(&command, &options, |line| spinner.output_line(line.text()))?;

    if !result.success {
        let summary = result.failure_summary();
        if spec.optional {
            spinner.finish_skipped(&format!("{} (optional)", summary));
            return Ok(StepOutcome::success()
                .warn(format!("{} failed: {}", ctx.step.name, summary)));
        }
        spinner.finish_error(&summary);
        ctx.ui
            .show_error_block(&command, &error_tail(&result), None);
        return Ok(StepOutcome::failed(summary));
    }
    spinner.finish_success(&ctx.step.name);

    let mut outcome = StepOutcome::success();
    if let Some(key) = &spec.capture {
        let Some(value) = captured_value(&result.stdout, spec.json_pointer.as_deref()) else {
            return Ok(StepOutcome::failed(match &spec.json_pointer {
                Some(pointer) => format!("Command output has no value at {}", pointer),
                None => "Command produced no output to capture".to_string(),
            }));
        };
        ctx.setup.set(key.clone(), value.clone());
        let mut config = Map::new();
        config.insert(key.clone(), Value::String(value));
        outcome = outcome.insert(CONFIG_KEY, config);
    }

    let interpolation = InterpolationContext::new(ctx.setup.config());
    for (key, template) in &spec.result {
        match resolve_string(template, &interpolation) {
            Ok(value) => outcome = outcome.insert(key, value),
            Err(e) => return Ok(StepOutcome::failed(e.to_string())),
        }
    }

    Ok(outcome)
}

/// Value captured from stdout: the trimmed text, or the JSON value at
/// `pointer`.
fn captured_value(stdout: &str, pointer: Option<&str>) -> Option<String> {
    let value = match pointer {
        Some(pointer) => {
            let json: Value = serde_json::from_str(stdout.trim()).ok()?;
            match json.pointer(pointer)? {
                Value::String(s) => s.clone(),
                Value::Null => return None,
                other => other.to_string(),
            }
        }
        None => stdout.trim().to_string(),
    };
    (!value.is_empty()).then_some(value)
}

fn error_tail(result: &CommandResult) -> String {
    let output = if result.stderr.trim().is_empty() {
        &result.stdout
    } else {
        &result.stderr
    };
    let lines: Vec<_> = output.lines().collect();
    let start = lines.len().saturating_sub(ERROR_TAIL_LINES);
    lines[start..].join("\n")
}
