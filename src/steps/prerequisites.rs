//! Prerequisite validation: required tools and CLI checks.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::SetupConfig;
use crate::shell::{execute, find_executable, CommandOptions};

use super::{StepBody, StepContext, StepOutcome};

/// Result of checking prerequisites.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PrerequisiteReport {
    /// Tools found, with their location.
    pub found: Vec<(String, PathBuf)>,
    /// Tools not on PATH.
    pub missing: Vec<String>,
    /// Checks that passed.
    pub passed_checks: Vec<String>,
    /// Failed checks with their hint, if any.
    pub failed_checks: Vec<(String, Option<String>)>,
}

impl PrerequisiteReport {
    /// Whether every tool was found and every check passed.
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.failed_checks.is_empty()
    }

    /// One message per problem.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.missing.is_empty() {
            problems.push(format!("Missing required tools: {}", self.missing.join(", ")));
        }
        for (name, hint) in &self.failed_checks {
            problems.push(match hint {
                Some(hint) => format!("{} failed ({})", name, hint),
                None => format!("{} failed", name),
            });
        }
        problems
    }
}

/// Check the tools and commands the configuration requires.
///
/// Checks only run when every tool is present, since they usually
/// invoke one of them.
pub fn check_prerequisites(config: &SetupConfig, project_root: &Path) -> PrerequisiteReport {
    let mut report = PrerequisiteReport::default();

    for tool in &config.requires {
        match find_executable(tool) {
            Some(path) => {
                tracing::debug!("Found {} at {}", tool, path.display());
                report.found.push((tool.clone(), path));
            }
            None => report.missing.push(tool.clone()),
        }
    }

    if !report.missing.is_empty() {
        return report;
    }

    let options = CommandOptions {
        cwd: Some(project_root.to_path_buf()),
        timeout: Some(60),
        ..Default::default()
    };
    for check in &config.checks {
        let passed = execute(&check.run, &options)
            .map(|r| r.success)
            .unwrap_or(false);
        if passed {
            report.passed_checks.push(check.name.clone());
        } else {
            report
                .failed_checks
                .push((check.name.clone(), check.hint.clone()));
        }
    }

    report
}

/// Body of `validate_prerequisites`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrerequisitesBody;

impl StepBody for PrerequisitesBody {
    fn execute(&self, ctx: &mut StepContext<'_>) -> crate::error::Result<StepOutcome> {
        if ctx.dry_run {
            return Ok(dry_run(ctx));
        }

        let mut spinner = ctx.ui.start_spinner("Checking prerequisites...");
        let report = check_prerequisites(ctx.config, ctx.project_root);

        if !report.is_ok() {
            spinner.finish_error("Prerequisites not met");
            let problems = report.problems();
            for problem in &problems {
                ctx.ui.error(problem);
            }
            return Ok(StepOutcome::failed(problems.join("; ")));
        }

        spinner.finish_success(&format!(
            "{} tools, {} checks",
            report.found.len(),
            report.passed_checks.len()
        ));

        let tools: Map<String, Value> = report
            .found
            .iter()
            .map(|(name, path)| (name.clone(), Value::String(path.display().to_string())))
            .collect();
        Ok(StepOutcome::success()
            .insert("tools", tools)
            .insert("checks", report.passed_checks))
    }
}

fn dry_run(ctx: &mut StepContext<'_>) -> StepOutcome {
    let config = ctx.config;
    let mut outcome = StepOutcome::success();
    for tool in &config.requires {
        if find_executable(tool).is_none() {
            outcome = outcome.warn(format!("{} is not on PATH", tool));
        }
    }
    for check in &config.checks {
        ctx.ui.message(&format!("Would run: {}", check.run));
    }
    outcome
}
