//! Validation of the collected configuration.

use super::{StepBody, StepContext, StepOutcome};

/// Body of `validate_config`.
///
/// Every required key must be set. The host must be an https URL and the
/// catalog and schema must be bare names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateConfigBody;

impl StepBody for ValidateConfigBody {
    fn execute(&self, ctx: &mut StepContext<'_>) -> crate::error::Result<StepOutcome> {
        let problems = problems(ctx);
        if problems.is_empty() {
            ctx.ui.message("Configuration is valid");
            return Ok(StepOutcome::success().insert("validated", ctx.config.required.clone()));
        }

        for problem in &problems {
            ctx.ui.error(problem);
        }
        Ok(StepOutcome::failed(problems.join("; ")))
    }
}

fn problems(ctx: &StepContext<'_>) -> Vec<String> {
    let mut problems = Vec::new();

    let missing: Vec<_> = ctx
        .config
        .required
        .iter()
        .filter(|key| !ctx.setup.has(key))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        problems.push(format!("Missing required configuration: {}", missing.join(", ")));
    }

    if let Some(host) = ctx.setup.get("DATABRICKS_HOST") {
        if !host.is_empty() && !host.starts_with("https://") {
            problems.push(format!("DATABRICKS_HOST must start with https:// (got '{}')", host));
        }
    }
    for key in ["UC_CATALOG", "UC_SCHEMA"] {
        if let Some(name) = ctx.setup.get(key) {
            if name.contains('.') {
                problems.push(format!("{} must not contain dots (got '{}')", key, name));
            }
        }
    }

    problems
}
