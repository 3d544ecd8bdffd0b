//! Local setup validation.

use crate::config::EnvFileParser;

use super::command::run_command;
use super::{StepBody, StepContext, StepOutcome};

/// Body of `validate_local_setup`.
///
/// The generated env file must parse and carry every required key. A
/// command configured for the step runs afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCheckBody;

impl StepBody for LocalCheckBody {
    fn execute(&self, ctx: &mut StepContext<'_>) -> crate::error::Result<StepOutcome> {
        let path = ctx.project_path(&ctx.config.env_file);
        let display = ctx.config.env_file.display().to_string();

        if ctx.dry_run {
            ctx.ui.message(&format!("Would check {}", display));
        } else {
            if !path.exists() {
                return Ok(StepOutcome::failed(format!("{} not found", display)));
            }
            let vars = match EnvFileParser::load(&path) {
                Ok(vars) => vars,
                Err(e) => return Ok(StepOutcome::failed(format!("{}: {:#}", display, e))),
            };
            let missing: Vec<_> = ctx
                .config
                .required
                .iter()
                .filter(|key| vars.get(*key).is_none_or(|v| v.is_empty()))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                return Ok(StepOutcome::failed(format!(
                    "{} is missing: {}",
                    display,
                    missing.join(", ")
                )));
            }
            ctx.ui.message(&format!("{} contains all required keys", display));
        }

        match ctx.config.command(&ctx.step.id) {
            Some(spec) => run_command(ctx, &spec),
            None => Ok(StepOutcome::success().insert("env_file", display)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandSpec;
    use crate::steps::testing::Harness;

    fn write_env(h: &Harness, content: &str) {
        std::fs::write(h.root.path().join(".env.local"), content).unwrap();
    }

    const COMPLETE: &str = r#"DATABRICKS_HOST="https://x.cloud.databricks.com"
UC_CATALOG="workspace"
UC_SCHEMA="default"
DATABRICKS_APP_NAME="demo"
LLM_MODEL="m"
"#;

    #[test]
    fn complete_env_file_passes() {
        let mut h = Harness::new("validate_local_setup");
        write_env(&h, COMPLETE);

        let outcome = h.run(&LocalCheckBody).unwrap();

        assert!(outcome.is_success());
        assert!(h.ui.has_message("contains all required keys"));
    }

    #[test]
    fn missing_file_fails() {
        let mut h = Harness::new("validate_local_setup");

        let outcome = h.run(&LocalCheckBody).unwrap();

        assert_eq!(outcome, StepOutcome::failed(".env.local not found"));
    }

    #[test]
    fn missing_keys_fail() {
        let mut h = Harness::new("validate_local_setup");
        write_env(&h, "DATABRICKS_HOST=https://x\nUC_CATALOG=\n");

        let outcome = h.run(&LocalCheckBody).unwrap();

        let StepOutcome::Failed { message } = outcome else {
            panic!("expected failure");
        };
        assert!(message.contains("UC_CATALOG, UC_SCHEMA"));
        assert!(!message.contains("DATABRICKS_HOST"));
    }

    #[cfg(unix)]
    #[test]
    fn configured_command_runs_after_check() {
        let mut h = Harness::new("validate_local_setup");
        write_env(&h, COMPLETE);
        h.config
            .commands
            .insert("validate_local_setup".to_string(), CommandSpec::new("exit 4"));

        let outcome = h.run(&LocalCheckBody).unwrap();

        assert_eq!(outcome, StepOutcome::failed("exit code 4"));
    }
}
