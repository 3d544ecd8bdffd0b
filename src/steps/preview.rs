//! Installation preview and confirmation.

use super::{StepBody, StepContext, StepOutcome};
use crate::ui::Prompt;

/// Prompt key for the confirmation; `AUTOSETUP_PROMPT_CONFIRM_INSTALL`
/// answers it in non-interactive mode.
pub const CONFIRM_KEY: &str = "confirm_install";

/// Body of `show_installation_preview`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewBody;

impl StepBody for PreviewBody {
    fn execute(&self, ctx: &mut StepContext<'_>) -> crate::error::Result<StepOutcome> {
        let value = |key: &str| ctx.setup.get(key).unwrap_or("<unset>").to_string();
        let catalog = value("UC_CATALOG");
        let schema = value("UC_SCHEMA");
        let app = value("DATABRICKS_APP_NAME");
        let host = value("DATABRICKS_HOST");
        let model = value("LLM_MODEL");

        let lines = [
            format!("Workspace:   {}", host),
            format!("Schema:      {}.{}", catalog, schema),
            format!("Experiment:  /Shared/{}", app),
            format!("App:         {}", app),
            format!("Model:       {}", model),
            format!("Env file:    {}", ctx.config.env_file.display()),
        ];
        ctx.ui.message("The following resources will be created or updated:");
        for line in &lines {
            ctx.ui.message(&format!("  {}", line));
        }

        if ctx.dry_run {
            return Ok(StepOutcome::skipped("Confirmation skipped in dry run"));
        }

        let confirmed = ctx
            .ui
            .prompt(&Prompt::confirm(CONFIRM_KEY, "Proceed with installation?", true))?
            .is_affirmative();
        if !confirmed {
            return Ok(StepOutcome::failed("Installation cancelled by user"));
        }

        Ok(StepOutcome::success()
            .insert("confirmed", true)
            .insert("schema", format!("{}.{}", catalog, schema))
            .insert("experiment_name", format!("/Shared/{}", app)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testing::Harness;

    fn harness() -> Harness {
        let mut h = Harness::new("show_installation_preview");
        h.setup.set("UC_CATALOG", "workspace");
        h.setup.set("UC_SCHEMA", "demo");
        h.setup.set("DATABRICKS_APP_NAME", "demo-app");
        h
    }

    #[test]
    fn confirmation_completes_step() {
        let mut h = harness();

        let outcome = h.run(&PreviewBody).unwrap();

        let StepOutcome::Succeeded { data, .. } = outcome else {
            panic!("expected success");
        };
        assert_eq!(data["schema"], "workspace.demo");
        assert_eq!(data["experiment_name"], "/Shared/demo-app");
        assert!(h.ui.has_message("Schema:      workspace.demo"));
        assert_eq!(h.ui.prompts_shown(), [CONFIRM_KEY.to_string()]);
    }

    #[test]
    fn declining_fails_step() {
        let mut h = harness();
        h.ui.set_prompt_response(CONFIRM_KEY, "no");

        let outcome = h.run(&PreviewBody).unwrap();

        assert_eq!(outcome, StepOutcome::failed("Installation cancelled by user"));
    }

    #[test]
    fn dry_run_does_not_ask() {
        let mut h = harness();
        h.dry_run = true;

        let outcome = h.run(&PreviewBody).unwrap();

        assert!(matches!(outcome, StepOutcome::Skipped { .. }));
        assert!(h.ui.prompts_shown().is_empty());
    }
}
