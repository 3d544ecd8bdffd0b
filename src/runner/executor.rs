//! The executor loop: drives the tracker to completion one step at a time.

use std::path::Path;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{info, warn};

use crate::config::SetupConfig;
use crate::error::{Result, SetupError};
use crate::steps::{StepContext, StepOutcome, StepRegistry};
use crate::ui::{format_duration, UserInterface};

use super::context::SetupContext;
use super::definition::StepDefinition;
use super::tracker::ProgressTracker;

/// Result data key holding the warnings of a partial success.
pub const WARNINGS_KEY: &str = "warnings";

/// Reason recorded for steps listed in `skip_steps`.
const DISABLED_REASON: &str = "Disabled in configuration";

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Every step is `Completed` or `Skipped`.
    pub success: bool,
    /// Step whose failure halted the loop.
    pub failed_step: Option<String>,
    /// Steps whose bodies ran in this process, in order.
    pub executed: Vec<String>,
    /// Wall-clock time of the run.
    pub duration: Duration,
}

/// Runs step bodies in the order the tracker hands them out.
///
/// Halts on the first failure; a later run retries that step first.
pub struct StepExecutor<'a> {
    registry: &'a StepRegistry,
    config: &'a SetupConfig,
    project_root: &'a Path,
    dry_run: bool,
}

impl<'a> StepExecutor<'a> {
    /// Create an executor.
    pub fn new(registry: &'a StepRegistry, config: &'a SetupConfig, project_root: &'a Path) -> Self {
        Self {
            registry,
            config,
            project_root,
            dry_run: false,
        }
    }

    /// Describe instead of act.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run every eligible step, then print the final summary.
    ///
    /// Configuration errors are returned before any state changes. A
    /// failing body is recorded and reported, not returned.
    pub fn run(
        &self,
        tracker: &mut ProgressTracker,
        ui: &mut dyn UserInterface,
    ) -> Result<RunOutcome> {
        self.registry.validate(tracker.table())?;
        let start = Instant::now();

        if let Some(warning) = tracker.load_warning() {
            ui.warning(&format!("Saved progress was unreadable, starting fresh: {}", warning));
        }
        self.apply_skips(tracker)?;

        let mut setup = SetupContext::restore(tracker);
        let completed = tracker.list_completed().len();
        if completed > 0 {
            info!("Resuming with {} completed steps", completed);
        }

        let total = tracker.table().len();
        let mut executed = Vec::new();
        let mut failed_step = None;

        while let Some(id) = tracker.next_eligible_step().map(String::from) {
            if !tracker.start(&id)? {
                warn!("Step '{}' was offered but could not start", id);
                break;
            }
            let def = tracker
                .table()
                .get(&id)
                .cloned()
                .ok_or_else(|| SetupError::UnknownStep { step: id.clone() })?;
            let position = tracker.table().position(&id).map_or(0, |p| p + 1);
            ui.show_step(position, total, &def.name, &def.description);
            executed.push(id.clone());

            let step_start = Instant::now();
            let outcome = self.execute_body(&def, &mut setup, ui);
            let elapsed = format_duration(step_start.elapsed());

            match outcome {
                Ok(StepOutcome::Succeeded { mut data, warnings }) => {
                    for warning in &warnings {
                        ui.warning(warning);
                    }
                    if !warnings.is_empty() {
                        data.insert(
                            WARNINGS_KEY.to_string(),
                            Value::Array(warnings.into_iter().map(Value::String).collect()),
                        );
                    }
                    setup.absorb(&id, data.clone());
                    tracker.complete(&id, data)?;
                    ui.success(&format!("{} completed ({})", def.name, elapsed));
                }
                Ok(StepOutcome::Skipped { reason }) => {
                    tracker.skip(&id, &reason)?;
                    ui.message(&format!("{} skipped: {}", def.name, reason));
                }
                Ok(StepOutcome::Failed { message }) => {
                    tracker.fail(&id, &message)?;
                    ui.error(&format!("{} failed: {}", def.name, message));
                    failed_step = Some(id);
                    break;
                }
                Err(e) => {
                    let message = e.to_string();
                    tracker.fail(&id, &message)?;
                    ui.error(&format!("{} failed: {}", def.name, message));
                    failed_step = Some(id);
                    break;
                }
            }
        }

        let outcome = RunOutcome {
            success: failed_step.is_none() && tracker.is_complete(),
            failed_step,
            executed,
            duration: start.elapsed(),
        };
        self.show_final_results(tracker, &setup, &outcome, ui);
        Ok(outcome)
    }

    fn execute_body(
        &self,
        def: &StepDefinition,
        setup: &mut SetupContext,
        ui: &mut dyn UserInterface,
    ) -> Result<StepOutcome> {
        let body = self
            .registry
            .get(&def.id)
            .ok_or_else(|| SetupError::MissingStepBody {
                step: def.id.clone(),
            })?;
        let mut ctx = StepContext {
            step: def,
            setup,
            config: self.config,
            project_root: self.project_root,
            ui,
            dry_run: self.dry_run,
        };
        body.execute(&mut ctx)
    }

    /// Mark steps disabled in the configuration as skipped.
    fn apply_skips(&self, tracker: &mut ProgressTracker) -> Result<()> {
        for id in &self.config.skip_steps {
            let status = tracker.status(id).ok_or_else(|| SetupError::UnknownStep {
                step: id.clone(),
            })?;
            if !status.is_terminal_success() {
                tracker.skip(id, DISABLED_REASON)?;
            }
        }
        Ok(())
    }

    fn show_final_results(
        &self,
        tracker: &ProgressTracker,
        setup: &SetupContext,
        outcome: &RunOutcome,
        ui: &mut dyn UserInterface,
    ) {
        let summary = tracker.summary();

        if outcome.success {
            ui.show_header(if self.dry_run {
                "Dry Run Complete"
            } else {
                "Setup Complete"
            });
            if self.dry_run {
                ui.message("No changes were made.");
            } else {
                for (label, value) in resources(setup, self.config) {
                    ui.message(&format!("  {:<14}{}", label, value));
                }
                ui.show_hint("Start the app locally with './run.sh'");
                ui.show_hint("Check progress any time with 'autosetup status'");
            }
            ui.success(&format!(
                "{} in {}",
                summary.line(),
                format_duration(outcome.duration)
            ));
            return;
        }

        ui.show_header("Setup Incomplete");
        match &outcome.failed_step {
            Some(id) => {
                let name = tracker.table().get(id).map_or(id.as_str(), |d| d.name.as_str());
                let message = tracker
                    .step(id)
                    .and_then(|s| s.error_message.as_deref())
                    .unwrap_or("unknown error");
                ui.error(&format!("Failed at '{}': {}", name, message));
            }
            None => {
                let blocked = tracker.blocked_steps();
                if !blocked.is_empty() {
                    ui.error(&format!("Blocked steps: {}", blocked.join(", ")));
                }
            }
        }
        ui.message(&tracker.detailed_report());
        if self.dry_run {
            ui.message("No changes were made.");
        } else {
            ui.show_hint("Fix the problem above, then run 'autosetup run --resume'");
            ui.show_hint("Inspect progress with 'autosetup status'");
        }
    }
}

/// Key resources for the success banner.
fn resources(setup: &SetupContext, config: &SetupConfig) -> Vec<(&'static str, String)> {
    let mut lines = Vec::new();
    if let (Some(catalog), Some(schema)) = (setup.get("UC_CATALOG"), setup.get("UC_SCHEMA")) {
        lines.push(("Schema:", format!("{}.{}", catalog, schema)));
    }
    if let Some(id) = setup.get("MLFLOW_EXPERIMENT_ID") {
        lines.push(("Experiment:", id.to_string()));
    }
    if let Some(app) = setup.get("DATABRICKS_APP_NAME") {
        lines.push(("App:", app.to_string()));
    }
    if let Some(url) = setup.get("DATABRICKS_APP_URL") {
        lines.push(("App URL:", url.to_string()));
    }
    lines.push(("Env file:", config.env_file.display().to_string()));
    lines
}
