//! Step bodies: the work behind each step of the workflow.
//!
//! The executor owns scheduling and state; a [`StepBody`] only does the
//! work and reports a [`StepOutcome`]. Bodies are bound to step ids in a
//! [`StepRegistry`].
//!
//! - [`prerequisites`] - required tools and CLI checks
//! - [`detect`] - suggested values from the environment
//! - [`input`] - operator-supplied configuration
//! - [`validate`] - configuration checks
//! - [`preview`] - installation preview and confirmation
//! - [`env_file`] - environment file generation
//! - [`local_check`] - local setup validation
//! - [`command`] - shell commands for platform actions

pub mod command;
pub mod detect;
pub mod env_file;
pub mod input;
pub mod local_check;
pub mod prerequisites;
pub mod preview;
pub mod registry;
pub mod validate;

pub use command::CommandBody;
pub use detect::DetectBody;
pub use env_file::EnvFileBody;
pub use input::InputBody;
pub use local_check::LocalCheckBody;
pub use prerequisites::{check_prerequisites, PrerequisiteReport, PrerequisitesBody};
pub use preview::PreviewBody;
pub use registry::StepRegistry;
pub use validate::ValidateConfigBody;

use std::path::Path;

use serde_json::Value;

use crate::config::SetupConfig;
use crate::error::Result;
use crate::runner::{SetupContext, StepDefinition};
use crate::state::ResultData;
use crate::ui::UserInterface;

/// The work performed by one step.
pub trait StepBody {
    /// Run the step.
    ///
    /// An `Err` is treated like [`StepOutcome::Failed`] with the error's
    /// message.
    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome>;
}

/// Adapter turning a closure into a [`StepBody`].
pub struct FnBody<F>(pub F);

impl<F> StepBody for FnBody<F>
where
    F: Fn(&mut StepContext<'_>) -> Result<StepOutcome>,
{
    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        (self.0)(ctx)
    }
}

/// Everything a body may read or write while it runs.
pub struct StepContext<'a> {
    /// Definition of the running step.
    pub step: &'a StepDefinition,
    /// Configuration and results collected so far.
    pub setup: &'a mut SetupContext,
    /// Project configuration.
    pub config: &'a SetupConfig,
    /// Directory commands run in and files are written to.
    pub project_root: &'a Path,
    /// Operator interface.
    pub ui: &'a mut dyn UserInterface,
    /// Describe instead of act.
    pub dry_run: bool,
}

impl StepContext<'_> {
    /// Resolve a project-relative path.
    pub fn project_path(&self, relative: &Path) -> std::path::PathBuf {
        self.project_root.join(relative)
    }
}

/// How a body finished.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The step did its work. Warnings mark a partial success.
    Succeeded {
        data: ResultData,
        warnings: Vec<String>,
    },
    /// The step could not do its work.
    Failed { message: String },
    /// The step chose not to run.
    Skipped { reason: String },
}

impl StepOutcome {
    /// Success without result data.
    pub fn success() -> Self {
        Self::Succeeded {
            data: ResultData::new(),
            warnings: Vec::new(),
        }
    }

    /// Success with result data.
    pub fn with_data(data: ResultData) -> Self {
        Self::Succeeded {
            data,
            warnings: Vec::new(),
        }
    }

    /// Failure with a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Skip with a reason.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Add a result data entry. No-op unless succeeded.
    pub fn insert(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Self::Succeeded { data, .. } = &mut self {
            data.insert(key.to_string(), value.into());
        }
        self
    }

    /// Add a warning. No-op unless succeeded.
    pub fn warn(mut self, warning: impl Into<String>) -> Self {
        if let Self::Succeeded { warnings, .. } = &mut self {
            warnings.push(warning.into());
        }
        self
    }

    /// Whether the step succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by the body tests.

    use super::*;
    use crate::runner::StepTable;
    use crate::ui::MockUI;

    /// Owns everything a [`StepContext`] borrows.
    pub struct Harness {
        pub step: StepDefinition,
        pub setup: SetupContext,
        pub config: SetupConfig,
        pub root: tempfile::TempDir,
        pub ui: MockUI,
        pub dry_run: bool,
    }

    impl Harness {
        pub fn new(step_id: &str) -> Self {
            let step = StepTable::builtin()
                .ok()
                .and_then(|t| t.get(step_id).cloned())
                .unwrap_or_else(|| StepDefinition::new(step_id, step_id, ""));
            Self {
                step,
                setup: SetupContext::new(),
                config: SetupConfig::default(),
                root: tempfile::TempDir::new().unwrap(),
                ui: MockUI::new(),
                dry_run: false,
            }
        }

        pub fn run(&mut self, body: &dyn StepBody) -> Result<StepOutcome> {
            let mut ctx = StepContext {
                step: &self.step,
                setup: &mut self.setup,
                config: &self.config,
                project_root: self.root.path(),
                ui: &mut self.ui,
                dry_run: self.dry_run,
            };
            body.execute(&mut ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_only_touch_success() {
        let ok = StepOutcome::success().insert("app_name", "demo").warn("slow");
        match ok {
            StepOutcome::Succeeded { data, warnings } => {
                assert_eq!(data["app_name"], "demo");
                assert_eq!(warnings, vec!["slow".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }

        let failed = StepOutcome::failed("boom").insert("x", 1).warn("ignored");
        assert_eq!(failed, StepOutcome::failed("boom"));
        assert!(!failed.is_success());
    }

    #[test]
    fn closures_are_bodies() {
        let body = FnBody(|ctx: &mut StepContext<'_>| {
            ctx.setup.set("TOUCHED", "yes");
            Ok(StepOutcome::skipped("nothing to do"))
        });
        let mut harness = testing::Harness::new("custom");

        let outcome = harness.run(&body).unwrap();

        assert_eq!(outcome, StepOutcome::skipped("nothing to do"));
        assert_eq!(harness.setup.get("TOUCHED"), Some("yes"));
    }
}
