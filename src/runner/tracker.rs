//! The progress tracker: the lifecycle state machine over the step table.
//!
//! The tracker owns the [`WorkflowState`], decides which step may run next,
//! and writes the state through its [`StateBackend`] after every transition.
//! It never retries and never runs step bodies itself.
//!
//! Persistence is fail-open in both directions: an unreadable state file
//! yields an all-`Pending` store, and a failed write leaves the in-memory
//! transition in place.

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{Result, SetupError};
use crate::state::{ResultData, SessionId, StateBackend, StepState, StepStatus, WorkflowState};

use super::definition::{StepDefinition, StepTable};

/// Dependency-aware lifecycle tracker for one workflow.
pub struct ProgressTracker {
    table: StepTable,
    state: WorkflowState,
    backend: Box<dyn StateBackend>,
    session: SessionId,
    /// Step started by this process and not yet finished. Not persisted:
    /// an `InProgress` step loaded from disk is a leftover from a crash.
    in_flight: Option<String>,
    load_warning: Option<String>,
}

impl ProgressTracker {
    /// Create a tracker and load any persisted progress.
    pub fn open(table: StepTable, backend: impl StateBackend + 'static) -> Self {
        let session = SessionId::new();
        let mut state = WorkflowState::fresh(&session.to_string(), table.ids());
        let mut load_warning = None;

        match backend.load() {
            Ok(Some(persisted)) => {
                let ignored = state.merge_persisted(persisted);
                if !ignored.is_empty() {
                    debug!("Ignoring undeclared steps in state file: {}", ignored.join(", "));
                }
                debug!("Loaded progress from {}", backend.describe());
            }
            Ok(None) => debug!("No saved progress at {}", backend.describe()),
            Err(e) => {
                warn!("Could not load existing progress, starting fresh: {}", e);
                load_warning = Some(e.to_string());
            }
        }

        Self {
            table,
            state,
            backend: Box::new(backend),
            session,
            in_flight: None,
            load_warning,
        }
    }

    /// The step definition table.
    pub fn table(&self) -> &StepTable {
        &self.table
    }

    /// The full workflow state.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Identifier of this process's session.
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Where the state is persisted.
    pub fn location(&self) -> String {
        self.backend.describe()
    }

    /// Why loading fell back to a fresh store, if it did.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    /// State of one step.
    pub fn step(&self, id: &str) -> Option<&StepState> {
        self.state.get_step(id)
    }

    /// Status of one step.
    pub fn status(&self, id: &str) -> Option<StepStatus> {
        self.step(id).map(|s| s.status)
    }

    /// Result data attached to a step, if any.
    pub fn result_data(&self, id: &str) -> Option<&ResultData> {
        self.step(id).and_then(|s| s.result_data.as_ref())
    }

    /// The step this process is currently running.
    pub fn in_flight(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }

    /// Whether every dependency of `id` is `Completed` or `Skipped`.
    pub fn dependencies_met(&self, id: &str) -> bool {
        self.table.get(id).is_some_and(|def| self.unmet_dependency(def).is_none())
    }

    fn unmet_dependency<'a>(&self, def: &'a StepDefinition) -> Option<&'a str> {
        def.dependencies
            .iter()
            .find(|dep| !self.status(dep).is_some_and(|s| s.is_terminal_success()))
            .map(String::as_str)
    }

    /// First step, in declaration order, that may run now.
    ///
    /// A step qualifies when it is `Pending` or `Failed` (or `InProgress`
    /// left behind by an earlier process) and all its dependencies are
    /// satisfied. Returns `None` when everything is done or the remaining
    /// steps are blocked; [`is_complete`](Self::is_complete) tells which.
    pub fn next_eligible_step(&self) -> Option<&str> {
        self.table
            .iter()
            .find(|def| self.is_candidate(&def.id) && self.unmet_dependency(def).is_none())
            .map(|def| def.id.as_str())
    }

    fn is_candidate(&self, id: &str) -> bool {
        match self.status(id) {
            Some(StepStatus::InProgress) => self.in_flight.as_deref() != Some(id),
            Some(status) => status.is_runnable(),
            None => false,
        }
    }

    /// Move a step to `InProgress`.
    ///
    /// Returns `Ok(false)` without touching state if the step is already
    /// `Completed`, already running in this process, blocked by an unmet
    /// dependency, or if another step is in flight.
    pub fn start(&mut self, id: &str) -> Result<bool> {
        let def = self.definition(id)?;

        if self.status(id) == Some(StepStatus::Completed) {
            debug!("Step '{}' already completed", id);
            return Ok(false);
        }
        if let Some(dep) = self.unmet_dependency(def) {
            debug!("Cannot start '{}': dependency '{}' not satisfied", id, dep);
            return Ok(false);
        }
        match self.in_flight.as_deref() {
            Some(current) if current == id => {
                debug!("Step '{}' is already in progress", id);
                return Ok(false);
            }
            Some(current) => {
                warn!("Cannot start '{}' while '{}' is in progress", id, current);
                return Ok(false);
            }
            None => {}
        }

        self.step_mut(id)?.begin(Utc::now());
        self.in_flight = Some(id.to_string());
        self.state.current_step = Some(id.to_string());
        debug!("Started step '{}'", id);
        self.persist();
        Ok(true)
    }

    /// Mark an in-progress step `Completed` and attach its result data.
    ///
    /// A step that is not `InProgress` is left alone with a warning.
    pub fn complete(&mut self, id: &str, result_data: ResultData) -> Result<()> {
        let step = self.step_mut(id)?;
        if step.status != StepStatus::InProgress {
            warn!("Step '{}' is not in progress ({}); not completing", id, step.status);
            return Ok(());
        }

        step.finish(StepStatus::Completed, Utc::now());
        step.result_data = Some(result_data);
        self.release(id);
        debug!("Completed step '{}'", id);
        self.persist();
        Ok(())
    }

    /// Mark a step `Failed`, whatever its current status.
    pub fn fail(&mut self, id: &str, error_message: impl Into<String>) -> Result<()> {
        let message = error_message.into();
        let step = self.step_mut(id)?;
        step.finish(StepStatus::Failed, Utc::now());
        step.error_message = Some(message.clone());
        self.release(id);
        debug!("Failed step '{}': {}", id, message);
        self.persist();
        Ok(())
    }

    /// Mark a step `Skipped`, recording the reason.
    pub fn skip(&mut self, id: &str, reason: impl AsRef<str>) -> Result<()> {
        let reason = reason.as_ref();
        let step = self.step_mut(id)?;
        step.finish(StepStatus::Skipped, Utc::now());
        step.error_message = Some(format!("Skipped: {}", reason));
        self.release(id);
        debug!("Skipped step '{}': {}", id, reason);
        self.persist();
        Ok(())
    }

    /// Return one step to `Pending`, discarding its history and result data.
    pub fn reset(&mut self, id: &str) -> Result<()> {
        self.step_mut(id)?.clear();
        self.release(id);
        debug!("Reset step '{}'", id);
        self.persist();
        Ok(())
    }

    /// Return every step to `Pending`.
    pub fn reset_all(&mut self) {
        for step in self.state.steps.values_mut() {
            step.clear();
        }
        self.in_flight = None;
        self.state.current_step = None;
        debug!("Reset all steps");
        self.persist();
    }

    /// Delete the persisted artifact and start over in memory.
    ///
    /// Nothing is written afterwards until the next transition.
    pub fn wipe_state(&mut self) -> Result<()> {
        self.backend.wipe()?;
        self.state = WorkflowState::fresh(&self.session.to_string(), self.table.ids());
        self.in_flight = None;
        debug!("Wiped state at {}", self.backend.describe());
        Ok(())
    }

    /// Completed step ids in declaration order.
    pub fn list_completed(&self) -> Vec<&str> {
        self.ids_with(StepStatus::Completed)
    }

    /// Failed step ids in declaration order.
    pub fn list_failed(&self) -> Vec<&str> {
        self.ids_with(StepStatus::Failed)
    }

    /// Skipped step ids in declaration order.
    pub fn list_skipped(&self) -> Vec<&str> {
        self.ids_with(StepStatus::Skipped)
    }

    /// Whether every step is `Completed` or `Skipped`.
    pub fn is_complete(&self) -> bool {
        self.state.steps.values().all(|s| s.status.is_terminal_success())
    }

    /// Steps that are not done and cannot become eligible without an
    /// earlier step being retried or skipped.
    pub fn blocked_steps(&self) -> Vec<&str> {
        self.table
            .iter()
            .filter(|def| {
                !self.status(&def.id).is_some_and(|s| s.is_terminal_success())
                    && self.unmet_dependency(def).is_some()
            })
            .map(|def| def.id.as_str())
            .collect()
    }

    fn ids_with(&self, status: StepStatus) -> Vec<&str> {
        self.table
            .ids()
            .filter(|id| self.status(id) == Some(status))
            .collect()
    }

    fn definition(&self, id: &str) -> Result<&StepDefinition> {
        self.table.get(id).ok_or_else(|| SetupError::UnknownStep {
            step: id.to_string(),
        })
    }

    fn step_mut(&mut self, id: &str) -> Result<&mut StepState> {
        self.state.step_mut(id).ok_or_else(|| SetupError::UnknownStep {
            step: id.to_string(),
        })
    }

    fn release(&mut self, id: &str) {
        if self.in_flight.as_deref() == Some(id) {
            self.in_flight = None;
        }
        if self.state.current_step.as_deref() == Some(id) {
            self.state.current_step = None;
        }
    }

    fn persist(&mut self) {
        self.state.session_id = self.session.to_string();
        self.state.last_updated = Some(Utc::now());
        if let Err(e) = self.backend.save(&self.state) {
            warn!("Could not save progress: {}", e);
        }
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("location", &self.backend.describe())
            .field("in_flight", &self.in_flight)
            .field("steps", &self.table.len())
            .finish()
    }
}
