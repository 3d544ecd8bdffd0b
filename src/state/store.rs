//! Persistent step state.
//!
//! [`WorkflowState`] is the unit of persistence: a session id, the last
//! update time, the informational in-flight step, and a map from step id to
//! [`StepState`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Open key-value payload a step attaches on success.
pub type ResultData = serde_json::Map<String, serde_json::Value>;

/// Lifecycle status of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not yet attempted (or reset).
    #[default]
    Pending,
    /// Currently executing.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Finished with an error; retryable.
    Failed,
    /// Deliberately not run.
    Skipped,
}

impl StepStatus {
    /// `Completed` and `Skipped` satisfy downstream dependencies.
    pub fn is_terminal_success(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Skipped)
    }

    /// Statuses the scheduler may pick up.
    pub fn is_runnable(&self) -> bool {
        matches!(self, StepStatus::Pending | StepStatus::Failed)
    }

    /// Lowercase name used in reports and on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State for a single step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepState {
    /// Current status.
    #[serde(default)]
    pub status: StepStatus,

    /// Start of the current or most recent attempt.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,

    /// End of the most recent attempt.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    /// `end_time - start_time` in milliseconds.
    #[serde(default)]
    pub duration_ms: Option<u64>,

    /// Failure message, or the skip reason for skipped steps.
    #[serde(default)]
    pub error_message: Option<String>,

    /// Payload attached on success.
    #[serde(default)]
    pub result_data: Option<ResultData>,
}

impl StepState {
    /// Begin a new attempt, discarding the previous attempt's outcome.
    pub(crate) fn begin(&mut self, now: DateTime<Utc>) {
        self.status = StepStatus::InProgress;
        self.start_time = Some(now);
        self.end_time = None;
        self.duration_ms = None;
        self.error_message = None;
    }

    /// Close the current attempt with a terminal status.
    pub(crate) fn finish(&mut self, status: StepStatus, now: DateTime<Utc>) {
        self.status = status;
        self.end_time = Some(now);
        self.duration_ms = self.start_time.and_then(|start| elapsed_ms(start, now));
    }

    /// Return to a pristine `Pending` state.
    pub(crate) fn clear(&mut self) {
        *self = StepState::default();
    }

    /// Duration of the most recent attempt, when both ends are known.
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }
}

fn elapsed_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<u64> {
    let millis = end.signed_duration_since(start).num_milliseconds();
    u64::try_from(millis).ok()
}

/// Full persisted state of one setup workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Opaque identifier of the process that last wrote the file.
    #[serde(default)]
    pub session_id: String,

    /// When the state was last written.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    /// Step in flight at the time of the last write (informational).
    #[serde(default)]
    pub current_step: Option<String>,

    /// State for each step, keyed by step id.
    #[serde(default)]
    pub steps: BTreeMap<String, StepState>,
}

impl WorkflowState {
    /// Create an all-`Pending` state for the given step ids.
    pub fn fresh<'a>(session_id: &str, step_ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            session_id: session_id.to_string(),
            last_updated: None,
            current_step: None,
            steps: step_ids
                .into_iter()
                .map(|id| (id.to_string(), StepState::default()))
                .collect(),
        }
    }

    /// Overlay persisted state onto this state.
    ///
    /// Only ids already present are taken over; persisted ids that are no
    /// longer declared are ignored. The write timestamp and the in-flight
    /// step carry over; the session id does not. Returns the ignored ids.
    pub fn merge_persisted(&mut self, persisted: WorkflowState) -> Vec<String> {
        self.last_updated = persisted.last_updated;
        self.current_step = persisted
            .current_step
            .filter(|id| self.steps.contains_key(id));

        let mut ignored = Vec::new();
        for (id, saved) in persisted.steps {
            match self.steps.get_mut(&id) {
                Some(slot) => *slot = saved,
                None => ignored.push(id),
            }
        }
        ignored
    }

    /// Get state for a step.
    pub fn get_step(&self, id: &str) -> Option<&StepState> {
        self.steps.get(id)
    }

    /// Whether any step has left the `Pending` state.
    pub fn has_history(&self) -> bool {
        self.steps
            .values()
            .any(|s| s.status != StepStatus::Pending)
    }

    pub(crate) fn step_mut(&mut self, id: &str) -> Option<&mut StepState> {
        self.steps.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&StepStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: StepStatus = serde_json::from_str("\"skipped\"").unwrap();
        assert_eq!(parsed, StepStatus::Skipped);
    }

    #[test]
    fn terminal_success_statuses() {
        assert!(StepStatus::Completed.is_terminal_success());
        assert!(StepStatus::Skipped.is_terminal_success());
        assert!(!StepStatus::Failed.is_terminal_success());
        assert!(!StepStatus::InProgress.is_terminal_success());
        assert!(!StepStatus::Pending.is_terminal_success());
    }

    #[test]
    fn runnable_statuses() {
        assert!(StepStatus::Pending.is_runnable());
        assert!(StepStatus::Failed.is_runnable());
        assert!(!StepStatus::Completed.is_runnable());
    }

    #[test]
    fn begin_clears_previous_attempt() {
        let mut state = StepState {
            status: StepStatus::Failed,
            start_time: Some(at(0)),
            end_time: Some(at(5)),
            duration_ms: Some(5000),
            error_message: Some("boom".to_string()),
            result_data: None,
        };

        state.begin(at(10));

        assert_eq!(state.status, StepStatus::InProgress);
        assert_eq!(state.start_time, Some(at(10)));
        assert!(state.end_time.is_none());
        assert!(state.duration_ms.is_none());
        assert!(state.error_message.is_none());
    }

    #[test]
    fn finish_derives_duration() {
        let mut state = StepState::default();
        state.begin(at(0));
        state.finish(StepStatus::Completed, at(3));

        assert_eq!(state.duration_ms, Some(3000));
        assert_eq!(state.duration(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn finish_without_start_has_no_duration() {
        let mut state = StepState::default();
        state.finish(StepStatus::Failed, at(3));

        assert_eq!(state.end_time, Some(at(3)));
        assert!(state.duration_ms.is_none());
    }

    #[test]
    fn merge_ignores_undeclared_steps() {
        let mut state = WorkflowState::fresh("s1", ["a", "b"]);
        let mut persisted = WorkflowState::fresh("old", ["a", "gone"]);
        persisted.steps.get_mut("a").unwrap().status = StepStatus::Completed;
        persisted.steps.get_mut("gone").unwrap().status = StepStatus::Failed;

        let ignored = state.merge_persisted(persisted);

        assert_eq!(ignored, vec!["gone".to_string()]);
        assert_eq!(state.get_step("a").unwrap().status, StepStatus::Completed);
        assert_eq!(state.get_step("b").unwrap().status, StepStatus::Pending);
        assert!(state.get_step("gone").is_none());
        assert_eq!(state.session_id, "s1");
    }

    #[test]
    fn merge_keeps_write_time_and_declared_current_step() {
        let mut state = WorkflowState::fresh("s1", ["a", "b"]);
        let mut persisted = WorkflowState::fresh("old", ["a"]);
        persisted.last_updated = Some(at(42));
        persisted.current_step = Some("a".to_string());

        state.merge_persisted(persisted);

        assert_eq!(state.last_updated, Some(at(42)));
        assert_eq!(state.current_step.as_deref(), Some("a"));

        let mut persisted = WorkflowState::fresh("old", ["gone"]);
        persisted.current_step = Some("gone".to_string());
        state.merge_persisted(persisted);
        assert!(state.current_step.is_none());
    }

    #[test]
    fn missing_fields_default_when_parsing() {
        let json = r#"{"steps": {"a": {"status": "completed"}}}"#;
        let state: WorkflowState = serde_json::from_str(json).unwrap();
        let step = state.get_step("a").unwrap();
        assert_eq!(step.status, StepStatus::Completed);
        assert!(step.result_data.is_none());
        assert!(state.session_id.is_empty());
    }

    #[test]
    fn has_history_detects_progress() {
        let mut state = WorkflowState::fresh("s", ["a"]);
        assert!(!state.has_history());
        state.step_mut("a").unwrap().status = StepStatus::Skipped;
        assert!(state.has_history());
    }
}
