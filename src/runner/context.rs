//! Configuration and results accumulated across steps.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::state::ResultData;

use super::tracker::ProgressTracker;

/// Key under which input-collecting steps publish configuration values.
pub const CONFIG_KEY: &str = "config";

/// Key under which detection publishes suggested values.
pub const SUGGESTIONS_KEY: &str = "suggestions";

/// Result keys that map onto well-known configuration names.
const RESULT_ALIASES: &[(&str, &str)] = &[
    ("experiment_id", "MLFLOW_EXPERIMENT_ID"),
    ("app_name", "DATABRICKS_APP_NAME"),
];

/// Context threaded through the executor loop.
///
/// Holds the configuration collected so far, the result data of each
/// finished step, and suggestions produced by environment detection.
#[derive(Debug, Clone, Default)]
pub struct SetupContext {
    config: BTreeMap<String, String>,
    results: BTreeMap<String, ResultData>,
    suggestions: BTreeMap<String, String>,
}

impl SetupContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the context from the result data of completed steps.
    ///
    /// Reads only; steps are visited in declaration order so later steps
    /// win on conflicting keys.
    pub fn restore(tracker: &ProgressTracker) -> Self {
        let mut ctx = Self::new();
        for id in tracker.list_completed() {
            if let Some(data) = tracker.result_data(id) {
                ctx.absorb(id, data.clone());
            }
        }
        if !ctx.config.is_empty() {
            debug!(
                "Restored configuration from progress: {}",
                ctx.config.keys().cloned().collect::<Vec<_>>().join(", ")
            );
        }
        ctx
    }

    /// Fold a step's result data into the context.
    pub fn absorb(&mut self, step: &str, data: ResultData) {
        if let Some(Value::Object(values)) = data.get(CONFIG_KEY) {
            for (key, value) in values {
                if let Some(text) = value_to_string(value) {
                    self.config.insert(key.clone(), text);
                }
            }
        }
        if let Some(Value::Object(values)) = data.get(SUGGESTIONS_KEY) {
            for (key, value) in values {
                if let Some(text) = value_to_string(value) {
                    self.suggestions.insert(key.clone(), text);
                }
            }
        }
        for (result_key, config_key) in RESULT_ALIASES {
            if let Some(text) = data.get(*result_key).and_then(value_to_string) {
                self.config.insert((*config_key).to_string(), text);
            }
        }
        self.results.insert(step.to_string(), data);
    }

    /// Look up a configuration value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.config.insert(key.into(), value.into());
    }

    /// Whether a non-empty value is set for `key`.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    /// All configuration values.
    pub fn config(&self) -> &BTreeMap<String, String> {
        &self.config
    }

    /// Result data of a step completed earlier, in this run or a previous one.
    pub fn result(&self, step: &str) -> Option<&ResultData> {
        self.results.get(step)
    }

    /// Record a suggested value for a configuration key.
    pub fn suggest(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.suggestions.insert(key.into(), value.into());
    }

    /// Suggested value for a configuration key.
    pub fn suggestion(&self, key: &str) -> Option<&str> {
        self.suggestions.get(key).map(String::as_str)
    }

    /// Configuration as a JSON object, for result data.
    pub fn config_object(&self) -> Value {
        Value::Object(
            self.config
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{StepDefinition, StepTable};
    use crate::state::MemoryBackend;
    use serde_json::json;

    fn data(value: Value) -> ResultData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn absorb_merges_config_object() {
        let mut ctx = SetupContext::new();
        ctx.absorb(
            "collect_user_input",
            data(json!({"config": {"UC_CATALOG": "main", "PORT": 8000, "GONE": null}})),
        );

        assert_eq!(ctx.get("UC_CATALOG"), Some("main"));
        assert_eq!(ctx.get("PORT"), Some("8000"));
        assert_eq!(ctx.get("GONE"), None);
        assert!(ctx.result("collect_user_input").is_some());
    }

    #[test]
    fn absorb_maps_aliases() {
        let mut ctx = SetupContext::new();
        ctx.absorb("create_experiment", data(json!({"experiment_id": "1234"})));
        ctx.absorb("create_app", data(json!({"app_name": "demo-app"})));

        assert_eq!(ctx.get("MLFLOW_EXPERIMENT_ID"), Some("1234"));
        assert_eq!(ctx.get("DATABRICKS_APP_NAME"), Some("demo-app"));
    }

    #[test]
    fn restore_reads_only_completed_steps() {
        let table = StepTable::from_definitions([
            StepDefinition::new("input", "Input", ""),
            StepDefinition::new("experiment", "Experiment", "").depends_on(["input"]),
            StepDefinition::new("app", "App", "").depends_on(["experiment"]),
        ])
        .unwrap();
        let mut tracker = ProgressTracker::open(table, MemoryBackend::new());
        tracker.start("input").unwrap();
        tracker
            .complete("input", data(json!({"config": {"UC_SCHEMA": "demo"}})))
            .unwrap();
        tracker.start("experiment").unwrap();
        tracker
            .complete("experiment", data(json!({"experiment_id": "99"})))
            .unwrap();
        tracker.fail("app", "quota").unwrap();

        let ctx = SetupContext::restore(&tracker);

        assert_eq!(ctx.get("UC_SCHEMA"), Some("demo"));
        assert_eq!(ctx.get("MLFLOW_EXPERIMENT_ID"), Some("99"));
        assert!(ctx.result("app").is_none());
    }

    #[test]
    fn absorb_collects_suggestions() {
        let mut ctx = SetupContext::new();
        ctx.absorb(
            "detect_environment",
            data(json!({"suggestions": {"UC_CATALOG": "workspace"}})),
        );
        assert_eq!(ctx.suggestion("UC_CATALOG"), Some("workspace"));
        assert_eq!(ctx.get("UC_CATALOG"), None);
    }

    #[test]
    fn later_steps_win() {
        let mut ctx = SetupContext::new();
        ctx.absorb("a", data(json!({"config": {"K": "first"}})));
        ctx.absorb("b", data(json!({"config": {"K": "second"}})));
        assert_eq!(ctx.get("K"), Some("second"));
    }

    #[test]
    fn has_ignores_empty_values() {
        let mut ctx = SetupContext::new();
        ctx.set("EMPTY", "");
        ctx.set("FULL", "x");
        assert!(!ctx.has("EMPTY"));
        assert!(ctx.has("FULL"));
        assert!(!ctx.has("MISSING"));
    }

    #[test]
    fn config_object_round_trips_through_absorb() {
        let mut ctx = SetupContext::new();
        ctx.set("A", "1");
        let mut payload = ResultData::new();
        payload.insert(CONFIG_KEY.to_string(), ctx.config_object());

        let mut other = SetupContext::new();
        other.absorb("x", payload);
        assert_eq!(other.config(), ctx.config());
    }
}
