//! Configuration schema definitions.
//!
//! This module contains the structs that map to `.autosetup/config.yml`.
//! Every field has a default, so an empty or missing file describes the
//! stock provisioning workflow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Application name (for display purposes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Progress file, relative to the project root
    pub state_file: PathBuf,

    /// Generated environment file, relative to the project root
    pub env_file: PathBuf,

    /// Tools that must be on PATH
    pub requires: Vec<String>,

    /// Extra prerequisite commands that must exit successfully
    pub checks: Vec<CheckConfig>,

    /// Base configuration values, written to the env file unless overridden
    pub defaults: BTreeMap<String, String>,

    /// Commands whose output suggests a value for a configuration key
    pub detect: BTreeMap<String, DetectConfig>,

    /// Values collected from the operator, in prompt order
    pub inputs: Vec<InputConfig>,

    /// Keys that must be set before any resource is created
    pub required: Vec<String>,

    /// Shell commands for platform actions, keyed by step id.
    /// Entries here replace the built-in command for that step.
    pub commands: BTreeMap<String, CommandSpec>,

    /// Steps to mark skipped instead of running
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skip_steps: Vec<String>,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            app_name: None,
            state_file: PathBuf::from(".setup_progress.json"),
            env_file: PathBuf::from(".env.local"),
            requires: ["databricks", "uv", "bun"].map(String::from).to_vec(),
            checks: vec![CheckConfig {
                name: "Databricks CLI authentication".to_string(),
                run: "databricks auth profiles".to_string(),
                hint: Some("Run 'databricks auth login'".to_string()),
            }],
            defaults: default_values(),
            detect: default_detect(),
            inputs: default_inputs(),
            required: [
                "DATABRICKS_HOST",
                "UC_CATALOG",
                "UC_SCHEMA",
                "DATABRICKS_APP_NAME",
                "LLM_MODEL",
            ]
            .map(String::from)
            .to_vec(),
            commands: BTreeMap::new(),
            skip_steps: Vec::new(),
        }
    }
}

impl SetupConfig {
    /// Display name of the project.
    pub fn display_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or("Automated Setup")
    }

    /// Command bound to a step: the configured one, else the built-in one.
    pub fn command(&self, step: &str) -> Option<CommandSpec> {
        self.commands
            .get(step)
            .cloned()
            .or_else(|| default_commands().remove(step))
    }

    /// Whether the operator asked to skip this step.
    pub fn is_skipped(&self, step: &str) -> bool {
        self.skip_steps.iter().any(|s| s == step)
    }
}

/// A prerequisite command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Display name
    pub name: String,

    /// Command that must exit 0
    pub run: String,

    /// Shown when the check fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Detection of a suggested value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Command to run; failures are ignored
    pub run: String,

    /// Regex applied to stdout; the first match is the suggestion.
    /// Without a pattern the first non-empty line is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Prompt configuration for interactive input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Configuration key the answer is stored under
    pub key: String,

    /// Question to display
    pub question: String,

    /// Default answer, used when nothing better was detected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Fixed set of answers; turns the prompt into a selection
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,

    /// Regex the answer must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Shown when the answer does not match `pattern`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Shell command bound to a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Command line; `${KEY}` is replaced with configuration values
    pub run: String,

    /// Working directory relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Store trimmed stdout under this configuration key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<String>,

    /// JSON pointer into stdout selecting the captured value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_pointer: Option<String>,

    /// Extra result data entries, interpolated after capture
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub result: BTreeMap<String, String>,

    /// A failing command completes the step with a warning
    #[serde(default)]
    pub optional: bool,

    /// Timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl CommandSpec {
    /// A plain command.
    pub fn new(run: impl Into<String>) -> Self {
        Self {
            run: run.into(),
            cwd: None,
            capture: None,
            json_pointer: None,
            result: BTreeMap::new(),
            optional: false,
            timeout: None,
        }
    }

    fn with_result(mut self, key: &str, template: &str) -> Self {
        self.result.insert(key.to_string(), template.to_string());
        self
    }
}

fn default_values() -> BTreeMap<String, String> {
    [
        ("MLFLOW_ENABLE_ASYNC_TRACE_LOGGING", "false"),
        ("PROMPT_NAME", "email_generation"),
        ("PROMPT_ALIAS", "production"),
        ("MLFLOW_TRACKING_URI", "databricks"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_detect() -> BTreeMap<String, DetectConfig> {
    let mut detect = BTreeMap::new();
    detect.insert(
        "DATABRICKS_HOST".to_string(),
        DetectConfig {
            run: "databricks auth profiles".to_string(),
            pattern: Some(r"https://[^\s]+".to_string()),
        },
    );
    detect
}

fn default_inputs() -> Vec<InputConfig> {
    let input = |key: &str, question: &str, default: Option<&str>| InputConfig {
        key: key.to_string(),
        question: question.to_string(),
        default: default.map(String::from),
        choices: Vec::new(),
        pattern: None,
        hint: None,
    };

    vec![
        InputConfig {
            pattern: Some("^https://".to_string()),
            hint: Some("The workspace URL must start with https://".to_string()),
            ..input("DATABRICKS_HOST", "Databricks workspace URL", None)
        },
        InputConfig {
            pattern: Some(r"^[^.\s]+$".to_string()),
            hint: Some("Catalog names must not contain dots".to_string()),
            ..input("UC_CATALOG", "Unity Catalog catalog", Some("workspace"))
        },
        InputConfig {
            pattern: Some(r"^[^.\s]+$".to_string()),
            hint: Some("Schema names must not contain dots".to_string()),
            ..input("UC_SCHEMA", "Unity Catalog schema", Some("default"))
        },
        InputConfig {
            pattern: Some("^[a-z0-9-]+$".to_string()),
            hint: Some(
                "App name must contain only lowercase letters, numbers, and dashes".to_string(),
            ),
            ..input("DATABRICKS_APP_NAME", "Databricks App name", Some("mlflow-demo-app"))
        },
        input(
            "LLM_MODEL",
            "LLM serving endpoint",
            Some("databricks-claude-3-7-sonnet"),
        ),
    ]
}

/// Built-in commands for the platform action steps.
pub fn default_commands() -> BTreeMap<String, CommandSpec> {
    let mut commands = BTreeMap::new();

    commands.insert(
        "create_catalog_schema".to_string(),
        CommandSpec::new(
            "(databricks catalogs get ${UC_CATALOG} >/dev/null 2>&1 || databricks catalogs create ${UC_CATALOG}) && \
             (databricks schemas get ${UC_CATALOG}.${UC_SCHEMA} >/dev/null 2>&1 || databricks schemas create ${UC_SCHEMA} ${UC_CATALOG})",
        )
        .with_result("schema", "${UC_CATALOG}.${UC_SCHEMA}"),
    );
    commands.insert(
        "create_experiment".to_string(),
        CommandSpec {
            capture: Some("MLFLOW_EXPERIMENT_ID".to_string()),
            json_pointer: Some("/experiment_id".to_string()),
            ..CommandSpec::new(
                "databricks experiments create-experiment /Shared/${DATABRICKS_APP_NAME} --output json",
            )
        }
        .with_result("experiment_id", "${MLFLOW_EXPERIMENT_ID}"),
    );
    commands.insert(
        "create_app".to_string(),
        CommandSpec::new(
            "databricks apps get ${DATABRICKS_APP_NAME} >/dev/null 2>&1 || \
             databricks apps create ${DATABRICKS_APP_NAME} --description \"MLflow demo application - automated setup\"",
        )
        .with_result("app_name", "${DATABRICKS_APP_NAME}"),
    );
    commands.insert(
        "setup_permissions".to_string(),
        CommandSpec {
            optional: true,
            ..CommandSpec::new(
                "databricks grants update schema ${UC_CATALOG}.${UC_SCHEMA} \
                 --json '{\"changes\":[{\"principal\":\"${DATABRICKS_APP_NAME}\",\"add\":[\"ALL_PRIVILEGES\",\"MANAGE\"]}]}'",
            )
        },
    );
    commands.insert(
        "install_dependencies".to_string(),
        CommandSpec::new("uv sync && (cd client && bun install)"),
    );
    commands.insert(
        "load_sample_data".to_string(),
        CommandSpec::new(
            "for script in 1_load_prompts 2_load_sample_traces 3_run_evals_for_sample_traces \
             4_setup_monitoring 5_setup_labeling_session; do \
             if [ -f setup/$script.py ]; then uv run python setup/$script.py || exit 1; \
             else echo \"Setup script $script.py not found, skipping\"; fi; done",
        ),
    );
    commands.insert("deploy_app".to_string(), CommandSpec::new("./deploy.sh"));
    commands.insert(
        "validate_deployment".to_string(),
        CommandSpec {
            capture: Some("DATABRICKS_APP_URL".to_string()),
            json_pointer: Some("/url".to_string()),
            ..CommandSpec::new("databricks apps get ${DATABRICKS_APP_NAME} --output json")
        },
    );
    commands.insert(
        "run_integration_tests".to_string(),
        CommandSpec {
            optional: true,
            ..CommandSpec::new("curl -fsS ${DATABRICKS_APP_URL}/health")
        },
    );

    commands
}
