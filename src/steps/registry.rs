//! Binding of step ids to bodies.

use std::collections::HashMap;

use crate::error::{Result, SetupError};
use crate::runner::StepTable;

use super::{
    CommandBody, DetectBody, EnvFileBody, FnBody, InputBody, LocalCheckBody, PreviewBody,
    PrerequisitesBody, StepBody, StepContext, StepOutcome, ValidateConfigBody,
};

/// Steps driven by a shell command from the project configuration.
const COMMAND_STEPS: &[&str] = &[
    "create_catalog_schema",
    "create_experiment",
    "create_app",
    "install_dependencies",
    "load_sample_data",
    "setup_permissions",
    "deploy_app",
    "validate_deployment",
    "run_integration_tests",
];

/// Lookup table from step id to body.
#[derive(Default)]
pub struct StepRegistry {
    bodies: HashMap<String, Box<dyn StepBody>>,
}

impl StepRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bodies for the built-in step table.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("validate_prerequisites", PrerequisitesBody);
        registry.register("detect_environment", DetectBody);
        registry.register("collect_user_input", InputBody::default());
        registry.register("validate_config", ValidateConfigBody);
        registry.register("show_installation_preview", PreviewBody);
        registry.register("generate_env_file", EnvFileBody);
        registry.register("validate_local_setup", LocalCheckBody);
        for id in COMMAND_STEPS {
            registry.register(id, CommandBody);
        }
        registry
    }

    /// Bind `body` to `id`, replacing any earlier binding.
    pub fn register(&mut self, id: &str, body: impl StepBody + 'static) {
        self.bodies.insert(id.to_string(), Box::new(body));
    }

    /// Bind a closure to `id`.
    pub fn register_fn<F>(&mut self, id: &str, body: F)
    where
        F: Fn(&mut StepContext<'_>) -> Result<StepOutcome> + 'static,
    {
        self.register(id, FnBody(body));
    }

    /// Body bound to `id`.
    pub fn get(&self, id: &str) -> Option<&dyn StepBody> {
        self.bodies.get(id).map(Box::as_ref)
    }

    /// Whether `id` has a body.
    pub fn contains(&self, id: &str) -> bool {
        self.bodies.contains_key(id)
    }

    /// Check that every step in `table` has a body.
    pub fn validate(&self, table: &StepTable) -> Result<()> {
        match table.ids().find(|id| !self.contains(id)) {
            Some(step) => Err(SetupError::MissingStepBody {
                step: step.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.bodies.keys().collect();
        ids.sort();
        f.debug_struct("StepRegistry").field("steps", &ids).finish()
    }
}
