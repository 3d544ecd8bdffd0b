//! The step definition table.
//!
//! Definitions are declared once at startup and never mutated. Declaration
//! order doubles as scheduling priority.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Result, SetupError};

use super::dependency::DependencyGraph;

/// Static description of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDefinition {
    /// Unique, durable key.
    pub id: String,
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Ids that must be `Completed` or `Skipped` before this step may start.
    pub dependencies: Vec<String>,
}

impl StepDefinition {
    /// Create a definition without dependencies.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            dependencies: Vec::new(),
        }
    }

    /// Add dependencies.
    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(deps.into_iter().map(Into::into));
        self
    }
}

/// Validated, ordered collection of step definitions.
#[derive(Debug, Clone)]
pub struct StepTable {
    steps: Vec<StepDefinition>,
    positions: HashMap<String, usize>,
    graph: DependencyGraph,
}

impl StepTable {
    /// Start building a table.
    pub fn builder() -> StepTableBuilder {
        StepTableBuilder::default()
    }

    /// Build a table from definitions, in order.
    pub fn from_definitions(steps: impl IntoIterator<Item = StepDefinition>) -> Result<Self> {
        steps
            .into_iter()
            .fold(Self::builder(), StepTableBuilder::step)
            .build()
    }

    /// The provisioning and deployment workflow.
    pub fn builtin() -> Result<Self> {
        Self::builder()
            .step(StepDefinition::new(
                "validate_prerequisites",
                "Validate Prerequisites",
                "Check CLI auth, tools, and workspace connectivity",
            ))
            .step(
                StepDefinition::new(
                    "detect_environment",
                    "Detect Environment",
                    "Auto-discover workspace settings and suggest configurations",
                )
                .depends_on(["validate_prerequisites"]),
            )
            .step(
                StepDefinition::new(
                    "collect_user_input",
                    "Collect User Input",
                    "Gather required configuration from user",
                )
                .depends_on(["detect_environment"]),
            )
            .step(
                StepDefinition::new(
                    "validate_config",
                    "Validate Configuration",
                    "Validate environment configuration",
                )
                .depends_on(["collect_user_input"]),
            )
            .step(
                StepDefinition::new(
                    "show_installation_preview",
                    "Installation Preview",
                    "Show what will be created and get user confirmation",
                )
                .depends_on(["validate_config"]),
            )
            .step(
                StepDefinition::new(
                    "create_catalog_schema",
                    "Create Catalog & Schema",
                    "Create Unity Catalog resources if needed",
                )
                .depends_on(["show_installation_preview"]),
            )
            .step(
                StepDefinition::new(
                    "create_experiment",
                    "Create MLflow Experiment",
                    "Create MLflow experiment for tracking",
                )
                .depends_on(["create_catalog_schema"]),
            )
            .step(
                StepDefinition::new(
                    "create_app",
                    "Create Databricks App",
                    "Create Databricks App resource",
                )
                .depends_on(["create_experiment"]),
            )
            .step(
                StepDefinition::new(
                    "generate_env_file",
                    "Generate Environment File",
                    "Create the environment file with all configuration",
                )
                .depends_on(["create_app"]),
            )
            .step(
                StepDefinition::new(
                    "install_dependencies",
                    "Install Dependencies",
                    "Install Python and frontend dependencies",
                )
                .depends_on(["generate_env_file"]),
            )
            .step(
                StepDefinition::new(
                    "load_sample_data",
                    "Load Sample Data",
                    "Run setup scripts to load prompts, traces, and evaluations",
                )
                .depends_on(["install_dependencies"]),
            )
            .step(
                StepDefinition::new(
                    "validate_local_setup",
                    "Validate Local Setup",
                    "Test local development server functionality",
                )
                .depends_on(["load_sample_data"]),
            )
            .step(
                StepDefinition::new(
                    "setup_permissions",
                    "Setup Permissions",
                    "Configure permissions for app service principal",
                )
                .depends_on(["create_app"]),
            )
            .step(
                StepDefinition::new(
                    "deploy_app",
                    "Deploy Application",
                    "Build and deploy app to Databricks",
                )
                .depends_on(["validate_local_setup", "setup_permissions"]),
            )
            .step(
                StepDefinition::new(
                    "validate_deployment",
                    "Validate Deployment",
                    "Test deployed app functionality",
                )
                .depends_on(["setup_permissions"]),
            )
            .step(
                StepDefinition::new(
                    "run_integration_tests",
                    "Integration Tests",
                    "Run end-to-end integration tests",
                )
                .depends_on(["validate_deployment"]),
            )
            .build()
    }

    /// Definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter()
    }

    /// Step ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.id.as_str())
    }

    /// Look up a definition.
    pub fn get(&self, id: &str) -> Option<&StepDefinition> {
        self.positions.get(id).map(|&i| &self.steps[i])
    }

    /// Declaration index of a step.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Whether the table declares `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The validated dependency graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}

/// Builder for [`StepTable`].
#[derive(Debug, Default)]
pub struct StepTableBuilder {
    steps: Vec<StepDefinition>,
}

impl StepTableBuilder {
    /// Append a definition.
    pub fn step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    /// Validate and build.
    ///
    /// Rejects duplicate ids, dependencies on undeclared steps, and cycles.
    pub fn build(self) -> Result<StepTable> {
        let mut positions = HashMap::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            if positions.insert(step.id.clone(), index).is_some() {
                return Err(SetupError::DuplicateStep {
                    step: step.id.clone(),
                });
            }
        }

        let graph = self
            .steps
            .iter()
            .fold(DependencyGraph::builder(), |builder, step| {
                builder.add_step(step.id.as_str(), step.dependencies.iter().map(String::as_str))
            })
            .build()?;

        if let Some(cycle) = graph.find_cycle() {
            return Err(SetupError::CircularDependency {
                cycle: cycle.join(" -> "),
            });
        }

        Ok(StepTable {
            steps: self.steps,
            positions,
            graph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        let table = StepTable::builtin().unwrap();
        assert_eq!(table.len(), 16);
        assert_eq!(table.ids().next(), Some("validate_prerequisites"));
        assert_eq!(table.ids().last(), Some("run_integration_tests"));
    }

    #[test]
    fn builtin_deploy_waits_for_local_validation_and_permissions() {
        let table = StepTable::builtin().unwrap();
        let deploy = table.get("deploy_app").unwrap();
        assert_eq!(
            deploy.dependencies,
            vec!["validate_local_setup".to_string(), "setup_permissions".to_string()]
        );
    }

    #[test]
    fn preserves_declaration_order() {
        let table = StepTable::from_definitions([
            StepDefinition::new("b", "B", ""),
            StepDefinition::new("a", "A", "").depends_on(["b"]),
        ])
        .unwrap();

        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(table.position("a"), Some(1));
    }

    #[test]
    fn dependency_may_be_declared_later() {
        let table = StepTable::from_definitions([
            StepDefinition::new("a", "A", "").depends_on(["b"]),
            StepDefinition::new("b", "B", ""),
        ]);
        assert!(table.is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = StepTable::from_definitions([
            StepDefinition::new("a", "A", ""),
            StepDefinition::new("a", "Again", ""),
        ])
        .unwrap_err();
        assert!(matches!(err, SetupError::DuplicateStep { step } if step == "a"));
    }

    #[test]
    fn rejects_dangling_dependency() {
        let err = StepTable::from_definitions([
            StepDefinition::new("a", "A", "").depends_on(["missing"])
        ])
        .unwrap_err();
        assert!(matches!(err, SetupError::UnknownDependency { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn rejects_cycle() {
        let err = StepTable::from_definitions([
            StepDefinition::new("a", "A", "").depends_on(["c"]),
            StepDefinition::new("b", "B", "").depends_on(["a"]),
            StepDefinition::new("c", "C", "").depends_on(["b"]),
        ])
        .unwrap_err();
        match err {
            SetupError::CircularDependency { cycle } => assert!(cycle.contains("a -> ")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn get_unknown_returns_none() {
        let table = StepTable::builtin().unwrap();
        assert!(table.get("nope").is_none());
        assert!(!table.contains("nope"));
    }
}
