//! Dependency graph for the step definition table.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, SetupError};

/// Represents the dependency relationships between steps.
///
/// Ordered collections keep cycle reports and dependent listings stable
/// from one run to the next.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Map of step id to its direct dependencies.
    dependencies: BTreeMap<String, BTreeSet<String>>,
    /// Map of step id to steps that depend on it.
    dependents: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Create a new dependency graph builder.
    pub fn builder() -> DependencyGraphBuilder {
        DependencyGraphBuilder::new()
    }

    /// Get the direct dependencies of a step.
    pub fn dependencies_of(&self, step: &str) -> Option<&BTreeSet<String>> {
        self.dependencies.get(step)
    }

    /// Get steps that depend on the given step.
    pub fn dependents_of(&self, step: &str) -> Option<&BTreeSet<String>> {
        self.dependents.get(step)
    }

    /// Check if a step exists in the graph.
    pub fn contains(&self, step: &str) -> bool {
        self.dependencies.contains_key(step)
    }

    /// Get the number of steps in the graph.
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Find a cycle in the graph, returning the path if one exists.
    ///
    /// The returned path starts and ends with the same step.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs<'a>(
            node: &'a str,
            graph: &'a DependencyGraph,
            state: &mut BTreeMap<&'a str, State>,
            path: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            state.insert(node, State::Visiting);
            path.push(node);

            if let Some(deps) = graph.dependencies.get(node) {
                for dep in deps {
                    match state.get(dep.as_str()) {
                        Some(State::Visiting) => {
                            let start =
                                path.iter().position(|s| *s == dep.as_str()).unwrap_or(0);
                            let mut cycle: Vec<String> =
                                path[start..].iter().map(|s| s.to_string()).collect();
                            cycle.push(dep.clone());
                            return Some(cycle);
                        }
                        Some(State::Unvisited) | None => {
                            if let Some(cycle) = dfs(dep, graph, state, path) {
                                return Some(cycle);
                            }
                        }
                        Some(State::Visited) => {}
                    }
                }
            }

            path.pop();
            state.insert(node, State::Visited);
            None
        }

        let mut state: BTreeMap<&str, State> = self
            .dependencies
            .keys()
            .map(|s| (s.as_str(), State::Unvisited))
            .collect();
        let mut path = Vec::new();

        for step in self.dependencies.keys() {
            if state.get(step.as_str()) == Some(&State::Unvisited) {
                if let Some(cycle) = dfs(step, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }

    /// Get all transitive dependents of a step.
    ///
    /// Returns steps that depend on the given step, directly or indirectly.
    pub fn transitive_dependents(&self, step: &str) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        let mut to_visit = vec![step.to_string()];

        while let Some(current) = to_visit.pop() {
            if let Some(dependents) = self.dependents.get(&current) {
                for dep in dependents {
                    if result.insert(dep.clone()) {
                        to_visit.push(dep.clone());
                    }
                }
            }
        }

        result
    }
}

/// Builder for constructing a DependencyGraph.
#[derive(Debug, Default)]
pub struct DependencyGraphBuilder {
    dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraphBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step with its dependencies.
    pub fn add_step<I, S>(mut self, name: impl Into<String>, depends_on: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .entry(name.into())
            .or_default()
            .extend(depends_on.into_iter().map(Into::into));
        self
    }

    /// Build the dependency graph.
    ///
    /// Returns an error if any dependency references a non-existent step.
    /// Cycles are not rejected here; see [`DependencyGraph::find_cycle`].
    pub fn build(self) -> Result<DependencyGraph> {
        for (step, deps) in &self.dependencies {
            if let Some(dep) = deps.iter().find(|d| !self.dependencies.contains_key(*d)) {
                return Err(SetupError::UnknownDependency {
                    step: step.clone(),
                    dependency: dep.clone(),
                });
            }
        }

        // Reverse lookup
        let mut dependents: BTreeMap<String, BTreeSet<String>> = self
            .dependencies
            .keys()
            .map(|s| (s.clone(), BTreeSet::new()))
            .collect();
        for (step, deps) in &self.dependencies {
            for dep in deps {
                dependents.entry(dep.clone()).or_default().insert(step.clone());
            }
        }

        Ok(DependencyGraph {
            dependencies: self.dependencies,
            dependents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn builder_creates_empty_graph() {
        let graph = DependencyGraph::builder().build().unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn builder_adds_step_with_dependencies() {
        let graph = DependencyGraph::builder()
            .add_step("step1", NONE)
            .add_step("step2", ["step1"])
            .build()
            .unwrap();

        assert!(graph.contains("step1"));
        assert!(graph.contains("step2"));
        assert_eq!(graph.len(), 2);
        assert!(graph.dependencies_of("step2").unwrap().contains("step1"));
    }

    #[test]
    fn builder_tracks_dependents() {
        let graph = DependencyGraph::builder()
            .add_step("step1", NONE)
            .add_step("step2", ["step1"])
            .add_step("step3", ["step1"])
            .build()
            .unwrap();

        let dependents = graph.dependents_of("step1").unwrap();
        assert!(dependents.contains("step2"));
        assert!(dependents.contains("step3"));
    }

    #[test]
    fn builder_rejects_unknown_dependency() {
        let err = DependencyGraph::builder()
            .add_step("step1", ["nonexistent"])
            .build()
            .unwrap_err();

        match err {
            SetupError::UnknownDependency { step, dependency } => {
                assert_eq!(step, "step1");
                assert_eq!(dependency, "nonexistent");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_cycle_returns_none() {
        let graph = DependencyGraph::builder()
            .add_step("a", NONE)
            .add_step("b", ["a"])
            .build()
            .unwrap();

        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn simple_cycle_returns_path() {
        let graph = DependencyGraph::builder()
            .add_step("a", ["b"])
            .add_step("b", ["a"])
            .build()
            .unwrap();

        let path = graph.find_cycle().unwrap();
        assert!(path.len() >= 2);
        assert_eq!(path.first(), path.last());
    }

    #[test]
    fn longer_cycle_returns_full_path() {
        let graph = DependencyGraph::builder()
            .add_step("a", ["c"])
            .add_step("b", ["a"])
            .add_step("c", ["b"])
            .build()
            .unwrap();

        let path = graph.find_cycle().unwrap();
        assert_eq!(path, vec!["a", "c", "b", "a"]);
    }

    #[test]
    fn self_cycle_detected() {
        let graph = DependencyGraph::builder()
            .add_step("a", ["a"])
            .build()
            .unwrap();

        assert_eq!(graph.find_cycle(), Some(vec!["a".to_string(), "a".to_string()]));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let graph = DependencyGraph::builder()
            .add_step("a", NONE)
            .add_step("b", ["a"])
            .add_step("c", ["a"])
            .add_step("d", ["b", "c"])
            .build()
            .unwrap();

        assert!(graph.find_cycle().is_none());
    }

    #[test]
    fn transitive_dependents_follows_chain() {
        let graph = DependencyGraph::builder()
            .add_step("a", NONE)
            .add_step("b", ["a"])
            .add_step("c", ["b"])
            .add_step("d", NONE)
            .build()
            .unwrap();

        let deps = graph.transitive_dependents("a");
        assert_eq!(
            deps.into_iter().collect::<Vec<_>>(),
            vec!["b".to_string(), "c".to_string()]
        );
        assert!(graph.transitive_dependents("d").is_empty());
    }
}
