//! Feature dependency graph (from `dependencies` in feature.config)

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::workspace::FeatureWorkspace;

/// Forward and reverse dependency edges between features
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    forward: BTreeMap<String, Vec<String>>,
    reverse: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn from_workspace(workspace: &FeatureWorkspace) -> Self {
        Self::from_edges(
            workspace
                .features()
                .iter()
                .map(|f| (f.name.clone(), f.config.dependency_names())),
        )
    }

    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut graph = Self::default();
        for (feature, deps) in edges {
            for dep in &deps {
                graph
                    .reverse
                    .entry(dep.clone())
                    .or_default()
                    .push(feature.clone());
            }
            graph.forward.insert(feature, deps);
        }
        for dependents in graph.reverse.values_mut() {
            dependents.sort();
        }
        graph
    }

    pub fn dependencies(&self, feature: &str) -> &[String] {
        self.forward.get(feature).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependents(&self, feature: &str) -> &[String] {
        self.reverse.get(feature).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `feature` plus everything it transitively depends on; cycles are tolerated
    pub fn closure(&self, feature: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let mut stack = vec![feature.to_string()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for dep in self.dependencies(&current) {
                if !visited.contains(dep) {
                    stack.push(dep.clone());
                }
            }
        }
        visited
    }
}

impl fmt::Display for DependencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(items: &[String]) -> String {
            if items.is_empty() {
                "(none)".to_string()
            } else {
                items.join(", ")
            }
        }

        writeln!(f, "Dependency graph (feature -> dependencies):")?;
        for (feature, deps) in &self.forward {
            writeln!(f, "  {feature} -> {}", list(deps))?;
        }
        writeln!(f)?;
        writeln!(f, "Reverse dependencies (feature -> dependents):")?;
        for feature in self.forward.keys() {
            writeln!(f, "  {feature} <- {}", list(self.dependents(feature)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> DependencyGraph {
        DependencyGraph::from_edges(vec![
            ("todo".to_string(), vec!["user".to_string()]),
            ("user".to_string(), vec!["session".to_string()]),
            ("session".to_string(), vec!["user".to_string()]),
            ("billing".to_string(), vec![]),
        ])
    }

    #[test]
    fn test_closure_handles_cycles() {
        let closure = graph().closure("todo");
        assert_eq!(
            closure.into_iter().collect::<Vec<_>>(),
            vec!["session", "todo", "user"]
        );
        assert_eq!(graph().closure("billing").len(), 1);
    }

    #[test]
    fn test_reverse_edges() {
        let graph = graph();
        assert_eq!(graph.dependents("user"), &["session".to_string(), "todo".to_string()]);
        assert!(graph.dependents("billing").is_empty());
    }

    #[test]
    fn test_display() {
        let rendered = graph().to_string();
        assert!(rendered.contains("  todo -> user"));
        assert!(rendered.contains("  billing -> (none)"));
        assert!(rendered.contains("  user <- session, todo"));
    }
}
