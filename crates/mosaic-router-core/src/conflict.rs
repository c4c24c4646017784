//! Conflict Detector
//!
//! Proves that every routable path and every route name is registered once
//! across all features. Conflicts are never resolved by priority; a non-empty
//! report fails the build or lint step.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use mosaic_types::{FeatureDescriptor, RouteNode};
use serde::{Deserialize, Serialize};

use crate::error::RouterError;
use crate::path::{feature_prefix, prefix_parent};
use crate::types::{unnamed_route_name, ComposedRoute, RouteKind};
use crate::walk;

/// One routable node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub feature: Option<String>,
    pub path: String,
    pub name: String,
}

/// A path registered more than once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConflict {
    pub path: String,
    /// Names registered at the path, sorted
    pub names: Vec<String>,
    /// Owning features, sorted and de-duplicated
    pub features: Vec<String>,
}

/// A name registered at more than one distinct path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameConflict {
    pub name: String,
    /// Distinct paths, sorted
    pub paths: Vec<String>,
}

/// Result of a conflict detection pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub path_conflicts: Vec<PathConflict>,
    pub name_conflicts: Vec<NameConflict>,
    /// Every routable node in declaration order
    pub records: Vec<RouteRecord>,
}

impl ConflictReport {
    /// Build the report from a route inventory
    pub fn from_records(records: Vec<RouteRecord>) -> Self {
        let mut by_path: BTreeMap<&str, Vec<&RouteRecord>> = BTreeMap::new();
        let mut by_name: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for record in &records {
            by_path.entry(&record.path).or_default().push(record);
            by_name.entry(&record.name).or_default().insert(&record.path);
        }

        let path_conflicts = by_path
            .into_iter()
            .filter(|(_, owners)| owners.len() > 1)
            .map(|(path, owners)| {
                let mut names: Vec<String> = owners.iter().map(|r| r.name.clone()).collect();
                names.sort();
                let features: BTreeSet<String> =
                    owners.iter().filter_map(|r| r.feature.clone()).collect();
                PathConflict {
                    path: path.to_string(),
                    names,
                    features: features.into_iter().collect(),
                }
            })
            .collect();

        let name_conflicts = by_name
            .into_iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(name, paths)| NameConflict {
                name: name.to_string(),
                paths: paths.into_iter().map(str::to_string).collect(),
            })
            .collect();

        Self {
            path_conflicts,
            name_conflicts,
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.path_conflicts.is_empty() && self.name_conflicts.is_empty()
    }

    pub fn conflict_count(&self) -> usize {
        self.path_conflicts.len() + self.name_conflicts.len()
    }

    /// `Err(RouterError::Conflicts)` when any conflict was found
    pub fn into_result(self) -> Result<Self, RouterError> {
        if self.is_empty() {
            Ok(self)
        } else {
            Err(RouterError::Conflicts(self))
        }
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for conflict in &self.path_conflicts {
            writeln!(
                f,
                "  path {} registered {} times ({}) by [{}]",
                conflict.path,
                conflict.names.len(),
                conflict.names.join(", "),
                conflict.features.join(", ")
            )?;
        }
        for conflict in &self.name_conflicts {
            writeln!(
                f,
                "  name \"{}\" used at {}",
                conflict.name,
                conflict.paths.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Detect conflicts in a composed tree (containers and fallbacks are skipped)
pub fn detect_conflicts(routes: &[ComposedRoute]) -> ConflictReport {
    let mut records = Vec::new();
    walk::visit(routes, "", &mut |route: &ComposedRoute, path: &str, _depth: usize| {
        if route.kind == RouteKind::Leaf {
            records.push(RouteRecord {
                feature: route.feature_name.clone(),
                path: path.to_string(),
                name: route.route_name.clone(),
            });
        }
    });
    ConflictReport::from_records(records)
}

/// Detect conflicts on raw descriptors, without resolving any view
pub fn detect_descriptor_conflicts(descriptors: &[FeatureDescriptor]) -> ConflictReport {
    let mut records = Vec::new();
    for descriptor in descriptors {
        let parent = prefix_parent(feature_prefix(descriptor).as_deref());
        let (absolute, relative): (Vec<RouteNode>, Vec<RouteNode>) = descriptor
            .routes
            .iter()
            .cloned()
            .partition(RouteNode::is_absolute);

        let mut record = |node: &RouteNode, path: &str, _depth: usize| {
            if node.is_container() {
                return;
            }
            records.push(RouteRecord {
                feature: Some(descriptor.name.clone()),
                path: path.to_string(),
                name: node.name.clone().unwrap_or_else(|| unnamed_route_name(path)),
            });
        };
        walk::visit(&absolute, "", &mut record);
        walk::visit(&relative, &parent, &mut record);
    }
    ConflictReport::from_records(records)
}
