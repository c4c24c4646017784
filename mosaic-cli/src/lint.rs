//! Workspace lint
//!
//! Every problem becomes one [`Diagnostic`]. None of them stops the run;
//! the caller fails when any exist.

use std::fmt;

use anyhow::{Context, Result};
use mosaic_boundary::analyze_workspace;
use mosaic_core::FeatureWorkspace;
use mosaic_router_core::path::{feature_prefix, prefix_parent};
use mosaic_router_core::{detect_descriptor_conflicts, walk, LazyResolver, Resolution};
use mosaic_types::RouteNode;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticKind {
    PathConflict,
    NameConflict,
    MissingLazyTarget,
    MissingPrefetchTarget,
    BoundaryViolation,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            DiagnosticKind::PathConflict => "path-conflict",
            DiagnosticKind::NameConflict => "name-conflict",
            DiagnosticKind::MissingLazyTarget => "missing-lazy-target",
            DiagnosticKind::MissingPrefetchTarget => "missing-prefetch-target",
            DiagnosticKind::BoundaryViolation => "boundary-violation",
        };
        f.write_str(code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Collect route, lazy-import and boundary diagnostics for the workspace
pub fn lint_workspace(workspace: &FeatureWorkspace, resolver: &LazyResolver) -> Result<Vec<Diagnostic>> {
    let descriptors = workspace.descriptors();
    let mut diagnostics = Vec::new();

    let report = detect_descriptor_conflicts(&descriptors);
    for conflict in &report.path_conflicts {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::PathConflict,
            format!(
                "path {} registered {} times ({}) by [{}]",
                conflict.path,
                conflict.names.len(),
                conflict.names.join(", "),
                conflict.features.join(", ")
            ),
        ));
    }
    for conflict in &report.name_conflicts {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::NameConflict,
            format!("route name \"{}\" used at {}", conflict.name, conflict.paths.join(", ")),
        ));
    }

    for descriptor in &descriptors {
        let parent = prefix_parent(feature_prefix(descriptor).as_deref());
        let feature = descriptor.name.as_str();

        walk::visit(&descriptor.routes, &parent, &mut |node: &RouteNode, path: &str, _depth: usize| {
            if node.element.is_none() {
                if let Some(hint) = node.effective_lazy_import() {
                    if let Resolution::NotFound { candidates } = resolver.resolve(feature, hint) {
                        diagnostics.push(Diagnostic::new(
                            DiagnosticKind::MissingLazyTarget,
                            format!(
                                "{feature}: route {path} imports \"{hint}\" but none of [{}] exists",
                                candidates.join(", ")
                            ),
                        ));
                    }
                }
            }
            for hint in &node.prefetch {
                if resolver.resolve(feature, hint).module().is_none() {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::MissingPrefetchTarget,
                        format!("{feature}: route {path} prefetches \"{hint}\" which does not exist"),
                    ));
                }
            }
        });
    }

    let boundary = analyze_workspace(workspace).context("Boundary analysis failed")?;
    diagnostics.extend(
        boundary
            .violations
            .iter()
            .map(|violation| Diagnostic::new(DiagnosticKind::BoundaryViolation, violation.to_string())),
    );

    debug!(diagnostics = diagnostics.len(), "Lint finished");
    Ok(diagnostics)
}
