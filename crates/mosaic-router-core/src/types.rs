//! Common types for the router module
//!
//! Composed routes are immutable snapshots produced by the composer.

use std::fmt;

use mosaic_types::{Policies, ViewRef};
use serde::{Deserialize, Serialize};

/// Suffix of the generated name of unnamed routes (`"/todo (unnamed)"`)
pub const UNNAMED_SUFFIX: &str = " (unnamed)";

/// View rendered by fallback routes and unmatched paths
pub const NOT_FOUND_VIEW: &str = "core/NotFound";

/// Generated name for an unnamed route at `path`
pub fn unnamed_route_name(path: &str) -> String {
    format!("{path}{UNNAMED_SUFFIX}")
}

/// Route role in the composed tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteKind {
    /// Renders a view
    Leaf,
    /// Groups children, never renders itself
    Container,
    /// Synthetic not-found leaf under a prefix container
    Fallback,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Leaf => write!(f, "leaf"),
            RouteKind::Container => write!(f, "container"),
            RouteKind::Fallback => write!(f, "fallback"),
        }
    }
}

/// What a composed route renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedView {
    Inline(ViewRef),
    /// Lazily loaded module (catalog key)
    Lazy { module: String },
    NotFound { fallback_path: String },
}

impl ResolvedView {
    pub fn lazy_module(&self) -> Option<&str> {
        match self {
            ResolvedView::Lazy { module } => Some(module),
            _ => None,
        }
    }
}

/// Resolved prefetch hint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefetchTarget {
    /// `"<feature>:<normalized hint>"`
    pub key: String,
    /// Catalog key of the module to warm up
    pub module: String,
}

/// Route after composition: absolute path, metadata and resolved view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedRoute {
    pub path: String,
    pub index: bool,
    pub kind: RouteKind,
    pub feature_name: Option<String>,
    pub route_name: String,
    pub feature_version: Option<String>,
    pub policies: Policies,
    pub view: Option<ResolvedView>,
    pub loading_fallback: Option<ViewRef>,
    pub prefetch: Vec<PrefetchTarget>,
    pub children: Vec<ComposedRoute>,
}

impl ComposedRoute {
    /// Synthetic container grouping a feature's prefix-relative routes
    pub fn container(
        path: impl Into<String>,
        feature_name: Option<String>,
        children: Vec<ComposedRoute>,
    ) -> Self {
        let path = path.into();
        Self {
            route_name: unnamed_route_name(&path),
            path,
            index: false,
            kind: RouteKind::Container,
            feature_name,
            feature_version: None,
            policies: Policies::new(),
            view: None,
            loading_fallback: None,
            prefetch: Vec::new(),
            children,
        }
    }

    /// Synthetic index leaf rendering `NotFound` at `path`
    pub fn fallback(path: impl Into<String>, feature_name: Option<String>) -> Self {
        let path = path.into();
        Self {
            route_name: unnamed_route_name(&path),
            view: Some(ResolvedView::NotFound {
                fallback_path: path.clone(),
            }),
            path,
            index: true,
            kind: RouteKind::Fallback,
            feature_name,
            feature_version: None,
            policies: Policies::new(),
            loading_fallback: None,
            prefetch: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind == RouteKind::Container
    }

    /// Leaves and fallbacks: routes a path can land on
    pub fn is_routable(&self) -> bool {
        !self.is_container()
    }
}
