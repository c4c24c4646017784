//! Route table service
//!
//! Holds the current composed tree together with its name index and
//! conflict report. A rebuild composes, verifies and then swaps the whole
//! snapshot at once; readers never observe a half-built table.

use std::collections::BTreeMap;
use std::sync::Arc;

use mosaic_core::MosaicConfig;
use mosaic_types::{FeatureDescriptor, RouteManifest, ViewRef};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::compose::{not_found_view, Composer};
use crate::conflict::{detect_conflicts, ConflictReport};
use crate::error::RouterError;
use crate::lazy::LazyResolver;
use crate::path::{normalize_route_path, path_segments};
use crate::types::ComposedRoute;
use crate::walk;

/// Path parameters captured by `:name` segments (and `*` for a wildcard tail)
pub type RouteParams = BTreeMap<String, String>;

/// Outcome of matching a navigated path
#[derive(Debug, Clone, PartialEq)]
pub enum RouteMatch {
    Matched {
        route: ComposedRoute,
        params: RouteParams,
    },
    NotFound {
        path: String,
        view: ViewRef,
    },
}

impl RouteMatch {
    pub fn is_match(&self) -> bool {
        matches!(self, RouteMatch::Matched { .. })
    }

    pub fn route(&self) -> Option<&ComposedRoute> {
        match self {
            RouteMatch::Matched { route, .. } => Some(route),
            RouteMatch::NotFound { .. } => None,
        }
    }
}

/// Immutable composed tree with its indexes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSnapshot {
    pub routes: Vec<ComposedRoute>,
    pub name_index: BTreeMap<String, String>,
    pub report: ConflictReport,
    /// Manifest build the snapshot came from
    pub build_id: Option<String>,
}

impl RouteSnapshot {
    pub fn new(routes: Vec<ComposedRoute>) -> Self {
        let report = detect_conflicts(&routes);
        let name_index = build_name_index(&routes);
        Self {
            routes,
            name_index,
            report,
            build_id: None,
        }
    }

    pub fn path_by_name(&self, name: &str) -> Option<&str> {
        self.name_index.get(name).map(String::as_str)
    }

    /// Whether some leaf renders at `/`
    pub fn has_home_route(&self) -> bool {
        self.match_path("/").is_match()
    }

    /// Match a navigated path against the tree.
    ///
    /// Top-level routes are tried in declaration order; inside a route its
    /// children are tried before the route itself. The first hit wins.
    pub fn match_path(&self, path: &str) -> RouteMatch {
        let normalized = normalize_route_path(path);
        let segments = path_segments(&normalized);

        for route in &self.routes {
            if let Some(found) = match_route(route, &segments) {
                return found;
            }
        }

        debug!(path = %normalized, "No route matched");
        RouteMatch::NotFound {
            path: normalized,
            view: not_found_view(),
        }
    }
}

fn match_route(route: &ComposedRoute, segments: &[&str]) -> Option<RouteMatch> {
    for child in &route.children {
        if let Some(found) = match_route(child, segments) {
            return Some(found);
        }
    }

    if !route.is_routable() || route.view.is_none() {
        return None;
    }
    match_segments(&path_segments(&route.path), segments).map(|params| RouteMatch::Matched {
        route: route.clone(),
        params,
    })
}

/// Segment-wise pattern match: literals, `:param` captures and a `*` tail
pub fn match_segments(pattern: &[&str], segments: &[&str]) -> Option<RouteParams> {
    let mut params = RouteParams::new();
    for (i, part) in pattern.iter().enumerate() {
        if *part == "*" {
            params.insert("*".to_string(), segments.get(i..).unwrap_or(&[]).join("/"));
            return Some(params);
        }
        let segment = segments.get(i)?;
        match part.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), (*segment).to_string());
            }
            None if part == segment => {}
            None => return None,
        }
    }
    (pattern.len() == segments.len()).then_some(params)
}

/// Route name → absolute path; later registrations overwrite earlier ones
pub fn build_name_index(routes: &[ComposedRoute]) -> BTreeMap<String, String> {
    let mut index = BTreeMap::new();
    walk::visit(routes, "", &mut |route: &ComposedRoute, path: &str, _depth: usize| {
        index.insert(route.route_name.clone(), path.to_string());
    });
    index
}

/// Route table service: composer plus the current snapshot
pub struct RouteTable {
    composer: Composer,
    /// Refuse to publish a snapshot with conflicts
    strict: bool,
    snapshot: RwLock<Arc<RouteSnapshot>>,
}

impl RouteTable {
    pub fn new(resolver: Arc<LazyResolver>) -> Self {
        Self {
            composer: Composer::new(resolver),
            strict: true,
            snapshot: RwLock::new(Arc::new(RouteSnapshot::default())),
        }
    }

    /// Strict in dev mode, lenient otherwise
    pub fn for_config(resolver: Arc<LazyResolver>, config: &MosaicConfig) -> Self {
        Self::new(resolver).with_strict(config.dev_mode)
    }

    /// In non-strict mode conflicts are logged and the snapshot is published anyway
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<RouteSnapshot> {
        self.snapshot.read().clone()
    }

    /// Compose, verify and publish a new snapshot
    pub fn rebuild(&self, descriptors: &[FeatureDescriptor]) -> Result<Arc<RouteSnapshot>, RouterError> {
        self.publish(descriptors, None)
    }

    /// Rebuild from a build-time manifest
    pub fn rebuild_from_manifest(&self, manifest: &RouteManifest) -> Result<Arc<RouteSnapshot>, RouterError> {
        self.publish(&manifest.descriptors(), Some(manifest.build_id.clone()))
    }

    fn publish(
        &self,
        descriptors: &[FeatureDescriptor],
        build_id: Option<String>,
    ) -> Result<Arc<RouteSnapshot>, RouterError> {
        let routes = self.composer.compose(descriptors)?;
        let mut snapshot = RouteSnapshot::new(routes);
        snapshot.build_id = build_id;

        if !snapshot.report.is_empty() {
            if self.strict {
                return Err(RouterError::Conflicts(snapshot.report));
            }
            warn!(
                conflicts = snapshot.report.conflict_count(),
                "Publishing route table with conflicts"
            );
        }
        if !snapshot.has_home_route() {
            debug!("No home route, / renders NotFound");
        }

        let snapshot = Arc::new(snapshot);
        *self.snapshot.write() = snapshot.clone();

        info!(
            features = descriptors.len(),
            top_level = snapshot.routes.len(),
            names = snapshot.name_index.len(),
            build_id = ?snapshot.build_id,
            "Route table rebuilt"
        );
        Ok(snapshot)
    }

    /// Drop the snapshot and every memoized resolution
    pub fn reset(&self) {
        *self.snapshot.write() = Arc::new(RouteSnapshot::default());
        self.composer.resolver().reset();
        debug!("Route table reset");
    }

    pub fn path_by_name(&self, name: &str) -> Option<String> {
        self.snapshot.read().path_by_name(name).map(str::to_string)
    }

    /// Path of a named route, for building links
    pub fn resolve_link(&self, name: &str) -> Result<String, RouterError> {
        self.path_by_name(name)
            .ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))
    }

    pub fn match_path(&self, path: &str) -> RouteMatch {
        self.snapshot().match_path(path)
    }
}
