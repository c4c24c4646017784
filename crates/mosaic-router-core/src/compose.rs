//! Route Composer
//!
//! Turns per-feature route declarations into one tree of absolute routes.
//!
//! ```text
//! FeatureDescriptor (prefix "todo")        ComposedRoute
//!   ""        -> TodoPage          ==>       /todo            (container)
//!   "list"    -> ListPage                      /todo          (index leaf)
//!   "/inbox"  -> InboxPage                     /todo/list     (leaf)
//!                                            /inbox           (absolute leaf)
//! ```
//!
//! Absolute routes of a feature come first, then its prefix-relative routes
//! wrapped in one container at `/<prefix>`. When none of the wrapped routes is
//! index-like a `NotFound` fallback leaf is appended so the bare prefix path
//! never lands on a sibling.

use std::sync::Arc;

use mosaic_types::{FeatureDescriptor, Policies, RouteNode, ViewRef};
use tracing::debug;

use crate::error::RouteConfigurationError;
use crate::lazy::{prefetch_key, LazyResolver};
use crate::path::{feature_prefix, normalize_route_path, prefix_parent};
use crate::types::{
    unnamed_route_name, ComposedRoute, PrefetchTarget, ResolvedView, RouteKind,
};
use crate::walk;

/// Composes feature descriptors, resolving lazy views through a [`LazyResolver`]
pub struct Composer {
    resolver: Arc<LazyResolver>,
}

impl Composer {
    pub fn new(resolver: Arc<LazyResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<LazyResolver> {
        &self.resolver
    }

    /// Compose all descriptors in declaration order.
    ///
    /// The first invalid route aborts the whole composition.
    pub fn compose(
        &self,
        descriptors: &[FeatureDescriptor],
    ) -> Result<Vec<ComposedRoute>, RouteConfigurationError> {
        let mut routes = Vec::new();
        for descriptor in descriptors {
            routes.extend(self.compose_feature(descriptor)?);
        }
        Ok(routes)
    }

    /// Compose a single feature
    pub fn compose_feature(
        &self,
        descriptor: &FeatureDescriptor,
    ) -> Result<Vec<ComposedRoute>, RouteConfigurationError> {
        if descriptor.routes.is_empty() {
            return Ok(Vec::new());
        }

        let prefix = feature_prefix(descriptor);
        let parent = prefix_parent(prefix.as_deref());

        let (absolute, relative): (Vec<RouteNode>, Vec<RouteNode>) = descriptor
            .routes
            .iter()
            .cloned()
            .partition(RouteNode::is_absolute);

        let mut wrap = |node: &RouteNode, path: &str, children: Vec<ComposedRoute>| {
            self.wrap_node(descriptor, node, path, children)
        };

        let mut composed = walk::try_map(&absolute, "", &mut wrap)?;
        let relative_routes = walk::try_map(&relative, &parent, &mut wrap)?;

        match prefix {
            Some(_) if !relative_routes.is_empty() => {
                let container_path = normalize_route_path(&parent);
                let mut children = relative_routes;
                if !relative.iter().any(RouteNode::is_index_like) {
                    children.push(ComposedRoute::fallback(
                        container_path.clone(),
                        Some(descriptor.name.clone()),
                    ));
                }

                let mut container =
                    ComposedRoute::container(container_path, Some(descriptor.name.clone()), children);
                container.feature_version = descriptor.config.version.clone();
                container.policies = descriptor.config.policies.clone().unwrap_or_default();
                composed.push(container);
            }
            _ => composed.extend(relative_routes),
        }

        debug!(
            feature = %descriptor.name,
            prefix = ?prefix,
            top_level = composed.len(),
            "Feature routes composed"
        );
        Ok(composed)
    }

    fn wrap_node(
        &self,
        descriptor: &FeatureDescriptor,
        node: &RouteNode,
        path: &str,
        children: Vec<ComposedRoute>,
    ) -> Result<ComposedRoute, RouteConfigurationError> {
        let feature = descriptor.name.as_str();
        let route_name = node
            .name
            .clone()
            .unwrap_or_else(|| unnamed_route_name(path));

        let view = self.resolve_view(feature, node)?;
        let kind = match (&view, children.is_empty()) {
            (Some(_), _) => RouteKind::Leaf,
            (None, false) => RouteKind::Container,
            (None, true) => {
                return Err(RouteConfigurationError::MissingRenderable {
                    feature: feature.to_string(),
                    route: route_name,
                    path: path.to_string(),
                })
            }
        };

        Ok(ComposedRoute {
            path: path.to_string(),
            index: node.is_index_like(),
            kind,
            feature_name: Some(feature.to_string()),
            route_name,
            feature_version: descriptor.config.version.clone(),
            policies: merge_policies(descriptor.config.policies.as_ref(), node.policies.as_ref()),
            view,
            loading_fallback: node.loading_fallback.clone(),
            prefetch: self.resolve_prefetch(feature, &node.prefetch),
            children,
        })
    }

    /// Inline element first, then the lazy import
    fn resolve_view(
        &self,
        feature: &str,
        node: &RouteNode,
    ) -> Result<Option<ResolvedView>, RouteConfigurationError> {
        if let Some(element) = &node.element {
            return Ok(Some(ResolvedView::Inline(element.clone())));
        }
        match node.effective_lazy_import() {
            Some(hint) => {
                let module = self.resolver.resolve_view(feature, hint)?;
                Ok(Some(ResolvedView::Lazy { module }))
            }
            None => Ok(None),
        }
    }

    fn resolve_prefetch(&self, feature: &str, hints: &[String]) -> Vec<PrefetchTarget> {
        let mut targets: Vec<PrefetchTarget> = Vec::new();
        for hint in hints.iter().filter(|h| !h.is_empty()) {
            let key = prefetch_key(feature, hint);
            if targets.iter().any(|t| t.key == key) {
                continue;
            }
            if let Some(module) = self.resolver.resolve_prefetch(feature, hint) {
                targets.push(PrefetchTarget { key, module });
            }
        }
        targets
    }
}

/// Feature policies overlaid by route policies
pub fn merge_policies(feature: Option<&Policies>, route: Option<&Policies>) -> Policies {
    let mut merged = feature.cloned().unwrap_or_default();
    if let Some(route) = route {
        merged.extend(route.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}

/// View shown for an unmatched path
pub fn not_found_view() -> ViewRef {
    ViewRef::new(crate::types::NOT_FOUND_VIEW)
}
