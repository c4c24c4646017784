//! RouteNode - Feature-authored route declaration
//!
//! Design Philosophy:
//! - A RouteNode is what a feature writes; nothing here is resolved yet
//! - Parent owns children; paths are relative to the parent unless they start with `/`
//! - A leaf must carry exactly one renderable: an inline element or a lazy import

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Route policies (auth, cache, ...). Opaque to the router, merged per route.
pub type Policies = BTreeMap<String, serde_json::Value>;

/// Reference to an inline view known to the render layer (e.g. `core/NotFound`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewRef(pub String);

impl ViewRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declarative route as exported by a feature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNode {
    /// Path segment, relative to the parent unless it starts with `/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Globally unique route name (e.g. `todo.board`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Index route: resolves to the parent path
    #[serde(default, alias = "isIndex", skip_serializing_if = "is_false")]
    pub index: bool,

    /// Import hint for the lazily loaded view (e.g. `./pages/TodoPage.tsx`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy_import: Option<String>,

    /// Keep the hint for tooling but never load it lazily
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_lazy: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<Policies>,

    /// Import hints of related views to warm up while idle
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefetch: Vec<String>,

    /// Inline view; wins over `lazy_import`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ViewRef>,

    /// View shown while the lazy view is loading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_fallback: Option<ViewRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RouteNode>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RouteNode {
    /// Create a route at `path` with the given name
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Create an index route
    pub fn index_route() -> Self {
        Self {
            index: true,
            ..Default::default()
        }
    }

    /// Set the lazy import hint
    pub fn with_lazy(mut self, hint: impl Into<String>) -> Self {
        self.lazy_import = Some(hint.into());
        self
    }

    /// Set an inline element
    pub fn with_element(mut self, view: impl Into<String>) -> Self {
        self.element = Some(ViewRef::new(view));
        self
    }

    /// Set the view shown while the lazy view loads
    pub fn with_loading_fallback(mut self, view: impl Into<String>) -> Self {
        self.loading_fallback = Some(ViewRef::new(view));
        self
    }

    /// Set the route name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set route policies
    pub fn with_policies(mut self, policies: Policies) -> Self {
        self.policies = Some(policies);
        self
    }

    /// Add prefetch hints
    pub fn with_prefetch<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefetch.extend(hints.into_iter().map(Into::into));
        self
    }

    /// Attach children
    pub fn with_children(mut self, children: Vec<RouteNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// Children as a slice (empty when absent)
    pub fn child_routes(&self) -> &[RouteNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.child_routes().is_empty()
    }

    /// Lazy import hint unless suppressed by `skip_lazy`
    pub fn effective_lazy_import(&self) -> Option<&str> {
        if self.skip_lazy {
            return None;
        }
        self.lazy_import.as_deref()
    }

    /// Whether this node can render something by itself
    pub fn has_renderable(&self) -> bool {
        self.element.is_some() || self.effective_lazy_import().is_some()
    }

    /// Container: nothing to render, at least one child
    pub fn is_container(&self) -> bool {
        !self.has_renderable() && self.has_children()
    }

    /// Index flag, empty path, or a path made only of slashes
    pub fn is_index_like(&self) -> bool {
        if self.index {
            return true;
        }
        match self.path.as_deref() {
            None => false,
            Some(path) => path.trim_matches('/').is_empty(),
        }
    }

    /// Path starts with `/` and is not index-like
    pub fn is_absolute(&self) -> bool {
        !self.is_index_like()
            && self
                .path
                .as_deref()
                .map(|path| path.starts_with('/'))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_like() {
        assert!(RouteNode::index_route().is_index_like());
        assert!(RouteNode::new("", "a").is_index_like());
        assert!(RouteNode::new("/", "a").is_index_like());
        assert!(RouteNode::new("//", "a").is_index_like());
        assert!(!RouteNode::new("list", "a").is_index_like());
        assert!(!RouteNode::default().is_index_like());
    }

    #[test]
    fn test_absolute_excludes_root_slash() {
        assert!(RouteNode::new("/settings", "a").is_absolute());
        assert!(!RouteNode::new("/", "a").is_absolute());
        assert!(!RouteNode::new("settings", "a").is_absolute());
    }

    #[test]
    fn test_container_and_renderable() {
        let leaf = RouteNode::new("a", "a").with_lazy("./pages/A.tsx");
        assert!(leaf.has_renderable());
        assert!(!leaf.is_container());

        let mut skipped = leaf.clone();
        skipped.skip_lazy = true;
        assert!(!skipped.has_renderable());

        let container = RouteNode::new("a", "a").with_children(vec![leaf]);
        assert!(container.is_container());

        let empty_children = RouteNode::new("b", "b").with_children(vec![]);
        assert!(!empty_children.is_container());
    }

    #[test]
    fn test_yaml_shape() {
        let yaml = r#"
path: ""
name: todo.board
lazyImport: ./pages/TodoPage.tsx
policies:
  auth: optional
prefetch:
  - ../user/pages/LoginPage.tsx
children:
  - isIndex: true
    element: core/Empty
"#;
        let node: RouteNode = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(node.name.as_deref(), Some("todo.board"));
        assert_eq!(node.lazy_import.as_deref(), Some("./pages/TodoPage.tsx"));
        assert_eq!(node.prefetch.len(), 1);
        assert!(node.child_routes()[0].index);
        assert_eq!(
            node.policies.unwrap().get("auth"),
            Some(&serde_json::Value::String("optional".to_string()))
        );
    }
}
