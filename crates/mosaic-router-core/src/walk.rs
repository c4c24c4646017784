//! Route tree walking with an absolute-path accumulator
//!
//! Composition, conflict detection and name indexing all walk a route tree
//! while tracking the absolute path of the current node. They share the two
//! walkers here instead of each recursing on their own.

use mosaic_types::RouteNode;

use crate::path::resolve_node_path;
use crate::types::ComposedRoute;

/// A tree of routes whose nodes know how to resolve their absolute path
pub trait RouteTree: Sized {
    fn child_nodes(&self) -> &[Self];

    /// Absolute path of this node below `parent`
    fn absolute_path(&self, parent: &str) -> String;
}

impl RouteTree for RouteNode {
    fn child_nodes(&self) -> &[Self] {
        self.child_routes()
    }

    fn absolute_path(&self, parent: &str) -> String {
        resolve_node_path(self.is_index_like(), self.path.as_deref(), parent)
    }
}

impl RouteTree for ComposedRoute {
    fn child_nodes(&self) -> &[Self] {
        &self.children
    }

    fn absolute_path(&self, _parent: &str) -> String {
        self.path.clone()
    }
}

/// Pre-order walk calling `f(node, absolute_path, depth)`
pub fn visit<T, F>(nodes: &[T], parent: &str, f: &mut F)
where
    T: RouteTree,
    F: FnMut(&T, &str, usize),
{
    visit_at(nodes, parent, 0, f);
}

fn visit_at<T, F>(nodes: &[T], parent: &str, depth: usize, f: &mut F)
where
    T: RouteTree,
    F: FnMut(&T, &str, usize),
{
    for node in nodes {
        let path = node.absolute_path(parent);
        f(node, &path, depth);
        visit_at(node.child_nodes(), &path, depth + 1, f);
    }
}

/// Post-order fallible map: `f(node, absolute_path, mapped_children)`.
///
/// Stops at the first error.
pub fn try_map<T, U, E, F>(nodes: &[T], parent: &str, f: &mut F) -> Result<Vec<U>, E>
where
    T: RouteTree,
    F: FnMut(&T, &str, Vec<U>) -> Result<U, E>,
{
    nodes
        .iter()
        .map(|node| {
            let path = node.absolute_path(parent);
            let children = try_map(node.child_nodes(), &path, f)?;
            f(node, &path, children)
        })
        .collect()
}
