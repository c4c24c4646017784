//! Path/Name Resolver
//!
//! One place that turns relative segments into absolute route paths. The
//! composer, the conflict detector, the name index and the matcher all go
//! through these functions so they always agree on a route's path.

use mosaic_types::{FeatureDescriptor, RoutePrefix};

/// Collapse repeated slashes, guarantee a leading slash and drop a trailing one
pub fn normalize_route_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Resolve `segment` against the absolute `parent` path.
///
/// Segments starting with `/` are absolute and ignore the parent. An empty
/// or missing segment resolves to the parent itself (or `/`).
pub fn resolve_path(segment: Option<&str>, parent: &str) -> String {
    let segment = segment.unwrap_or("");
    if segment.starts_with('/') {
        return normalize_route_path(segment);
    }

    let parent = parent.trim_end_matches('/');
    let segment = segment.trim_start_matches('/');
    if segment.is_empty() {
        return normalize_route_path(parent);
    }
    normalize_route_path(&format!("{parent}/{segment}"))
}

/// Index-like nodes take the parent path; everything else goes through [`resolve_path`]
pub fn resolve_node_path(index_like: bool, segment: Option<&str>, parent: &str) -> String {
    if index_like {
        normalize_route_path(parent)
    } else {
        resolve_path(segment, parent)
    }
}

/// Prefix text without surrounding slashes; empty prefixes count as none
pub fn normalize_prefix(prefix: Option<&str>) -> Option<String> {
    let trimmed = prefix?.trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Effective prefix of a feature: `false`/absent mean none, `true` the feature name
pub fn feature_prefix(descriptor: &FeatureDescriptor) -> Option<String> {
    match &descriptor.route_prefix {
        None | Some(RoutePrefix::Toggle(false)) => None,
        Some(RoutePrefix::Toggle(true)) => normalize_prefix(Some(&descriptor.name)),
        Some(RoutePrefix::Path(path)) => normalize_prefix(Some(path)),
    }
}

/// Parent path for a feature's prefix-relative routes (`/<prefix>` or empty)
pub fn prefix_parent(prefix: Option<&str>) -> String {
    prefix.map(|p| format!("/{p}")).unwrap_or_default()
}

/// Lexically resolve `.` and `..` segments of a `/`-separated module path.
///
/// Leading `..` segments that would climb above the root are dropped.
pub fn normalize_module_path(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

/// Strip leading `./` and `../` segments from an import hint
pub fn strip_relative_prefix(hint: &str) -> &str {
    let mut rest = hint;
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        } else {
            return rest;
        }
    }
}

/// Non-empty segments of a route path
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
