//! Lazy Resolver: import hint → catalog module
//!
//! Hints are written relative to the feature directory (`./pages/TodoPage.tsx`)
//! and may reach into other features (`../user/pages/LoginPage.tsx`). A hint
//! expands into an ordered candidate list; the first exact catalog hit wins,
//! then a suffix match within the feature's own modules.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::RouteConfigurationError;
use crate::lazy::catalog::{ModuleCatalog, ViewLoader};
use crate::path::{normalize_module_path, strip_relative_prefix};

/// Outcome of resolving one hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    NotFound { candidates: Vec<String> },
}

impl Resolution {
    pub fn module(&self) -> Option<&str> {
        match self {
            Resolution::Found(module) => Some(module),
            Resolution::NotFound { .. } => None,
        }
    }
}

/// Prefetch key of a hint: `"<feature>:<hint without ./>"`
pub fn prefetch_key(feature: &str, hint: &str) -> String {
    format!("{feature}:{}", hint.strip_prefix("./").unwrap_or(hint))
}

/// Resolves import hints against a [`ModuleCatalog`], memoizing per `(feature, hint)`
pub struct LazyResolver {
    catalog: Arc<dyn ModuleCatalog>,
    cache: RwLock<HashMap<(String, String), Resolution>>,
}

impl LazyResolver {
    pub fn new(catalog: Arc<dyn ModuleCatalog>) -> Self {
        Self {
            catalog,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn ModuleCatalog> {
        &self.catalog
    }

    /// Ordered, de-duplicated candidate keys for a hint
    pub fn candidates(&self, feature: &str, hint: &str) -> Vec<String> {
        let stripped = strip_relative_prefix(hint);
        let without_dot = hint.strip_prefix("./").unwrap_or(hint);

        let mut candidates = vec![
            format!("features/{feature}/{stripped}"),
            normalize_module_path(&format!("features/{feature}/{without_dot}")),
            hint.to_string(),
        ];
        if stripped.starts_with("features/") {
            candidates.push(stripped.to_string());
        }

        let segments: Vec<&str> = stripped.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() > 1 && self.catalog.feature_names().contains(segments[0]) {
            candidates.push(format!("features/{}/{}", segments[0], segments[1..].join("/")));
        }

        let mut seen = std::collections::HashSet::new();
        candidates.retain(|c| seen.insert(c.clone()));
        candidates
    }

    /// Resolve a hint, consulting the memo first
    pub fn resolve(&self, feature: &str, hint: &str) -> Resolution {
        let key = (feature.to_string(), hint.to_string());
        if let Some(cached) = self.cache.read().get(&key) {
            return cached.clone();
        }

        let resolution = self.resolve_uncached(feature, hint);
        self.cache.write().insert(key, resolution.clone());
        resolution
    }

    fn resolve_uncached(&self, feature: &str, hint: &str) -> Resolution {
        let candidates = self.candidates(feature, hint);
        for candidate in &candidates {
            trace!(feature = %feature, candidate = %candidate, "Trying lazy import candidate");
            if self.catalog.contains(candidate) {
                return Resolution::Found(candidate.clone());
            }
        }

        let stripped = strip_relative_prefix(hint);
        if !stripped.is_empty() {
            let scope = format!("features/{feature}/");
            let suffix = format!("/{stripped}");
            if let Some(module) = self
                .catalog
                .module_paths()
                .into_iter()
                .find(|path| path.starts_with(&scope) && path.ends_with(&suffix))
            {
                debug!(feature = %feature, hint = %hint, module = %module, "Lazy import resolved by suffix");
                return Resolution::Found(module);
            }
        }

        Resolution::NotFound { candidates }
    }

    /// Resolve the view of a real route; a miss is a configuration error
    pub fn resolve_view(&self, feature: &str, hint: &str) -> Result<String, RouteConfigurationError> {
        match self.resolve(feature, hint) {
            Resolution::Found(module) => Ok(module),
            Resolution::NotFound { candidates } => Err(RouteConfigurationError::LazyImportNotFound {
                feature: feature.to_string(),
                import: hint.to_string(),
                candidates,
            }),
        }
    }

    /// Resolve a prefetch hint; misses are dropped
    pub fn resolve_prefetch(&self, feature: &str, hint: &str) -> Option<String> {
        match self.resolve(feature, hint) {
            Resolution::Found(module) => Some(module),
            Resolution::NotFound { .. } => {
                debug!(feature = %feature, hint = %hint, "Prefetch target not found, dropped");
                None
            }
        }
    }

    /// Loader of a resolved module
    pub fn loader(&self, module: &str) -> Option<ViewLoader> {
        self.catalog.loader(module)
    }

    /// Forget memoized resolutions
    pub fn reset(&self) {
        self.cache.write().clear();
    }
}
