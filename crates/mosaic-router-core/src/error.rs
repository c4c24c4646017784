//! Error types for the router module

use thiserror::Error;

use crate::conflict::ConflictReport;

/// Invalid route declarations; aborts composition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteConfigurationError {
    /// A leaf route with neither an element nor a lazy import
    #[error("Route \"{route}\" in feature \"{feature}\" ({path}) has neither an element nor a lazy import")]
    MissingRenderable {
        feature: String,
        route: String,
        path: String,
    },

    /// A lazy import hint that matches no known module
    #[error(
        "Lazy import \"{import}\" of feature \"{feature}\" not found (tried: {})",
        .candidates.join(", ")
    )]
    LazyImportNotFound {
        feature: String,
        import: String,
        candidates: Vec<String>,
    },
}

/// Router error types
#[derive(Debug, Clone, Error)]
pub enum RouterError {
    #[error(transparent)]
    Configuration(#[from] RouteConfigurationError),

    /// Duplicate paths or names across features
    #[error("Route conflicts detected:\n{0}")]
    Conflicts(ConflictReport),

    /// Link to a route name nobody registered
    #[error("Unknown route name: {0}")]
    UnknownRouteName(String),
}

/// View loader failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Failed to load {module}: {reason}")]
    Failed { module: String, reason: String },
}

impl LoadError {
    pub fn failed(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            module: module.into(),
            reason: reason.into(),
        }
    }
}
