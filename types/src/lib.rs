//! Mosaic Types - the declarative model every Mosaic crate shares
//!
//! Features author [`RouteNode`] trees and a [`FeatureConfig`]; the workspace
//! loader turns them into [`FeatureDescriptor`]s, the build writes a
//! [`RouteManifest`], and the boundary analyzer consumes a [`PublicSurface`].

// ========== Declaration Model ==========
pub mod route;       // RouteNode, ViewRef, Policies
pub mod feature;     // feature.config
pub mod descriptor;  // FeatureDescriptor

// ========== Build Artifacts ==========
pub mod manifest;    // RouteManifest
pub mod surface;     // PublicSurface

pub use route::{Policies, RouteNode, ViewRef};
pub use feature::{
    Dependency, ExportDecl, FeatureConfig, Owner, PublicConfig, RoutePrefix, RouteSummary,
    DEFAULT_FEATURE_VERSION, DEFAULT_PUBLIC_ENTRY,
};
pub use descriptor::FeatureDescriptor;
pub use manifest::{FeatureManifestEntry, RouteManifest};
pub use surface::{PublicSurface, DEFAULT_EXPORT};

// Error types
pub type MosaicResult<T> = Result<T, MosaicError>;

#[derive(Debug, thiserror::Error)]
pub enum MosaicError {
    #[error("Invalid feature name: {0}")]
    InvalidFeatureName(String),
}

/// Validate a feature name: a single non-empty path segment without dots
pub fn validate_feature_name(name: &str) -> MosaicResult<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(MosaicError::InvalidFeatureName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_feature_name() {
        assert!(validate_feature_name("todo").is_ok());
        assert!(validate_feature_name("user-profile_2").is_ok());
        assert!(validate_feature_name("").is_err());
        assert!(validate_feature_name("../etc").is_err());
        assert!(validate_feature_name("a/b").is_err());
    }
}
