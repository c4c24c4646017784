//! Public surface extraction
//!
//! A feature's surface is its declared export list, or, when it declares
//! none, whatever its public entry file exports.

use std::fs;

use mosaic_core::{Feature, FeatureWorkspace};
use mosaic_types::PublicSurface;
use tracing::debug;

use crate::error::{BoundaryError, BoundaryResult};
use crate::scanner::scan_exports;

/// Export names found in the feature's public entry (empty when the entry is missing)
pub fn describe_exports(feature: &Feature) -> BoundaryResult<Vec<String>> {
    let entry = feature.public_entry_path();
    if !entry.is_file() {
        debug!(feature = %feature.name, entry = %entry.display(), "No public entry");
        return Ok(Vec::new());
    }
    let source = fs::read_to_string(&entry).map_err(|source| BoundaryError::Io {
        path: entry.clone(),
        source,
    })?;
    Ok(scan_exports(&source))
}

/// Exports of one feature: declared list first, entry scan otherwise
pub fn feature_exports(feature: &Feature) -> BoundaryResult<Vec<String>> {
    if feature.config.declares_exports() {
        return Ok(feature.config.declared_exports());
    }
    describe_exports(feature)
}

/// Surface of every feature in the workspace
pub fn build_surface(workspace: &FeatureWorkspace) -> BoundaryResult<PublicSurface> {
    let mut surface = PublicSurface::new();
    for feature in workspace.features() {
        let exports = feature_exports(feature)?;
        debug!(feature = %feature.name, exports = exports.len(), "Public surface collected");
        surface.declare(feature.name.clone(), exports);
    }
    Ok(surface)
}
