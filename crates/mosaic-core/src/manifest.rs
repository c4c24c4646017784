//! Route manifest generation
//!
//! The manifest is produced once per build from the workspace and consumed
//! by the runtime, so feature sources never need to be re-read at startup.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use mosaic_types::{FeatureManifestEntry, RouteManifest};
use tracing::info;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::workspace::FeatureWorkspace;

/// Snapshot every feature of the workspace
pub fn build_manifest(workspace: &FeatureWorkspace) -> RouteManifest {
    let generated_at_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();

    RouteManifest {
        build_id: uuid::Uuid::new_v4().to_string(),
        generated_at_ms,
        features: workspace
            .descriptors()
            .iter()
            .map(FeatureManifestEntry::from)
            .collect(),
    }
}

/// Build and write the manifest to the configured location
pub fn write_manifest(workspace: &FeatureWorkspace) -> WorkspaceResult<RouteManifest> {
    let manifest = build_manifest(workspace);
    let path = workspace.config().manifest_file();
    save_manifest(&manifest, &path)?;

    info!(
        path = %path.display(),
        build_id = %manifest.build_id,
        feature_count = manifest.features.len(),
        "Route manifest written"
    );

    Ok(manifest)
}

pub fn save_manifest(manifest: &RouteManifest, path: &Path) -> WorkspaceResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| WorkspaceError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(manifest).map_err(|source| WorkspaceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|e| WorkspaceError::io(path, e))
}

pub fn read_manifest(path: &Path) -> WorkspaceResult<RouteManifest> {
    let raw = fs::read_to_string(path).map_err(|e| WorkspaceError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|source| WorkspaceError::Json {
        path: path.to_path_buf(),
        source,
    })
}
