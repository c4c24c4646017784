//! Public contract snapshots
//!
//! Each `check` run records the declared export list of every feature under
//! `<cache>/contracts/<feature>.json`. A changed list means the feature's
//! public contract moved and its version should follow.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{WorkspaceError, WorkspaceResult};

/// Stored export list of one feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSnapshot {
    pub exports: Vec<String>,
    pub version: String,
    /// blake3 of the export list
    #[serde(default)]
    pub digest: String,
}

impl ContractSnapshot {
    pub fn new(exports: Vec<String>, version: impl Into<String>) -> Self {
        let digest = exports_digest(&exports);
        Self {
            exports,
            version: version.into(),
            digest,
        }
    }

    /// Order-sensitive comparison by digest.
    ///
    /// Snapshots written without a digest fall back to the stored list.
    pub fn differs_from(&self, exports: &[String]) -> bool {
        if self.digest.is_empty() {
            return self.exports.as_slice() != exports;
        }
        self.digest != exports_digest(exports)
    }
}

/// Hex blake3 digest of an export list
pub fn exports_digest(exports: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    for name in exports {
        hasher.update(name.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// Snapshot directory
#[derive(Debug, Clone)]
pub struct ContractStore {
    dir: PathBuf,
}

impl ContractStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, feature: &str) -> PathBuf {
        self.dir.join(format!("{feature}.json"))
    }

    /// Stored snapshot; unreadable or corrupt snapshots count as absent
    pub fn read(&self, feature: &str) -> Option<ContractSnapshot> {
        let raw = fs::read_to_string(self.path_for(feature)).ok()?;
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!(feature = %feature, error = %e, "Ignoring unreadable contract snapshot");
                None
            }
        }
    }

    pub fn write(&self, feature: &str, snapshot: &ContractSnapshot) -> WorkspaceResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| WorkspaceError::io(&self.dir, e))?;
        let path = self.path_for(feature);
        let json = serde_json::to_string_pretty(snapshot).map_err(|source| WorkspaceError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|e| WorkspaceError::io(&path, e))
    }

    /// Whether `exports` differ from the stored snapshot (no snapshot counts as changed)
    pub fn exports_changed(&self, feature: &str, exports: &[String]) -> bool {
        self.read(feature)
            .map(|snapshot| snapshot.differs_from(exports))
            .unwrap_or(true)
    }
}

/// Increment the patch component of a `major.minor.patch` version.
///
/// A pre-release version is promoted to its release (`1.2.3-beta` → `1.2.3`).
/// Unparseable versions are returned unchanged.
pub fn bump_patch(version: &str) -> String {
    let core_end = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(core_end);

    let parts: Vec<u64> = match core.split('.').map(str::parse).collect::<Result<Vec<u64>, _>>() {
        Ok(parts) if parts.len() == 3 => parts,
        _ => return version.to_string(),
    };

    if suffix.starts_with('-') {
        return format!("{}.{}.{}", parts[0], parts[1], parts[2]);
    }
    format!("{}.{}.{}", parts[0], parts[1], parts[2] + 1)
}
