//! Feature scaffolding from templates
//!
//! Templates live under `templates/feature/<template>/`. Copying substitutes
//! `{{featureName}}` in file names and contents and drops `.template` suffixes.

use std::fs;
use std::path::{Path, PathBuf};

use mosaic_types::validate_feature_name;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::MosaicConfig;
use crate::error::{WorkspaceError, WorkspaceResult};

const FEATURE_NAME_PLACEHOLDER: &str = "{{featureName}}";
const TEMPLATE_SUFFIX: &str = ".template";

/// Persisted tool defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    pub feature_template: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            feature_template: "default".to_string(),
        }
    }
}

impl Defaults {
    /// Load defaults, writing the base defaults when none exist yet
    pub fn load(config: &MosaicConfig) -> WorkspaceResult<Self> {
        let path = config.defaults_path();
        if let Ok(raw) = fs::read_to_string(&path) {
            if let Ok(defaults) = serde_json::from_str(&raw) {
                return Ok(defaults);
            }
            debug!(path = %path.display(), "Unreadable defaults, resetting");
        }
        let defaults = Self::default();
        defaults.save(config)?;
        Ok(defaults)
    }

    pub fn save(&self, config: &MosaicConfig) -> WorkspaceResult<()> {
        let path = config.defaults_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| WorkspaceError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| WorkspaceError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|e| WorkspaceError::io(&path, e))
    }
}

/// Create `features/<name>` from the named template
pub fn generate_feature(
    config: &MosaicConfig,
    name: &str,
    template: &str,
) -> WorkspaceResult<PathBuf> {
    validate_feature_name(name)?;

    let template_dir = config.templates_root().join(template);
    if !template_dir.is_dir() {
        return Err(WorkspaceError::TemplateNotFound {
            name: template.to_string(),
            path: template_dir,
        });
    }

    let target = config.feature_dir(name);
    if target.exists() {
        return Err(WorkspaceError::FeatureExists(name.to_string()));
    }

    copy_template(&template_dir, &target, name)?;

    info!(feature = %name, template = %template, target = %target.display(), "Feature scaffolded");
    Ok(target)
}

fn copy_template(src: &Path, dest: &Path, feature_name: &str) -> WorkspaceResult<()> {
    fs::create_dir_all(dest).map_err(|e| WorkspaceError::io(dest, e))?;

    let mut entries: Vec<_> = fs::read_dir(src)
        .map_err(|e| WorkspaceError::io(src, e))?
        .collect::<Result<_, _>>()
        .map_err(|e| WorkspaceError::io(src, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let src_path = entry.path();
        let file_name = entry.file_name().to_string_lossy().to_string();
        let mut dest_name = file_name.replace(FEATURE_NAME_PLACEHOLDER, feature_name);
        if let Some(stripped) = dest_name.strip_suffix(TEMPLATE_SUFFIX) {
            dest_name = stripped.to_string();
        }
        let dest_path = dest.join(dest_name);

        if src_path.is_dir() {
            copy_template(&src_path, &dest_path, feature_name)?;
            continue;
        }

        let content = fs::read_to_string(&src_path).map_err(|e| WorkspaceError::io(&src_path, e))?;
        let rendered = content.replace(FEATURE_NAME_PLACEHOLDER, feature_name);
        fs::write(&dest_path, rendered).map_err(|e| WorkspaceError::io(&dest_path, e))?;
        debug!(path = %dest_path.display(), "Template file written");
    }

    Ok(())
}
