//! Feature workspace discovery
//!
//! A workspace is a directory of features, one sub-directory each:
//!
//! ```text
//! features/
//!   todo/
//!     feature.config      YAML FeatureConfig
//!     routes.yaml         routePrefix + routes
//!     public/index.ts     public entry
//!     pages/TodoPage.tsx  lazily loaded views
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use mosaic_types::{FeatureConfig, FeatureDescriptor, RouteNode, RoutePrefix};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::MosaicConfig;
use crate::error::{WorkspaceError, WorkspaceResult};

/// Feature configuration file name
pub const CONFIG_FILE: &str = "feature.config";

/// Route declaration file name
pub const ROUTES_FILE: &str = "routes.yaml";

/// Source file extensions analyzed and cataloged
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx"];

/// Contents of `routes.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_prefix: Option<RoutePrefix>,

    #[serde(default)]
    pub routes: Vec<RouteNode>,
}

/// One discovered feature
#[derive(Debug, Clone)]
pub struct Feature {
    pub name: String,
    pub dir: PathBuf,
    pub config: FeatureConfig,
    pub routes: RoutesFile,
    /// Path of `routes.yaml`, when present
    pub routes_path: Option<PathBuf>,
}

impl Feature {
    /// Routes file prefix, then config prefix, then the feature name
    pub fn route_prefix(&self) -> RoutePrefix {
        let declared = self
            .routes
            .route_prefix
            .clone()
            .or_else(|| self.config.route_prefix.clone());
        match declared {
            Some(RoutePrefix::Toggle(true)) | None => RoutePrefix::Path(self.name.clone()),
            Some(prefix) => prefix,
        }
    }

    pub fn descriptor(&self) -> FeatureDescriptor {
        FeatureDescriptor {
            name: self.name.clone(),
            route_prefix: Some(self.route_prefix()),
            config: self.config.clone(),
            routes: self.routes.routes.clone(),
        }
    }

    pub fn public_entry_path(&self) -> PathBuf {
        self.dir.join(self.config.public_entry())
    }

    pub fn tests_dir(&self) -> PathBuf {
        self.dir.join("tests")
    }

    /// All `.ts`/`.tsx` files below the feature directory, sorted
    pub fn source_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.dir)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != "node_modules")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| has_source_extension(path))
            .collect();
        files.sort();
        files
    }
}

/// Whether `path` has a `.ts`/`.tsx` extension
pub fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// All features of a workspace, sorted by name
#[derive(Debug, Clone)]
pub struct FeatureWorkspace {
    config: MosaicConfig,
    features: Vec<Feature>,
}

impl FeatureWorkspace {
    /// Scan the features directory
    pub fn discover(config: MosaicConfig) -> WorkspaceResult<Self> {
        let root = config.features_root();
        let mut features = Vec::new();

        for name in list_feature_names(&root)? {
            features.push(load_feature(&root, &name)?);
        }

        info!(
            features_root = %root.display(),
            feature_count = features.len(),
            "Feature workspace discovered"
        );

        Ok(Self { config, features })
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name.clone()).collect()
    }

    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn require(&self, name: &str) -> WorkspaceResult<&Feature> {
        self.feature(name)
            .ok_or_else(|| WorkspaceError::FeatureNotFound(name.to_string()))
    }

    /// Descriptors in workspace order
    pub fn descriptors(&self) -> Vec<FeatureDescriptor> {
        self.features.iter().map(Feature::descriptor).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Persist a feature's config and refresh the in-memory copy
    pub fn write_config(&mut self, name: &str, config: FeatureConfig) -> WorkspaceResult<()> {
        let feature = self
            .features
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| WorkspaceError::FeatureNotFound(name.to_string()))?;

        let path = feature.dir.join(CONFIG_FILE);
        let raw = serde_yaml::to_string(&config).map_err(|source| WorkspaceError::Yaml {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, raw).map_err(|e| WorkspaceError::io(&path, e))?;
        feature.config = config;

        debug!(feature = %name, path = %path.display(), "Feature config written");
        Ok(())
    }
}

/// Names of the sub-directories of `root`, sorted; a missing root has none
pub fn list_feature_names(root: &Path) -> WorkspaceResult<Vec<String>> {
    if !root.exists() {
        return Ok(vec![]);
    }

    let entries = fs::read_dir(root).map_err(|e| WorkspaceError::io(root, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| WorkspaceError::io(root, e))?;
        let file_type = entry.file_type().map_err(|e| WorkspaceError::io(entry.path(), e))?;
        if file_type.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn load_feature(root: &Path, name: &str) -> WorkspaceResult<Feature> {
    let dir = root.join(name);

    let config_path = dir.join(CONFIG_FILE);
    let config: FeatureConfig = read_yaml(&config_path)?.unwrap_or_default();

    let routes_path = dir.join(ROUTES_FILE);
    let routes: Option<RoutesFile> = read_yaml(&routes_path)?;

    debug!(
        feature = %name,
        has_config = config_path.exists(),
        route_count = routes.as_ref().map(|r| r.routes.len()).unwrap_or(0),
        "Feature loaded"
    );

    Ok(Feature {
        name: name.to_string(),
        dir,
        config,
        routes_path: routes.as_ref().map(|_| routes_path.clone()),
        routes: routes.unwrap_or_default(),
    })
}

/// Parse a YAML file; `None` when the file does not exist or is empty
fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> WorkspaceResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| WorkspaceError::io(path, e))?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(&raw)
        .map(Some)
        .map_err(|source| WorkspaceError::Yaml {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_discover_sorted_with_prefix_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "features/user/feature.config", "version: 1.0.0\nroutePrefix: account\n");
        write(
            root,
            "features/user/routes.yaml",
            "routes:\n  - path: /\n    name: user.login\n    lazyImport: ./pages/LoginPage.tsx\n",
        );
        write(root, "features/todo/routes.yaml", "routePrefix: tasks\nroutes: []\n");
        write(root, "features/billing/feature.config", "routePrefix: false\n");

        let workspace = FeatureWorkspace::discover(MosaicConfig::for_root(root)).unwrap();
        assert_eq!(workspace.feature_names(), vec!["billing", "todo", "user"]);

        let descriptors = workspace.descriptors();
        assert_eq!(descriptors[0].route_prefix, Some(RoutePrefix::Toggle(false)));
        assert_eq!(descriptors[1].route_prefix, Some(RoutePrefix::path("tasks")));
        assert_eq!(descriptors[2].route_prefix, Some(RoutePrefix::path("account")));
        assert_eq!(descriptors[2].routes[0].name.as_deref(), Some("user.login"));
        assert_eq!(descriptors[2].version(), Some("1.0.0"));
    }

    #[test]
    fn test_prefix_defaults_to_feature_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "features/todo/pages/TodoPage.tsx", "export default 1;");

        let workspace = FeatureWorkspace::discover(MosaicConfig::for_root(dir.path())).unwrap();
        let feature = workspace.require("todo").unwrap();
        assert_eq!(feature.route_prefix(), RoutePrefix::path("todo"));
        assert!(feature.routes_path.is_none());
        assert!(matches!(
            workspace.require("nope"),
            Err(WorkspaceError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn test_source_files_skip_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "features/todo/pages/TodoPage.tsx", "");
        write(dir.path(), "features/todo/public/index.ts", "");
        write(dir.path(), "features/todo/node_modules/x/index.ts", "");
        write(dir.path(), "features/todo/README.md", "");

        let workspace = FeatureWorkspace::discover(MosaicConfig::for_root(dir.path())).unwrap();
        let files = workspace.require("todo").unwrap().source_files();
        let rel: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            rel,
            vec!["features/todo/pages/TodoPage.tsx", "features/todo/public/index.ts"]
        );
    }

    #[test]
    fn test_invalid_yaml_names_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "features/todo/feature.config", "version: [unclosed\n");

        let err = FeatureWorkspace::discover(MosaicConfig::for_root(dir.path())).unwrap_err();
        assert!(matches!(err, WorkspaceError::Yaml { .. }));
        assert!(err.to_string().contains("feature.config"));
    }

    #[test]
    fn test_write_config_roundtrips_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "features/todo/feature.config", "version: 0.1.0\n");

        let mut workspace = FeatureWorkspace::discover(MosaicConfig::for_root(dir.path())).unwrap();
        let mut config = workspace.require("todo").unwrap().config.clone();
        config.version = Some("0.1.1".to_string());
        workspace.write_config("todo", config).unwrap();

        let reloaded = FeatureWorkspace::discover(MosaicConfig::for_root(dir.path())).unwrap();
        assert_eq!(reloaded.require("todo").unwrap().config.version.as_deref(), Some("0.1.1"));
    }
}
