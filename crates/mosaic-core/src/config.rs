//! Configuration module for Mosaic workspaces

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Workspace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosaicConfig {
    /// Workspace root; every other path is relative to it
    pub root: PathBuf,

    /// Directory holding one sub-directory per feature
    pub features_dir: PathBuf,

    /// Directory holding feature templates (`<name>/...`)
    pub templates_dir: PathBuf,

    /// Tool cache (defaults, contract snapshots)
    pub cache_dir: PathBuf,

    /// Route manifest location
    pub manifest_path: PathBuf,

    /// Verify route conflicts whenever the route table is rebuilt
    pub dev_mode: bool,

    /// Prefetch scheduling
    pub prefetch: PrefetchSettings,

    /// Command (program + args) used by `mosaic test`
    pub test_command: Vec<String>,
}

/// Prefetch scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefetchSettings {
    /// Upper bound on waiting for the host to become idle
    pub idle_timeout_ms: u64,

    /// Delay used when the host has no idle primitive
    pub fallback_delay_ms: u64,
}

impl Default for PrefetchSettings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 2000,
            fallback_delay_ms: 500,
        }
    }
}

impl PrefetchSettings {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self::for_root(".")
    }
}

impl MosaicConfig {
    /// Default layout rooted at `root`
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            features_dir: PathBuf::from("features"),
            templates_dir: PathBuf::from("templates/feature"),
            cache_dir: PathBuf::from(".cache/mosaic"),
            manifest_path: PathBuf::from("tooling/route-manifest.json"),
            dev_mode: true,
            prefetch: PrefetchSettings::default(),
            test_command: vec!["npm".to_string(), "run".to_string(), "test".to_string()],
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let root = std::env::var("MOSAIC_ROOT").unwrap_or_else(|_| ".".to_string());
        let mut config = MosaicConfig::for_root(root);

        if let Ok(dir) = std::env::var("MOSAIC_FEATURES_DIR") {
            config.features_dir = PathBuf::from(dir);
        }

        if let Ok(path) = std::env::var("MOSAIC_MANIFEST") {
            config.manifest_path = PathBuf::from(path);
        }

        if let Ok(dev) = std::env::var("MOSAIC_DEV") {
            config.dev_mode = !matches!(dev.trim(), "0" | "false" | "no" | "off");
        }

        if let Ok(ms) = std::env::var("MOSAIC_PREFETCH_IDLE_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.prefetch.idle_timeout_ms = ms;
            }
        }

        if let Ok(ms) = std::env::var("MOSAIC_PREFETCH_FALLBACK_MS") {
            if let Ok(ms) = ms.parse() {
                config.prefetch.fallback_delay_ms = ms;
            }
        }

        if let Ok(command) = std::env::var("MOSAIC_TEST_COMMAND") {
            let parts: Vec<String> = command
                .split_whitespace()
                .map(|s| s.to_string())
                .collect();
            if !parts.is_empty() {
                config.test_command = parts;
            }
        }

        config
    }

    /// Replace the workspace root, keeping the relative layout
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    fn under_root(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn features_root(&self) -> PathBuf {
        self.under_root(&self.features_dir)
    }

    pub fn feature_dir(&self, feature: &str) -> PathBuf {
        self.features_root().join(feature)
    }

    pub fn templates_root(&self) -> PathBuf {
        self.under_root(&self.templates_dir)
    }

    pub fn cache_root(&self) -> PathBuf {
        self.under_root(&self.cache_dir)
    }

    pub fn contracts_dir(&self) -> PathBuf {
        self.cache_root().join("contracts")
    }

    pub fn defaults_path(&self) -> PathBuf {
        self.cache_root().join("defaults.json")
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.under_root(&self.manifest_path)
    }
}
