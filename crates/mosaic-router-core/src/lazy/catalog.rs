//! Module catalog: the loadable view modules known at startup

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use mosaic_types::ViewRef;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::LoadError;

/// Loaded view module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModule {
    /// Catalog key (`features/<feature>/pages/...`)
    pub path: String,
    pub default_export: ViewRef,
}

pub type LoadFuture = BoxFuture<'static, Result<ViewModule, LoadError>>;

/// Async loader producing a view module
pub type ViewLoader = Arc<dyn Fn() -> LoadFuture + Send + Sync>;

/// Loader that resolves immediately to `view`
pub fn ready_loader(path: impl Into<String>, view: ViewRef) -> ViewLoader {
    let module = ViewModule {
        path: path.into(),
        default_export: view,
    };
    Arc::new(move || futures::future::ready(Ok(module.clone())).boxed())
}

/// Enumerates view modules in a stable order and hands out their loaders
pub trait ModuleCatalog: Send + Sync {
    /// All module keys, sorted
    fn module_paths(&self) -> Vec<String>;

    fn contains(&self, path: &str) -> bool;

    fn loader(&self, path: &str) -> Option<ViewLoader>;

    /// Features that own at least one module (or were declared explicitly)
    fn feature_names(&self) -> BTreeSet<String>;
}

/// Catalog built once from explicit registrations or a workspace scan
#[derive(Clone, Default)]
pub struct StaticCatalog {
    modules: BTreeMap<String, ViewLoader>,
    features: BTreeSet<String>,
}

impl std::fmt::Debug for StaticCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCatalog")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .field("features", &self.features)
            .finish()
    }
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module with its loader
    pub fn register(&mut self, path: impl Into<String>, loader: ViewLoader) {
        let path = path.into();
        if let Some(feature) = feature_of_module(&path) {
            self.features.insert(feature.to_string());
        }
        self.modules.insert(path, loader);
    }

    /// Register a module whose default export is the module key itself
    pub fn register_view(&mut self, path: impl Into<String>) {
        let path = path.into();
        let loader = ready_loader(path.clone(), ViewRef::new(path.clone()));
        self.register(path, loader);
    }

    pub fn with_view(mut self, path: impl Into<String>) -> Self {
        self.register_view(path);
        self
    }

    /// Declare a feature that may own no modules
    pub fn declare_feature(&mut self, name: impl Into<String>) {
        self.features.insert(name.into());
    }

    /// Catalog every `<feature>/pages/**/*.{ts,tsx}` below `features_root`.
    ///
    /// Keys are `features/<feature>/...` wherever the directory lives.
    pub fn scan_features(features_root: &Path) -> Self {
        let mut catalog = Self::new();

        for entry in WalkDir::new(features_root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
        {
            let feature = entry.file_name().to_string_lossy().into_owned();
            catalog.declare_feature(feature.clone());

            for page in WalkDir::new(entry.path().join("pages"))
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .filter(|e| mosaic_core::has_source_extension(e.path()))
            {
                let Ok(relative) = page.path().strip_prefix(features_root) else {
                    continue;
                };
                let relative = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                catalog.register_view(format!("features/{relative}"));
            }
        }

        debug!(
            features_root = %features_root.display(),
            module_count = catalog.modules.len(),
            "Module catalog scanned"
        );
        catalog
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleCatalog for StaticCatalog {
    fn module_paths(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    fn loader(&self, path: &str) -> Option<ViewLoader> {
        self.modules.get(path).cloned()
    }

    fn feature_names(&self) -> BTreeSet<String> {
        self.features.clone()
    }
}

/// `<feature>` of a `features/<feature>/...` key
pub fn feature_of_module(path: &str) -> Option<&str> {
    let mut parts = path.strip_prefix("features/")?.split('/');
    let feature = parts.next().filter(|f| !f.is_empty())?;
    parts.next().map(|_| feature)
}
