//! Module cache: one in-flight load per module, successes memoized

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::LoadError;
use crate::lazy::catalog::{ViewLoader, ViewModule};

pub type LoadResult = Result<ViewModule, Arc<LoadError>>;

type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

/// Concurrent loads of one module share a single future; failures are evicted
#[derive(Default)]
pub struct ModuleCache {
    entries: Mutex<HashMap<String, SharedLoad>>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `module`, joining an in-flight or finished load when there is one
    pub async fn load(&self, module: &str, loader: &ViewLoader) -> LoadResult {
        let load = {
            let mut entries = self.entries.lock();
            entries
                .entry(module.to_string())
                .or_insert_with(|| {
                    let loader = loader.clone();
                    async move { loader().await.map_err(Arc::new) }.boxed().shared()
                })
                .clone()
        };

        let result = load.clone().await;
        if let Err(e) = &result {
            let mut entries = self.entries.lock();
            if entries.get(module).map(|current| current.ptr_eq(&load)).unwrap_or(false) {
                entries.remove(module);
            }
            debug!(module = %module, error = %e, "Module load failed, evicted");
        }
        result
    }

    /// Whether `module` finished loading successfully
    pub fn is_loaded(&self, module: &str) -> bool {
        self.entries
            .lock()
            .get(module)
            .and_then(|load| load.peek().map(|result| result.is_ok()))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn reset(&self) {
        self.entries.lock().clear();
    }
}
