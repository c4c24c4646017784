//! Navigation runtime
//!
//! Ties the route table, the module cache and the prefetch scheduler together:
//! match the path, load the view (sharing in-flight loads), then schedule the
//! route's prefetch targets for idle time.

use std::sync::Arc;

use mosaic_core::{MosaicConfig, PrefetchSettings};
use mosaic_types::ViewRef;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::LoadError;
use crate::lazy::{LazyResolver, ModuleCache, ModuleCatalog};
use crate::prefetch::{PrefetchEntry, PrefetchScheduler, RuntimeHost};
use crate::table::{RouteMatch, RouteTable};
use crate::types::{ComposedRoute, ResolvedView};

/// Result of a navigation
#[derive(Debug)]
pub struct Navigation {
    pub matched: RouteMatch,
    /// View to render
    pub view: ViewRef,
    /// Shown while `view` was loading, when the route declares one
    pub loading_fallback: Option<ViewRef>,
    /// Spawned prefetch task, if any
    pub prefetch: Option<JoinHandle<()>>,
}

/// Navigation runtime over a shared route table
pub struct RouteRuntime {
    table: Arc<RouteTable>,
    modules: ModuleCache,
    scheduler: PrefetchScheduler,
}

impl RouteRuntime {
    pub fn new(table: Arc<RouteTable>, scheduler: PrefetchScheduler) -> Self {
        Self {
            table,
            modules: ModuleCache::new(),
            scheduler,
        }
    }

    /// Runtime over a fresh table backed by `catalog`, prefetching on the tokio runtime
    pub fn for_catalog(catalog: Arc<dyn ModuleCatalog>, settings: PrefetchSettings) -> Self {
        let resolver = Arc::new(LazyResolver::new(catalog));
        let scheduler = PrefetchScheduler::with_settings(Arc::new(RuntimeHost::new()), settings);
        Self::new(Arc::new(RouteTable::new(resolver)), scheduler)
    }

    /// Runtime using the workspace's prefetch settings; conflicts are fatal only in dev mode
    pub fn for_config(catalog: Arc<dyn ModuleCatalog>, config: &MosaicConfig) -> Self {
        let resolver = Arc::new(LazyResolver::new(catalog));
        let scheduler =
            PrefetchScheduler::with_settings(Arc::new(RuntimeHost::new()), config.prefetch.clone());
        Self::new(Arc::new(RouteTable::for_config(resolver, config)), scheduler)
    }

    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    pub fn modules(&self) -> &ModuleCache {
        &self.modules
    }

    pub fn scheduler(&self) -> &PrefetchScheduler {
        &self.scheduler
    }

    /// Match `path`, load its view and schedule its prefetch targets
    pub async fn navigate(&self, path: &str) -> Result<Navigation, Arc<LoadError>> {
        let matched = self.table.match_path(path);

        let (view, loading_fallback, prefetch) = match &matched {
            RouteMatch::NotFound { view, .. } => (view.clone(), None, None),
            RouteMatch::Matched { route, .. } => {
                let view = self.load_view(route).await?;
                let prefetch = self.schedule_prefetch(route);
                (view, route.loading_fallback.clone(), prefetch)
            }
        };

        debug!(path = %path, view = %view, "Navigated");
        Ok(Navigation {
            matched,
            view,
            loading_fallback,
            prefetch,
        })
    }

    async fn load_view(&self, route: &ComposedRoute) -> Result<ViewRef, Arc<LoadError>> {
        match &route.view {
            Some(ResolvedView::Inline(view)) => Ok(view.clone()),
            Some(ResolvedView::NotFound { .. }) | None => Ok(crate::compose::not_found_view()),
            Some(ResolvedView::Lazy { module }) => {
                let loader = self
                    .table
                    .composer()
                    .resolver()
                    .loader(module)
                    .ok_or_else(|| Arc::new(LoadError::ModuleNotFound(module.clone())))?;
                let loaded = self.modules.load(module, &loader).await?;
                Ok(loaded.default_export)
            }
        }
    }

    fn schedule_prefetch(&self, route: &ComposedRoute) -> Option<JoinHandle<()>> {
        let resolver = self.table.composer().resolver();
        let entries: Vec<PrefetchEntry> = route
            .prefetch
            .iter()
            .map(|target| PrefetchEntry {
                key: target.key.clone(),
                loader: resolver.loader(&target.module),
            })
            .collect();
        self.scheduler.schedule(entries)
    }

    /// Reset every session-wide cache
    pub fn reset(&self) {
        self.table.reset();
        self.modules.reset();
        self.scheduler.reset();
    }
}
