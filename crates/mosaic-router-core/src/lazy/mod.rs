//! Lazy view loading
//!
//! - `catalog`: which view modules exist and how to load them
//! - `resolver`: import hint → catalog key
//! - `module_cache`: shared in-flight loads

mod catalog;
mod module_cache;
mod resolver;

pub use catalog::{
    feature_of_module, ready_loader, LoadFuture, ModuleCatalog, StaticCatalog, ViewLoader,
    ViewModule,
};
pub use module_cache::{LoadResult, ModuleCache};
pub use resolver::{prefetch_key, LazyResolver, Resolution};
