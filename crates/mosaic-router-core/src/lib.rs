//! Mosaic Router - Feature Route Composition
//!
//! Merges independently owned feature route declarations into one
//! conflict-free, lazily loaded navigation tree.
//!
//! # Architecture
//!
//! ```text
//! FeatureDescriptor[]
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │        Composer         │  Prefixes, absolute paths, fallbacks
//! │   (LazyResolver)        │  Import hint → catalog module
//! └───────────┬─────────────┘
//!             │  ComposedRoute[]
//!             ▼
//! ┌─────────────────────────┐
//! │       RouteTable        │  Conflict report, name index, matcher
//! └───────────┬─────────────┘
//!             │
//!             ▼
//! ┌─────────────────────────┐
//! │      RouteRuntime       │  ModuleCache + PrefetchScheduler
//! └─────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use mosaic_router_core::{LazyResolver, RouteTable, StaticCatalog};
//!
//! let catalog = StaticCatalog::scan_features(&config.features_root());
//! let table = RouteTable::new(Arc::new(LazyResolver::new(Arc::new(catalog))));
//! table.rebuild(&workspace.descriptors())?;
//!
//! let link = table.resolve_link("todo.board")?;
//! let matched = table.match_path("/todo/card/42");
//! ```

// Core modules
mod error;
mod types;
pub mod path;
pub mod walk;

// Composition and verification
mod compose;
mod conflict;
mod table;

// Lazy loading
pub mod lazy;
mod prefetch;
mod runtime;

// Re-exports: Error types
pub use error::{LoadError, RouteConfigurationError, RouterError};

// Re-exports: Core types
pub use types::{
    unnamed_route_name, ComposedRoute, PrefetchTarget, ResolvedView, RouteKind, NOT_FOUND_VIEW,
    UNNAMED_SUFFIX,
};

// Re-exports: Composition and verification
pub use compose::{merge_policies, not_found_view, Composer};
pub use conflict::{
    detect_conflicts, detect_descriptor_conflicts, ConflictReport, NameConflict, PathConflict,
    RouteRecord,
};
pub use table::{
    build_name_index, match_segments, RouteMatch, RouteParams, RouteSnapshot, RouteTable,
};

// Re-exports: Lazy loading
pub use lazy::{
    prefetch_key, LazyResolver, ModuleCache, ModuleCatalog, Resolution, StaticCatalog, ViewLoader,
    ViewModule,
};
pub use prefetch::{PrefetchEntry, PrefetchScheduler, RuntimeHost, SchedulingHost};
pub use runtime::{Navigation, RouteRuntime};
