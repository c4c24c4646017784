//! Mosaic Boundary - Cross-Feature Import Analysis
//!
//! A feature's internals are private. Other features reach it only
//! through its public sub-path and only for names on its public surface.
//!
//! ```text
//! feature.config ──► declared exports ─┐
//! public/index.ts ─► scanned exports ──┴─► PublicSurface
//!                                              │
//! features/*/**/*.ts(x) ─► scan_imports ───────┴─► Vec<Violation>
//! ```

mod analyzer;
mod error;
pub mod scanner;
mod surface;

pub use analyzer::{
    analyze_imports, analyze_workspace, load_sources, resolve_import, BoundaryReport,
    FeatureSources, ImportTarget, SourceFile, Violation, ViolationKind,
};
pub use error::{BoundaryError, BoundaryResult};
pub use scanner::{scan_exports, scan_imports, ImportDecl, NamedImport};
pub use surface::{build_surface, describe_exports, feature_exports};
