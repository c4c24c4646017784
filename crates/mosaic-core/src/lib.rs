//! Mosaic core: workspace configuration and feature discovery
//!
//! Everything here works on the on-disk feature workspace. The router crate
//! consumes the descriptors and manifest produced here.

pub mod config;
pub mod contracts;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod runner;
pub mod scaffold;
pub mod workspace;

pub use config::{MosaicConfig, PrefetchSettings};
pub use contracts::{bump_patch, exports_digest, ContractSnapshot, ContractStore};
pub use error::{WorkspaceError, WorkspaceResult};
pub use graph::DependencyGraph;
pub use manifest::{build_manifest, read_manifest, save_manifest, write_manifest};
pub use runner::{run_all_tests, run_feature_tests, TestPlan};
pub use scaffold::{generate_feature, Defaults};
pub use workspace::{
    has_source_extension, list_feature_names, Feature, FeatureWorkspace, RoutesFile, CONFIG_FILE,
    ROUTES_FILE, SOURCE_EXTENSIONS,
};
