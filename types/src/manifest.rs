//! Build-time route manifest
//!
//! A serialized snapshot of every feature's prefix, config and route tree,
//! written once per build cycle and read back by the runtime composer.

use serde::{Deserialize, Serialize};

use crate::descriptor::FeatureDescriptor;
use crate::feature::{FeatureConfig, RoutePrefix};
use crate::route::RouteNode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureManifestEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_prefix: Option<RoutePrefix>,

    #[serde(default)]
    pub config: FeatureConfig,

    #[serde(default)]
    pub routes: Vec<RouteNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteManifest {
    /// Unique id of the build that produced this manifest
    #[serde(default)]
    pub build_id: String,

    /// Milliseconds since epoch
    #[serde(default)]
    pub generated_at_ms: u64,

    #[serde(default)]
    pub features: Vec<FeatureManifestEntry>,
}

impl From<&FeatureDescriptor> for FeatureManifestEntry {
    fn from(descriptor: &FeatureDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            route_prefix: descriptor.route_prefix.clone(),
            config: descriptor.config.clone(),
            routes: descriptor.routes.clone(),
        }
    }
}

impl From<FeatureManifestEntry> for FeatureDescriptor {
    fn from(entry: FeatureManifestEntry) -> Self {
        Self {
            name: entry.name,
            route_prefix: entry.route_prefix,
            config: entry.config,
            routes: entry.routes,
        }
    }
}

impl RouteManifest {
    /// Descriptors in manifest (declaration) order
    pub fn descriptors(&self) -> Vec<FeatureDescriptor> {
        self.features.iter().cloned().map(Into::into).collect()
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|entry| entry.name.as_str()).collect()
    }
}
