//! FeatureDescriptor - one feature as seen by the composition pass

use serde::{Deserialize, Serialize};

use crate::feature::{FeatureConfig, RoutePrefix};
use crate::route::RouteNode;

/// A feature's routes together with its configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDescriptor {
    /// Unique feature name (directory name under `features/`)
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_prefix: Option<RoutePrefix>,

    #[serde(default)]
    pub config: FeatureConfig,

    #[serde(default)]
    pub routes: Vec<RouteNode>,
}

impl FeatureDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = Some(RoutePrefix::path(prefix));
        self
    }

    pub fn without_prefix(mut self) -> Self {
        self.route_prefix = Some(RoutePrefix::disabled());
        self
    }

    pub fn with_config(mut self, config: FeatureConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_routes(mut self, routes: Vec<RouteNode>) -> Self {
        self.routes = routes;
        self
    }

    pub fn version(&self) -> Option<&str> {
        self.config.version.as_deref()
    }
}
