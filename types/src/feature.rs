//! Feature configuration (`feature.config`)
//!
//! Everything a feature declares about itself besides its routes:
//! version, default prefix, policies, public surface, owners and dependencies.

use serde::{Deserialize, Serialize};

use crate::route::Policies;

/// Default public entry, relative to the feature directory
pub const DEFAULT_PUBLIC_ENTRY: &str = "public/index.ts";

/// Default version when a feature does not declare one
pub const DEFAULT_FEATURE_VERSION: &str = "0.0.0";

/// Route prefix declaration: a path, or `false` to mount routes unprefixed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoutePrefix {
    Toggle(bool),
    Path(String),
}

impl RoutePrefix {
    pub fn path(prefix: impl Into<String>) -> Self {
        Self::Path(prefix.into())
    }

    pub fn disabled() -> Self {
        Self::Toggle(false)
    }

    /// Raw prefix text, `None` when toggled
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(path) => Some(path),
            Self::Toggle(_) => None,
        }
    }
}

/// One declared public export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDecl {
    pub name: String,

    /// Kind of export: hook, function, class, const, type, default
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ExportDecl {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            path: None,
        }
    }
}

/// Public surface declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicConfig {
    /// Public entry file, relative to the feature directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<ExportDecl>,
}

impl PublicConfig {
    pub fn entry(&self) -> &str {
        self.entry.as_deref().unwrap_or(DEFAULT_PUBLIC_ENTRY)
    }

    /// Directory holding the public entry (`public` by default)
    pub fn sub_path(&self) -> &str {
        let entry = self.entry().trim_start_matches("./");
        match entry.rfind('/') {
            Some(idx) => &entry[..idx],
            None => "",
        }
    }

    pub fn export_names(&self) -> Vec<String> {
        self.exports
            .iter()
            .map(|export| export.name.clone())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub feature: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Parsed `feature.config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_prefix: Option<RoutePrefix>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<Policies>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<PublicConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<RouteSummary>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<Owner>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

impl FeatureConfig {
    pub fn version_or_default(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_FEATURE_VERSION)
    }

    /// Declared export names, in declaration order
    pub fn declared_exports(&self) -> Vec<String> {
        self.public
            .as_ref()
            .map(PublicConfig::export_names)
            .unwrap_or_default()
    }

    /// Whether the feature declares an export list at all
    pub fn declares_exports(&self) -> bool {
        self.public
            .as_ref()
            .map(|public| !public.exports.is_empty())
            .unwrap_or(false)
    }

    pub fn public_entry(&self) -> &str {
        self.public
            .as_ref()
            .map(PublicConfig::entry)
            .unwrap_or(DEFAULT_PUBLIC_ENTRY)
    }

    pub fn public_sub_path(&self) -> &str {
        match &self.public {
            Some(public) => public.sub_path(),
            None => "public",
        }
    }

    /// Names of the features this one depends on
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .map(|dep| dep.feature.clone())
            .filter(|name| !name.is_empty())
            .collect()
    }
}
