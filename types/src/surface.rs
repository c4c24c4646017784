//! PublicSurface - which names other features may import from a feature

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Export name that stands for a default export
pub const DEFAULT_EXPORT: &str = "default";

/// Feature name → allowed export names, built fresh for every analysis run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicSurface {
    exports: BTreeMap<String, BTreeSet<String>>,
}

impl PublicSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a feature's allowlist
    pub fn declare<I, S>(&mut self, feature: impl Into<String>, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exports
            .insert(feature.into(), names.into_iter().map(Into::into).collect());
    }

    /// Builder form of [`PublicSurface::declare`]
    pub fn with<I, S>(mut self, feature: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declare(feature, names);
        self
    }

    /// Whether `feature` exports `name`; unknown features export nothing
    pub fn allows(&self, feature: &str, name: &str) -> bool {
        self.exports
            .get(feature)
            .map(|names| names.contains(name))
            .unwrap_or(false)
    }

    pub fn exports_of(&self, feature: &str) -> Option<&BTreeSet<String>> {
        self.exports.get(feature)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows() {
        let surface = PublicSurface::new()
            .with("user", ["Widget", DEFAULT_EXPORT])
            .with("todo", Vec::<String>::new());

        assert!(surface.allows("user", "Widget"));
        assert!(surface.allows("user", DEFAULT_EXPORT));
        assert!(!surface.allows("user", "helper"));
        assert!(!surface.allows("todo", "Widget"));
        assert!(!surface.allows("billing", "Widget"));
        assert_eq!(surface.features().collect::<Vec<_>>(), vec!["todo", "user"]);
    }
}
