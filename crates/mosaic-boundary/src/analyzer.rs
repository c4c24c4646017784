//! Module-Boundary Analyzer
//!
//! Features may only reach into each other through the public sub-path
//! (`public/` by default), and only for names on the target's surface.
//!
//! ```text
//! features/todo/pages/TodoPage.tsx
//!   import { helper } from "../../user/public"    ─► UndeclaredExport (helper)
//!   import * as User from "../../user/public"     ─► NamespaceImport
//!   import Login from "../../user/pages/Login"    ─► CrossFeatureBoundary
//! ```
//!
//! The analysis is read-only and never stops early: every file is scanned
//! and every violation reported.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;

use mosaic_core::FeatureWorkspace;
use mosaic_types::{PublicSurface, DEFAULT_EXPORT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BoundaryError, BoundaryResult};
use crate::scanner::{scan_imports, ImportDecl};
use crate::surface::build_surface;

const FEATURES_SEGMENT: &str = "features/";

/// One source file, with a `features/<feature>/...` path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub contents: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Sources of one feature together with its public sub-path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSources {
    pub name: String,
    /// Directory below the feature that others may import from (`public`)
    pub public_sub_path: String,
    pub files: Vec<SourceFile>,
}

impl FeatureSources {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public_sub_path: "public".to_string(),
            files: Vec::new(),
        }
    }

    pub fn with_public_sub_path(mut self, sub_path: impl Into<String>) -> Self {
        self.public_sub_path = sub_path.into();
        self
    }

    /// Add a file; `relative` is relative to the feature directory
    pub fn with_file(mut self, relative: &str, contents: impl Into<String>) -> Self {
        let path = format!("{FEATURES_SEGMENT}{}/{}", self.name, relative.trim_start_matches("./"));
        self.files.push(SourceFile::new(path, contents));
        self
    }

    fn is_public(&self, rest: &str) -> bool {
        let sub_path = self.public_sub_path.trim_matches('/');
        sub_path.is_empty() || rest == sub_path || rest.starts_with(&format!("{sub_path}/"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Import of another feature's internals
    CrossFeatureBoundary,
    /// Name not on the target's public surface
    UndeclaredExport,
    /// `import * as X` of another feature's public surface
    NamespaceImport,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::CrossFeatureBoundary => write!(f, "cross-feature-boundary"),
            ViolationKind::UndeclaredExport => write!(f, "undeclared-export"),
            ViolationKind::NamespaceImport => write!(f, "namespace-import"),
        }
    }
}

/// A reported boundary violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Importing feature
    pub feature: String,
    pub file: String,
    pub line: usize,
    pub specifier: String,
    pub target_feature: String,
    /// Offending export name, for `UndeclaredExport`
    pub name: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: [{}] ", self.file, self.line, self.kind)?;
        match self.kind {
            ViolationKind::CrossFeatureBoundary => write!(
                f,
                "importing '{}' from feature '{}' must go through its public exports",
                self.specifier, self.target_feature
            ),
            ViolationKind::UndeclaredExport => write!(
                f,
                "'{}' is not a declared export of feature '{}'",
                self.name.as_deref().unwrap_or(DEFAULT_EXPORT),
                self.target_feature
            ),
            ViolationKind::NamespaceImport => write!(
                f,
                "namespace import of feature '{}' exposes undeclared exports",
                self.target_feature
            ),
        }
    }
}

/// Where an import specifier lands: `features/<feature>/<rest>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    pub feature: String,
    pub rest: String,
}

/// Resolve an import specifier written in `file`.
///
/// Relative specifiers resolve lexically against the file's directory;
/// other specifiers count only when they contain a `features/` segment.
pub fn resolve_import(file: &str, specifier: &str) -> Option<ImportTarget> {
    let resolved = if specifier.starts_with('.') {
        let dir = file.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        join_lexically(dir, specifier)
    } else {
        let start = find_features_segment(specifier)?;
        specifier[start..].to_string()
    };

    let rest = resolved.strip_prefix(FEATURES_SEGMENT)?;
    let (feature, rest) = rest.split_once('/').unwrap_or((rest, ""));
    if feature.is_empty() {
        return None;
    }
    Some(ImportTarget {
        feature: feature.to_string(),
        rest: rest.to_string(),
    })
}

fn find_features_segment(specifier: &str) -> Option<usize> {
    if specifier.starts_with(FEATURES_SEGMENT) {
        return Some(0);
    }
    specifier
        .find(&format!("/{FEATURES_SEGMENT}"))
        .map(|idx| idx + 1)
}

fn join_lexically(dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Check every import of every feature against the public surfaces
pub fn analyze_imports(features: &[FeatureSources], surface: &PublicSurface) -> Vec<Violation> {
    let by_name: BTreeMap<&str, &FeatureSources> =
        features.iter().map(|f| (f.name.as_str(), f)).collect();

    let mut violations = Vec::new();
    for feature in features {
        for file in &feature.files {
            for import in scan_imports(&file.contents) {
                check_import(feature, file, &import, &by_name, surface, &mut violations);
            }
        }
    }

    debug!(
        features = features.len(),
        violations = violations.len(),
        "Import boundaries analyzed"
    );
    violations
}

fn check_import(
    feature: &FeatureSources,
    file: &SourceFile,
    import: &ImportDecl,
    features: &BTreeMap<&str, &FeatureSources>,
    surface: &PublicSurface,
    violations: &mut Vec<Violation>,
) {
    let Some(target) = resolve_import(&file.path, &import.specifier) else {
        return;
    };
    if target.feature == feature.name {
        return;
    }
    let Some(target_sources) = features.get(target.feature.as_str()) else {
        return;
    };

    let violation = |kind: ViolationKind, name: Option<String>| Violation {
        kind,
        feature: feature.name.clone(),
        file: file.path.clone(),
        line: import.line,
        specifier: import.specifier.clone(),
        target_feature: target.feature.clone(),
        name,
    };

    if !target_sources.is_public(&target.rest) {
        violations.push(violation(ViolationKind::CrossFeatureBoundary, None));
        return;
    }

    if import.namespace.is_some() {
        violations.push(violation(ViolationKind::NamespaceImport, None));
    }
    if import.default.is_some() && !surface.allows(&target.feature, DEFAULT_EXPORT) {
        violations.push(violation(
            ViolationKind::UndeclaredExport,
            Some(DEFAULT_EXPORT.to_string()),
        ));
    }
    for named in &import.named {
        if !surface.allows(&target.feature, &named.imported) {
            violations.push(violation(
                ViolationKind::UndeclaredExport,
                Some(named.imported.clone()),
            ));
        }
    }
}

/// Read every feature's `.ts`/`.tsx` sources from disk
pub fn load_sources(workspace: &FeatureWorkspace) -> BoundaryResult<Vec<FeatureSources>> {
    let mut all = Vec::new();
    for feature in workspace.features() {
        let mut sources = FeatureSources::new(feature.name.clone())
            .with_public_sub_path(feature.config.public_sub_path());

        for path in feature.source_files() {
            let contents = fs::read_to_string(&path).map_err(|source| BoundaryError::Io {
                path: path.clone(),
                source,
            })?;
            let Ok(relative) = path.strip_prefix(&feature.dir) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            sources = sources.with_file(&relative, contents);
        }
        all.push(sources);
    }
    Ok(all)
}

/// Outcome of a workspace analysis
#[derive(Debug, Clone, Default)]
pub struct BoundaryReport {
    pub surface: PublicSurface,
    pub violations: Vec<Violation>,
}

impl BoundaryReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Build the surfaces and analyze every feature of the workspace
pub fn analyze_workspace(workspace: &FeatureWorkspace) -> BoundaryResult<BoundaryReport> {
    let surface = build_surface(workspace)?;
    let sources = load_sources(workspace)?;
    let violations = analyze_imports(&sources, &surface);

    info!(
        features = sources.len(),
        files = sources.iter().map(|s| s.files.len()).sum::<usize>(),
        violations = violations.len(),
        "Boundary analysis finished"
    );
    Ok(BoundaryReport {
        surface,
        violations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_import() {
        assert_eq!(
            resolve_import("features/todo/pages/TodoPage.tsx", "../../user/public"),
            Some(ImportTarget {
                feature: "user".to_string(),
                rest: "public".to_string()
            })
        );
        assert_eq!(
            resolve_import("features/todo/pages/TodoPage.tsx", "@/features/user/pages/LoginPage"),
            Some(ImportTarget {
                feature: "user".to_string(),
                rest: "pages/LoginPage".to_string()
            })
        );
        assert_eq!(resolve_import("features/todo/pages/TodoPage.tsx", "react"), None);
        assert_eq!(resolve_import("features/todo/pages/TodoPage.tsx", "myfeatures/x"), None);
        assert_eq!(
            resolve_import("features/todo/pages/TodoPage.tsx", "./TodoList").map(|t| t.feature),
            Some("todo".to_string())
        );
    }

    #[test]
    fn test_undeclared_named_import() {
        let features = vec![
            FeatureSources::new("a").with_file(
                "pages/APage.tsx",
                "import { helper } from \"../../b/public\";\n",
            ),
            FeatureSources::new("b").with_file("public/index.ts", "export const Widget = 1;"),
        ];
        let surface = PublicSurface::new().with("b", ["Widget"]).with("a", Vec::<String>::new());

        let violations = analyze_imports(&features, &surface);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::UndeclaredExport);
        assert_eq!(violations[0].name.as_deref(), Some("helper"));
        assert_eq!(violations[0].feature, "a");
        assert_eq!(violations[0].target_feature, "b");
        assert_eq!(violations[0].line, 1);
    }

    #[test]
    fn test_all_violation_kinds() {
        let src = r#"import { Widget as W, useTodos } from "../../todo/public";
import Board from "../../todo/public/Board";
import * as Todo from "../../todo/public";
import { TodoList } from "../../todo/components/TodoList";
import { Session } from "../../user/api/session";
import "../../todo/public/styles.css";
import { ok } from "./local";
"#;
        let features = vec![
            FeatureSources::new("todo").with_file("public/index.ts", ""),
            FeatureSources::new("user")
                .with_public_sub_path("api")
                .with_file("pages/Profile.tsx", src),
        ];
        let surface = PublicSurface::new().with("todo", ["Widget"]).with("user", ["Session"]);

        let found: Vec<_> = analyze_imports(&features, &surface)
            .into_iter()
            .map(|v| (v.line, v.kind, v.name))
            .collect();
        assert_eq!(
            found,
            vec![
                (1, ViolationKind::UndeclaredExport, Some("useTodos".to_string())),
                (2, ViolationKind::UndeclaredExport, Some("default".to_string())),
                (3, ViolationKind::NamespaceImport, None),
                (4, ViolationKind::CrossFeatureBoundary, None),
            ]
        );
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation {
            kind: ViolationKind::CrossFeatureBoundary,
            feature: "todo".to_string(),
            file: "features/todo/pages/TodoPage.tsx".to_string(),
            line: 3,
            specifier: "../../user/pages/LoginPage".to_string(),
            target_feature: "user".to_string(),
            name: None,
        };
        assert_eq!(
            violation.to_string(),
            "features/todo/pages/TodoPage.tsx:3: [cross-feature-boundary] importing '../../user/pages/LoginPage' from feature 'user' must go through its public exports"
        );
    }
}
