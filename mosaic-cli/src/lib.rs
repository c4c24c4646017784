//! Mosaic CLI - Feature workspace tooling
//!
//! The `mosaic` binary is responsible for:
//! - Scaffolding features from templates
//! - Printing feature metadata and the dependency graph
//! - Running dependency-aware feature tests
//! - Enforcing public contracts and import boundaries
//! - Listing composed routes and writing the route manifest
//!
//! Each command writes its report to the given writer and returns a
//! [`CommandStatus`]; detected problems are a `Failed` status, not an error.

mod lint;

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use mosaic_boundary::{analyze_workspace, describe_exports, feature_exports};
use mosaic_core::{
    bump_patch, generate_feature, run_all_tests, run_feature_tests, write_manifest, ContractSnapshot,
    ContractStore, Defaults, DependencyGraph, FeatureWorkspace, MosaicConfig,
};
use mosaic_router_core::{walk, ComposedRoute, LazyResolver, ResolvedView, RouteTable, StaticCatalog};
use mosaic_types::{ExportDecl, PublicConfig};
use tracing::{info, warn};

pub use lint::{lint_workspace, Diagnostic, DiagnosticKind};

/// Outcome of a command that ran to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failed,
}

impl CommandStatus {
    fn failed_if(failed: bool) -> Self {
        if failed {
            CommandStatus::Failed
        } else {
            CommandStatus::Success
        }
    }
}

/// Discover the workspace under the configured root
pub fn open_workspace(config: &MosaicConfig) -> Result<FeatureWorkspace> {
    FeatureWorkspace::discover(config.clone())
        .with_context(|| format!("Failed to load workspace at {}", config.root.display()))
}

/// Resolver over every view found under `<features dir>/*/pages`
pub fn workspace_resolver(config: &MosaicConfig) -> Arc<LazyResolver> {
    Arc::new(LazyResolver::new(Arc::new(StaticCatalog::scan_features(&config.features_root()))))
}

/// `generate <feature> [--template]`
pub fn generate(
    config: &MosaicConfig,
    name: &str,
    template: Option<&str>,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    let template = match template {
        Some(template) => template.to_string(),
        None => Defaults::load(config)?.feature_template,
    };
    let target = generate_feature(config, name, &template)?;

    writeln!(out, "Feature scaffolded at {}", target.display())?;
    writeln!(out, "Update feature.config, wire routes, and add tests as needed.")?;
    Ok(CommandStatus::Success)
}

/// `set-default-template feature <name>`
pub fn set_default_template(config: &MosaicConfig, template: &str, out: &mut dyn Write) -> Result<CommandStatus> {
    let mut defaults = Defaults::load(config)?;
    defaults.feature_template = template.to_string();
    defaults.save(config)?;

    writeln!(out, "Default feature template set to \"{template}\"")?;
    Ok(CommandStatus::Success)
}

/// `info [feature] [--graph]`
pub fn info(
    workspace: &FeatureWorkspace,
    feature: Option<&str>,
    graph: bool,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    if workspace.is_empty() {
        writeln!(out, "No features found.")?;
        return Ok(CommandStatus::Success);
    }

    let names = match feature {
        Some(name) => vec![name.to_string()],
        None => workspace.feature_names(),
    };

    let mut missing = false;
    for name in &names {
        let Some(feature) = workspace.feature(name) else {
            writeln!(out, "Feature {name} is missing or failed to load.")?;
            missing = true;
            continue;
        };
        let config = &feature.config;

        let owners = config
            .owners
            .iter()
            .map(|owner| {
                let team = owner.team.clone().unwrap_or_default();
                match &owner.contact {
                    Some(contact) => format!("{team} ({contact})").trim().to_string(),
                    None => team,
                }
            })
            .filter(|owner| !owner.is_empty())
            .collect::<Vec<_>>();
        let dependencies = config
            .dependencies
            .iter()
            .map(|dep| match &dep.version {
                Some(version) => format!("{}@{version}", dep.feature),
                None => dep.feature.clone(),
            })
            .collect::<Vec<_>>();
        let routes = config
            .routes
            .iter()
            .filter_map(|route| route.name.clone())
            .collect::<Vec<_>>();
        let policies = match &config.policies {
            Some(policies) => serde_json::to_string(policies)?,
            None => "-".to_string(),
        };

        writeln!(out)?;
        writeln!(
            out,
            "Feature: {} (v{})",
            config.name.as_deref().unwrap_or(name),
            config.version_or_default()
        )?;
        writeln!(out, "  Owners: {}", dash_join(&owners))?;
        writeln!(out, "  Dependencies: {}", dash_join(&dependencies))?;
        writeln!(out, "  Exports: {}", dash_join(&config.declared_exports()))?;
        writeln!(out, "  Routes: {}", dash_join(&routes))?;
        writeln!(out, "  Policies: {policies}")?;
    }

    if graph {
        writeln!(out)?;
        write!(out, "{}", DependencyGraph::from_workspace(workspace))?;
    }
    Ok(CommandStatus::failed_if(missing))
}

fn dash_join(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// `graph`
pub fn graph(workspace: &FeatureWorkspace, out: &mut dyn Write) -> Result<CommandStatus> {
    if workspace.is_empty() {
        writeln!(out, "No features found.")?;
        return Ok(CommandStatus::Success);
    }
    write!(out, "{}", DependencyGraph::from_workspace(workspace))?;
    Ok(CommandStatus::Success)
}

/// `test [feature]`
pub async fn test(workspace: &FeatureWorkspace, feature: Option<&str>, out: &mut dyn Write) -> Result<CommandStatus> {
    let Some(feature) = feature else {
        run_all_tests(workspace).await?;
        return Ok(CommandStatus::Success);
    };

    let plan = run_feature_tests(workspace, feature).await?;
    if plan.test_dirs.is_empty() {
        writeln!(out, "No feature-specific tests found for {feature}; ran the command without test folders.")?;
    } else {
        writeln!(
            out,
            "Ran contract-aware tests for {} ({} tests folders)",
            plan.features.join(", "),
            plan.test_dirs.len()
        )?;
    }
    Ok(CommandStatus::Success)
}

/// Options of `check`
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    pub auto_bump: bool,
    pub auto_describe: bool,
}

/// `check [feature] [--auto-bump] [--auto-describe]`
///
/// Snapshots every targeted feature's public exports, then analyzes the
/// imports of the whole workspace.
pub fn check(
    workspace: &mut FeatureWorkspace,
    feature: Option<&str>,
    options: CheckOptions,
    out: &mut dyn Write,
) -> Result<CommandStatus> {
    if workspace.is_empty() {
        writeln!(out, "No features to check.")?;
        return Ok(CommandStatus::Success);
    }

    let targets = match feature {
        Some(name) => {
            workspace.require(name)?;
            vec![name.to_string()]
        }
        None => workspace.feature_names(),
    };
    let store = ContractStore::new(workspace.config().contracts_dir());

    for name in &targets {
        let feature = workspace.require(name)?;
        let mut config = feature.config.clone();
        let mut config_dirty = false;

        if options.auto_describe {
            let described = describe_exports(feature)?;
            if !described.is_empty() {
                let public = config.public.get_or_insert_with(PublicConfig::default);
                public.exports = described
                    .into_iter()
                    .map(|export| {
                        let kind = export_kind(&export);
                        ExportDecl {
                            name: export,
                            kind: Some(kind.to_string()),
                            path: None,
                        }
                    })
                    .collect();
                writeln!(out, "Updated public exports for {name} via auto-describe")?;
                config_dirty = true;
            }
        }

        let exports = if config_dirty {
            config.declared_exports()
        } else {
            feature_exports(feature)?
        };

        let mut version = config.version_or_default().to_string();
        if store.exports_changed(name, &exports) {
            if options.auto_bump {
                let bumped = bump_patch(&version);
                writeln!(out, "Bumped {name} version to {bumped} (public exports changed)")?;
                config.version = Some(bumped.clone());
                config_dirty = true;
                version = bumped;
            } else {
                warn!(feature = %name, version = %version, "Public exports changed without a version bump");
                writeln!(
                    out,
                    "Feature {name} public exports changed; update feature.config version (current: {version}) before publishing."
                )?;
            }
        }

        store.write(name, &ContractSnapshot::new(exports, version))?;
        if config_dirty {
            workspace.write_config(name, config)?;
        }
    }

    let report = analyze_workspace(workspace)?;
    if !report.is_clean() {
        for violation in &report.violations {
            writeln!(out, "{violation}")?;
        }
        writeln!(out, "Contract enforcement failed. Fix import violations above.")?;
        return Ok(CommandStatus::Failed);
    }

    writeln!(out, "Contract enforcement passed.")?;
    Ok(CommandStatus::Success)
}

/// Kind recorded for an auto-described export
fn export_kind(name: &str) -> &'static str {
    let mut chars = name.strip_prefix("use").unwrap_or("").chars();
    if chars.next().is_some_and(|c| c.is_ascii_uppercase()) {
        return "hook";
    }
    if name == mosaic_types::DEFAULT_EXPORT {
        return "default";
    }
    "export"
}

/// `routes`: composed inventory followed by any conflicts
pub fn routes(workspace: &FeatureWorkspace, out: &mut dyn Write) -> Result<CommandStatus> {
    let table = RouteTable::new(workspace_resolver(workspace.config())).with_strict(false);
    let snapshot = table
        .rebuild(&workspace.descriptors())
        .context("Route composition failed")?;

    let mut lines = Vec::new();
    walk::visit(&snapshot.routes, "", &mut |route: &ComposedRoute, path: &str, depth: usize| {
        lines.push(format!(
            "{}{path}  {}  [{}] {}",
            "  ".repeat(depth),
            route.route_name,
            route.kind,
            describe_view(route)
        ));
    });

    writeln!(out, "Routes ({} names):", snapshot.name_index.len())?;
    for line in &lines {
        writeln!(out, "{line}")?;
    }

    if snapshot.report.is_empty() {
        writeln!(out, "No route conflicts.")?;
        return Ok(CommandStatus::Success);
    }
    writeln!(out, "Route conflicts ({}):", snapshot.report.conflict_count())?;
    write!(out, "{}", snapshot.report)?;
    Ok(CommandStatus::Failed)
}

fn describe_view(route: &ComposedRoute) -> String {
    match &route.view {
        Some(ResolvedView::Inline(view)) => format!("-> {}", view.as_str()),
        Some(ResolvedView::Lazy { module }) => format!("-> lazy {module}"),
        Some(ResolvedView::NotFound { fallback_path }) => format!("-> not found under {fallback_path}"),
        None => String::new(),
    }
}

/// `lint`
pub fn lint(workspace: &FeatureWorkspace, out: &mut dyn Write) -> Result<CommandStatus> {
    let resolver = workspace_resolver(workspace.config());
    let diagnostics = lint_workspace(workspace, &resolver)?;

    for diagnostic in &diagnostics {
        writeln!(out, "{diagnostic}")?;
    }
    if diagnostics.is_empty() {
        writeln!(out, "No problems found.")?;
    } else {
        writeln!(out, "{} problem(s) found.", diagnostics.len())?;
    }
    Ok(CommandStatus::failed_if(!diagnostics.is_empty()))
}

/// `manifest`: compose once to validate, then write the manifest.
///
/// Route conflicts block the manifest only in dev mode; missing views always do.
pub fn manifest(workspace: &FeatureWorkspace, out: &mut dyn Write) -> Result<CommandStatus> {
    let config = workspace.config();
    if workspace.is_empty() {
        bail!("No features found under {}", config.features_root().display());
    }
    let table = RouteTable::for_config(workspace_resolver(config), config);
    table
        .rebuild(&workspace.descriptors())
        .context("Refusing to write a manifest for an invalid route tree")?;

    let manifest = write_manifest(workspace)?;
    info!(build_id = %manifest.build_id, "Manifest ready");
    writeln!(
        out,
        "Wrote {} ({} features, build {})",
        config.manifest_file().display(),
        manifest.features.len(),
        manifest.build_id
    )?;
    Ok(CommandStatus::Success)
}
