//! Integration tests for the mosaic commands

use std::fs;
use std::path::Path;

use mosaic_cli::{CheckOptions, CommandStatus, DiagnosticKind};
use mosaic_core::{read_manifest, FeatureWorkspace, MosaicConfig};
use mosaic_router_core::RouteTable;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn workspace(root: &Path) -> FeatureWorkspace {
    FeatureWorkspace::discover(MosaicConfig::for_root(root)).unwrap()
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

/// `todo` and `user`, both prefixed, with resolvable views
fn routed_workspace(root: &Path) {
    write(
        root,
        "features/todo/routes.yaml",
        r#"
routePrefix: todo
routes:
  - path: ""
    name: todo.board
    lazyImport: ./pages/TodoPage.tsx
    prefetch:
      - ../user/pages/LoginPage.tsx
  - path: card/:id
    name: todo.card
    lazyImport: ./pages/CardPage.tsx
"#,
    );
    write(
        root,
        "features/todo/feature.config",
        "version: 1.0.0\nowners:\n  - team: tasks\n    contact: tasks@example.com\ndependencies:\n  - feature: user\n    version: ^1.0.0\n",
    );
    write(root, "features/todo/pages/TodoPage.tsx", "export default function TodoPage() {}");
    write(root, "features/todo/pages/CardPage.tsx", "export default function CardPage() {}");

    write(
        root,
        "features/user/routes.yaml",
        "routePrefix: user\nroutes:\n  - path: /\n    name: user.login\n    lazyImport: ./pages/LoginPage.tsx\n",
    );
    write(root, "features/user/pages/LoginPage.tsx", "export default function LoginPage() {}");
}

/// `user` reaches into `todo` through its public entry for an undeclared name
fn contract_workspace(root: &Path) {
    write(
        root,
        "features/todo/feature.config",
        "version: 1.0.0\npublic:\n  exports:\n    - name: Widget\n      type: component\n",
    );
    write(
        root,
        "features/todo/public/index.ts",
        "export const Widget = 1;\nexport function useTodos() {}\nexport const helper = 2;\n",
    );
    write(
        root,
        "features/user/pages/Profile.tsx",
        "import { Widget } from \"../../todo/public\";\nimport { helper } from \"../../todo/public\";\n",
    );
}

#[test]
fn test_generate_uses_stored_default_template() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "templates/feature/default/routes.yaml.template", "routes: []\n");
    write(
        root,
        "templates/feature/compact/{{featureName}}.md.template",
        "# {{featureName}}\n",
    );
    let config = MosaicConfig::for_root(root);

    let mut out = Vec::new();
    let status = mosaic_cli::generate(&config, "todo", None, &mut out).unwrap();
    assert_eq!(status, CommandStatus::Success);
    assert!(root.join("features/todo/routes.yaml").is_file());
    assert!(output(out).contains("Feature scaffolded at"));

    let mut out = Vec::new();
    mosaic_cli::set_default_template(&config, "compact", &mut out).unwrap();
    assert_eq!(output(out), "Default feature template set to \"compact\"\n");

    mosaic_cli::generate(&config, "billing", None, &mut Vec::new()).unwrap();
    assert_eq!(
        fs::read_to_string(root.join("features/billing/billing.md")).unwrap(),
        "# billing\n"
    );

    // Existing features are never overwritten
    assert!(mosaic_cli::generate(&config, "todo", Some("compact"), &mut Vec::new()).is_err());
}

#[test]
fn test_info_and_graph() {
    let dir = tempfile::tempdir().unwrap();
    routed_workspace(dir.path());
    let workspace = workspace(dir.path());

    let mut out = Vec::new();
    let status = mosaic_cli::info(&workspace, Some("todo"), true, &mut out).unwrap();
    let text = output(out);

    assert_eq!(status, CommandStatus::Success);
    assert!(text.contains("Feature: todo (v1.0.0)"));
    assert!(text.contains("  Owners: tasks (tasks@example.com)"));
    assert!(text.contains("  Dependencies: user@^1.0.0"));
    assert!(text.contains("  Exports: -"));
    assert!(text.contains("  todo -> user"));
    assert!(text.contains("  user <- todo"));

    let mut out = Vec::new();
    let status = mosaic_cli::info(&workspace, Some("missing"), false, &mut out).unwrap();
    assert_eq!(status, CommandStatus::Failed);

    let mut out = Vec::new();
    mosaic_cli::graph(&workspace, &mut out).unwrap();
    assert!(output(out).starts_with("Dependency graph (feature -> dependencies):"));
}

#[test]
fn test_check_reports_undeclared_import_and_bumps_once() {
    let dir = tempfile::tempdir().unwrap();
    contract_workspace(dir.path());
    let options = CheckOptions {
        auto_bump: true,
        auto_describe: false,
    };

    let mut ws = workspace(dir.path());
    let mut out = Vec::new();
    let status = mosaic_cli::check(&mut ws, None, options, &mut out).unwrap();
    let text = output(out);

    assert_eq!(status, CommandStatus::Failed);
    assert!(text.contains("Bumped todo version to 1.0.1 (public exports changed)"));
    assert!(text.contains("'helper' is not a declared export of feature 'todo'"));
    assert!(!text.contains("'Widget'"));
    assert!(text.contains("Contract enforcement failed."));
    assert!(dir.path().join(".cache/mosaic/contracts/todo.json").is_file());

    // Unchanged exports keep the version
    let mut ws = workspace(dir.path());
    assert_eq!(ws.require("todo").unwrap().config.version.as_deref(), Some("1.0.1"));
    let mut out = Vec::new();
    mosaic_cli::check(&mut ws, Some("todo"), options, &mut out).unwrap();
    assert!(!output(out).contains("Bumped"));

    // Fixing the import passes
    write(
        dir.path(),
        "features/user/pages/Profile.tsx",
        "import { Widget } from \"../../todo/public\";\n",
    );
    let mut ws = workspace(dir.path());
    let mut out = Vec::new();
    let status = mosaic_cli::check(&mut ws, None, CheckOptions::default(), &mut out).unwrap();
    assert_eq!(status, CommandStatus::Success);
    assert!(output(out).ends_with("Contract enforcement passed.\n"));
}

#[test]
fn test_check_auto_describe_rewrites_declared_exports() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "features/todo/feature.config", "version: 2.0.0\n");
    write(
        dir.path(),
        "features/todo/public/index.ts",
        "export const Widget = 1;\nexport function useTodos() {}\n",
    );

    let mut ws = workspace(dir.path());
    let options = CheckOptions {
        auto_bump: false,
        auto_describe: true,
    };
    let mut out = Vec::new();
    let status = mosaic_cli::check(&mut ws, Some("todo"), options, &mut out).unwrap();
    let text = output(out);
    assert_eq!(status, CommandStatus::Success);
    assert!(text.contains("Updated public exports for todo via auto-describe"));
    assert!(text.contains("Feature todo public exports changed"));

    let config = workspace(dir.path()).require("todo").unwrap().config.clone();
    assert_eq!(config.declared_exports(), vec!["Widget", "useTodos"]);
    let kinds: Vec<_> = config
        .public
        .as_ref()
        .unwrap()
        .exports
        .iter()
        .map(|e| e.kind.clone().unwrap())
        .collect();
    assert_eq!(kinds, vec!["export", "hook"]);
    assert_eq!(config.version.as_deref(), Some("2.0.0"));
}

#[test]
fn test_routes_lists_tree_and_reports_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    routed_workspace(dir.path());

    let mut out = Vec::new();
    let status = mosaic_cli::routes(&workspace(dir.path()), &mut out).unwrap();
    let text = output(out);
    assert_eq!(status, CommandStatus::Success);
    assert!(text.contains("/todo/card/:id  todo.card  [leaf] -> lazy features/todo/pages/CardPage.tsx"));
    assert!(text.contains("No route conflicts."));

    write(
        dir.path(),
        "features/stats/routes.yaml",
        "routes:\n  - path: /todo/card/:id\n    name: stats.card\n    element: stats/Card\n",
    );
    let mut out = Vec::new();
    let status = mosaic_cli::routes(&workspace(dir.path()), &mut out).unwrap();
    let text = output(out);
    assert_eq!(status, CommandStatus::Failed);
    assert!(text.contains("Route conflicts (1):"));
    assert!(text.contains("path /todo/card/:id registered 2 times (stats.card, todo.card) by [stats, todo]"));
}

#[test]
fn test_lint_collects_every_problem() {
    let dir = tempfile::tempdir().unwrap();
    routed_workspace(dir.path());
    write(
        dir.path(),
        "features/todo/routes.yaml",
        r#"
routePrefix: todo
routes:
  - path: ""
    name: todo.board
    lazyImport: ./pages/TodoPage.tsx
    prefetch:
      - ../user/pages/Gone.tsx
  - path: archive
    name: todo.archive
    lazyImport: ./pages/ArchivePage.tsx
"#,
    );
    write(
        dir.path(),
        "features/user/routes.yaml",
        "routePrefix: user\nroutes:\n  - path: /\n    name: todo.board\n    lazyImport: ./pages/LoginPage.tsx\n",
    );
    write(
        dir.path(),
        "features/user/pages/LoginPage.tsx",
        "import { TodoList } from \"../../todo/components/TodoList\";\nexport default function LoginPage() {}\n",
    );

    let mut out = Vec::new();
    let status = mosaic_cli::lint(&workspace(dir.path()), &mut out).unwrap();
    let text = output(out);
    assert_eq!(status, CommandStatus::Failed);

    let resolver = mosaic_cli::workspace_resolver(&MosaicConfig::for_root(dir.path()));
    let kinds: Vec<_> = mosaic_cli::lint_workspace(&workspace(dir.path()), &resolver)
        .unwrap()
        .into_iter()
        .map(|d| d.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::NameConflict,
            DiagnosticKind::MissingPrefetchTarget,
            DiagnosticKind::MissingLazyTarget,
            DiagnosticKind::BoundaryViolation,
        ]
    );
    assert!(text.contains("[name-conflict] route name \"todo.board\" used at /todo, /user"));
    assert!(text.contains("4 problem(s) found."));
}

#[test]
fn test_manifest_round_trips_into_route_table() {
    let dir = tempfile::tempdir().unwrap();
    routed_workspace(dir.path());
    let ws = workspace(dir.path());

    let mut out = Vec::new();
    assert_eq!(mosaic_cli::manifest(&ws, &mut out).unwrap(), CommandStatus::Success);
    assert!(output(out).contains("(2 features, build "));

    let manifest = read_manifest(&dir.path().join("tooling/route-manifest.json")).unwrap();
    let table = RouteTable::new(mosaic_cli::workspace_resolver(ws.config()));
    let snapshot = table.rebuild_from_manifest(&manifest).unwrap();
    assert_eq!(snapshot.build_id.as_deref(), Some(manifest.build_id.as_str()));
    assert_eq!(table.resolve_link("user.login").unwrap(), "/user");
}

#[test]
fn test_manifest_refuses_invalid_tree() {
    let dir = tempfile::tempdir().unwrap();
    routed_workspace(dir.path());
    fs::remove_file(dir.path().join("features/todo/pages/CardPage.tsx")).unwrap();

    assert!(mosaic_cli::manifest(&workspace(dir.path()), &mut Vec::new()).is_err());
    assert!(!dir.path().join("tooling/route-manifest.json").exists());
}

#[test]
fn test_manifest_conflicts_block_only_in_dev_mode() {
    let dir = tempfile::tempdir().unwrap();
    routed_workspace(dir.path());
    write(
        dir.path(),
        "features/stats/routes.yaml",
        "routes:\n  - path: /todo/card/:id\n    name: stats.card\n    element: stats/Card\n",
    );

    assert!(mosaic_cli::manifest(&workspace(dir.path()), &mut Vec::new()).is_err());
    assert!(!dir.path().join("tooling/route-manifest.json").exists());

    let mut config = MosaicConfig::for_root(dir.path());
    config.dev_mode = false;
    let ws = FeatureWorkspace::discover(config).unwrap();
    assert_eq!(mosaic_cli::manifest(&ws, &mut Vec::new()).unwrap(), CommandStatus::Success);
    assert!(dir.path().join("tooling/route-manifest.json").is_file());
}

#[test]
fn test_custom_features_dir_resolves_views() {
    let dir = tempfile::tempdir().unwrap();
    routed_workspace(&dir.path().join("app"));

    let mut config = MosaicConfig::for_root(dir.path());
    config.features_dir = "app/features".into();
    let ws = FeatureWorkspace::discover(config).unwrap();
    assert_eq!(ws.feature_names(), vec!["todo", "user"]);

    let mut out = Vec::new();
    assert_eq!(mosaic_cli::routes(&ws, &mut out).unwrap(), CommandStatus::Success);
    assert!(output(out).contains("-> lazy features/todo/pages/CardPage.tsx"));

    let mut out = Vec::new();
    assert_eq!(mosaic_cli::lint(&ws, &mut out).unwrap(), CommandStatus::Success);
    assert_eq!(output(out), "No problems found.\n");

    assert_eq!(mosaic_cli::manifest(&ws, &mut Vec::new()).unwrap(), CommandStatus::Success);
}

#[cfg(unix)]
#[tokio::test]
async fn test_feature_tests_run_configured_command() {
    let dir = tempfile::tempdir().unwrap();
    routed_workspace(dir.path());
    fs::create_dir_all(dir.path().join("features/user/tests")).unwrap();

    let mut config = MosaicConfig::for_root(dir.path());
    config.test_command = vec!["true".to_string()];
    let ws = FeatureWorkspace::discover(config).unwrap();

    let mut out = Vec::new();
    let status = mosaic_cli::test(&ws, Some("todo"), &mut out).await.unwrap();
    assert_eq!(status, CommandStatus::Success);
    assert_eq!(
        output(out),
        "Ran contract-aware tests for todo, user (1 tests folders)\n"
    );

    assert!(mosaic_cli::test(&ws, Some("nope"), &mut Vec::new()).await.is_err());
}
