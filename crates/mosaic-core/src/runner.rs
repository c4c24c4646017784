//! Feature test runner
//!
//! `mosaic test <feature>` runs the configured test command once over the
//! `tests/` directories of the feature and everything it depends on.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::graph::DependencyGraph;
use crate::workspace::FeatureWorkspace;

/// Planned invocation of the test command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPlan {
    pub feature: String,
    /// Features whose tests are included, sorted
    pub features: Vec<String>,
    /// Existing `tests/` directories of those features
    pub test_dirs: Vec<PathBuf>,
}

impl TestPlan {
    /// Resolve the dependency closure of `feature`
    pub fn for_feature(workspace: &FeatureWorkspace, feature: &str) -> WorkspaceResult<Self> {
        workspace.require(feature)?;
        let graph = DependencyGraph::from_workspace(workspace);

        let mut features = Vec::new();
        let mut test_dirs = Vec::new();
        for name in graph.closure(feature) {
            match workspace.feature(&name) {
                Some(f) => {
                    let dir = f.tests_dir();
                    if dir.is_dir() {
                        test_dirs.push(dir);
                    }
                }
                None => warn!(feature = %feature, dependency = %name, "Unknown dependency skipped"),
            }
            features.push(name);
        }

        Ok(Self {
            feature: feature.to_string(),
            features,
            test_dirs,
        })
    }

    /// Program and arguments: `<test_command> -- <dirs...>`
    pub fn command_line(&self, test_command: &[String]) -> Vec<String> {
        let mut line = test_command.to_vec();
        if !self.test_dirs.is_empty() {
            line.push("--".to_string());
            line.extend(self.test_dirs.iter().map(|d| d.to_string_lossy().into_owned()));
        }
        line
    }
}

/// Run the test command for a feature; errors when it is missing or exits non-zero
pub async fn run_feature_tests(workspace: &FeatureWorkspace, feature: &str) -> WorkspaceResult<TestPlan> {
    let plan = TestPlan::for_feature(workspace, feature)?;
    let line = plan.command_line(&workspace.config().test_command);

    info!(
        feature = %feature,
        included = ?plan.features,
        command = %line.join(" "),
        "Running feature tests"
    );
    run_command_line(workspace, &line).await?;
    Ok(plan)
}

/// Run the whole test suite
pub async fn run_all_tests(workspace: &FeatureWorkspace) -> WorkspaceResult<()> {
    let line = workspace.config().test_command.clone();
    info!(command = %line.join(" "), "Running full test suite");
    run_command_line(workspace, &line).await
}

async fn run_command_line(workspace: &FeatureWorkspace, line: &[String]) -> WorkspaceResult<()> {
    let (program, args) = line
        .split_first()
        .ok_or_else(|| WorkspaceError::CommandFailed("empty test command".to_string()))?;

    let status = Command::new(program)
        .args(args)
        .current_dir(&workspace.config().root)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|e| WorkspaceError::CommandFailed(format!("{program}: {e}")))?;

    if !status.success() {
        return Err(WorkspaceError::CommandFailed(format!(
            "{} exited with {status}",
            line.join(" ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MosaicConfig;
    use std::fs;

    fn workspace() -> (tempfile::TempDir, FeatureWorkspace) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for (name, config) in [
            ("todo", "dependencies:\n  - feature: user\n"),
            ("user", ""),
            ("billing", ""),
        ] {
            let feature = root.join("features").join(name);
            fs::create_dir_all(&feature).unwrap();
            fs::write(feature.join("feature.config"), config).unwrap();
        }
        fs::create_dir_all(root.join("features/todo/tests")).unwrap();
        fs::create_dir_all(root.join("features/user/tests")).unwrap();
        fs::create_dir_all(root.join("features/billing/tests")).unwrap();

        let workspace = FeatureWorkspace::discover(MosaicConfig::for_root(root)).unwrap();
        (dir, workspace)
    }

    #[test]
    fn test_plan_covers_dependency_closure() {
        let (_dir, workspace) = workspace();
        let plan = TestPlan::for_feature(&workspace, "todo").unwrap();
        assert_eq!(plan.features, vec!["todo", "user"]);
        assert_eq!(plan.test_dirs.len(), 2);

        let line = plan.command_line(&["npm".to_string(), "test".to_string()]);
        assert_eq!(&line[..3], &["npm", "test", "--"]);
        assert!(line[3].ends_with("todo/tests"));
        assert!(line[4].ends_with("user/tests"));
    }

    #[test]
    fn test_plan_unknown_feature() {
        let (_dir, workspace) = workspace();
        assert!(matches!(
            TestPlan::for_feature(&workspace, "ghost"),
            Err(WorkspaceError::FeatureNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reports_exit_status() {
        let (dir, _workspace) = workspace();

        let mut config = MosaicConfig::for_root(dir.path());
        config.test_command = vec!["true".to_string()];
        let ok = FeatureWorkspace::discover(config.clone()).unwrap();
        assert!(run_feature_tests(&ok, "billing").await.is_ok());

        config.test_command = vec!["false".to_string()];
        let failing = FeatureWorkspace::discover(config).unwrap();
        assert!(matches!(
            run_feature_tests(&failing, "billing").await,
            Err(WorkspaceError::CommandFailed(_))
        ));
    }
}
