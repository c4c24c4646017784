//! Mosaic CLI - Main entry point

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use mosaic_cli::{CheckOptions, CommandStatus};
use mosaic_core::MosaicConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mosaic")]
#[command(about = "Feature workspace tooling: scaffolding, contracts, routes")]
struct Cli {
    /// Workspace root (overrides MOSAIC_ROOT)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scaffold a feature from a template
    Generate {
        feature: String,
        /// Template name (defaults to the stored default)
        #[arg(long)]
        template: Option<String>,
    },

    /// Print feature metadata
    Info {
        feature: Option<String>,
        /// Also print the dependency graph
        #[arg(long)]
        graph: bool,
    },

    /// Run the tests of a feature and its dependencies
    Test { feature: Option<String> },

    /// Snapshot public contracts and enforce import boundaries
    Check {
        feature: Option<String>,
        /// Bump the patch version when exports changed
        #[arg(long)]
        auto_bump: bool,
        /// Rewrite declared exports from the public entry
        #[arg(long)]
        auto_describe: bool,
    },

    /// Print forward and reverse feature dependencies
    Graph,

    /// Persist a default template
    SetDefaultTemplate {
        scope: TemplateScope,
        template: String,
    },

    /// List composed routes and conflicts
    Routes,

    /// Report route conflicts, missing views and boundary violations
    Lint,

    /// Write the build-time route manifest
    Manifest,
}

#[derive(Clone, Copy, ValueEnum)]
enum TemplateScope {
    Feature,
}

async fn run(cli: Cli) -> Result<CommandStatus> {
    let mut config = MosaicConfig::from_env();
    if let Some(root) = cli.root {
        config = config.with_root(root);
    }
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Generate { feature, template } => {
            mosaic_cli::generate(&config, &feature, template.as_deref(), &mut out)
        }
        Command::SetDefaultTemplate {
            scope: TemplateScope::Feature,
            template,
        } => mosaic_cli::set_default_template(&config, &template, &mut out),
        Command::Info { feature, graph } => {
            let workspace = mosaic_cli::open_workspace(&config)?;
            mosaic_cli::info(&workspace, feature.as_deref(), graph, &mut out)
        }
        Command::Test { feature } => {
            let workspace = mosaic_cli::open_workspace(&config)?;
            mosaic_cli::test(&workspace, feature.as_deref(), &mut out).await
        }
        Command::Check {
            feature,
            auto_bump,
            auto_describe,
        } => {
            let mut workspace = mosaic_cli::open_workspace(&config)?;
            let options = CheckOptions {
                auto_bump,
                auto_describe,
            };
            mosaic_cli::check(&mut workspace, feature.as_deref(), options, &mut out)
        }
        Command::Graph => mosaic_cli::graph(&mosaic_cli::open_workspace(&config)?, &mut out),
        Command::Routes => mosaic_cli::routes(&mosaic_cli::open_workspace(&config)?, &mut out),
        Command::Lint => mosaic_cli::lint(&mosaic_cli::open_workspace(&config)?, &mut out),
        Command::Manifest => mosaic_cli::manifest(&mosaic_cli::open_workspace(&config)?, &mut out),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(CommandStatus::Success) => ExitCode::SUCCESS,
        Ok(CommandStatus::Failed) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
