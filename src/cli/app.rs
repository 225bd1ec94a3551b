//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{plan, query};
use crate::domain::Registry;
use crate::logging::init_logging;
use crate::resolver::ResolveOptions;
use crate::storage::{Config, Project, RegistryStore};

#[derive(Parser)]
#[command(name = "featplan")]
#[command(author, version, about = "Dependency resolution and execution planning for feature registries")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Registry document to read (overrides the project config)
    #[arg(long, short = 'r', global = true, env = "FEATPLAN_REGISTRY")]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize featplan configuration in a directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Check the whole registry for cycles and broken references
    Check,

    /// Validate that the dependencies of the given features are satisfied
    Validate {
        /// Feature IDs (FR-###)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Print the execution order for the given features and their dependencies
    Order {
        /// Feature IDs (FR-###); all features when omitted
        ids: Vec<String>,
    },

    /// Build an execution plan for the given features
    Plan {
        /// Feature IDs (FR-###)
        #[arg(required = true)]
        ids: Vec<String>,

        /// Plan only the requested features, not their dependencies
        #[arg(long)]
        no_auto_deps: bool,

        /// Plan past dependencies that are present but not completed
        #[arg(long)]
        force: bool,
    },

    /// Show what a feature depends on
    Deps {
        /// Feature ID (FR-###)
        id: String,

        /// Include transitive dependencies
        #[arg(long, short)]
        all: bool,
    },

    /// Show what depends on a feature
    Dependents {
        /// Feature ID (FR-###)
        id: String,

        /// Include transitive dependents
        #[arg(long, short)]
        all: bool,
    },

    /// Show features whose dependencies are all completed
    Ready,

    /// Show features waiting on unfinished dependencies
    Blocked,

    /// Show registry progress
    Status,
}

/// Resolved settings shared by every command
pub struct Workspace {
    pub config: Config,
    pub registry_path: PathBuf,
}

impl Workspace {
    /// Loads a fresh registry snapshot
    pub fn load_registry(&self) -> Result<Registry> {
        RegistryStore::new(&self.registry_path).load()
    }

    /// Plan options from config, with CLI flags applied on top
    pub fn resolve_options(&self, no_auto_deps: bool, force: bool) -> ResolveOptions {
        let mut options = ResolveOptions::from(&self.config.project.resolve);
        if no_auto_deps {
            options.auto_include_dependencies = false;
        }
        if force {
            options.force = true;
        }
        options
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = Config::load()?;
    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format);

    let registry_path = cli
        .registry
        .clone()
        .unwrap_or_else(|| config.registry_path());
    tracing::debug!(
        registry = %registry_path.display(),
        project = ?config.project_root,
        "featplan starting"
    );

    let workspace = Workspace {
        config,
        registry_path,
    };

    match cli.command {
        Commands::Init { path } => {
            let project = Project::init(&path)?;
            tracing::debug!(dir = %project.project_dir().display(), "initialized project");
            output.success(&format!(
                "Initialized featplan at {} (registry: {})",
                project.root().display(),
                project.registry_path().display()
            ));
        }

        Commands::Check => plan::check(&workspace, &output)?,
        Commands::Validate { ids } => plan::validate(&workspace, &output, &ids)?,
        Commands::Order { ids } => plan::order(&workspace, &output, &ids)?,
        Commands::Plan {
            ids,
            no_auto_deps,
            force,
        } => {
            let options = workspace.resolve_options(no_auto_deps, force);
            plan::plan(&workspace, &output, &ids, options)?
        }

        Commands::Deps { id, all } => query::deps(&workspace, &output, &id, all)?,
        Commands::Dependents { id, all } => query::dependents(&workspace, &output, &id, all)?,
        Commands::Ready => query::ready(&workspace, &output)?,
        Commands::Blocked => query::blocked(&workspace, &output)?,
        Commands::Status => query::status(&workspace, &output)?,
    }

    Ok(())
}
