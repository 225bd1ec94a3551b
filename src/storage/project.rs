//! Project management
//!
//! Handles project initialization and resolves the configured registry path.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::PROJECT_DIR;
use super::Config;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a featplan project. Run 'featplan init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r#"# featplan configuration

# Feature registry, relative to the project root
registry = "2-docs/features/feature-registry.json"

[resolve]
# Pull transitive dependencies into every plan
auto_include_dependencies = true

# Plan past dependencies that are present but not completed
force = false
"#;

/// A featplan project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Initializes a new project at the given path
    ///
    /// Existing configuration is left untouched.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&project_dir).with_context(|| {
            format!(
                "Failed to create {} directory: {}",
                PROJECT_DIR,
                project_dir.display()
            )
        })?;

        let config_path = project_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
            tracing::info!(path = %config_path.display(), "wrote default config");
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .featplan directory path
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Returns the configured registry path
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.config.project.registry)
    }
}
