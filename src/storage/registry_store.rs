//! JSON storage for the feature registry
//!
//! The registry lives in a single JSON document, by default
//! `2-docs/features/feature-registry.json`. It is written by other tools;
//! this store only reads it, under a shared lock.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::Registry;

/// Default registry location relative to the project root
pub const DEFAULT_REGISTRY_PATH: &str = "2-docs/features/feature-registry.json";

/// Read-only store for the registry document
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    /// Creates a store for the document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(DEFAULT_REGISTRY_PATH))
    }

    /// Returns the path to the registry document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads a registry snapshot
    ///
    /// A missing file is an error: an absent registry is not an empty one.
    pub fn load(&self) -> Result<Registry> {
        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open registry: {}", self.path.display()))?;

        FileExt::lock_shared(&file).context("Failed to acquire read lock on registry")?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("Failed to read registry: {}", self.path.display()))?;

        // Lock is released when file is dropped
        let registry = Registry::from_json(&content)
            .with_context(|| format!("Invalid registry: {}", self.path.display()))?;

        tracing::debug!(
            path = %self.path.display(),
            features = registry.len(),
            rejected = registry.rejected_ids().len(),
            "loaded registry"
        );

        Ok(registry)
    }
}
