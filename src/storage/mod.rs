//! # Storage Layer
//!
//! Reads the feature registry and featplan configuration from disk.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Registry | JSON | `2-docs/features/feature-registry.json` (configurable) |
//! | Config | TOML | `.featplan/config.toml` |
//! | Global config | TOML | platform config dir, `featplan/config.toml` |
//!
//! ## Concurrency Safety
//!
//! [`RegistryStore`] takes a shared `fs2` lock while reading, so a writer
//! holding an exclusive lock never produces a torn snapshot.
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for a featplan project
//! - [`RegistryStore`] - Loads registry snapshots
//! - [`Config`] - Project and global configuration

mod config;
mod project;
mod registry_store;

pub use config::{
    Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, ResolveConfig, PROJECT_DIR,
};
pub use project::{Project, ProjectError};
pub use registry_store::{RegistryStore, DEFAULT_REGISTRY_PATH};
