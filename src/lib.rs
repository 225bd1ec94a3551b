//! featplan - dependency resolution for feature registries
//!
//! Reads a registry of `FR-###` features, validates their declared
//! dependencies, detects cycles and produces deterministic execution plans.

pub mod domain;
pub mod resolver;
pub mod storage;
pub mod logging;
pub mod cli;

pub use domain::{Feature, FeatureId, FeatureStatus, Registry};
pub use resolver::{ResolutionPlan, ResolveError, ResolveOptions, Resolver, ValidationReport};
