//! # Dependency Resolver
//!
//! Turns a registry snapshot into validation reports and execution plans.
//!
//! ## Pipeline
//!
//! 1. [`DependencyGraph::build`] derives nodes and edges from the registry
//! 2. [`validate_dependencies`] collects missing, incomplete and malformed references
//! 3. [`detect_cycle`] rejects loops anywhere in the requested closure
//! 4. [`execution_order`] sorts the closure, lowest ready ID first
//! 5. [`Resolver::resolve`] combines the above into a [`ResolutionPlan`]
//!
//! Nothing here performs I/O or mutates the registry.

mod cycle;
mod error;
mod graph;
mod order;
mod plan;
mod validate;

pub use cycle::detect_cycle;
pub use error::{format_cycle, ResolveError};
pub use graph::DependencyGraph;
pub use order::{execution_order, full_order};
pub use plan::{
    resolve, BlockedFeature, InvalidReference, MissingReference, PlanWarning, RegistryCheck,
    ResolutionPlan, ResolveOptions, Resolver,
};
pub use validate::{validate_dependencies, ValidationReport};
