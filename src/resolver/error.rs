//! Resolver errors

use thiserror::Error;

use super::validate::ValidationReport;
use crate::domain::{FeatureId, IdError};

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("Circular dependency detected: {}", format_cycle(.cycle))]
    CircularDependency { cycle: Vec<FeatureId> },

    #[error(transparent)]
    InvalidIdentifier(#[from] IdError),

    #[error("Feature not found: {0}")]
    UnknownFeature(FeatureId),

    #[error("{}", .0.error_message.as_deref().unwrap_or("invalid identifiers"))]
    InvalidIdentifiers(ValidationReport),

    #[error("{}", .0.error_message.as_deref().unwrap_or("missing dependencies"))]
    MissingDependencies(ValidationReport),

    #[error("{}", .0.error_message.as_deref().unwrap_or("incomplete dependencies"))]
    IncompleteDependencies(ValidationReport),
}

impl ResolveError {
    /// Returns the cycle for circular dependency errors
    pub fn cycle(&self) -> Option<&[FeatureId]> {
        match self {
            ResolveError::CircularDependency { cycle } => Some(cycle),
            _ => None,
        }
    }

    /// Returns the validation report attached to data-quality errors
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            ResolveError::InvalidIdentifiers(report)
            | ResolveError::MissingDependencies(report)
            | ResolveError::IncompleteDependencies(report) => Some(report),
            _ => None,
        }
    }

    /// Structural errors can never be waived by `force`
    pub fn is_structural(&self) -> bool {
        !matches!(self, ResolveError::IncompleteDependencies(_))
    }
}

/// Renders a cycle as `A -> B -> A`
pub fn format_cycle(cycle: &[FeatureId]) -> String {
    let mut parts: Vec<String> = cycle.iter().map(|id| id.to_string()).collect();
    if let Some(first) = cycle.first() {
        parts.push(first.to_string());
    }
    parts.join(" -> ")
}
