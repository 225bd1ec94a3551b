//! Dependency validation
//!
//! Checks that every transitive dependency of a request exists and is
//! completed. Problems are collected into a [`ValidationReport`] so callers
//! can show all of them at once.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;

use crate::domain::{FeatureId, Registry};

/// Outcome of validating a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,

    /// Declared or requested, but absent from the registry
    pub missing_dependencies: Vec<FeatureId>,

    /// Present, but not yet completed
    pub incomplete_dependencies: Vec<FeatureId>,

    /// Present and completed
    pub satisfied_dependencies: Vec<FeatureId>,

    /// IDs that do not match the `FR-###` format
    pub invalid_identifiers: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ValidationReport {
    /// Returns true if something other than completion status is wrong
    pub fn has_structural_problems(&self) -> bool {
        !self.missing_dependencies.is_empty() || !self.invalid_identifiers.is_empty()
    }

    /// Report for dependencies that name features absent from the registry
    pub(crate) fn for_missing(missing: Vec<FeatureId>) -> Self {
        Self {
            missing_dependencies: missing,
            ..Self::default()
        }
        .finish()
    }

    fn finish(mut self) -> Self {
        self.valid = !self.has_structural_problems() && self.incomplete_dependencies.is_empty();
        self.error_message = (!self.valid).then(|| self.describe());
        self
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();

        if !self.missing_dependencies.is_empty() {
            parts.push(format!(
                "missing dependencies: {}",
                join(&self.missing_dependencies)
            ));
        }
        if !self.incomplete_dependencies.is_empty() {
            parts.push(format!(
                "incomplete dependencies: {}",
                join(&self.incomplete_dependencies)
            ));
        }
        if !self.invalid_identifiers.is_empty() {
            parts.push(format!(
                "invalid identifiers: {}",
                self.invalid_identifiers.join(", ")
            ));
        }

        format!("Dependency validation failed ({})", parts.join("; "))
    }
}

/// Validates a request against a registry snapshot
///
/// Requested IDs that are absent count as missing. Requested IDs themselves
/// are not required to be completed; everything they depend on is.
pub fn validate_dependencies<S: AsRef<str>>(
    registry: &Registry,
    requested: &[S],
) -> ValidationReport {
    let mut missing = BTreeSet::new();
    let mut incomplete = BTreeSet::new();
    let mut satisfied = BTreeSet::new();
    let mut invalid = BTreeSet::new();

    let mut queue: VecDeque<FeatureId> = VecDeque::new();
    let mut visited: BTreeSet<FeatureId> = BTreeSet::new();

    for raw in requested {
        let raw = raw.as_ref();
        match raw.parse::<FeatureId>() {
            Ok(id) if registry.contains(&id) => {
                if visited.insert(id) {
                    queue.push_back(id);
                }
            }
            Ok(id) => {
                missing.insert(id);
            }
            Err(_) => {
                invalid.insert(raw.to_string());
            }
        }
    }

    while let Some(id) = queue.pop_front() {
        let Some(feature) = registry.get(&id) else {
            continue;
        };

        invalid.extend(registry.invalid_references(&id).iter().cloned());

        for dep in &feature.dependencies {
            match registry.status_of(dep) {
                None => {
                    missing.insert(*dep);
                }
                Some(status) => {
                    if status.is_complete() {
                        satisfied.insert(*dep);
                    } else {
                        incomplete.insert(*dep);
                    }
                    if visited.insert(*dep) {
                        queue.push_back(*dep);
                    }
                }
            }
        }
    }

    let report = ValidationReport {
        valid: false,
        missing_dependencies: missing.into_iter().collect(),
        incomplete_dependencies: incomplete.into_iter().collect(),
        satisfied_dependencies: satisfied.into_iter().collect(),
        invalid_identifiers: invalid.into_iter().collect(),
        error_message: None,
    }
    .finish();

    tracing::debug!(
        valid = report.valid,
        missing = report.missing_dependencies.len(),
        incomplete = report.incomplete_dependencies.len(),
        invalid = report.invalid_identifiers.len(),
        "validated dependencies"
    );

    report
}

fn join(ids: &[FeatureId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
