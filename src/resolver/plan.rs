//! Resolution planning
//!
//! [`Resolver`] borrows a registry snapshot, derives the dependency graph
//! once, and answers validation, ordering and impact queries against it.

use std::collections::BTreeSet;

use serde::Serialize;

use super::cycle::{detect_cycle, find_cycle};
use super::error::ResolveError;
use super::graph::DependencyGraph;
use super::order::execution_order;
use super::validate::{validate_dependencies, ValidationReport};
use crate::domain::{FeatureId, FeatureStatus, Registry};

/// Options for [`Resolver::resolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolveOptions {
    /// Include every transitive dependency in the plan
    pub auto_include_dependencies: bool,

    /// Plan even when dependencies are present but not completed
    pub force: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            auto_include_dependencies: true,
            force: false,
        }
    }
}

impl ResolveOptions {
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn requested_only(mut self) -> Self {
        self.auto_include_dependencies = false;
        self
    }
}

/// Non-fatal conditions attached to a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// A dependency was left out of the plan and is not completed
    ExcludedDependency {
        feature: FeatureId,
        dependency: FeatureId,
        status: FeatureStatus,
    },

    /// `force` was used to plan past an incomplete dependency
    ForcedIncomplete {
        dependency: FeatureId,
        status: FeatureStatus,
    },
}

impl std::fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanWarning::ExcludedDependency {
                feature,
                dependency,
                status,
            } => write!(
                f,
                "{} depends on {} ({}), which is not part of this plan",
                feature, dependency, status
            ),
            PlanWarning::ForcedIncomplete { dependency, status } => {
                write!(f, "forced past incomplete dependency {} ({})", dependency, status)
            }
        }
    }
}

/// An ordered execution plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionPlan {
    /// Requested IDs, deduplicated, in request order
    pub requested: Vec<FeatureId>,

    /// Features to execute, dependencies first
    pub order: Vec<FeatureId>,

    /// IDs in `order` that were pulled in rather than requested
    pub included_dependencies: Vec<FeatureId>,

    pub warnings: Vec<PlanWarning>,

    pub validation: ValidationReport,

    pub options: ResolveOptions,
}

impl ResolutionPlan {
    /// True when every prerequisite is already completed
    pub fn is_ready(&self) -> bool {
        self.validation.valid
    }
}

/// Whole-registry health report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryCheck {
    pub healthy: bool,
    pub feature_count: usize,
    pub cycle: Option<Vec<FeatureId>>,
    pub missing_references: Vec<MissingReference>,
    pub rejected_ids: Vec<String>,
    pub invalid_references: Vec<InvalidReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingReference {
    pub feature: FeatureId,
    pub missing: FeatureId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidReference {
    pub feature: FeatureId,
    pub reference: String,
}

/// A feature that cannot start yet, with what it is waiting on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedFeature {
    pub id: FeatureId,
    pub blocked_by: Vec<FeatureId>,
}

/// Dependency resolver over one registry snapshot
pub struct Resolver<'a> {
    registry: &'a Registry,
    graph: DependencyGraph,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            graph: DependencyGraph::build(registry.features()),
            registry,
        }
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Checks that every transitive dependency of `requested` exists and is completed
    pub fn validate_dependencies<S: AsRef<str>>(&self, requested: &[S]) -> ValidationReport {
        validate_dependencies(self.registry, requested)
    }

    /// Returns the ordered transitive closure of `requested`
    pub fn execution_order<S: AsRef<str>>(
        &self,
        requested: &[S],
    ) -> Result<Vec<FeatureId>, ResolveError> {
        let ids = parse_ids(requested)?;
        execution_order(&self.graph, &ids)
    }

    /// Returns `id` and everything it depends on, dependencies first
    pub fn resolve_dependencies(&self, id: &str) -> Result<Vec<FeatureId>, ResolveError> {
        self.execution_order(&[id])
    }

    /// Builds an execution plan for `requested`
    ///
    /// Cycles, missing features and malformed IDs always fail. Incomplete
    /// dependencies fail unless `options.force` is set.
    pub fn resolve<S: AsRef<str>>(
        &self,
        requested: &[S],
        options: ResolveOptions,
    ) -> Result<ResolutionPlan, ResolveError> {
        let report = self.validate_dependencies(requested);

        // Cycles first: they are fatal and make the rest of the report moot
        let known: Vec<FeatureId> = dedup(
            requested
                .iter()
                .filter_map(|raw| raw.as_ref().parse::<FeatureId>().ok())
                .filter(|id| self.graph.contains(id)),
        );
        let roots: Vec<_> = known.iter().filter_map(|id| self.graph.index_of(id)).collect();
        let closure = self
            .graph
            .reachable(&roots, petgraph::Direction::Incoming);
        if let Some(cycle) = find_cycle(&self.graph, Some(&closure)) {
            return Err(ResolveError::CircularDependency { cycle });
        }

        if !report.invalid_identifiers.is_empty() {
            tracing::debug!("plan rejected: malformed identifiers");
            return Err(ResolveError::InvalidIdentifiers(report));
        }

        if !report.missing_dependencies.is_empty() {
            tracing::debug!("plan rejected: missing dependencies");
            return Err(ResolveError::MissingDependencies(report));
        }

        if !report.incomplete_dependencies.is_empty() && !options.force {
            tracing::debug!("plan rejected: incomplete dependencies without force");
            return Err(ResolveError::IncompleteDependencies(report));
        }

        let full_order = execution_order(&self.graph, &known)?;
        let requested_set: BTreeSet<FeatureId> = known.iter().copied().collect();
        let mut warnings = Vec::new();

        let order = if options.auto_include_dependencies {
            full_order
        } else {
            // Walk the whole closure so unmet transitive dependencies are
            // flagged too, each against the feature that declares it
            for id in &full_order {
                let Some(feature) = self.registry.get(id) else {
                    continue;
                };
                for dep in &feature.dependencies {
                    let status = self.registry.status_of(dep).unwrap_or_default();
                    if !requested_set.contains(dep) && !status.is_complete() {
                        warnings.push(PlanWarning::ExcludedDependency {
                            feature: *id,
                            dependency: *dep,
                            status,
                        });
                    }
                }
            }
            full_order
                .into_iter()
                .filter(|id| requested_set.contains(id))
                .collect()
        };

        if options.force {
            for dep in &report.incomplete_dependencies {
                let status = self.registry.status_of(dep).unwrap_or_default();
                warnings.push(PlanWarning::ForcedIncomplete {
                    dependency: *dep,
                    status,
                });
            }
        }

        for warning in &warnings {
            tracing::debug!(%warning, "plan warning");
        }

        let included_dependencies = order
            .iter()
            .filter(|id| !requested_set.contains(id))
            .copied()
            .collect();

        Ok(ResolutionPlan {
            requested: known,
            order,
            included_dependencies,
            warnings,
            validation: report,
            options,
        })
    }

    /// Direct dependencies of `id`, in declaration order
    pub fn direct_dependencies(&self, id: &str) -> Result<Vec<FeatureId>, ResolveError> {
        let id = self.known_id(id)?;
        Ok(self
            .registry
            .get(&id)
            .map(|f| f.dependencies.clone())
            .unwrap_or_default())
    }

    /// Every feature `id` depends on, directly or indirectly, excluding itself
    ///
    /// Declared dependencies on unknown features are included; they are
    /// still dependencies even if nothing can satisfy them.
    pub fn all_dependencies(&self, id: &str) -> Result<Vec<FeatureId>, ResolveError> {
        let id = self.known_id(id)?;
        let closure = self.graph.closure(&[id]);

        let mut all: BTreeSet<FeatureId> = BTreeSet::new();
        for member in &closure {
            all.extend(self.graph.missing_dependencies(member));
        }
        all.extend(closure);
        all.remove(&id);

        Ok(all.into_iter().collect())
    }

    /// Features that declare a direct dependency on `id`
    pub fn dependents(&self, id: &str) -> Result<Vec<FeatureId>, ResolveError> {
        let id = self.known_id(id)?;
        Ok(self.graph.dependents(&id))
    }

    /// Features affected if `id` changes: every transitive dependent
    pub fn all_dependents(&self, id: &str) -> Result<Vec<FeatureId>, ResolveError> {
        let id = self.known_id(id)?;
        let mut impacted = self.graph.transitive_dependents(&id);
        impacted.remove(&id);
        Ok(impacted.into_iter().collect())
    }

    /// Features not yet completed whose dependencies are all completed
    pub fn ready_features(&self) -> Vec<FeatureId> {
        self.registry
            .features()
            .filter(|f| !f.is_complete())
            .filter(|f| {
                f.dependencies.iter().all(|dep| {
                    self.registry
                        .status_of(dep)
                        .map(|s| s.is_complete())
                        .unwrap_or(false)
                })
            })
            .map(|f| f.id)
            .collect()
    }

    /// Features not yet completed with at least one unsatisfied dependency
    pub fn blocked_features(&self) -> Vec<BlockedFeature> {
        self.registry
            .features()
            .filter(|f| !f.is_complete())
            .filter_map(|f| {
                let blocked_by: Vec<FeatureId> = f
                    .dependencies
                    .iter()
                    .filter(|dep| {
                        self.registry
                            .status_of(dep)
                            .map(|s| !s.is_complete())
                            .unwrap_or(true)
                    })
                    .copied()
                    .collect();

                (!blocked_by.is_empty()).then_some(BlockedFeature {
                    id: f.id,
                    blocked_by,
                })
            })
            .collect()
    }

    /// Checks the whole registry for structural problems
    pub fn check(&self) -> RegistryCheck {
        let cycle = detect_cycle(&self.graph);

        let missing_references: Vec<MissingReference> = self
            .graph
            .dangling_references()
            .map(|(feature, missing)| MissingReference { feature, missing })
            .collect();

        let invalid_references: Vec<InvalidReference> = self
            .registry
            .all_invalid_references()
            .flat_map(|(feature, refs)| {
                refs.iter().map(move |r| InvalidReference {
                    feature: *feature,
                    reference: r.clone(),
                })
            })
            .collect();

        let rejected_ids = self.registry.rejected_ids().to_vec();

        let healthy = cycle.is_none()
            && missing_references.is_empty()
            && invalid_references.is_empty()
            && rejected_ids.is_empty();

        RegistryCheck {
            healthy,
            feature_count: self.registry.len(),
            cycle,
            missing_references,
            rejected_ids,
            invalid_references,
        }
    }

    fn known_id(&self, raw: &str) -> Result<FeatureId, ResolveError> {
        let id: FeatureId = raw.parse()?;
        if !self.registry.contains(&id) {
            return Err(ResolveError::UnknownFeature(id));
        }
        Ok(id)
    }
}

/// Resolves `requested` against `registry` in one call
pub fn resolve<S: AsRef<str>>(
    registry: &Registry,
    requested: &[S],
    options: ResolveOptions,
) -> Result<ResolutionPlan, ResolveError> {
    Resolver::new(registry).resolve(requested, options)
}

fn parse_ids<S: AsRef<str>>(raw: &[S]) -> Result<Vec<FeatureId>, ResolveError> {
    raw.iter()
        .map(|s| s.as_ref().parse::<FeatureId>().map_err(ResolveError::from))
        .collect()
}

fn dedup(ids: impl Iterator<Item = FeatureId>) -> Vec<FeatureId> {
    let mut seen = BTreeSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
