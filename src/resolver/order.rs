//! Topological ordering
//!
//! Kahn's algorithm over the transitive closure of a request, with a
//! min-heap instead of a FIFO queue so independent features come out in
//! ascending ID order regardless of how the registry was written.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

use petgraph::graph::NodeIndex;
use petgraph::Direction;

use super::cycle::find_cycle;
use super::error::ResolveError;
use super::graph::DependencyGraph;
use super::validate::ValidationReport;
use crate::domain::FeatureId;

/// Returns the execution order for `requested` and everything it depends on
///
/// Every requested ID and every transitive dependency appears exactly once,
/// each after all of its dependencies. Fails with
/// [`ResolveError::CircularDependency`] if the closure contains a cycle,
/// [`ResolveError::MissingDependencies`] if anything in the closure depends
/// on a feature that does not exist, and [`ResolveError::UnknownFeature`] if
/// a requested ID is not in the graph.
pub fn execution_order(
    graph: &DependencyGraph,
    requested: &[FeatureId],
) -> Result<Vec<FeatureId>, ResolveError> {
    let mut roots = Vec::with_capacity(requested.len());
    for id in requested {
        let idx = graph
            .index_of(id)
            .ok_or(ResolveError::UnknownFeature(*id))?;
        roots.push(idx);
    }

    let closure = graph.reachable(&roots, Direction::Incoming);

    if let Some(cycle) = find_cycle(graph, Some(&closure)) {
        return Err(ResolveError::CircularDependency { cycle });
    }

    let missing: BTreeSet<FeatureId> = closure
        .iter()
        .flat_map(|&idx| graph.missing_dependencies(&graph.id_at(idx)))
        .collect();
    if !missing.is_empty() {
        tracing::debug!(missing = missing.len(), "closure has dangling dependencies");
        return Err(ResolveError::MissingDependencies(
            ValidationReport::for_missing(missing.into_iter().collect()),
        ));
    }

    let order = sort_closure(graph, &closure);
    if order.len() != closure.len() {
        // Unreachable once the cycle check passed; keep the error precise anyway
        let cycle = find_cycle(graph, Some(&closure)).unwrap_or_default();
        return Err(ResolveError::CircularDependency { cycle });
    }

    tracing::debug!(
        requested = requested.len(),
        planned = order.len(),
        "computed execution order"
    );

    Ok(order)
}

/// Returns the execution order for every feature in the graph
pub fn full_order(graph: &DependencyGraph) -> Result<Vec<FeatureId>, ResolveError> {
    let all: Vec<FeatureId> = graph.feature_ids().copied().collect();
    execution_order(graph, &all)
}

fn sort_closure(graph: &DependencyGraph, closure: &HashSet<NodeIndex>) -> Vec<FeatureId> {
    let mut unplaced: HashMap<NodeIndex, usize> = closure
        .iter()
        .map(|&idx| {
            let deps = graph
                .sorted_neighbors(idx, Direction::Incoming)
                .into_iter()
                .filter(|dep| closure.contains(dep))
                .count();
            (idx, deps)
        })
        .collect();

    let mut ready: BinaryHeap<Reverse<NodeIndex>> = unplaced
        .iter()
        .filter(|(_, &count)| count == 0)
        .map(|(&idx, _)| Reverse(idx))
        .collect();

    let mut order = Vec::with_capacity(closure.len());

    while let Some(Reverse(idx)) = ready.pop() {
        order.push(graph.id_at(idx));

        for dependent in graph.sorted_neighbors(idx, Direction::Outgoing) {
            if let Some(count) = unplaced.get_mut(&dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }
    }

    order
}
