//! Dependency graph for features
//!
//! Built fresh from a registry snapshot on every resolver call and never
//! mutated afterwards. Uses petgraph for storage and neighbor lookups; the
//! traversals in `cycle` and `order` run on top of this one structure.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::domain::{Feature, FeatureId};

/// A dependency graph over features
///
/// Edge direction is `dependency -> dependent`, i.e. "must be completed
/// before". Nodes are added in ascending ID order, so comparing two
/// [`NodeIndex`] values compares their feature IDs.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// The underlying directed graph
    graph: DiGraph<FeatureId, ()>,

    /// Map from FeatureId to node index
    node_map: BTreeMap<FeatureId, NodeIndex>,

    /// Declared dependencies on features that are not in the graph
    dangling: BTreeMap<FeatureId, BTreeSet<FeatureId>>,
}

impl DependencyGraph {
    /// Builds a graph from a collection of features
    ///
    /// Never fails: self-dependencies are kept as self-loops for the cycle
    /// detector, and unknown dependencies are kept as dangling references.
    pub fn build<'a>(features: impl IntoIterator<Item = &'a Feature>) -> Self {
        let mut features: Vec<&Feature> = features.into_iter().collect();
        features.sort_by_key(|f| f.id);
        features.dedup_by_key(|f| f.id);

        let mut graph = Self::default();

        // First pass: add all nodes, in ID order
        for feature in &features {
            let idx = graph.graph.add_node(feature.id);
            graph.node_map.insert(feature.id, idx);
        }

        // Second pass: add all edges
        for feature in &features {
            let task_idx = graph.node_map[&feature.id];
            let deps: BTreeSet<FeatureId> = feature.dependencies.iter().copied().collect();

            for dep in deps {
                match graph.node_map.get(&dep) {
                    Some(&dep_idx) => {
                        graph.graph.add_edge(dep_idx, task_idx, ());
                    }
                    None => {
                        graph.dangling.entry(feature.id).or_default().insert(dep);
                    }
                }
            }
        }

        tracing::trace!(
            nodes = graph.graph.node_count(),
            edges = graph.graph.edge_count(),
            dangling = graph.dangling.len(),
            "built dependency graph"
        );

        graph
    }

    /// Returns true if the graph contains the feature
    pub fn contains(&self, id: &FeatureId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Returns the number of features in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Returns the number of dependency edges (dangling references excluded)
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns all feature IDs in ascending order
    pub fn feature_ids(&self) -> impl Iterator<Item = &FeatureId> {
        self.node_map.keys()
    }

    /// Returns the direct dependencies of a feature that exist in the graph
    pub fn dependencies(&self, id: &FeatureId) -> Vec<FeatureId> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Returns the direct dependents of a feature (features that depend on it)
    pub fn dependents(&self, id: &FeatureId) -> Vec<FeatureId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Returns declared dependencies of `id` that name unknown features
    pub fn missing_dependencies(&self, id: &FeatureId) -> Vec<FeatureId> {
        self.dangling
            .get(id)
            .map(|missing| missing.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Iterates `(owner, missing)` pairs for every dangling reference
    pub fn dangling_references(&self) -> impl Iterator<Item = (FeatureId, FeatureId)> + '_ {
        self.dangling
            .iter()
            .flat_map(|(owner, missing)| missing.iter().map(move |m| (*owner, *m)))
    }

    /// Returns every feature reachable from `roots` along dependency edges,
    /// roots included. IDs not in the graph are ignored.
    pub fn closure(&self, roots: &[FeatureId]) -> BTreeSet<FeatureId> {
        let indices: Vec<NodeIndex> = roots
            .iter()
            .filter_map(|id| self.node_map.get(id).copied())
            .collect();

        self.reachable(&indices, Direction::Incoming)
            .into_iter()
            .map(|idx| self.graph[idx])
            .collect()
    }

    /// Returns every feature that transitively depends on `id`, excluding
    /// `id` itself unless it sits on a cycle
    pub fn transitive_dependents(&self, id: &FeatureId) -> BTreeSet<FeatureId> {
        let Some(&start) = self.node_map.get(id) else {
            return BTreeSet::new();
        };

        let starts: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(start, Direction::Outgoing)
            .collect();

        self.reachable(&starts, Direction::Outgoing)
            .into_iter()
            .map(|idx| self.graph[idx])
            .collect()
    }

    pub(crate) fn index_of(&self, id: &FeatureId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub(crate) fn id_at(&self, idx: NodeIndex) -> FeatureId {
        self.graph[idx]
    }

    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    pub(crate) fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Neighbor indices of `idx` in the given direction, ascending
    pub(crate) fn sorted_neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> =
            self.graph.neighbors_directed(idx, direction).collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Nodes reachable from `starts` in `direction`, starts included
    pub(crate) fn reachable(&self, starts: &[NodeIndex], direction: Direction) -> HashSet<NodeIndex> {
        let mut seen: HashSet<NodeIndex> = HashSet::new();
        let mut stack: Vec<NodeIndex> = starts.to_vec();

        while let Some(idx) = stack.pop() {
            if seen.insert(idx) {
                stack.extend(self.graph.neighbors_directed(idx, direction));
            }
        }

        seen
    }

    fn neighbors(&self, id: &FeatureId, direction: Direction) -> Vec<FeatureId> {
        match self.node_map.get(id) {
            Some(&idx) => self
                .sorted_neighbors(idx, direction)
                .into_iter()
                .map(|n| self.graph[n])
                .collect(),
            None => vec![],
        }
    }
}
