//! Cycle detection
//!
//! White/gray/black depth-first search along dependency edges. Gray nodes
//! are exactly the ones on the current DFS stack, so meeting a gray node
//! means the stack slice from that node upward is a cycle.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use petgraph::Direction;

use super::graph::DependencyGraph;
use crate::domain::FeatureId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

struct Frame {
    node: NodeIndex,
    /// Unvisited dependencies, descending so `pop` yields the lowest ID
    pending: Vec<NodeIndex>,
}

/// Finds a cycle anywhere in the graph
///
/// Returns the cycle in "depends on" order: each ID depends on the next,
/// and the last depends on the first. A self-loop is a cycle of length 1.
pub fn detect_cycle(graph: &DependencyGraph) -> Option<Vec<FeatureId>> {
    find_cycle(graph, None)
}

/// Finds a cycle among the nodes of `scope` only
pub(crate) fn find_cycle(
    graph: &DependencyGraph,
    scope: Option<&HashSet<NodeIndex>>,
) -> Option<Vec<FeatureId>> {
    let in_scope = |idx: NodeIndex| scope.map_or(true, |s| s.contains(&idx));

    let mut marks = vec![Mark::White; graph.node_count()];

    // Roots in ascending ID order, so disconnected components are all covered
    // and the reported cycle is stable across runs.
    for root in graph.node_indices().filter(|idx| in_scope(*idx)) {
        if marks[root.index()] != Mark::White {
            continue;
        }

        marks[root.index()] = Mark::Gray;
        let mut stack = vec![frame(graph, root)];

        while let Some(top) = stack.last_mut() {
            let Some(next) = top.pending.pop() else {
                marks[top.node.index()] = Mark::Black;
                stack.pop();
                continue;
            };

            if !in_scope(next) {
                continue;
            }

            match marks[next.index()] {
                Mark::White => {
                    marks[next.index()] = Mark::Gray;
                    stack.push(frame(graph, next));
                }
                Mark::Gray => {
                    let start = stack
                        .iter()
                        .position(|f| f.node == next)
                        .unwrap_or(0);
                    let cycle: Vec<FeatureId> =
                        stack[start..].iter().map(|f| graph.id_at(f.node)).collect();

                    tracing::debug!(cycle = ?cycle, "dependency cycle found");
                    return Some(cycle);
                }
                Mark::Black => {}
            }
        }
    }

    None
}

fn frame(graph: &DependencyGraph, node: NodeIndex) -> Frame {
    let mut pending = graph.sorted_neighbors(node, Direction::Incoming);
    pending.reverse();
    Frame { node, pending }
}
