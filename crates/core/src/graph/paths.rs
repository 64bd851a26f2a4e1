//! Single-source Dijkstra that keeps every equally short predecessor.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use super::{MapGraph, NodeId};

/// Distances closer than this are treated as equal when collecting predecessors.
pub const DISTANCE_EPSILON: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
pub struct ShortestPaths {
    pub source: NodeId,
    pub distances: BTreeMap<NodeId, f64>,
    /// Predecessors on some shortest path, in discovery order.
    pub predecessors: BTreeMap<NodeId, Vec<NodeId>>,
}

#[derive(Clone, Copy, Debug)]
struct Frontier {
    distance: f64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    /// Reversed so the max-heap pops the closest node, smallest id first on ties.
    fn cmp(&self, other: &Self) -> Ordering {
        other.distance.total_cmp(&self.distance).then_with(|| other.node.cmp(&self.node))
    }
}

pub fn dijkstra(graph: &MapGraph, source: NodeId) -> ShortestPaths {
    let mut distances = BTreeMap::new();
    let mut predecessors: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    let mut heap = BinaryHeap::new();

    if graph.contains(source) {
        distances.insert(source, 0.0);
        heap.push(Frontier { distance: 0.0, node: source });
    }

    while let Some(Frontier { distance, node }) = heap.pop() {
        if distances.get(&node).is_some_and(|&best| distance > best + DISTANCE_EPSILON) {
            continue;
        }
        for (next, weight) in graph.neighbors(node) {
            let candidate = distance + weight;
            match distances.get(&next) {
                Some(&known) if candidate < known - DISTANCE_EPSILON => {}
                Some(&known) if candidate <= known + DISTANCE_EPSILON => {
                    let entry = predecessors.entry(next).or_default();
                    if !entry.contains(&node) {
                        entry.push(node);
                    }
                    continue;
                }
                Some(_) => continue,
                None => {}
            }
            distances.insert(next, candidate);
            predecessors.insert(next, vec![node]);
            heap.push(Frontier { distance: candidate, node: next });
        }
    }

    ShortestPaths { source, distances, predecessors }
}

impl ShortestPaths {
    pub fn distance_to(&self, target: NodeId) -> Option<f64> {
        self.distances.get(&target).copied()
    }

    /// Up to `cap` distinct shortest paths from the source to `target`, each listed from
    /// source to target. Empty when `target` is unreachable.
    pub fn enumerate_paths(&self, target: NodeId, cap: usize) -> Vec<Vec<NodeId>> {
        let mut paths = Vec::new();
        if cap == 0 || !self.distances.contains_key(&target) {
            return paths;
        }
        let mut suffix = Vec::new();
        self.walk_back(target, &mut suffix, cap, &mut paths);
        paths
    }

    fn walk_back(
        &self,
        node: NodeId,
        suffix: &mut Vec<NodeId>,
        cap: usize,
        paths: &mut Vec<Vec<NodeId>>,
    ) {
        if paths.len() >= cap {
            return;
        }
        suffix.push(node);
        if node == self.source {
            paths.push(suffix.iter().rev().copied().collect());
        } else if let Some(previous) = self.predecessors.get(&node) {
            for &step in previous {
                self.walk_back(step, suffix, cap, paths);
            }
        }
        suffix.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use crate::mapgen::area::Area;

    fn graph_with(edges: &[(u32, u32, f64)], nodes: u32) -> MapGraph {
        let mut graph = MapGraph::new();
        for index in 0..nodes {
            graph.add_node(NodeId::Room(index), Node::room(Area::new(0, 0, 0, 0)));
        }
        for &(a, b, weight) in edges {
            graph.connect(NodeId::Room(a), NodeId::Room(b), weight);
        }
        graph
    }

    #[test]
    fn finds_the_cheaper_detour() {
        let graph = graph_with(&[(0, 1, 10.0), (0, 2, 1.0), (2, 1, 2.0)], 3);
        let paths = dijkstra(&graph, NodeId::Room(0));
        assert_eq!(paths.distance_to(NodeId::Room(1)), Some(3.0));
        assert_eq!(paths.enumerate_paths(NodeId::Room(1), 16), vec![vec![
            NodeId::Room(0),
            NodeId::Room(2),
            NodeId::Room(1)
        ]]);
    }

    #[test]
    fn keeps_every_equal_length_path_up_to_the_cap() {
        // A diamond: 0 -> {1, 2} -> 3, both branches of length 2.
        let graph = graph_with(&[(0, 1, 1.0), (0, 2, 1.0), (1, 3, 1.0), (2, 3, 1.0)], 4);
        let paths = dijkstra(&graph, NodeId::Room(0));
        assert_eq!(paths.enumerate_paths(NodeId::Room(3), 16).len(), 2);
        assert_eq!(paths.enumerate_paths(NodeId::Room(3), 1).len(), 1);
    }

    #[test]
    fn unreachable_targets_have_no_distance_or_paths() {
        let graph = graph_with(&[(0, 1, 1.0)], 3);
        let paths = dijkstra(&graph, NodeId::Room(0));
        assert_eq!(paths.distance_to(NodeId::Room(2)), None);
        assert!(paths.enumerate_paths(NodeId::Room(2), 16).is_empty());
        assert_eq!(paths.enumerate_paths(NodeId::Room(0), 16), vec![vec![NodeId::Room(0)]]);
    }
}
