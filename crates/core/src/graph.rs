//! Weighted, symmetric map graph over rooms and tiles.

pub mod analysis;
pub mod builder;
pub mod paths;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::mapgen::area::Area;
use crate::types::Coord;

pub use analysis::{MapProperties, analyze};
pub use builder::{build_room_graph, build_tile_graph};

/// Tile and room identifiers live in disjoint namespaces, so they can never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum NodeId {
    /// `row * width + col` of the tile.
    Tile(u32),
    Room(u32),
}

impl NodeId {
    pub fn tile(coord: Coord, width: usize) -> NodeId {
        NodeId::Tile(coord.row as u32 * width as u32 + coord.col as u32)
    }

    pub fn is_room(self) -> bool {
        matches!(self, NodeId::Room(_))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum NodeKind {
    Tile { row: i32, col: i32, resource: Option<char> },
    /// Room nodes may hold several resources when distance restrictions are off.
    Room { bounds: Area, resources: Vec<char> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Normalized visibility, filled in by placement.
    pub visibility: Option<f64>,
}

impl Node {
    pub fn room(bounds: Area) -> Self {
        Self { kind: NodeKind::Room { bounds, resources: Vec::new() }, visibility: None }
    }

    pub fn tile(coord: Coord, resource: Option<char>) -> Self {
        Self {
            kind: NodeKind::Tile { row: coord.row, col: coord.col, resource },
            visibility: None,
        }
    }

    pub fn bounds(&self) -> Option<&Area> {
        match &self.kind {
            NodeKind::Room { bounds, .. } => Some(bounds),
            NodeKind::Tile { .. } => None,
        }
    }

    pub fn is_corridor(&self) -> bool {
        self.bounds().is_some_and(|bounds| bounds.is_corridor)
    }

    pub fn is_dummy(&self) -> bool {
        self.bounds().is_some_and(|bounds| bounds.is_dummy)
    }

    pub fn is_genuine_room(&self) -> bool {
        self.bounds().is_some_and(Area::is_genuine_room)
    }

    pub fn holds(&self, symbol: char) -> bool {
        match &self.kind {
            NodeKind::Room { resources, .. } => resources.contains(&symbol),
            NodeKind::Tile { resource, .. } => *resource == Some(symbol),
        }
    }
}

/// Every edge is stored in both directions with the same non-negative weight.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapGraph {
    nodes: BTreeMap<NodeId, Node>,
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, f64>>,
}

impl MapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, id: NodeId, node: Node) {
        self.nodes.insert(id, node);
        self.adjacency.entry(id).or_default();
    }

    /// Removes the node together with every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let neighbors = self.adjacency.remove(&id).unwrap_or_default();
        for neighbor in neighbors.keys() {
            if let Some(edges) = self.adjacency.get_mut(neighbor) {
                edges.remove(&id);
            }
        }
        self.nodes.remove(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().map(|(&id, node)| (id, node))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Adds or overwrites the edge in both directions. Self-loops, unknown endpoints and
    /// negative or NaN weights are refused.
    pub fn connect(&mut self, a: NodeId, b: NodeId, weight: f64) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) || weight.is_nan() || weight < 0.0 {
            return false;
        }
        self.adjacency.entry(a).or_default().insert(b, weight);
        self.adjacency.entry(b).or_default().insert(a, weight);
        true
    }

    pub fn weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.adjacency.get(&a).and_then(|edges| edges.get(&b)).copied()
    }

    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.adjacency.get(&id).into_iter().flatten().map(|(&next, &weight)| (next, weight))
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency.get(&id).map_or(0, BTreeMap::len)
    }

    /// Directed edge count, i.e. twice the number of undirected edges.
    pub fn out_degree_sum(&self) -> usize {
        self.adjacency.values().map(BTreeMap::len).sum()
    }

    /// Each undirected edge once, smaller endpoint first.
    pub fn edges(&self) -> Vec<(NodeId, NodeId, f64)> {
        self.adjacency
            .iter()
            .flat_map(|(&a, edges)| {
                edges.iter().filter(move |(b, _)| a < **b).map(move |(&b, &weight)| (a, b, weight))
            })
            .collect()
    }
}
