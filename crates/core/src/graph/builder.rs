//! Room graphs from layout areas, and fine-grained tile graphs from finished grids.

use std::f64::consts::SQRT_2;

use crate::grid::Grid;
use crate::mapgen::area::Area;
use crate::types::{Coord, Tile};

use super::{MapGraph, Node, NodeId};

/// One node per area, edges between touching areas weighted by center distance. Corridor
/// nodes, and dummy nodes when genuine rooms exist, are then contracted into edges.
pub fn build_room_graph(areas: &[Area]) -> MapGraph {
    let mut graph = MapGraph::new();
    for (index, area) in areas.iter().enumerate() {
        graph.add_node(NodeId::Room(index as u32), Node::room(*area));
    }

    for (i, a) in areas.iter().enumerate() {
        for (j, b) in areas.iter().enumerate().skip(i + 1) {
            if a.is_corridor && b.is_corridor {
                continue;
            }
            if a.overlaps_or_touches(b) {
                let weight = a.center_distance(b);
                graph.connect(NodeId::Room(i as u32), NodeId::Room(j as u32), weight);
            }
        }
    }

    let corridors = matching(&graph, Node::is_corridor);
    contract(&mut graph, &corridors);
    if graph.nodes().any(|(_, node)| node.is_genuine_room()) {
        let dummies = matching(&graph, Node::is_dummy);
        contract(&mut graph, &dummies);
    }

    log::debug!(
        "room graph: {} area(s) contracted to {} node(s), {} edge(s)",
        areas.len(),
        graph.len(),
        graph.out_degree_sum() / 2
    );
    graph
}

fn matching(graph: &MapGraph, predicate: fn(&Node) -> bool) -> Vec<NodeId> {
    graph.nodes().filter(|(_, node)| predicate(node)).map(|(id, _)| id).collect()
}

/// Replaces each node by edges between all pairs of its neighbours, weighted by the sum of
/// the two edges. An existing lighter edge is kept.
fn contract(graph: &mut MapGraph, ids: &[NodeId]) {
    for &id in ids {
        let neighbors: Vec<(NodeId, f64)> = graph.neighbors(id).collect();
        for (index, &(a, weight_a)) in neighbors.iter().enumerate() {
            for &(b, weight_b) in &neighbors[index + 1..] {
                let weight = weight_a + weight_b;
                if graph.weight(a, b).is_none_or(|existing| weight < existing) {
                    graph.connect(a, b, weight);
                }
            }
        }
        graph.remove_node(id);
    }
}

/// One node per open tile; orthogonal steps weigh 1, diagonal steps √2 and are only
/// allowed when both orthogonal cells are open.
pub fn build_tile_graph(grid: &Grid) -> MapGraph {
    let mut graph = MapGraph::new();
    let width = grid.width();
    for coord in grid.open_coords() {
        let resource = match grid.get(coord) {
            Tile::Resource(symbol) => Some(symbol),
            _ => None,
        };
        graph.add_node(NodeId::tile(coord, width), Node::tile(coord, resource));
    }

    let open = |coord: Coord| grid.get(coord).is_open();
    for coord in grid.open_coords() {
        let id = NodeId::tile(coord, width);
        for next in [coord.offset(0, 1), coord.offset(1, 0)] {
            if open(next) {
                graph.connect(id, NodeId::tile(next, width), 1.0);
            }
        }
        for d_col in [-1, 1] {
            let next = coord.offset(1, d_col);
            if open(next) && open(coord.offset(1, 0)) && open(coord.offset(0, d_col)) {
                graph.connect(id, NodeId::tile(next, width), SQRT_2);
            }
        }
    }
    graph
}
