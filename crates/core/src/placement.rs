//! Greedy, single-pass resource placement: pick the best room, then the best tile in it.

pub mod fitness;
pub mod visibility;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::config::{PlacementConfig, PlacementMethod, PlacementWeights, ResourceCategory};
use crate::error::SoftError;
use crate::graph::paths::{ShortestPaths, dijkstra};
use crate::graph::{MapGraph, Node, NodeId, NodeKind};
use crate::grid::Grid;
use crate::rng::MapRng;
use crate::types::{Coord, Tile};

use fitness::{band_distance, normalize, visibility_fitness, wall_distances};
use visibility::{VisibilityMap, compute_visibility};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedResource {
    pub category: String,
    pub symbol: char,
    pub coord: Coord,
    pub room: NodeId,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementOutcome {
    pub placed: Vec<PlacedResource>,
    pub soft_errors: Vec<SoftError>,
}

/// Exact tile sets of room nodes whose area is only a bounding box, such as cave regions.
/// Rooms without an entry use the open tiles inside their bounds.
pub type Footprints = BTreeMap<NodeId, BTreeSet<Coord>>;

/// Per-room data that stays fixed while resources are placed.
struct RoomInfo {
    id: NodeId,
    tiles: Vec<Coord>,
    normalized_degree: f64,
    paths: ShortestPaths,
}

struct PlacementContext<'a> {
    grid: &'a mut Grid,
    graph: &'a mut MapGraph,
    weights: PlacementWeights,
    visibility: VisibilityMap,
    wall_distance: Vec<u32>,
    rooms: Vec<RoomInfo>,
    max_room_distance: f64,
    placed: Vec<PlacedResource>,
}

/// Places every configured category in order, stamping resource tiles into `grid` and
/// adding a tile node per resource to `graph`. Shortfalls are reported, never fatal.
pub fn place_resources(
    grid: &mut Grid,
    graph: &mut MapGraph,
    footprints: &Footprints,
    config: &PlacementConfig,
    rng: &mut MapRng,
) -> PlacementOutcome {
    let mut ctx = PlacementContext::new(grid, graph, footprints, config.weights);
    let mut soft_errors = Vec::new();

    for category in &config.categories {
        let mut placed = 0;
        while placed < category.count {
            let choice = match category.method {
                PlacementMethod::Heuristic => ctx.heuristic_choice(category),
                PlacementMethod::Random => ctx.random_choice(category, rng),
            };
            let Some((room, coord)) = choice else {
                break;
            };
            ctx.stamp(category, room, coord);
            placed += 1;
        }

        if placed < category.count {
            log::warn!(
                "placement: only {placed} of {} '{}' resource(s) fit",
                category.count,
                category.name
            );
            soft_errors.push(SoftError::ResourceUnplaced {
                category: category.name.clone(),
                requested: category.count,
                placed,
            });
        }
    }

    log::debug!("placement: {} resource(s) placed", ctx.placed.len());
    PlacementOutcome { placed: ctx.placed, soft_errors }
}

impl<'a> PlacementContext<'a> {
    fn new(
        grid: &'a mut Grid,
        graph: &'a mut MapGraph,
        footprints: &Footprints,
        weights: PlacementWeights,
    ) -> Self {
        let visibility = compute_visibility(grid);
        let wall_distance = wall_distances(grid);

        let room_ids: Vec<NodeId> = graph
            .nodes()
            .filter(|(id, node)| id.is_room() && node.bounds().is_some())
            .map(|(id, _)| id)
            .collect();

        let mut claimed = BTreeSet::new();
        let mut tiles_by_room: Vec<Vec<Coord>> = Vec::with_capacity(room_ids.len());
        for &id in &room_ids {
            let candidates: Vec<Coord> = match footprints.get(&id) {
                Some(footprint) => footprint.iter().copied().collect(),
                None => graph
                    .node(id)
                    .and_then(Node::bounds)
                    .map(|bounds| bounds.coords().collect())
                    .unwrap_or_default(),
            };
            let tiles = candidates
                .into_iter()
                .filter(|&coord| grid.in_range(coord) && grid.get(coord).is_open())
                .filter(|&coord| claimed.insert(coord))
                .collect();
            tiles_by_room.push(tiles);
        }

        let degrees: Vec<f64> = room_ids
            .iter()
            .map(|&id| graph.neighbors(id).filter(|(next, _)| next.is_room()).count() as f64)
            .collect();
        let normalized_degrees = normalize(&degrees);

        let mut rooms = Vec::with_capacity(room_ids.len());
        for ((id, tiles), normalized_degree) in
            room_ids.into_iter().zip(tiles_by_room).zip(normalized_degrees)
        {
            let room_visibility = mean(tiles.iter().filter_map(|&coord| visibility.get(coord)));
            if let Some(node) = graph.node_mut(id) {
                node.visibility = room_visibility;
            }
            rooms.push(RoomInfo { id, tiles, normalized_degree, paths: dijkstra(graph, id) });
        }

        let max_room_distance = rooms
            .iter()
            .flat_map(|room| room.paths.distances.values().copied())
            .fold(0.0, f64::max);

        Self {
            grid,
            graph,
            weights,
            visibility,
            wall_distance,
            rooms,
            max_room_distance,
            placed: Vec::new(),
        }
    }

    fn free_tiles(&self, room: &RoomInfo) -> Vec<Coord> {
        room.tiles.iter().copied().filter(|&coord| self.grid.get(coord) == Tile::Floor).collect()
    }

    fn is_eligible(&self, room: &RoomInfo, category: &ResourceCategory) -> bool {
        let Some(node) = self.graph.node(room.id) else {
            return false;
        };
        node.is_genuine_room()
            && !(category.restrict_distance && node.holds(category.symbol))
            && !self.free_tiles(room).is_empty()
    }

    fn heuristic_choice(&self, category: &ResourceCategory) -> Option<(NodeId, Coord)> {
        let mut best: Option<(f64, usize)> = None;
        for (index, room) in self.rooms.iter().enumerate() {
            if !self.is_eligible(room, category) {
                continue;
            }
            let score = self.room_score(room, category);
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, index));
            }
        }
        let room = &self.rooms[best?.1];
        self.best_tile(room, category).map(|coord| (room.id, coord))
    }

    fn random_choice(
        &self,
        category: &ResourceCategory,
        rng: &mut MapRng,
    ) -> Option<(NodeId, Coord)> {
        let candidates: Vec<(NodeId, Coord)> = self
            .rooms
            .iter()
            .filter(|room| self.is_eligible(room, category))
            .flat_map(|room| self.free_tiles(room).into_iter().map(move |coord| (room.id, coord)))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.range_usize(0, candidates.len() - 1)])
    }

    fn room_score(&self, room: &RoomInfo, category: &ResourceCategory) -> f64 {
        let degree_fit = 1.0
            - band_distance(room.normalized_degree, category.degree_low, category.degree_high);

        let nearest_placed = self
            .placed
            .iter()
            .filter_map(|resource| room.paths.distance_to(resource.room))
            .fold(None, |nearest: Option<f64>, distance| {
                Some(nearest.map_or(distance, |current| current.min(distance)))
            });
        let distance_fit = match nearest_placed {
            None => 1.0,
            Some(_) if self.max_room_distance <= 0.0 => 0.0,
            Some(distance) => distance / self.max_room_distance,
        };

        let neighbors: Vec<NodeId> =
            self.graph.neighbors(room.id).map(|(id, _)| id).filter(|id| id.is_room()).collect();
        let redundancy_fit = if neighbors.is_empty() {
            1.0
        } else {
            let same = neighbors
                .iter()
                .filter(|&&id| self.graph.node(id).is_some_and(|node| node.holds(category.symbol)))
                .count();
            1.0 - same as f64 / neighbors.len() as f64
        };

        self.weights.room_degree * degree_fit
            + self.weights.room_distance * distance_fit
            + self.weights.room_redundancy * redundancy_fit
    }

    fn best_tile(&self, room: &RoomInfo, category: &ResourceCategory) -> Option<Coord> {
        let tiles = self.free_tiles(room);
        let width = self.grid.width();

        let wall: Vec<f64> = tiles
            .iter()
            .map(|coord| {
                f64::from(self.wall_distance[coord.row as usize * width + coord.col as usize])
            })
            .collect();
        let max_wall = wall.iter().copied().fold(0.0, f64::max);

        let objects: Vec<f64> = tiles
            .iter()
            .map(|&coord| {
                self.placed
                    .iter()
                    .map(|resource| coord.distance(resource.coord))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let max_object = objects.iter().copied().filter(|d| d.is_finite()).fold(0.0, f64::max);

        let mut best: Option<(f64, Coord)> = None;
        for (index, &coord) in tiles.iter().enumerate() {
            let visibility = self.visibility.get(coord).unwrap_or(0.0);
            let wall_fit = if max_wall > 0.0 { wall[index] / max_wall } else { 1.0 };
            let object_fit = if !category.restrict_distance {
                0.0
            } else if self.placed.is_empty() || max_object <= 0.0 {
                1.0
            } else {
                objects[index] / max_object
            };
            let score = self.weights.tile_visibility
                * visibility_fitness(category.visibility, visibility)
                + self.weights.tile_wall_distance * wall_fit
                + self.weights.tile_object_distance * object_fit;
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, coord));
            }
        }
        best.map(|(_, coord)| coord)
    }

    fn stamp(&mut self, category: &ResourceCategory, room: NodeId, coord: Coord) {
        self.grid.set(coord, Tile::Resource(category.symbol));

        let tile_id = NodeId::tile(coord, self.grid.width());
        let mut node = Node::tile(coord, Some(category.symbol));
        node.visibility = self.visibility.get(coord);
        self.graph.add_node(tile_id, node);

        let mut weight = 0.0;
        if let Some(room_node) = self.graph.node_mut(room) {
            if let NodeKind::Room { bounds, resources } = &mut room_node.kind {
                resources.push(category.symbol);
                let (row, col) = bounds.center();
                weight = (f64::from(coord.row) - row).hypot(f64::from(coord.col) - col);
            }
        }
        self.graph.connect(tile_id, room, weight);

        log::debug!("placement: '{}' at ({}, {})", category.symbol, coord.row, coord.col);
        self.placed.push(PlacedResource {
            category: category.name.clone(),
            symbol: category.symbol,
            coord,
            room,
        });
    }
}

fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.into_iter().fold((0.0, 0_usize), |(sum, count), value| {
        (sum + value, count + 1)
    });
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisibilityPreference;
    use crate::graph::build_room_graph;
    use crate::mapgen::area::Area;

    fn category(name: &str, symbol: char, count: usize) -> ResourceCategory {
        ResourceCategory {
            name: name.to_string(),
            symbol,
            count,
            method: PlacementMethod::Heuristic,
            restrict_distance: true,
            degree_low: 0.0,
            degree_high: 1.0,
            visibility: VisibilityPreference::Neutral,
        }
    }

    /// Three 5x5 rooms in a row joined by one-tile corridors.
    fn three_rooms() -> (Grid, MapGraph) {
        let areas = [
            Area::new(1, 1, 5, 5),
            Area::corridor(6, 3, 6, 3),
            Area::new(7, 1, 11, 5),
            Area::corridor(12, 3, 12, 3),
            Area::new(13, 1, 17, 5),
        ];
        let mut grid = Grid::new(19, 7, Tile::Wall);
        for area in &areas {
            for coord in area.coords() {
                grid.set(coord, Tile::Floor);
            }
        }
        (grid, build_room_graph(&areas))
    }

    fn config(categories: Vec<ResourceCategory>) -> PlacementConfig {
        PlacementConfig { categories, ..PlacementConfig::default() }
    }

    #[test]
    fn restricted_category_gets_one_per_room_then_reports_shortfall() {
        let (mut grid, mut graph) = three_rooms();
        let outcome = place_resources(
            &mut grid,
            &mut graph,
            &Footprints::new(),
            &config(vec![category("spawn", 's', 5)]),
            &mut MapRng::from_seed_str("unused"),
        );

        assert_eq!(outcome.placed.len(), 3);
        let mut rooms: Vec<NodeId> = outcome.placed.iter().map(|p| p.room).collect();
        rooms.sort();
        rooms.dedup();
        assert_eq!(rooms.len(), 3, "each room holds one spawn");
        assert_eq!(outcome.soft_errors, vec![SoftError::ResourceUnplaced {
            category: "spawn".to_string(),
            requested: 5,
            placed: 3,
        }]);
        assert_eq!(grid.count(Tile::Resource('s')), 3);
    }

    #[test]
    fn placed_resources_become_graph_nodes() {
        let (mut grid, mut graph) = three_rooms();
        let outcome = place_resources(
            &mut grid,
            &mut graph,
            &Footprints::new(),
            &config(vec![category("medkit", 'h', 1)]),
            &mut MapRng::from_seed_str("unused"),
        );
        let resource = &outcome.placed[0];
        let tile = NodeId::tile(resource.coord, grid.width());
        let node = graph.node(tile).expect("resource node exists");
        assert!(node.holds('h'));
        assert!(node.visibility.is_some());
        assert!(graph.weight(tile, resource.room).is_some());
        assert!(graph.node(resource.room).is_some_and(|room| room.holds('h')));
    }

    #[test]
    fn interior_tiles_win_when_only_wall_distance_counts() {
        let (mut grid, mut graph) = three_rooms();
        let weights = PlacementWeights {
            tile_visibility: 0.0,
            tile_object_distance: 0.0,
            ..PlacementWeights::default()
        };
        let config = PlacementConfig { weights, categories: vec![category("ammo", 'a', 1)] };
        let outcome = place_resources(
            &mut grid,
            &mut graph,
            &Footprints::new(),
            &config,
            &mut MapRng::from_seed_str("unused"),
        );
        let coord = outcome.placed[0].coord;
        assert_eq!(coord.row, 3, "the middle row is furthest from the walls");
    }

    #[test]
    fn random_method_is_seeded_and_respects_restrictions() {
        let mut random = category("spawn", 's', 3);
        random.method = PlacementMethod::Random;
        let run = |seed: &str| {
            let (mut grid, mut graph) = three_rooms();
            place_resources(
                &mut grid,
                &mut graph,
                &Footprints::new(),
                &config(vec![random.clone()]),
                &mut MapRng::from_seed_str(seed),
            )
        };
        let a = run("test-1");
        assert_eq!(a, run("test-1"));
        assert!(a.soft_errors.is_empty());
        let mut rooms: Vec<NodeId> = a.placed.iter().map(|p| p.room).collect();
        rooms.dedup();
        assert_eq!(rooms.len(), 3);
    }

    #[test]
    fn cave_rooms_only_offer_their_own_tiles() {
        // An L-shaped room whose bounding box swallows a second room.
        let outer: BTreeSet<Coord> = (1..=9)
            .map(|col| Coord::new(1, col))
            .chain((2..=6).map(|row| Coord::new(row, 1)))
            .collect();
        let inner: BTreeSet<Coord> = Area::new(4, 3, 9, 6).coords().collect();
        let mut grid = Grid::new(12, 8, Tile::Wall);
        for &coord in outer.iter().chain(&inner) {
            grid.set(coord, Tile::Floor);
        }
        let areas = [
            Area::bounding(outer.iter().copied()).expect("outer bounds"),
            Area::bounding(inner.iter().copied()).expect("inner bounds"),
        ];
        let mut graph = build_room_graph(&areas);
        let footprints =
            Footprints::from([(NodeId::Room(0), outer.clone()), (NodeId::Room(1), inner.clone())]);

        let outcome = place_resources(
            &mut grid,
            &mut graph,
            &footprints,
            &config(vec![category("spawn", 's', 2)]),
            &mut MapRng::from_seed_str("unused"),
        );

        assert_eq!(outcome.placed.len(), 2, "the inner room keeps its tiles");
        for placed in &outcome.placed {
            assert!(footprints[&placed.room].contains(&placed.coord), "{placed:?}");
        }
    }

    #[test]
    fn unrestricted_category_can_share_a_room() {
        let mut unrestricted = category("ammo", 'a', 6);
        unrestricted.restrict_distance = false;
        let (mut grid, mut graph) = three_rooms();
        let outcome = place_resources(
            &mut grid,
            &mut graph,
            &Footprints::new(),
            &config(vec![unrestricted]),
            &mut MapRng::from_seed_str("unused"),
        );
        assert_eq!(outcome.placed.len(), 6);
        assert!(outcome.soft_errors.is_empty());
    }
}
