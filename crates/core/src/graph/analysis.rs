//! Graph-wide quality metrics for a finished map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;

use super::paths::{ShortestPaths, dijkstra};
use super::{MapGraph, NodeId};

/// Center and periphery membership tolerance.
pub const ECCENTRICITY_EPSILON: f64 = 1e-6;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapProperties {
    pub node_count: usize,
    pub edge_count: usize,
    pub degree_min: f64,
    pub degree_max: f64,
    pub degree_avg: f64,
    pub closeness_min: f64,
    pub closeness_max: f64,
    pub closeness_avg: f64,
    pub betweenness_min: f64,
    pub betweenness_max: f64,
    pub betweenness_avg: f64,
    pub radius: f64,
    pub diameter: f64,
    pub center_set_size: usize,
    pub periphery_set_size: usize,
    pub avg_eccentricity: f64,
    pub density: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Summary {
    min: f64,
    max: f64,
    avg: f64,
}

fn summarize<I: IntoIterator<Item = f64>>(values: I) -> Summary {
    let mut count = 0_usize;
    let mut summary = Summary { min: f64::INFINITY, max: f64::NEG_INFINITY, avg: 0.0 };
    for value in values {
        count += 1;
        summary.min = summary.min.min(value);
        summary.max = summary.max.max(value);
        summary.avg += value;
    }
    if count == 0 {
        return Summary::default();
    }
    summary.avg /= count as f64;
    summary
}

fn all_sources(graph: &MapGraph) -> BTreeMap<NodeId, ShortestPaths> {
    graph.node_ids().map(|id| (id, dijkstra(graph, id))).collect()
}

/// Sum of shortest-path distances to every reachable node.
pub fn closeness(graph: &MapGraph) -> BTreeMap<NodeId, f64> {
    closeness_from(&all_sources(graph))
}

fn closeness_from(sources: &BTreeMap<NodeId, ShortestPaths>) -> BTreeMap<NodeId, f64> {
    sources.iter().map(|(&id, paths)| (id, paths.distances.values().sum())).collect()
}

/// Largest shortest-path distance to any reachable node; unreachable pairs are ignored.
pub fn eccentricity(graph: &MapGraph) -> BTreeMap<NodeId, f64> {
    eccentricity_from(&all_sources(graph))
}

fn eccentricity_from(sources: &BTreeMap<NodeId, ShortestPaths>) -> BTreeMap<NodeId, f64> {
    sources
        .iter()
        .map(|(&id, paths)| (id, paths.distances.values().copied().fold(0.0, f64::max)))
        .collect()
}

/// For every ordered pair, each of the (at most `path_cap`) shortest paths adds
/// `1 / retained paths` to its intermediate nodes.
pub fn betweenness(graph: &MapGraph, path_cap: usize) -> BTreeMap<NodeId, f64> {
    betweenness_from(graph, &all_sources(graph), path_cap)
}

fn betweenness_from(
    graph: &MapGraph,
    sources: &BTreeMap<NodeId, ShortestPaths>,
    path_cap: usize,
) -> BTreeMap<NodeId, f64> {
    let mut scores: BTreeMap<NodeId, f64> = graph.node_ids().map(|id| (id, 0.0)).collect();
    for (&source, paths) in sources {
        for &target in paths.distances.keys() {
            if target == source {
                continue;
            }
            let retained = paths.enumerate_paths(target, path_cap);
            if retained.is_empty() {
                continue;
            }
            let share = 1.0 / retained.len() as f64;
            for path in &retained {
                for node in &path[1..path.len() - 1] {
                    *scores.entry(*node).or_default() += share;
                }
            }
        }
    }
    scores
}

/// Sum of out-degrees over `n * (n - 1)`; zero below two nodes.
pub fn density(graph: &MapGraph) -> f64 {
    let n = graph.len();
    if n < 2 {
        return 0.0;
    }
    graph.out_degree_sum() as f64 / (n * (n - 1)) as f64
}

pub fn analyze(graph: &MapGraph, config: &AnalysisConfig) -> MapProperties {
    let sources = all_sources(graph);
    let degree = summarize(graph.node_ids().map(|id| graph.degree(id) as f64));
    let closeness = summarize(closeness_from(&sources).into_values());
    let betweenness =
        summarize(betweenness_from(graph, &sources, config.betweenness_path_cap).into_values());

    let eccentricities = eccentricity_from(&sources);
    let eccentricity = summarize(eccentricities.values().copied());
    let within = |value: f64, target: f64| (value - target).abs() <= ECCENTRICITY_EPSILON;
    let center_set_size =
        eccentricities.values().filter(|&&value| within(value, eccentricity.min)).count();
    let periphery_set_size =
        eccentricities.values().filter(|&&value| within(value, eccentricity.max)).count();

    let properties = MapProperties {
        node_count: graph.len(),
        edge_count: graph.out_degree_sum() / 2,
        degree_min: degree.min,
        degree_max: degree.max,
        degree_avg: degree.avg,
        closeness_min: closeness.min,
        closeness_max: closeness.max,
        closeness_avg: closeness.avg,
        betweenness_min: betweenness.min,
        betweenness_max: betweenness.max,
        betweenness_avg: betweenness.avg,
        radius: eccentricity.min,
        diameter: eccentricity.max,
        center_set_size,
        periphery_set_size,
        avg_eccentricity: eccentricity.avg,
        density: density(graph),
    };
    log::debug!(
        "analysis: {} node(s), radius {:.2}, diameter {:.2}, density {:.3}",
        properties.node_count,
        properties.radius,
        properties.diameter,
        properties.density
    );
    properties
}
