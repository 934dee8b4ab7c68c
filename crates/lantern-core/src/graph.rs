//! # Derived Graphs
//!
//! The graph shape exchanged with the store, and the two tree transforms
//! applied to an illuminated neighborhood before it is rendered.
//!
//! All maps are `BTreeMap` so rendered output is deterministic.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// WEIGHT MAPPING
// =============================================================================

/// How an edge weight becomes a traversal cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightMap {
    /// Cost view: the weight is the cost.
    Identity,
    /// Relevance view: heavier edges are cheaper, cost = 1 / weight.
    Reciprocal,
}

impl WeightMap {
    /// Map a weight to a cost. Non-finite results (a zero weight under
    /// `Reciprocal`, or a non-finite input) clamp to `f32::MAX`.
    #[must_use]
    pub fn apply(self, weight: f32) -> f32 {
        let mapped = match self {
            Self::Identity => weight,
            Self::Reciprocal => weight.recip(),
        };
        if mapped.is_finite() { mapped } else { f32::MAX }
    }

    /// Cost used by the tree searches. Negative costs clamp to zero.
    fn cost(self, weight: f32) -> f64 {
        f64::from(self.apply(weight).max(0.0))
    }
}

// =============================================================================
// GRAPH
// =============================================================================

/// Vertices with their values, plus weighted directed edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub vertices: BTreeMap<String, Value>,

    /// tail -> head -> weight
    #[serde(default)]
    pub edges: BTreeMap<String, BTreeMap<String, f32>>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_vertex(&mut self, key: impl Into<String>, value: Value) {
        self.vertices.insert(key.into(), value);
    }

    /// Insert or replace an edge.
    pub fn insert_edge(&mut self, tail: impl Into<String>, head: impl Into<String>, weight: f32) {
        self.edges
            .entry(tail.into())
            .or_default()
            .insert(head.into(), weight);
    }

    #[must_use]
    pub fn weight(&self, tail: &str, head: &str) -> Option<f32> {
        self.edges.get(tail)?.get(head).copied()
    }

    /// Outgoing edges of `tail`, ordered by head key.
    pub fn neighbors<'a>(&'a self, tail: &str) -> impl Iterator<Item = (&'a str, f32)> + 'a {
        self.edges
            .get(tail)
            .into_iter()
            .flat_map(|heads| heads.iter().map(|(head, w)| (head.as_str(), *w)))
    }

    /// All edges as `(tail, head, weight)`, ordered by tail then head.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, f32)> + '_ {
        self.edges.iter().flat_map(|(tail, heads)| {
            heads
                .iter()
                .map(move |(head, w)| (tail.as_str(), head.as_str(), *w))
        })
    }

    /// Every key that appears as a vertex or an edge endpoint.
    #[must_use]
    pub fn keys(&self) -> BTreeSet<&str> {
        let mut keys: BTreeSet<&str> = self.vertices.keys().map(String::as_str).collect();
        for (tail, head, _) in self.edges() {
            keys.insert(tail);
            keys.insert(head);
        }
        keys
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vertices.contains_key(key)
            || self.edges.contains_key(key)
            || self.edges.values().any(|heads| heads.contains_key(key))
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    /// Copy the value of `key` into `tree` if this graph has one.
    fn carry_vertex(&self, key: &str, tree: &mut Graph) {
        if let Some(value) = self.vertices.get(key) {
            tree.vertices.insert(key.to_string(), value.clone());
        }
    }

    // =========================================================================
    // SHORTEST-PATH TREE
    // =========================================================================

    /// Dijkstra from `seed` over directed edges.
    ///
    /// The tree holds every vertex reachable from the seed and the edge that
    /// reaches it most cheaply. Tree edges carry the mapped weight. Ties are
    /// broken by key order.
    #[must_use]
    pub fn shortest_path_tree(&self, seed: &str, map: WeightMap) -> Graph {
        let mut tree = Graph::new();
        if !self.contains(seed) {
            return tree;
        }

        let mut dist: BTreeMap<&str, f64> = BTreeMap::new();
        let mut prev: BTreeMap<&str, &str> = BTreeMap::new();
        let mut visited: BTreeSet<&str> = BTreeSet::new();

        dist.insert(seed, 0.0);

        loop {
            // Unvisited vertex with minimum distance
            let current = dist
                .iter()
                .filter(|(key, _)| !visited.contains(*key))
                .min_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(key, d)| (*key, *d));

            let Some((current, current_dist)) = current else {
                break;
            };
            visited.insert(current);

            for (head, weight) in self.neighbors(current) {
                if visited.contains(head) {
                    continue;
                }
                let candidate = current_dist + map.cost(weight);
                let improves = dist.get(head).is_none_or(|known| candidate < *known);
                if improves {
                    dist.insert(head, candidate);
                    prev.insert(head, current);
                }
            }
        }

        for key in &visited {
            self.carry_vertex(key, &mut tree);
        }
        for (head, tail) in prev {
            if let Some(weight) = self.weight(tail, head) {
                tree.insert_edge(tail, head, map.apply(weight));
            }
        }

        tree
    }

    // =========================================================================
    // MINIMUM SPANNING TREE
    // =========================================================================

    /// Prim from `seed` over the undirected view of the edges.
    ///
    /// Grows the tree one vertex at a time through the cheapest edge with
    /// exactly one endpoint inside it. Chosen edges keep their stored
    /// direction and carry the mapped weight. Self-loops are ignored.
    #[must_use]
    pub fn minimum_spanning_tree(&self, seed: &str, map: WeightMap) -> Graph {
        let mut tree = Graph::new();
        if !self.contains(seed) {
            return tree;
        }

        let mut inside: BTreeSet<&str> = BTreeSet::new();
        inside.insert(seed);

        loop {
            let frontier = self
                .edges()
                .filter(|(tail, head, _)| inside.contains(tail) != inside.contains(head))
                .min_by(|(_, _, a), (_, _, b)| map.cost(*a).total_cmp(&map.cost(*b)));

            let Some((tail, head, weight)) = frontier else {
                break;
            };

            inside.insert(tail);
            inside.insert(head);
            tree.insert_edge(tail, head, map.apply(weight));
        }

        for key in &inside {
            self.carry_vertex(key, &mut tree);
        }

        tree
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// a -> b (1), a -> c (5), b -> c (1), c -> d (2)
    fn diamond() -> Graph {
        let mut graph = Graph::new();
        graph.insert_vertex("a", Value::Int(1));
        graph.insert_vertex("d", Value::from("leaf"));
        graph.insert_edge("a", "b", 1.0);
        graph.insert_edge("a", "c", 5.0);
        graph.insert_edge("b", "c", 1.0);
        graph.insert_edge("c", "d", 2.0);
        graph
    }

    #[test]
    fn reciprocal_clamps_zero_weight() {
        assert_eq!(WeightMap::Reciprocal.apply(0.0), f32::MAX);
        assert_eq!(WeightMap::Reciprocal.apply(4.0), 0.25);
        assert_eq!(WeightMap::Identity.apply(4.0), 4.0);
        assert_eq!(WeightMap::Identity.apply(f32::INFINITY), f32::MAX);
    }

    #[test]
    fn keys_include_edge_endpoints() {
        let graph = diamond();
        assert_eq!(
            graph.keys().into_iter().collect::<Vec<_>>(),
            vec!["a", "b", "c", "d"]
        );
        assert!(graph.contains("c"));
        assert!(!graph.contains("z"));
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn spt_cost_prefers_cheap_detour() {
        let tree = diamond().shortest_path_tree("a", WeightMap::Identity);

        assert_eq!(tree.weight("a", "b"), Some(1.0));
        assert_eq!(tree.weight("b", "c"), Some(1.0));
        assert_eq!(tree.weight("a", "c"), None);
        assert_eq!(tree.weight("c", "d"), Some(2.0));
        assert_eq!(tree.edge_count(), 3);
    }

    #[test]
    fn spt_relevance_prefers_heavy_edge() {
        let tree = diamond().shortest_path_tree("a", WeightMap::Reciprocal);

        // 1/5 = 0.2 beats 1/1 + 1/1 = 2
        assert_eq!(tree.weight("a", "c"), Some(0.2));
        assert_eq!(tree.weight("b", "c"), None);
        assert_eq!(tree.weight("c", "d"), Some(0.5));
    }

    #[test]
    fn spt_keeps_values_of_reached_vertices() {
        let tree = diamond().shortest_path_tree("a", WeightMap::Identity);
        assert_eq!(tree.vertices.get("a"), Some(&Value::Int(1)));
        assert_eq!(tree.vertices.get("d"), Some(&Value::from("leaf")));
    }

    #[test]
    fn spt_from_unknown_seed_is_empty() {
        let tree = diamond().shortest_path_tree("zzz", WeightMap::Identity);
        assert_eq!(tree, Graph::new());
    }

    #[test]
    fn spt_ignores_unreachable_vertices() {
        let tree = diamond().shortest_path_tree("c", WeightMap::Identity);
        assert_eq!(tree.edge_count(), 1);
        assert!(!tree.vertices.contains_key("a"));
    }

    #[test]
    fn mst_spans_component_with_minimum_edges() {
        let tree = diamond().minimum_spanning_tree("a", WeightMap::Identity);

        assert_eq!(tree.edge_count(), 3);
        assert_eq!(tree.weight("a", "b"), Some(1.0));
        assert_eq!(tree.weight("b", "c"), Some(1.0));
        assert_eq!(tree.weight("c", "d"), Some(2.0));
    }

    #[test]
    fn mst_relevance_keeps_heaviest_edges() {
        let tree = diamond().minimum_spanning_tree("a", WeightMap::Reciprocal);

        assert_eq!(tree.edge_count(), 3);
        assert_eq!(tree.weight("a", "c"), Some(0.2));
        assert_eq!(tree.weight("c", "d"), Some(0.5));
    }

    #[test]
    fn mst_walks_edges_against_their_direction() {
        let tree = diamond().minimum_spanning_tree("d", WeightMap::Identity);
        assert_eq!(tree.edge_count(), 3);
        assert!(tree.weight("c", "d").is_some());
    }

    #[test]
    fn graph_serializes_with_sorted_keys() {
        let mut graph = Graph::new();
        graph.insert_edge("b", "a", 1.5);
        graph.insert_edge("a", "b", 2.0);
        let json = serde_json::to_string(&graph).expect("serialize");
        assert_eq!(
            json,
            r#"{"vertices":{},"edges":{"a":{"b":2.0},"b":{"a":1.5}}}"#
        );
    }
}
