//! # In-Memory Store
//!
//! A volatile [`GraphStore`] for offline sessions and tests.
//!
//! - Every vertex and edge carries an expiry instant derived from its TTL
//! - Expired entries are invisible to reads and pruned on the next write
//! - Illumination is a bounded breadth-first walk over live edges

use crate::graph::Graph;
use crate::store::{GraphStore, StoreError, Vertex};
use crate::value::Value;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

// =============================================================================
// ENTRIES
// =============================================================================

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    /// `None` when `now + ttl` does not fit in an `Instant`.
    expires_at: Option<Instant>,
}

impl<T> Entry<T> {
    fn new(value: T, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            expires_at: now.checked_add(ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

#[derive(Debug, Default)]
struct State {
    vertices: BTreeMap<String, Entry<Value>>,
    /// tail -> head -> weight
    edges: BTreeMap<String, BTreeMap<String, Entry<f32>>>,
}

impl State {
    fn prune(&mut self, now: Instant) {
        self.vertices.retain(|_, entry| entry.is_live(now));
        for heads in self.edges.values_mut() {
            heads.retain(|_, entry| entry.is_live(now));
        }
        self.edges.retain(|_, heads| !heads.is_empty());
    }

    /// Snapshot of everything still live.
    fn live_graph(&self, now: Instant) -> Graph {
        let mut graph = Graph::new();
        for (key, entry) in &self.vertices {
            if entry.is_live(now) {
                graph.insert_vertex(key.clone(), entry.value.clone());
            }
        }
        for (tail, heads) in &self.edges {
            for (head, entry) in heads {
                if entry.is_live(now) {
                    graph.insert_edge(tail.clone(), head.clone(), entry.value);
                }
            }
        }
        graph
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// `RwLock`-guarded maps. Lock poisoning is recovered, not propagated.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        let now = Instant::now();
        self.read()
            .vertices
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let now = Instant::now();
        self.read()
            .edges
            .values()
            .flat_map(BTreeMap::values)
            .filter(|entry| entry.is_live(now))
            .count()
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn get_vertex(&self, key: &str) -> Result<Vertex, StoreError> {
        let now = Instant::now();
        self.read()
            .vertices
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| Vertex {
                key: key.to_string(),
                value: entry.value.clone(),
            })
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn put_vertex(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut state = self.write();
        state.prune(now);
        state
            .vertices
            .insert(key.to_string(), Entry::new(value.clone(), ttl, now));
        Ok(())
    }

    async fn get_edge(&self, tail: &str, head: &str) -> Result<f32, StoreError> {
        let now = Instant::now();
        self.read()
            .edges
            .get(tail)
            .and_then(|heads| heads.get(head))
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value)
            .ok_or_else(|| StoreError::NotFound(format!("{tail} -> {head}")))
    }

    async fn add_edge(
        &self,
        tail: &str,
        head: &str,
        weight: f32,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut state = self.write();
        state.prune(now);
        state
            .edges
            .entry(tail.to_string())
            .or_default()
            .insert(head.to_string(), Entry::new(weight, ttl, now));
        Ok(())
    }

    async fn illuminate(
        &self,
        seed: &str,
        step: i64,
        k: i64,
        tfidf: bool,
    ) -> Result<Graph, StoreError> {
        let graph = self.read().live_graph(Instant::now());
        illuminate(&graph, seed, step, k, tfidf)
    }
}

// =============================================================================
// ILLUMINATION
// =============================================================================

/// Edge scores used for ranking and reported as weights.
///
/// With `tfidf`, `tf = w / Σ out-weights(tail)` and
/// `idf = ln(1 + |V| / (1 + in-degree(head)))`; otherwise the raw weight.
fn scores(graph: &Graph, tfidf: bool) -> BTreeMap<(&str, &str), f32> {
    if !tfidf {
        return graph
            .edges()
            .map(|(tail, head, w)| ((tail, head), w))
            .collect();
    }

    let vertex_count = graph.keys().len() as f64;
    let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut out_total: BTreeMap<&str, f64> = BTreeMap::new();
    for (tail, head, w) in graph.edges() {
        *in_degree.entry(head).or_default() += 1;
        *out_total.entry(tail).or_default() += f64::from(w);
    }

    graph
        .edges()
        .map(|(tail, head, w)| {
            let total = out_total.get(tail).copied().unwrap_or_default();
            let tf = if total == 0.0 {
                0.0
            } else {
                f64::from(w) / total
            };
            let degree = in_degree.get(head).copied().unwrap_or_default() as f64;
            let idf = (1.0 + vertex_count / (1.0 + degree)).ln();
            ((tail, head), (tf * idf) as f32)
        })
        .collect()
}

/// Breadth-first from `seed` for at most `step` hops, following the top `k`
/// scored edges of each vertex (all of them when `k <= 0`).
fn illuminate(
    graph: &Graph,
    seed: &str,
    step: i64,
    k: i64,
    tfidf: bool,
) -> Result<Graph, StoreError> {
    if !graph.contains(seed) {
        return Err(StoreError::NotFound(seed.to_string()));
    }

    let scores = scores(graph, tfidf);
    let limit = usize::try_from(k).ok().filter(|k| *k > 0);
    let max_depth = u64::try_from(step).unwrap_or(0);

    let mut result = Graph::new();
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut queue: VecDeque<(&str, u64)> = VecDeque::new();

    visited.insert(seed);
    queue.push_back((seed, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if let Some(value) = graph.vertices.get(current) {
            result.insert_vertex(current, value.clone());
        }
        if depth >= max_depth {
            continue;
        }

        let mut ranked: Vec<(&str, f32)> = graph
            .neighbors(current)
            .map(|(head, w)| (head, scores.get(&(current, head)).copied().unwrap_or(w)))
            .collect();
        // Highest score first, ties by head key
        ranked.sort_by(|(a_head, a), (b_head, b)| {
            b.total_cmp(a).then_with(|| a_head.cmp(b_head))
        });
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }

        for (head, score) in ranked {
            result.insert_edge(current, head, score);
            if visited.insert(head) {
                queue.push_back((head, depth + 1));
            }
        }
    }

    Ok(result)
}

// =============================================================================
// TESTS
// =============================================================================
