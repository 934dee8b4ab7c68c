//! # Store Boundary
//!
//! The narrow interface between the command layer and whatever holds the
//! graph. The dispatcher only ever sees [`GraphStore`] and [`StoreError`];
//! transports, retries and deadlines belong to the implementor.

use crate::graph::Graph;
use crate::value::Value;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A vertex as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub key: String,
    pub value: Value,
}

/// Failures raised by a store. The dispatcher classifies all of them as
/// connection errors; the detail is kept for logs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("request timed out")]
    Timeout,

    #[error("request cancelled")]
    Cancelled,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("rejected by store ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Remote operations the command language can reach.
///
/// Every call is a single request: no batching and no retries at this layer.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Fetch a vertex by key.
    async fn get_vertex(&self, key: &str) -> Result<Vertex, StoreError>;

    /// Insert or replace a vertex value with a time-to-live.
    async fn put_vertex(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), StoreError>;

    /// Fetch the weight of the edge `tail -> head`.
    async fn get_edge(&self, tail: &str, head: &str) -> Result<f32, StoreError>;

    /// Insert or replace the weighted edge `tail -> head` with a time-to-live.
    async fn add_edge(
        &self,
        tail: &str,
        head: &str,
        weight: f32,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Bounded neighborhood of `seed`: at most `step` hops, the top `k`
    /// edges per vertex when `k > 0`, term-frequency weighted when `tfidf`.
    async fn illuminate(
        &self,
        seed: &str,
        step: i64,
        k: i64,
        tfidf: bool,
    ) -> Result<Graph, StoreError>;
}
