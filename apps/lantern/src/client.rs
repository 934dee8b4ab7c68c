//! # Lantern HTTP Client
//!
//! [`GraphStore`] over the store's JSON API.
//!
//! | Operation      | Request                       | Response          |
//! |----------------|-------------------------------|-------------------|
//! | `get_vertex`   | `GET /vertex/{key}`           | [`Vertex`]        |
//! | `put_vertex`   | `PUT /vertex`                 | any 2xx           |
//! | `get_edge`     | `GET /edge/{tail}/{head}`     | [`EdgeResponse`]  |
//! | `add_edge`     | `POST /edge`                  | any 2xx           |
//! | `illuminate`   | `POST /illuminate`            | [`Graph`]         |

use crate::config::Config;
use crate::error::AppError;
use async_trait::async_trait;
use lantern_core::{Graph, GraphStore, StoreError, Value, Vertex};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutVertexRequest {
    pub key: String,
    pub value: Value,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeResponse {
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddEdgeRequest {
    pub tail: String,
    pub head: String,
    pub weight: f32,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IlluminateRequest {
    pub seed: String,
    pub step: i64,
    pub k: i64,
    pub tfidf: bool,
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for a remote Lantern store.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    http: reqwest::Client,
    base: Url,
}

impl RemoteStore {
    /// Client rooted at `base_url` with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base = Url::parse(base_url).map_err(|e| AppError::Endpoint {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(AppError::Endpoint {
                url: base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AppError::Client)?;
        Ok(Self { http, base })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(&config.base_url(), config.timeout())
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Transport(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, StoreError> {
        Ok(self.http.request(method, self.endpoint(segments)?))
    }

    /// Send and map the status. `what` names the missing entity on 404.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, StoreError> {
        let response = self.send(request, what).await?;
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout
            } else {
                StoreError::Decode(e.to_string())
            }
        })
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Transport(err.to_string())
    }
}

#[async_trait]
impl GraphStore for RemoteStore {
    async fn get_vertex(&self, key: &str) -> Result<Vertex, StoreError> {
        let request = self.request(Method::GET, &["vertex", key])?;
        self.fetch(request, key).await
    }

    async fn put_vertex(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), StoreError> {
        let body = PutVertexRequest {
            key: key.to_string(),
            value: value.clone(),
            ttl_seconds: ttl.as_secs(),
        };
        let request = self.request(Method::PUT, &["vertex"])?.json(&body);
        self.send(request, key).await.map(drop)
    }

    async fn get_edge(&self, tail: &str, head: &str) -> Result<f32, StoreError> {
        let request = self.request(Method::GET, &["edge", tail, head])?;
        let edge: EdgeResponse = self.fetch(request, &format!("{tail} -> {head}")).await?;
        Ok(edge.weight)
    }

    async fn add_edge(
        &self,
        tail: &str,
        head: &str,
        weight: f32,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let body = AddEdgeRequest {
            tail: tail.to_string(),
            head: head.to_string(),
            weight,
            ttl_seconds: ttl.as_secs(),
        };
        let request = self.request(Method::POST, &["edge"])?.json(&body);
        self.send(request, &format!("{tail} -> {head}"))
            .await
            .map(drop)
    }

    async fn illuminate(
        &self,
        seed: &str,
        step: i64,
        k: i64,
        tfidf: bool,
    ) -> Result<Graph, StoreError> {
        let body = IlluminateRequest {
            seed: seed.to_string(),
            step,
            k,
            tfidf,
        };
        let request = self.request(Method::POST, &["illuminate"])?.json(&body);
        self.fetch(request, seed).await
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base: &str) -> RemoteStore {
        RemoteStore::new(base, Duration::from_secs(1))
            .expect("client")
    }

    #[test]
    fn endpoint_encodes_segments() {
        let url = store("http://localhost:6380/")
            .endpoint(&["edge", "a b", "c/d"])
            .expect("url");
        assert_eq!(url.as_str(), "http://localhost:6380/edge/a%20b/c%2Fd");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let url = store("http://localhost:6380/api/")
            .endpoint(&["vertex", "k1"])
            .expect("url");
        assert_eq!(url.path(), "/api/vertex/k1");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            RemoteStore::new("not a url", Duration::from_secs(1)),
            Err(AppError::Endpoint { .. })
        ));
        assert!(matches!(
            RemoteStore::new("mailto:someone", Duration::from_secs(1)),
            Err(AppError::Endpoint { .. })
        ));
    }

    #[test]
    fn wire_bodies_use_documented_field_names() {
        let body = serde_json::to_value(AddEdgeRequest {
            tail: "a".into(),
            head: "b".into(),
            weight: 0.5,
            ttl_seconds: 60,
        })
        .expect("json");
        assert_eq!(
            body,
            serde_json::json!({"tail": "a", "head": "b", "weight": 0.5, "ttl_seconds": 60})
        );
    }
}
