//! Integration tests for the remote store client and configuration loading.
//!
//! `RemoteStore` talks to an axum fake of the store API bound to an
//! ephemeral port, so every request crosses a real socket.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use lantern::RemoteStore;
use lantern::client::{AddEdgeRequest, EdgeResponse, IlluminateRequest, PutVertexRequest};
use lantern::config::{Config, ConfigError, LogFormat, Overrides};
use lantern_core::{Dispatcher, ErrorKind, Graph, GraphStore, StoreError, Value, Vertex};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// FAKE STORE
// =============================================================================

#[derive(Default)]
struct Fake {
    vertices: BTreeMap<String, Value>,
    edges: BTreeMap<(String, String), f32>,
    puts: Vec<PutVertexRequest>,
    illuminations: Vec<IlluminateRequest>,
}

type Shared = Arc<Mutex<Fake>>;

async fn get_vertex(
    State(state): State<Shared>,
    Path(key): Path<String>,
) -> Result<Json<Vertex>, StatusCode> {
    let fake = state.lock().unwrap();
    fake.vertices
        .get(&key)
        .map(|value| {
            Json(Vertex {
                key: key.clone(),
                value: value.clone(),
            })
        })
        .ok_or(StatusCode::NOT_FOUND)
}

async fn put_vertex(State(state): State<Shared>, Json(body): Json<PutVertexRequest>) -> StatusCode {
    let mut fake = state.lock().unwrap();
    fake.vertices.insert(body.key.clone(), body.value.clone());
    fake.puts.push(body);
    StatusCode::NO_CONTENT
}

async fn get_edge(
    State(state): State<Shared>,
    Path((tail, head)): Path<(String, String)>,
) -> Result<Json<EdgeResponse>, StatusCode> {
    let fake = state.lock().unwrap();
    fake.edges
        .get(&(tail, head))
        .map(|weight| Json(EdgeResponse { weight: *weight }))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn add_edge(
    State(state): State<Shared>,
    Json(body): Json<AddEdgeRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    if body.weight < 0.0 {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "negative weight".into()));
    }
    let mut fake = state.lock().unwrap();
    fake.edges.insert((body.tail, body.head), body.weight);
    Ok(StatusCode::NO_CONTENT)
}

/// The seed plus its direct out-edges.
async fn illuminate(
    State(state): State<Shared>,
    Json(body): Json<IlluminateRequest>,
) -> Json<Graph> {
    let mut fake = state.lock().unwrap();
    let mut graph = Graph::new();
    if let Some(value) = fake.vertices.get(&body.seed) {
        graph.insert_vertex(body.seed.clone(), value.clone());
    }
    for ((tail, head), weight) in &fake.edges {
        if *tail == body.seed {
            graph.insert_edge(tail.clone(), head.clone(), *weight);
        }
    }
    fake.illuminations.push(body);
    Json(graph)
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/vertex", put(put_vertex))
        .route("/vertex/{key}", get(get_vertex))
        .route("/edge", post(add_edge))
        .route("/edge/{tail}/{head}", get(get_edge))
        .route("/illuminate", post(illuminate))
        .with_state(state)
}

/// Serve `router` on an ephemeral port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/")
}

async fn fake_store() -> (RemoteStore, Shared) {
    let state = Shared::default();
    let url = serve(router(state.clone())).await;
    let store = RemoteStore::new(&url, Duration::from_secs(5)).unwrap();
    (store, state)
}

// =============================================================================
// REQUESTS
// =============================================================================

#[tokio::test]
async fn vertex_round_trip() {
    let (store, state) = fake_store().await;

    store
        .put_vertex("alice", &Value::Int(42), Duration::from_secs(60))
        .await
        .unwrap();
    let vertex = store.get_vertex("alice").await.unwrap();

    assert_eq!(vertex.value, Value::Int(42));
    let fake = state.lock().unwrap();
    assert_eq!(fake.puts.len(), 1);
    assert_eq!(fake.puts[0].ttl_seconds, 60);
}

#[tokio::test]
async fn keys_are_percent_encoded() {
    let (store, _state) = fake_store().await;

    store
        .put_vertex("a/b c", &Value::from("odd"), Duration::from_secs(1))
        .await
        .unwrap();
    let vertex = store.get_vertex("a/b c").await.unwrap();
    assert_eq!(vertex.key, "a/b c");
}

#[tokio::test]
async fn edge_round_trip() {
    let (store, _state) = fake_store().await;

    store
        .add_edge("a", "b", 0.75, Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(store.get_edge("a", "b").await.unwrap(), 0.75);
}

#[tokio::test]
async fn illuminate_sends_all_parameters() {
    let (store, state) = fake_store().await;
    store
        .add_edge("s", "t", 2.0, Duration::from_secs(60))
        .await
        .unwrap();

    let graph = store.illuminate("s", 3, 5, true).await.unwrap();

    assert_eq!(graph.weight("s", "t"), Some(2.0));
    assert_eq!(
        state.lock().unwrap().illuminations,
        vec![IlluminateRequest {
            seed: "s".into(),
            step: 3,
            k: 5,
            tfidf: true,
        }]
    );
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

#[tokio::test]
async fn missing_vertex_is_not_found() {
    let (store, _state) = fake_store().await;
    let err = store.get_vertex("ghost").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(key) if key == "ghost"));
}

#[tokio::test]
async fn error_status_is_rejected_with_body() {
    let (store, _state) = fake_store().await;
    let err = store
        .add_edge("a", "b", -1.0, Duration::from_secs(1))
        .await
        .unwrap_err();

    match err {
        StoreError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "negative weight");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let broken = Router::new().route("/vertex/{key}", get(|| async { "not json" }));
    let url = serve(broken).await;
    let store = RemoteStore::new(&url, Duration::from_secs(5)).unwrap();

    let err = store.get_vertex("k").await.unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)));
}

#[tokio::test]
async fn slow_store_times_out() {
    let slow = Router::new().route(
        "/edge/{tail}/{head}",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(EdgeResponse { weight: 1.0 })
        }),
    );
    let url = serve(slow).await;
    let store = RemoteStore::new(&url, Duration::from_millis(100)).unwrap();

    let err = store.get_edge("a", "b").await.unwrap_err();
    assert!(matches!(err, StoreError::Timeout));
}

#[tokio::test]
async fn closed_port_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{addr}/");
    let store = RemoteStore::new(&url, Duration::from_secs(5)).unwrap();
    let err = store.get_vertex("k").await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}

// =============================================================================
// END TO END
// =============================================================================

#[tokio::test]
async fn dispatcher_over_remote_store() {
    let (store, _state) = fake_store().await;
    let dispatcher = Dispatcher::new(store);
    let mut out = Vec::new();

    dispatcher
        .execute_line("put vertex alice 2024-05-01T12:00:00+02:00", &mut out)
        .await
        .unwrap();
    dispatcher
        .execute_line("get vertex alice", &mut out)
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "\"2024-05-01T12:00:00+02:00\"\n"
    );

    let mut out = Vec::new();
    let err = dispatcher
        .execute_line("get edge nobody home", &mut out)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(out.is_empty());
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn config_file_is_layered_under_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lantern.toml");
    std::fs::write(
        &path,
        "host = \"graph.internal\"\nport = 7000\nlog_format = \"json\"\n",
    )
    .unwrap();

    let mut config = Config::from_file(Some(&path)).unwrap();
    assert_eq!(config.host, "graph.internal");
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(config.timeout_secs, 10);

    config.apply_overrides(&Overrides {
        port: Some(7100),
        ..Overrides::default()
    });
    assert_eq!(config.base_url(), "http://graph.internal:7100/");
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "port = \"not a number\"\n").unwrap();

    let err = Config::from_file(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = Config::from_file(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
