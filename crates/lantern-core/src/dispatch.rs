//! # Dispatcher
//!
//! Routes a tokenized line to the handler registered for its
//! `(verb, objective)` pair.
//!
//! Each handler parses its own typed record from the remaining tokens and
//! talks to the store. The dispatcher owns classification and output: a
//! handler's rendered result is written to the sink exactly once.

use crate::error::{CommandError, ErrorKind, ParseError, SyntaxError, Usage};
use crate::grammar::{self, AddEdge, GetEdge, GetVertex, Illuminate, PutVertex};
use crate::graph::{Graph, WeightMap};
use crate::source::Source;
use crate::store::GraphStore;
use crate::vocabulary::{GraphView, ROUTES, Route};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::Write;

// =============================================================================
// HANDLER
// =============================================================================

/// Executes one route. Returns rendered output, or `None` for silent success.
#[async_trait]
pub trait Handler<S: GraphStore>: Send + Sync {
    async fn handle(
        &self,
        route: Route,
        store: &S,
        source: &mut Source,
    ) -> Result<Option<String>, CommandError>;
}

/// `get vertex`: the value as pretty JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetVertexHandler;

#[async_trait]
impl<S: GraphStore> Handler<S> for GetVertexHandler {
    async fn handle(
        &self,
        route: Route,
        store: &S,
        source: &mut Source,
    ) -> Result<Option<String>, CommandError> {
        let params = GetVertex::parse(source)
            .map_err(|e| CommandError::syntax(route, e))?;
        let vertex = store.get_vertex(&params.key).await?;
        Ok(Some(serde_json::to_string_pretty(&vertex.value)?))
    }
}

/// `get edge`: the weight with six decimals.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetEdgeHandler;

#[async_trait]
impl<S: GraphStore> Handler<S> for GetEdgeHandler {
    async fn handle(
        &self,
        route: Route,
        store: &S,
        source: &mut Source,
    ) -> Result<Option<String>, CommandError> {
        let params = GetEdge::parse(source)
            .map_err(|e| CommandError::syntax(route, e))?;
        let weight = store.get_edge(&params.tail, &params.head).await?;
        Ok(Some(format!("{weight:.6}")))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PutVertexHandler;

#[async_trait]
impl<S: GraphStore> Handler<S> for PutVertexHandler {
    async fn handle(
        &self,
        route: Route,
        store: &S,
        source: &mut Source,
    ) -> Result<Option<String>, CommandError> {
        let params = PutVertex::parse(source)
            .map_err(|e| CommandError::syntax(route, e))?;
        store
            .put_vertex(&params.key, &params.value, params.ttl)
            .await?;
        Ok(None)
    }
}

/// `add edge`: upsert.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddEdgeHandler;

#[async_trait]
impl<S: GraphStore> Handler<S> for AddEdgeHandler {
    async fn handle(
        &self,
        route: Route,
        store: &S,
        source: &mut Source,
    ) -> Result<Option<String>, CommandError> {
        let params = AddEdge::parse(source)
            .map_err(|e| CommandError::syntax(route, e))?;
        store
            .add_edge(&params.tail, &params.head, params.weight, params.ttl)
            .await?;
        Ok(None)
    }
}

/// Recognized routes with no store operation behind them. The line is
/// still parsed so malformed input reports its syntax first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl<S: GraphStore> Handler<S> for Unsupported {
    async fn handle(
        &self,
        route: Route,
        _store: &S,
        source: &mut Source,
    ) -> Result<Option<String>, CommandError> {
        grammar::Command::parse_params(route, source)
            .map_err(|e| CommandError::syntax(route, e))?;
        Err(CommandError::NotImplemented(route))
    }
}

/// `illuminate <view>`: fetch the neighborhood, then derive the view.
#[derive(Debug, Clone, Copy)]
pub struct IlluminateHandler {
    pub view: GraphView,
}

impl IlluminateHandler {
    #[must_use]
    pub const fn new(view: GraphView) -> Self {
        Self { view }
    }

    /// Apply the view to an illuminated graph.
    #[must_use]
    pub fn derive(&self, graph: &Graph, seed: &str) -> Graph {
        match self.view {
            GraphView::Neighbor => graph.clone(),
            GraphView::SptCost => graph.shortest_path_tree(seed, WeightMap::Identity),
            GraphView::SptRelevance => graph.shortest_path_tree(seed, WeightMap::Reciprocal),
            GraphView::MstCost => graph.minimum_spanning_tree(seed, WeightMap::Identity),
            GraphView::MstRelevance => graph.minimum_spanning_tree(seed, WeightMap::Reciprocal),
        }
    }
}

#[async_trait]
impl<S: GraphStore> Handler<S> for IlluminateHandler {
    async fn handle(
        &self,
        route: Route,
        store: &S,
        source: &mut Source,
    ) -> Result<Option<String>, CommandError> {
        let params = Illuminate::parse(self.view, source)
            .map_err(|e| CommandError::syntax(route, e))?;
        let graph = store
            .illuminate(&params.seed, params.step, params.k, params.tfidf)
            .await?;
        let derived = self.derive(&graph, &params.seed);
        Ok(Some(serde_json::to_string_pretty(&derived)?))
    }
}

// =============================================================================
// DISPATCHER
// =============================================================================

/// Handler registry over a single store.
pub struct Dispatcher<S: GraphStore> {
    store: S,
    handlers: BTreeMap<Route, Box<dyn Handler<S>>>,
}

impl<S: GraphStore + 'static> Dispatcher<S> {
    /// A dispatcher with a handler for every route in the table.
    #[must_use]
    pub fn new(store: S) -> Self {
        let mut dispatcher = Self::empty(store);
        for route in ROUTES {
            let handler: Box<dyn Handler<S>> = match *route {
                Route::GetVertex => Box::new(GetVertexHandler),
                Route::GetEdge => Box::new(GetEdgeHandler),
                Route::PutVertex => Box::new(PutVertexHandler),
                Route::AddEdge => Box::new(AddEdgeHandler),
                Route::PutEdge | Route::DeleteVertex | Route::DeleteEdge => Box::new(Unsupported),
                Route::Illuminate(view) => Box::new(IlluminateHandler::new(view)),
            };
            dispatcher.handlers.insert(*route, handler);
        }
        dispatcher
    }

    /// A dispatcher with no handlers; every valid route reports
    /// `InvalidObjective` until one is registered.
    #[must_use]
    pub fn empty(store: S) -> Self {
        Self {
            store,
            handlers: BTreeMap::new(),
        }
    }
}

impl<S: GraphStore> Dispatcher<S> {
    /// Install or replace the handler for `route`.
    pub fn register(&mut self, route: Route, handler: Box<dyn Handler<S>>) {
        self.handlers.insert(route, handler);
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.handlers.keys().copied().collect()
    }

    /// Run one command from `source`, writing any output line to `sink`.
    ///
    /// The cursor is rewound first, so a source already walked by the
    /// validator can be passed straight through.
    pub async fn execute<W: Write + ?Sized>(
        &self,
        source: &mut Source,
        sink: &mut W,
    ) -> Result<(), CommandError> {
        source.reset();
        let route = grammar::parse_route(source)?;
        let handler = self.handlers.get(&route).ok_or_else(|| {
            CommandError::InvalidObjective(SyntaxError::new(
                Usage::Objectives(route.verb()),
                ParseError::UnknownObjective {
                    verb: route.verb(),
                    objective: route.objective().as_str().to_string(),
                },
            ))
        })?;

        tracing::debug!(%route, tokens = source.len(), "dispatching");

        match handler.handle(route, &self.store, source).await {
            Ok(Some(output)) => {
                writeln!(sink, "{output}")?;
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                if let CommandError::Connection(cause) = &err {
                    tracing::warn!(%route, error = %cause, "store request failed");
                } else if err.kind() == ErrorKind::NotImplemented {
                    tracing::debug!(%route, "route not implemented");
                }
                Err(err)
            }
        }
    }

    /// Tokenize and execute a whole line.
    pub async fn execute_line<W: Write + ?Sized>(
        &self,
        line: &str,
        sink: &mut W,
    ) -> Result<(), CommandError> {
        self.execute(&mut Source::new(line), sink).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
