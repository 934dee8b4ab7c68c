//! # Vocabulary
//!
//! The closed word lists of the command language.
//!
//! - `Verb`: first token, selects the command family
//! - `Objective`: second token, selects the entity kind or graph view
//! - `Route`: a valid (verb, objective) pair
//!
//! Membership is an exact string comparison. Case folding, if any, is the
//! caller's job and happens before tokenizing.

use std::fmt;

/// Literal that ends an interactive session.
pub const EXIT: &str = "exit";

// =============================================================================
// VERB
// =============================================================================

/// Command family selected by the first token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verb {
    Get,
    Put,
    Add,
    Delete,
    Illuminate,
}

/// Every recognized verb, in the order usage hints list them.
pub const VERBS: &[Verb] = &[
    Verb::Get,
    Verb::Put,
    Verb::Add,
    Verb::Delete,
    Verb::Illuminate,
];

impl Verb {
    /// The keyword as typed on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Illuminate => "illuminate",
        }
    }

    /// Exact membership test against [`VERBS`].
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        VERBS.iter().copied().find(|verb| verb.as_str() == token)
    }

    /// Objectives accepted after this verb, in route-table order.
    pub fn objectives(self) -> impl Iterator<Item = Objective> {
        ROUTES
            .iter()
            .filter(move |route| route.verb() == self)
            .map(|route| route.objective())
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// GRAPH VIEW
// =============================================================================

/// The five ways an illuminated graph can be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphView {
    /// The illuminated neighborhood as returned by the store.
    Neighbor,
    /// Shortest-path tree over raw edge cost.
    SptCost,
    /// Shortest-path tree over reciprocal edge weight.
    SptRelevance,
    /// Minimum spanning tree over raw edge cost.
    MstCost,
    /// Minimum spanning tree over reciprocal edge weight.
    MstRelevance,
}

/// Every graph view, in the order usage hints list them.
pub const GRAPH_VIEWS: &[GraphView] = &[
    GraphView::Neighbor,
    GraphView::SptCost,
    GraphView::SptRelevance,
    GraphView::MstCost,
    GraphView::MstRelevance,
];

impl GraphView {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neighbor => "neighbor",
            Self::SptCost => "spt_cost",
            Self::SptRelevance => "spt_relevance",
            Self::MstCost => "mst_cost",
            Self::MstRelevance => "mst_relevance",
        }
    }
}

// =============================================================================
// OBJECTIVE
// =============================================================================

/// Entity kind or graph view selected by the second token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Objective {
    Vertex,
    Edge,
    View(GraphView),
}

/// Every recognized objective.
pub const OBJECTIVES: &[Objective] = &[
    Objective::Vertex,
    Objective::Edge,
    Objective::View(GraphView::Neighbor),
    Objective::View(GraphView::SptCost),
    Objective::View(GraphView::SptRelevance),
    Objective::View(GraphView::MstCost),
    Objective::View(GraphView::MstRelevance),
];

impl Objective {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::View(view) => view.as_str(),
        }
    }

    /// Exact membership test against [`OBJECTIVES`].
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        OBJECTIVES
            .iter()
            .copied()
            .find(|objective| objective.as_str() == token)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ROUTE
// =============================================================================

/// A (verb, objective) pair that names exactly one command shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Route {
    GetVertex,
    GetEdge,
    PutVertex,
    PutEdge,
    AddEdge,
    DeleteVertex,
    DeleteEdge,
    Illuminate(GraphView),
}

/// The route table. A pair outside this table is an invalid objective.
pub const ROUTES: &[Route] = &[
    Route::GetVertex,
    Route::GetEdge,
    Route::PutVertex,
    Route::PutEdge,
    Route::AddEdge,
    Route::DeleteVertex,
    Route::DeleteEdge,
    Route::Illuminate(GraphView::Neighbor),
    Route::Illuminate(GraphView::SptCost),
    Route::Illuminate(GraphView::SptRelevance),
    Route::Illuminate(GraphView::MstCost),
    Route::Illuminate(GraphView::MstRelevance),
];

impl Route {
    #[must_use]
    pub const fn verb(self) -> Verb {
        match self {
            Self::GetVertex | Self::GetEdge => Verb::Get,
            Self::PutVertex | Self::PutEdge => Verb::Put,
            Self::AddEdge => Verb::Add,
            Self::DeleteVertex | Self::DeleteEdge => Verb::Delete,
            Self::Illuminate(_) => Verb::Illuminate,
        }
    }

    #[must_use]
    pub const fn objective(self) -> Objective {
        match self {
            Self::GetVertex | Self::PutVertex | Self::DeleteVertex => Objective::Vertex,
            Self::GetEdge | Self::PutEdge | Self::AddEdge | Self::DeleteEdge => Objective::Edge,
            Self::Illuminate(view) => Objective::View(view),
        }
    }

    /// Look up the route for a pair, `None` if the verb does not take that objective.
    #[must_use]
    pub fn find(verb: Verb, objective: Objective) -> Option<Self> {
        ROUTES
            .iter()
            .copied()
            .find(|route| route.verb() == verb && route.objective() == objective)
    }

    /// Parameter syntax shown in usage hints.
    #[must_use]
    pub const fn syntax(self) -> &'static str {
        match self {
            Self::GetVertex => "get vertex <key: string>",
            Self::GetEdge => "get edge <tail: string> <head: string>",
            Self::PutVertex => {
                "put vertex <key: string> <value: int|float|bool|timestamp|string> [<ttl_seconds: int>]"
            }
            Self::PutEdge => {
                "put edge <tail: string> <head: string> <weight: float> [<ttl_seconds: int>]"
            }
            Self::AddEdge => {
                "add edge <tail: string> <head: string> <weight: float> [<ttl_seconds: int>]"
            }
            Self::DeleteVertex => "delete vertex <key: string>",
            Self::DeleteEdge => "delete edge <tail: string> <head: string>",
            Self::Illuminate(GraphView::Neighbor) => {
                "illuminate neighbor <seed: string> <step: int> <k: int> <tfidf: bool>"
            }
            Self::Illuminate(GraphView::SptCost) => {
                "illuminate spt_cost <seed: string> <step: int> <k: int> <tfidf: bool>"
            }
            Self::Illuminate(GraphView::SptRelevance) => {
                "illuminate spt_relevance <seed: string> <step: int> <k: int> <tfidf: bool>"
            }
            Self::Illuminate(GraphView::MstCost) => {
                "illuminate mst_cost <seed: string> <step: int> <k: int> <tfidf: bool>"
            }
            Self::Illuminate(GraphView::MstRelevance) => {
                "illuminate mst_relevance <seed: string> <step: int> <k: int> <tfidf: bool>"
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb(), self.objective())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_round_trip_through_tokens() {
        for verb in VERBS {
            assert_eq!(Verb::from_token(verb.as_str()), Some(*verb));
        }
        assert_eq!(Verb::from_token("GET"), None);
        assert_eq!(Verb::from_token("exit"), None);
    }

    #[test]
    fn objectives_round_trip_through_tokens() {
        for objective in OBJECTIVES {
            assert_eq!(Objective::from_token(objective.as_str()), Some(*objective));
        }
        assert_eq!(Objective::from_token("widget"), None);
    }

    #[test]
    fn every_route_is_found_by_its_own_pair() {
        for route in ROUTES {
            assert_eq!(Route::find(route.verb(), route.objective()), Some(*route));
        }
    }

    #[test]
    fn add_takes_only_edge() {
        assert_eq!(Route::find(Verb::Add, Objective::Vertex), None);
        assert_eq!(
            Verb::Add.objectives().collect::<Vec<_>>(),
            vec![Objective::Edge]
        );
    }

    #[test]
    fn illuminate_takes_only_views() {
        assert_eq!(Route::find(Verb::Illuminate, Objective::Vertex), None);
        assert_eq!(Verb::Illuminate.objectives().count(), GRAPH_VIEWS.len());
        assert_eq!(
            Route::find(Verb::Get, Objective::View(GraphView::Neighbor)),
            None
        );
    }

    #[test]
    fn route_syntax_starts_with_route_name() {
        for route in ROUTES {
            assert!(route.syntax().starts_with(&route.to_string()));
        }
    }
}
