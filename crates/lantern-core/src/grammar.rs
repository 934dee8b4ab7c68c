//! # Grammar
//!
//! One typed parser per command shape.
//!
//! Each parser is a short fixed sequence of reads against a [`Source`],
//! closed by an end-of-input check. The only optional field in the language
//! is a trailing time-to-live on `put vertex`, `put edge` and `add edge`.
//! Parsers return the complete record or the first failure; they never
//! recover or collect several errors.

use crate::error::{ParseError, SyntaxError, Usage};
use crate::source::Source;
use crate::value::{self, Value};
use crate::vocabulary::{GraphView, Objective, Route, Verb};
use std::time::Duration;

/// Time-to-live applied when a line omits one: 365 × 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

// =============================================================================
// FIELD READERS
// =============================================================================

pub fn read_string(source: &mut Source) -> Result<String, ParseError> {
    source.read(value::as_string)
}

pub fn read_int(source: &mut Source) -> Result<i64, ParseError> {
    source.read(value::as_int)
}

/// Edge weights are single precision on the wire and must stay finite there.
pub fn read_weight(source: &mut Source) -> Result<f32, ParseError> {
    source.read(|token| {
        let weight = value::as_float(token)? as f32;
        if weight.is_finite() {
            Ok(weight)
        } else {
            Err(ParseError::InvalidFloat(token.to_string()))
        }
    })
}

pub fn read_bool(source: &mut Source) -> Result<bool, ParseError> {
    source.read(value::as_bool)
}

/// Any scalar, by coercion precedence. Fails only at end of input.
pub fn read_value(source: &mut Source) -> Result<Value, ParseError> {
    source.read(|token| Ok(value::coerce(token)))
}

/// A non-negative count of seconds.
pub fn read_ttl(source: &mut Source) -> Result<Duration, ParseError> {
    let seconds = read_int(source)?;
    u64::try_from(seconds)
        .map(Duration::from_secs)
        .map_err(|_| ParseError::NegativeTtl(seconds))
}

/// Trailing time-to-live: [`DEFAULT_TTL`] at end of input, otherwise one
/// integer token that must be the last.
pub fn read_optional_ttl(source: &mut Source) -> Result<Duration, ParseError> {
    if !source.has_next() {
        return Ok(DEFAULT_TTL);
    }
    let ttl = read_ttl(source)?;
    source.expect_end()?;
    Ok(ttl)
}

// =============================================================================
// COMMAND RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetVertex {
    pub key: String,
}

impl GetVertex {
    pub fn parse(source: &mut Source) -> Result<Self, ParseError> {
        let key = read_string(source)?;
        source.expect_end()?;
        Ok(Self { key })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetEdge {
    pub tail: String,
    pub head: String,
}

impl GetEdge {
    pub fn parse(source: &mut Source) -> Result<Self, ParseError> {
        let tail = read_string(source)?;
        let head = read_string(source)?;
        source.expect_end()?;
        Ok(Self { tail, head })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutVertex {
    pub key: String,
    pub value: Value,
    pub ttl: Duration,
}

impl PutVertex {
    pub fn parse(source: &mut Source) -> Result<Self, ParseError> {
        let key = read_string(source)?;
        let value = read_value(source)?;
        let ttl = read_optional_ttl(source)?;
        Ok(Self { key, value, ttl })
    }
}

/// Upsert form of a weighted edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PutEdge {
    pub tail: String,
    pub head: String,
    pub weight: f32,
    pub ttl: Duration,
}

impl PutEdge {
    pub fn parse(source: &mut Source) -> Result<Self, ParseError> {
        let tail = read_string(source)?;
        let head = read_string(source)?;
        let weight = read_weight(source)?;
        let ttl = read_optional_ttl(source)?;
        Ok(Self {
            tail,
            head,
            weight,
            ttl,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddEdge {
    pub tail: String,
    pub head: String,
    pub weight: f32,
    pub ttl: Duration,
}

impl AddEdge {
    pub fn parse(source: &mut Source) -> Result<Self, ParseError> {
        let tail = read_string(source)?;
        let head = read_string(source)?;
        let weight = read_weight(source)?;
        let ttl = read_optional_ttl(source)?;
        Ok(Self {
            tail,
            head,
            weight,
            ttl,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteVertex {
    pub key: String,
}

impl DeleteVertex {
    pub fn parse(source: &mut Source) -> Result<Self, ParseError> {
        let key = read_string(source)?;
        source.expect_end()?;
        Ok(Self { key })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteEdge {
    pub tail: String,
    pub head: String,
}

impl DeleteEdge {
    pub fn parse(source: &mut Source) -> Result<Self, ParseError> {
        let tail = read_string(source)?;
        let head = read_string(source)?;
        source.expect_end()?;
        Ok(Self { tail, head })
    }
}

/// Bounded traversal request. `view` is the objective it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Illuminate {
    pub view: GraphView,
    pub seed: String,
    pub step: i64,
    pub k: i64,
    pub tfidf: bool,
}

impl Illuminate {
    pub fn parse(view: GraphView, source: &mut Source) -> Result<Self, ParseError> {
        let seed = read_string(source)?;
        let step = read_int(source)?;
        let k = read_int(source)?;
        let tfidf = read_bool(source)?;
        source.expect_end()?;
        Ok(Self {
            view,
            seed,
            step,
            k,
            tfidf,
        })
    }
}

// =============================================================================
// COMMAND
// =============================================================================

/// A fully parsed line, one variant per route family.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetVertex(GetVertex),
    GetEdge(GetEdge),
    PutVertex(PutVertex),
    PutEdge(PutEdge),
    AddEdge(AddEdge),
    DeleteVertex(DeleteVertex),
    DeleteEdge(DeleteEdge),
    Illuminate(Illuminate),
}

impl Command {
    /// Parse the parameters that follow `route`'s verb and objective.
    pub fn parse_params(route: Route, source: &mut Source) -> Result<Self, ParseError> {
        match route {
            Route::GetVertex => GetVertex::parse(source).map(Self::GetVertex),
            Route::GetEdge => GetEdge::parse(source).map(Self::GetEdge),
            Route::PutVertex => PutVertex::parse(source).map(Self::PutVertex),
            Route::PutEdge => PutEdge::parse(source).map(Self::PutEdge),
            Route::AddEdge => AddEdge::parse(source).map(Self::AddEdge),
            Route::DeleteVertex => DeleteVertex::parse(source).map(Self::DeleteVertex),
            Route::DeleteEdge => DeleteEdge::parse(source).map(Self::DeleteEdge),
            Route::Illuminate(view) => Illuminate::parse(view, source).map(Self::Illuminate),
        }
    }

    #[must_use]
    pub fn route(&self) -> Route {
        match self {
            Self::GetVertex(_) => Route::GetVertex,
            Self::GetEdge(_) => Route::GetEdge,
            Self::PutVertex(_) => Route::PutVertex,
            Self::PutEdge(_) => Route::PutEdge,
            Self::AddEdge(_) => Route::AddEdge,
            Self::DeleteVertex(_) => Route::DeleteVertex,
            Self::DeleteEdge(_) => Route::DeleteEdge,
            Self::Illuminate(params) => Route::Illuminate(params.view),
        }
    }
}

// =============================================================================
// LINE PARSING
// =============================================================================

/// Read the verb and objective and resolve them to a route.
pub fn parse_route(source: &mut Source) -> Result<Route, SyntaxError> {
    let verb = source
        .read(|token| {
            Verb::from_token(token)
                .ok_or_else(|| ParseError::UnknownVerb(token.to_string()))
        })
        .map_err(|cause| SyntaxError::new(Usage::Verbs, cause))?;

    source
        .read(|token| {
            Objective::from_token(token)
                .and_then(|objective| Route::find(verb, objective))
                .ok_or_else(|| ParseError::UnknownObjective {
                    verb,
                    objective: token.to_string(),
                })
        })
        .map_err(|cause| SyntaxError::new(Usage::Objectives(verb), cause))
}

/// Verb → objective → parameters.
pub fn parse(source: &mut Source) -> Result<Command, SyntaxError> {
    let route = parse_route(source)?;
    Command::parse_params(route, source)
        .map_err(|cause| SyntaxError::new(Usage::Command(route), cause))
}

/// Tokenize and parse a whole line.
pub fn parse_line(line: &str) -> Result<Command, SyntaxError> {
    parse(&mut Source::new(line))
}

// =============================================================================
// TESTS
// =============================================================================
