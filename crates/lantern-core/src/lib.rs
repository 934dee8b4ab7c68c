//! # lantern-core
//!
//! The command language for the Lantern graph store client - THE LANGUAGE.
//!
//! A line travels one way through this crate:
//!
//! ```text
//! Source (tokens) -> grammar (typed record) -> Dispatcher -> GraphStore -> output
//! ```
//!
//! ## Architectural Constraints
//!
//! - No transport: the store is reached only through [`GraphStore`]
//! - Closed vocabularies: verbs, objectives and routes are static tables
//! - First failure wins: parsers never recover or collect errors
//! - Deterministic output: rendered graphs use `BTreeMap` ordering

// =============================================================================
// MODULES
// =============================================================================

pub mod dispatch;
pub mod error;
pub mod grammar;
pub mod graph;
pub mod memory;
pub mod source;
pub mod store;
pub mod validate;
pub mod value;
pub mod vocabulary;

// =============================================================================
// RE-EXPORTS: Language
// =============================================================================

pub use error::{CommandError, ErrorKind, ParseError, SyntaxError, Usage};
pub use grammar::{Command, DEFAULT_TTL, parse_line};
pub use source::Source;
pub use validate::{Line, validate};
pub use value::Value;
pub use vocabulary::{EXIT, GraphView, Objective, ROUTES, Route, VERBS, Verb};

// =============================================================================
// RE-EXPORTS: Execution
// =============================================================================

pub use dispatch::{Dispatcher, Handler};
pub use graph::{Graph, WeightMap};
pub use memory::MemoryStore;
pub use store::{GraphStore, StoreError, Vertex};
