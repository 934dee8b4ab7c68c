//! # Error Taxonomy
//!
//! Every failure a command line can produce, classified so callers branch on
//! [`ErrorKind`] instead of message text.
//!
//! - `ParseError`: a single field or token failed
//! - `Usage`: the usage hint for the deepest point the grammar reached
//! - `SyntaxError`: a `ParseError` paired with its `Usage`
//! - `CommandError`: the closed set surfaced by the dispatcher

use crate::store::StoreError;
use crate::vocabulary::{Route, VERBS, Verb};
use std::fmt;
use thiserror::Error;

// =============================================================================
// PARSE ERRORS
// =============================================================================

/// A token-level failure. Parsers stop at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The cursor is at or past the last token.
    #[error("unexpected end of input")]
    OutOfRange,

    /// Tokens remain after the last expected field.
    #[error("unexpected trailing token `{0}`")]
    NotAtEnd(String),

    #[error("expected an integer, found `{0}`")]
    InvalidInteger(String),

    #[error("expected a finite float, found `{0}`")]
    InvalidFloat(String),

    #[error("expected `true` or `false`, found `{0}`")]
    InvalidBool(String),

    #[error("expected an RFC 3339 timestamp, found `{0}`")]
    InvalidTimestamp(String),

    #[error("time-to-live must be a non-negative number of seconds, found `{0}`")]
    NegativeTtl(i64),

    #[error("unknown verb `{0}`")]
    UnknownVerb(String),

    #[error("`{verb}` does not take objective `{objective}`")]
    UnknownObjective { verb: Verb, objective: String },
}

// =============================================================================
// USAGE HINTS
// =============================================================================

/// How far the grammar got before failing, and therefore which hint applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    /// No valid verb.
    Verbs,
    /// Valid verb, no valid objective for it.
    Objectives(Verb),
    /// Valid route, bad parameters.
    Command(Route),
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verbs => {
                let verbs: Vec<&str> = VERBS.iter().map(|verb| verb.as_str()).collect();
                write!(f, "usage: {{ {} | exit }} ...", verbs.join(" | "))
            }
            Self::Objectives(verb) => {
                let objectives: Vec<&str> = verb.objectives().map(|o| o.as_str()).collect();
                match objectives.as_slice() {
                    [only] => write!(f, "usage: {verb} {only} ..."),
                    _ => write!(f, "usage: {verb} {{ {} }} ...", objectives.join(" | ")),
                }
            }
            Self::Command(route) => write!(f, "usage: {}", route.syntax()),
        }
    }
}

/// A parse failure together with the hint for where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{cause}")]
pub struct SyntaxError {
    pub usage: Usage,
    pub cause: ParseError,
}

impl SyntaxError {
    #[must_use]
    pub const fn new(usage: Usage, cause: ParseError) -> Self {
        Self { usage, cause }
    }
}

// =============================================================================
// COMMAND ERRORS
// =============================================================================

/// Stable classification of a [`CommandError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidVerb,
    InvalidObjective,
    Syntax,
    NotImplemented,
    Connection,
    Unexpected,
}

/// Errors returned by the dispatcher.
///
/// Each variant replaces its cause for display. The cause stays reachable
/// through `std::error::Error::source` for logging.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid verb; {}", .0.usage)]
    InvalidVerb(#[source] SyntaxError),

    #[error("invalid objective; {}", .0.usage)]
    InvalidObjective(#[source] SyntaxError),

    /// Parameters did not match the route's syntax.
    #[error("{}", .0.usage)]
    Syntax(#[source] SyntaxError),

    /// Recognized and well-formed, but intentionally unsupported.
    #[error("not implemented: {0}")]
    NotImplemented(Route),

    /// Any failure raised by the store during a valid command.
    #[error("connection error")]
    Connection(#[source] StoreError),

    #[error(transparent)]
    Render(#[from] serde_json::Error),

    #[error(transparent)]
    Sink(#[from] std::io::Error),
}

impl CommandError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidVerb(_) => ErrorKind::InvalidVerb,
            Self::InvalidObjective(_) => ErrorKind::InvalidObjective,
            Self::Syntax(_) => ErrorKind::Syntax,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::Connection(_) => ErrorKind::Connection,
            Self::Render(_) | Self::Sink(_) => ErrorKind::Unexpected,
        }
    }

    /// Wrap a parameter failure for `route`.
    #[must_use]
    pub const fn syntax(route: Route, cause: ParseError) -> Self {
        Self::Syntax(SyntaxError::new(Usage::Command(route), cause))
    }
}

impl From<SyntaxError> for CommandError {
    fn from(err: SyntaxError) -> Self {
        match err.usage {
            Usage::Verbs => Self::InvalidVerb(err),
            Usage::Objectives(_) => Self::InvalidObjective(err),
            Usage::Command(_) => Self::Syntax(err),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        Self::Connection(err)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::GraphView;
    use std::error::Error as _;

    #[test]
    fn top_level_usage_lists_verbs_and_exit() {
        assert_eq!(
            Usage::Verbs.to_string(),
            "usage: { get | put | add | delete | illuminate | exit } ..."
        );
    }

    #[test]
    fn objective_usage_is_scoped_to_verb() {
        assert_eq!(
            Usage::Objectives(Verb::Get).to_string(),
            "usage: get { vertex | edge } ..."
        );
        assert_eq!(
            Usage::Objectives(Verb::Add).to_string(),
            "usage: add edge ..."
        );
        assert!(
            Usage::Objectives(Verb::Illuminate)
                .to_string()
                .contains("neighbor | spt_cost | spt_relevance | mst_cost | mst_relevance")
        );
    }

    #[test]
    fn command_usage_names_exact_syntax() {
        let usage = Usage::Command(Route::Illuminate(GraphView::SptCost));
        assert_eq!(
            usage.to_string(),
            "usage: illuminate spt_cost <seed: string> <step: int> <k: int> <tfidf: bool>"
        );
    }

    #[test]
    fn syntax_errors_classify_by_depth() {
        let verb = CommandError::from(SyntaxError::new(
            Usage::Verbs,
            ParseError::UnknownVerb("foo".into()),
        ));
        let objective = CommandError::from(SyntaxError::new(
            Usage::Objectives(Verb::Get),
            ParseError::UnknownObjective {
                verb: Verb::Get,
                objective: "widget".into(),
            },
        ));
        let params = CommandError::syntax(Route::GetVertex, ParseError::OutOfRange);

        assert_eq!(verb.kind(), ErrorKind::InvalidVerb);
        assert_eq!(objective.kind(), ErrorKind::InvalidObjective);
        assert_eq!(params.kind(), ErrorKind::Syntax);
        assert_eq!(params.to_string(), "usage: get vertex <key: string>");
    }

    #[test]
    fn connection_error_hides_cause_but_keeps_it() {
        let err = CommandError::from(StoreError::Timeout);

        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(err.to_string(), "connection error");
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("request timed out"));
    }
}
