//! # Validator
//!
//! Runs the full grammar over a line without executing anything, so an
//! interactive prompt can refuse a line before it is submitted.
//!
//! The dispatcher re-parses independently; a line validated at the prompt is
//! parsed again from its own tokens at execution time.

use crate::error::Usage;
use crate::grammar::{self, Command};
use crate::source::Source;
use crate::vocabulary::EXIT;

/// What a valid line asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// The line is the single token `exit`.
    Exit,
    Command(Command),
}

/// Accept a line or return the usage hint for the deepest point reached.
pub fn validate(line: &str) -> Result<Line, Usage> {
    validate_source(&mut Source::new(line))
}

/// Same as [`validate`] over an existing source. The cursor is rewound
/// first and left wherever parsing stopped.
pub fn validate_source(source: &mut Source) -> Result<Line, Usage> {
    source.reset();
    if source.len() == 1 && source.peek() == Ok(EXIT) {
        return Ok(Line::Exit);
    }
    grammar::parse(source)
        .map(Line::Command)
        .map_err(|err| err.usage)
}

// =============================================================================
// TESTS
// =============================================================================
