//! # Token Source
//!
//! Whitespace tokenizer with a bounds-checked, forward-only cursor.
//!
//! The cursor only moves forward until an explicit [`Source::reset`], so the
//! validator and the dispatcher can run over the same tokens in turn without
//! re-tokenizing.

use crate::error::ParseError;

/// Tokens of one input line plus the current read position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Source {
    tokens: Vec<String>,
    position: usize,
}

impl Source {
    /// Split a line on whitespace. Runs of whitespace never produce empty tokens.
    #[must_use]
    pub fn new(line: &str) -> Self {
        Self::from_tokens(line.split_whitespace())
    }

    /// Build a source from tokens that were split elsewhere.
    #[must_use]
    pub fn from_tokens<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            position: 0,
        }
    }

    /// The token under the cursor. Does not advance.
    pub fn peek(&self) -> Result<&str, ParseError> {
        self.tokens
            .get(self.position)
            .map(String::as_str)
            .ok_or(ParseError::OutOfRange)
    }

    /// Move the cursor forward by one. Stops at the end.
    pub fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Whether a token remains under the cursor.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.position < self.tokens.len()
    }

    /// Fail with `NotAtEnd` if any token remains.
    pub fn expect_end(&self) -> Result<(), ParseError> {
        match self.tokens.get(self.position) {
            Some(token) => Err(ParseError::NotAtEnd(token.clone())),
            None => Ok(()),
        }
    }

    /// Rewind to the first token.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Apply `read` to the current token, then advance whether or not it succeeded.
    ///
    /// A malformed token is still consumed, so a failed read never leaves the
    /// cursor where the next read would see the same token again.
    pub fn read<T>(
        &mut self,
        read: impl FnOnce(&str) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let result = self.peek().and_then(read);
        self.advance();
        result
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_any_whitespace() {
        let source = Source::new("  get\tvertex   alice \n");
        assert_eq!(source.tokens(), ["get", "vertex", "alice"]);
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn empty_line_has_no_tokens() {
        let source = Source::new("   ");
        assert!(source.is_empty());
        assert_eq!(source.peek(), Err(ParseError::OutOfRange));
        assert_eq!(source.expect_end(), Ok(()));
    }

    #[test]
    fn peek_does_not_advance() {
        let source = Source::new("a b");
        assert_eq!(source.peek(), Ok("a"));
        assert_eq!(source.peek(), Ok("a"));
        assert_eq!(source.position(), 0);
    }

    #[test]
    fn reading_past_end_is_out_of_range() {
        let mut source = Source::new("only");
        source.advance();
        assert!(!source.has_next());
        assert_eq!(source.peek(), Err(ParseError::OutOfRange));

        source.advance();
        assert_eq!(source.position(), 1);
    }

    #[test]
    fn expect_end_reports_first_leftover() {
        let mut source = Source::new("get vertex k1 extra");
        for _ in 0..3 {
            source.advance();
        }
        assert_eq!(
            source.expect_end(),
            Err(ParseError::NotAtEnd("extra".into()))
        );
    }

    fn int(token: &str) -> Result<i64, ParseError> {
        token
            .parse()
            .map_err(|_| ParseError::InvalidInteger(token.into()))
    }

    #[test]
    fn failed_read_still_consumes_token() {
        let mut source = Source::new("x 7");
        assert!(source.read(int).is_err());
        assert_eq!(source.position(), 1);
        assert_eq!(source.read(int), Ok(7));
    }

    #[test]
    fn reset_rewinds_without_retokenizing() {
        let mut source = Source::new("a b c");
        source.advance();
        source.advance();
        source.reset();
        assert_eq!(source.position(), 0);
        assert_eq!(source.peek(), Ok("a"));
    }
}
