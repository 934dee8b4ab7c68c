//! # Value Coercion
//!
//! Token → scalar [`Value`] conversion.
//!
//! [`coerce`] tries each interpretation in a fixed order and keeps the first
//! that succeeds:
//! 1. Integer (base-10 `i64`) → `Value::Int`
//! 2. Float (finite `f64`) → `Value::Float`
//! 3. `true` / `false` → `Value::Bool`
//! 4. RFC 3339 date-time → `Value::Timestamp`
//! 5. Anything else → `Value::String`, unchanged
//!
//! A numeric-looking identifier such as `007` therefore never surfaces as a
//! string. Callers that know the expected type use the `as_*` coercers, which
//! fail instead of falling back.

use crate::error::ParseError;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed scalar. Serialized untagged, so JSON sees plain numbers,
/// booleans and strings (timestamps as RFC 3339 text).
///
/// Variant order doubles as the untagged deserialization order, which
/// matches the coercion precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<FixedOffset>),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Timestamp(v) => f.write_str(&v.to_rfc3339()),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

// =============================================================================
// COERCERS
// =============================================================================

pub fn as_int(token: &str) -> Result<i64, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::InvalidInteger(token.to_string()))
}

/// Finite floats only: `inf` and `NaN` spellings are rejected.
pub fn as_float(token: &str) -> Result<f64, ParseError> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::InvalidFloat(token.to_string())),
    }
}

/// Case-sensitive `true` / `false`.
pub fn as_bool(token: &str) -> Result<bool, ParseError> {
    match token {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidBool(token.to_string())),
    }
}

/// RFC 3339, e.g. `2024-05-01T12:00:00Z` or `2024-05-01T12:00:00+09:00`.
pub fn as_timestamp(token: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    DateTime::parse_from_rfc3339(token)
        .map_err(|_| ParseError::InvalidTimestamp(token.to_string()))
}

pub fn as_string(token: &str) -> Result<String, ParseError> {
    Ok(token.to_string())
}

/// Coerce with fallback. Never fails.
#[must_use]
pub fn coerce(token: &str) -> Value {
    if let Ok(v) = as_int(token) {
        return Value::Int(v);
    }
    if let Ok(v) = as_float(token) {
        return Value::Float(v);
    }
    if let Ok(v) = as_bool(token) {
        return Value::Bool(v);
    }
    if let Ok(v) = as_timestamp(token) {
        return Value::Timestamp(v);
    }
    Value::String(token.to_string())
}

// =============================================================================
// TESTS
// =============================================================================
