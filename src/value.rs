//! Conversion of raw strings into the supported leaf types.
//!
//! Every leaf field has a [`Kind`]. A raw string is turned into a [`Value`] of
//! that kind by [`convert`], and a [`Value`] is rendered back to text through
//! its `Display` impl (used for flag defaults in help output).

use std::fmt;
use std::num::ParseIntError;

use crate::error::BindError;

const SEQ_SEPARATOR: char = ',';

/// Type tag of a supported leaf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Str,
    /// Machine-default integer, stored as `i32`.
    Int,
    Int64,
    Bool,
    Float,
    /// Comma-separated `i32` sequence.
    IntSeq,
}

impl Kind {
    /// Placeholder shown in help output, e.g. `--intval <INT>`.
    pub fn placeholder(self) -> &'static str {
        match self {
            Kind::Str => "STRING",
            Kind::Int => "INT",
            Kind::Int64 => "INT64",
            Kind::Bool => "BOOL",
            Kind::Float => "FLOAT",
            Kind::IntSeq => "INT,...",
        }
    }
}

/// An owned value of one of the supported leaf kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i32),
    Int64(i64),
    Bool(bool),
    Float(f64),
    IntSeq(Vec<i32>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Str(_) => Kind::Str,
            Value::Int(_) => Kind::Int,
            Value::Int64(_) => Kind::Int64,
            Value::Bool(_) => Kind::Bool,
            Value::Float(_) => Kind::Float,
            Value::IntSeq(_) => Kind::IntSeq,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::IntSeq(seq) => {
                for (i, item) in seq.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{SEQ_SEPARATOR}")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// Convert `raw` into a value of `kind`.
///
/// Strings are taken verbatim. Booleans never fail: see [`parse_bool_token`].
/// A sequence fails as a whole on its first bad element. `key` names the
/// binding in the error.
pub fn convert(kind: Kind, raw: &str, key: &str) -> Result<Value, BindError> {
    let invalid = |reason: String| BindError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason,
    };

    match kind {
        Kind::Str => Ok(Value::Str(raw.to_string())),
        Kind::Int => raw
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|e| invalid(e.to_string())),
        Kind::Int64 => raw
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| invalid(e.to_string())),
        Kind::Bool => Ok(Value::Bool(parse_bool_token(raw))),
        Kind::Float => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| invalid(e.to_string())),
        Kind::IntSeq => parse_int_seq(raw)
            .map(Value::IntSeq)
            .map_err(|e| invalid(e.to_string())),
    }
}

/// `true`, `yes`, `on` and `1` (any case) are true; anything else is false.
pub fn parse_bool_token(raw: &str) -> bool {
    ["true", "yes", "on", "1"]
        .iter()
        .any(|token| raw.eq_ignore_ascii_case(token))
}

/// Parse `"4,5,6"` into `[4, 5, 6]`, preserving order.
pub fn parse_int_seq(raw: &str) -> Result<Vec<i32>, ParseIntError> {
    raw.split(SEQ_SEPARATOR).map(str::parse::<i32>).collect()
}

/// Strip surrounding quote characters and whitespace from a flag value.
pub fn strip_quotes(raw: &str) -> &str {
    raw.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
}
