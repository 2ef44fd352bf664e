//! Literal values and their query-language encoding.
//!
//! Every value kind has exactly one encoding. Text is escaped for the Lucene
//! standard query parser: reserved characters are backslash-escaped, a space
//! becomes `\ ` (so a multi-word value stays a single token), and the bare
//! operator keywords are quoted.

use std::{cmp::Ordering, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;

use crate::error::QueryError;

/// Characters that the standard query parser treats as syntax.
const RESERVED: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
];

/// Operator keywords that must be quoted when used as a bare term.
const KEYWORDS: [&str; 3] = ["AND", "OR", "NOT"];

/// Date-time layout understood by Solr date fields.
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A literal value that can appear in a query clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean, rendered as `true` or `false`.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number, always rendered with a decimal point.
    Float(f64),
    /// A UTC timestamp with second precision.
    DateTime(DateTime<Utc>),
    /// Plain text; every reserved character is escaped.
    Str(String),
    /// Text whose `*` and `?` characters are kept as wildcards.
    Wildcard(String),
    /// Text passed through untouched, for parsers with their own syntax (dismax).
    Unescaped(String),
}

impl Value {
    /// Creates a wildcard string value.
    pub fn wildcard(text: impl Into<String>) -> Self {
        Self::Wildcard(text.into())
    }

    /// Creates a value that is emitted without escaping.
    pub fn unescaped(text: impl Into<String>) -> Self {
        Self::Unescaped(text.into())
    }

    /// Parses a boolean literal (`"true"` or `"false"`) into a boolean value.
    pub fn boolean(literal: &str) -> Result<Self, QueryError> {
        literal.parse::<BoolLiteral>().map(Self::from)
    }

    /// Encodes the value as a query-language token.
    ///
    /// Empty text encodes as `""` so it never leaves a dangling operator or
    /// `field:` prefix behind.
    pub fn encode(&self) -> String {
        match self {
            Self::Str(text) | Self::Wildcard(text) | Self::Unescaped(text) if text.is_empty() => {
                "\"\"".to_string()
            }
            Self::Bool(true) => "true".to_string(),
            Self::Bool(false) => "false".to_string(),
            Self::Int(n) => escape_term(&n.to_string()),
            Self::Float(x) => escape_term(&format_float(*x)),
            Self::DateTime(dt) => escape_term(&format_datetime(dt)),
            Self::Str(text) => escape_term(text),
            Self::Wildcard(text) => escape_wildcard(text),
            Self::Unescaped(text) => text.clone(),
        }
    }

    /// Returns true for the string-like kinds.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Str(_) | Self::Wildcard(_) | Self::Unescaped(_))
    }

    /// Returns true if this is text made only of word characters.
    ///
    /// Such values are plain terms; any other text is treated as a phrase.
    pub(crate) fn is_word(&self) -> bool {
        match self {
            Self::Str(text) | Self::Wildcard(text) | Self::Unescaped(text) => {
                !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }

    /// A short name for the value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::DateTime(_) => "datetime",
            Self::Str(_) => "string",
            Self::Wildcard(_) => "wildcard string",
            Self::Unescaped(_) => "unescaped string",
        }
    }

    /// Orders two range bounds.
    ///
    /// Integers and floats compare numerically with each other; text kinds
    /// compare by their raw text. Returns `None` for incomparable kinds.
    pub(crate) fn compare_bound(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (a, b) if a.is_text() && b.is_text() => Some(a.raw_text().cmp(b.raw_text())),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }

    /// Numeric view of integer and float values.
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// The unescaped text of a string-like value.
    fn raw_text(&self) -> &str {
        match self {
            Self::Str(text) | Self::Wildcard(text) | Self::Unescaped(text) => text,
            _ => "",
        }
    }
}

/// Escapes text for use as a single query term.
pub fn escape_term(text: &str) -> String {
    escape(text, false)
}

/// Escapes text for use as a term, leaving `*` and `?` wildcards intact.
pub fn escape_wildcard(text: &str) -> String {
    escape(text, true)
}

/// Shared escaping routine.
fn escape(text: &str, keep_wildcards: bool) -> String {
    if KEYWORDS.contains(&text) {
        return format!("\"{text}\"");
    }

    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '*' | '?' if keep_wildcards => out.push(ch),
            ' ' => out.push_str("\\ "),
            c if RESERVED.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Formats a float so the text always carries a decimal point (`3.0`, not `3`).
///
/// Non-finite values use the spellings the server's float parser accepts
/// (`Infinity`, `-Infinity`, `NaN`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Formats a timestamp in Solr's `YYYY-MM-DDTHH:MM:SSZ` layout.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// A boolean spelled as `"true"` or `"false"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolLiteral(pub bool);

impl FromStr for BoolLiteral {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Self(true)),
            "false" => Ok(Self(false)),
            other => Err(QueryError::unsupported(format!(
                "boolean literal {other:?} (expected \"true\" or \"false\")"
            ))),
        }
    }
}

impl From<BoolLiteral> for Value {
    fn from(literal: BoolLiteral) -> Self {
        Self::Bool(literal.0)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Implements `From<$t> for Value` for integer types that widen losslessly to `i64`.
macro_rules! from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value.and_utc())
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::DateTime(value.and_time(Default::default()).and_utc())
    }
}

impl TryFrom<&JsonValue> for Value {
    type Error = QueryError;

    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Bool(b) => Ok(Self::Bool(*b)),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Int(i)),
                None => n
                    .as_f64()
                    .map(Self::Float)
                    .ok_or_else(|| QueryError::unsupported(format!("number {n}"))),
            },
            JsonValue::String(s) => Ok(Self::Str(s.clone())),
            JsonValue::Null => Err(QueryError::unsupported("null")),
            JsonValue::Array(_) => Err(QueryError::unsupported("array used as a scalar value")),
            JsonValue::Object(_) => Err(QueryError::unsupported("object used as a scalar value")),
        }
    }
}
