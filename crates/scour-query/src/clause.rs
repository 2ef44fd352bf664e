//! Atomic query clauses.
//!
//! A clause is a single predicate: a term, a phrase or a range, optionally scoped
//! to a field. Field constraints are described by a [`Modifier`] rather than by
//! string suffixes, although [`FieldKey::parse`] accepts the `field__suffix`
//! spelling for callers holding keyword-style input.

use std::{cmp::Ordering, fmt};

use serde_json::Value as JsonValue;

use crate::{
    error::QueryError,
    value::{BoolLiteral, Value},
};

/// The universal match clause.
pub const MATCH_ALL: &str = "*:*";

/// Comparison applied between a field and its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `field:value`
    Eq,
    /// `field:[* TO *]`: the field has any value.
    Any,
    /// `field:{* TO v}`
    Lt,
    /// `field:[* TO v]`
    Lte,
    /// `field:{v TO *}`
    Gt,
    /// `field:[v TO *]`
    Gte,
    /// `field:[a TO b]`
    Range,
    /// `field:{a TO b}`
    RangeExc,
}

impl Modifier {
    /// All modifiers, in suffix-table order.
    pub const ALL: [Self; 8] = [
        Self::Eq,
        Self::Any,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Range,
        Self::RangeExc,
    ];

    /// The keyword suffix naming this modifier.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Any => "any",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Range => "range",
            Self::RangeExc => "rangeexc",
        }
    }

    /// Looks up the modifier for a suffix found on `field`.
    pub fn from_suffix(field: &str, suffix: &str) -> Result<Self, QueryError> {
        Self::ALL
            .into_iter()
            .find(|m| m.suffix() == suffix)
            .ok_or_else(|| QueryError::InvalidModifier {
                field: field.to_string(),
                suffix: suffix.to_string(),
            })
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A field name paired with the modifier parsed from its keyword suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKey {
    /// Field name.
    pub field: String,
    /// Comparison to apply.
    pub modifier: Modifier,
}

impl FieldKey {
    /// Parses `field` or `field__suffix`.
    ///
    /// Only the last `__` separates the suffix, so field names may contain
    /// `__` themselves.
    ///
    /// ```
    /// use scour_query::{FieldKey, Modifier};
    ///
    /// let key = FieldKey::parse("int_field__lt").unwrap();
    /// assert_eq!(key.field, "int_field");
    /// assert_eq!(key.modifier, Modifier::Lt);
    /// ```
    pub fn parse(key: &str) -> Result<Self, QueryError> {
        let (field, modifier) = match key.rsplit_once("__") {
            Some((field, suffix)) => (field, Modifier::from_suffix(field, suffix)?),
            None => (key, Modifier::Eq),
        };

        if field.is_empty() {
            return Err(QueryError::InvalidModifier {
                field: String::new(),
                suffix: key.to_string(),
            });
        }

        Ok(Self {
            field: field.to_string(),
            modifier,
        })
    }
}

/// The right-hand side of a field constraint: a single value or a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A single value.
    Scalar(Value),
    /// Several values (multi-valued equality, or the two bounds of a range).
    Seq(Vec<Value>),
}

impl Operand {
    /// Number of values carried, with a scalar counting as one.
    fn arity(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Seq(values) => values.len(),
        }
    }
}

/// Implements `From<$t> for Operand` for scalar value types.
macro_rules! operand_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(value: $t) -> Self {
                    Self::Scalar(Value::from(value))
                }
            }
        )*
    };
}

operand_from_scalar!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    &str,
    String,
    &String,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveDateTime,
    chrono::NaiveDate,
    BoolLiteral
);

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(values: Vec<T>) -> Self {
        Self::Seq(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Operand {
    fn from(values: [T; N]) -> Self {
        Self::Seq(values.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Operand {
    fn from((a, b): (A, B)) -> Self {
        Self::Seq(vec![a.into(), b.into()])
    }
}

impl TryFrom<&JsonValue> for Operand {
    type Error = QueryError;

    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Array(items) => items
                .iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Seq),
            scalar => Value::try_from(scalar).map(Self::Scalar),
        }
    }
}

/// How text values are classified into terms or phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClauseStyle {
    /// Single words are terms, anything else is a phrase.
    #[default]
    Auto,
    /// All text values are terms.
    Term,
    /// All text values are phrases.
    Phrase,
}

impl ClauseStyle {
    /// Returns true if `value` should become a term clause.
    ///
    /// Non-text values are always terms.
    fn is_term(self, value: &Value) -> bool {
        if !value.is_text() {
            return true;
        }
        match self {
            Self::Auto => value.is_word(),
            Self::Term => true,
            Self::Phrase => false,
        }
    }
}

/// A range with optional bounds; both ends share one inclusivity.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    /// Lower bound, `*` when absent.
    pub lower: Option<Value>,
    /// Upper bound, `*` when absent.
    pub upper: Option<Value>,
    /// Square brackets when true, braces when false.
    pub inclusive: bool,
}

impl Range {
    /// Renders the bracketed range, e.g. `[3 TO *]`.
    fn render(&self) -> String {
        let (open, close) = if self.inclusive { ('[', ']') } else { ('{', '}') };
        let lower = self.lower.as_ref().map_or_else(|| "*".to_string(), Value::encode);
        let upper = self.upper.as_ref().map_or_else(|| "*".to_string(), Value::encode);
        format!("{open}{lower} TO {upper}{close}")
    }
}

/// What a clause matches.
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseKind {
    /// A single escaped term.
    Term(Value),
    /// A multi-word value, escaped into a single token.
    Phrase(Value),
    /// A bracketed range.
    Range(Range),
    /// `*:*`
    MatchAll,
}

/// An atomic query predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Field the clause is scoped to, if any.
    pub field: Option<String>,
    /// The predicate itself.
    pub kind: ClauseKind,
}

impl Clause {
    /// A field-less term or phrase, classified by `style`.
    pub fn positional(value: impl Into<Value>, style: ClauseStyle) -> Self {
        Self::exact(None, value.into(), style)
    }

    /// The universal match clause.
    pub fn match_all() -> Self {
        Self {
            field: None,
            kind: ClauseKind::MatchAll,
        }
    }

    /// Builds the clauses for one field constraint.
    ///
    /// Equality over a sequence produces one clause per value, so an empty
    /// sequence produces no clauses at all.
    pub fn build(
        field: &str,
        modifier: Modifier,
        operand: Operand,
        style: ClauseStyle,
    ) -> Result<Vec<Self>, QueryError> {
        let field_name = Some(field.to_string());
        let range = |lower, upper, inclusive| {
            vec![Self {
                field: field_name.clone(),
                kind: ClauseKind::Range(Range {
                    lower,
                    upper,
                    inclusive,
                }),
            }]
        };

        match (modifier, operand) {
            (Modifier::Eq, Operand::Scalar(value)) => {
                Ok(vec![Self::exact(field_name.clone(), value, style)])
            }
            (Modifier::Eq, Operand::Seq(values)) => Ok(values
                .into_iter()
                .map(|value| Self::exact(field_name.clone(), value, style))
                .collect()),
            (Modifier::Any, operand) => {
                if is_true(&operand) {
                    Ok(range(None, None, true))
                } else {
                    Err(QueryError::invalid_range(
                        field,
                        modifier.suffix(),
                        "the only accepted operand is true",
                    ))
                }
            }
            (Modifier::Lt | Modifier::Lte | Modifier::Gt | Modifier::Gte, operand) => {
                let Operand::Scalar(value) = operand else {
                    return Err(QueryError::invalid_range(
                        field,
                        modifier.suffix(),
                        format!("expected a single bound, got {}", operand.arity()),
                    ));
                };
                Ok(match modifier {
                    Modifier::Lt => range(None, Some(value), false),
                    Modifier::Lte => range(None, Some(value), true),
                    Modifier::Gt => range(Some(value), None, false),
                    _ => range(Some(value), None, true),
                })
            }
            (Modifier::Range | Modifier::RangeExc, operand) => {
                let (lower, upper) = sorted_bounds(field, modifier, operand)?;
                Ok(range(Some(lower), Some(upper), modifier == Modifier::Range))
            }
        }
    }

    /// A term or phrase clause for `value`.
    fn exact(field: Option<String>, value: Value, style: ClauseStyle) -> Self {
        let kind = if style.is_term(&value) {
            ClauseKind::Term(value)
        } else {
            ClauseKind::Phrase(value)
        };
        Self { field, kind }
    }

    /// Ordering group used when rendering sibling clauses: terms, then phrases,
    /// then ranges.
    pub(crate) fn group(&self) -> u8 {
        match self.kind {
            ClauseKind::Term(_) | ClauseKind::MatchAll => 0,
            ClauseKind::Phrase(_) => 1,
            ClauseKind::Range(_) => 2,
        }
    }

    /// Renders the clause as query text.
    pub fn render(&self) -> String {
        let body = match &self.kind {
            ClauseKind::MatchAll => return MATCH_ALL.to_string(),
            ClauseKind::Term(value) | ClauseKind::Phrase(value) => value.encode(),
            ClauseKind::Range(range) => range.render(),
        };
        match &self.field {
            Some(field) => format!("{field}:{body}"),
            None => body,
        }
    }
}

/// Returns true if the operand is boolean true (natively or as a literal).
fn is_true(operand: &Operand) -> bool {
    match operand {
        Operand::Scalar(Value::Bool(b)) => *b,
        Operand::Scalar(Value::Str(s)) => s.parse::<BoolLiteral>().is_ok_and(|b| b.0),
        _ => false,
    }
}

/// Extracts two range bounds and orders them ascending.
fn sorted_bounds(
    field: &str,
    modifier: Modifier,
    operand: Operand,
) -> Result<(Value, Value), QueryError> {
    let arity = operand.arity();
    let bounds: Option<[Value; 2]> = match operand {
        Operand::Seq(values) => values.try_into().ok(),
        Operand::Scalar(_) => None,
    };
    let Some([a, b]) = bounds else {
        return Err(QueryError::invalid_range(
            field,
            modifier.suffix(),
            format!("expected 2 bounds, got {arity}"),
        ));
    };

    match a.compare_bound(&b) {
        Some(Ordering::Greater) => Ok((b, a)),
        Some(_) => Ok((a, b)),
        None => Err(QueryError::invalid_range(
            field,
            modifier.suffix(),
            format!(
                "cannot order a {} against a {}",
                a.kind_name(),
                b.kind_name()
            ),
        )),
    }
}
