//! Clause-set builder.
//!
//! [`Q`] collects positional values, field constraints and nested expressions,
//! then builds them into a single conjunction. Input errors are deferred to
//! [`Q::build`] so the builder chains without intermediate `?`.

use serde_json::Value as JsonValue;

use crate::{
    ast::QueryExpr,
    clause::{Clause, ClauseStyle, FieldKey, Modifier, Operand},
    error::QueryError,
    value::Value,
};

/// One piece of a clause set, in the order it was added.
#[derive(Debug, Clone, PartialEq)]
enum Part {
    /// A field-less value.
    Positional(Value),
    /// A structured field constraint.
    Field {
        /// Field name.
        field: String,
        /// Comparison.
        modifier: Modifier,
        /// Right-hand side.
        operand: Operand,
    },
    /// A `field__suffix` keyword, parsed at build time.
    Keyword {
        /// The raw key.
        key: String,
        /// Right-hand side.
        operand: Operand,
    },
    /// The `*:*` clause.
    MatchAll,
    /// An already built expression.
    Expr(QueryExpr),
    /// A nested builder.
    Sub(Q),
}

/// A set of clauses conjoined into one expression.
///
/// An empty builder produces [`QueryExpr::Empty`], which disappears inside any
/// surrounding conjunction or disjunction.
///
/// ```
/// use scour_query::{Modifier, Q, render};
///
/// let expr = Q::new()
///     .value("hello")
///     .field("int_field", 3)
///     .field_op("date_field", Modifier::Any, true)
///     .build()
///     .unwrap();
/// assert_eq!(render(&expr), "hello AND int_field:3 AND date_field:[* TO *]");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Q {
    /// Term/phrase classification for text values added to this builder.
    style: ClauseStyle,
    /// Accumulated parts.
    parts: Vec<Part>,
}

impl Q {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how text values are classified into terms or phrases.
    pub fn style(mut self, style: ClauseStyle) -> Self {
        self.style = style;
        self
    }

    /// Adds a field-less value.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.parts.push(Part::Positional(value.into()));
        self
    }

    /// Adds several field-less values.
    pub fn values<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.parts
            .extend(values.into_iter().map(|v| Part::Positional(v.into())));
        self
    }

    /// Adds an equality constraint; a sequence operand adds one clause per value.
    pub fn field(self, field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        self.field_op(field, Modifier::Eq, operand)
    }

    /// Adds a field constraint with an explicit modifier.
    pub fn field_op(
        mut self,
        field: impl Into<String>,
        modifier: Modifier,
        operand: impl Into<Operand>,
    ) -> Self {
        self.parts.push(Part::Field {
            field: field.into(),
            modifier,
            operand: operand.into(),
        });
        self
    }

    /// Adds a constraint spelled as a `field__suffix` keyword.
    pub fn kwarg(mut self, key: impl Into<String>, operand: impl Into<Operand>) -> Self {
        self.parts.push(Part::Keyword {
            key: key.into(),
            operand: operand.into(),
        });
        self
    }

    /// Adds the `*:*` clause.
    pub fn match_all(mut self) -> Self {
        self.parts.push(Part::MatchAll);
        self
    }

    /// Adds an already built expression.
    pub fn expr(mut self, expr: QueryExpr) -> Self {
        self.parts.push(Part::Expr(expr));
        self
    }

    /// Adds a nested builder.
    pub fn sub(mut self, q: Self) -> Self {
        self.parts.push(Part::Sub(q));
        self
    }

    /// Creates a builder from a JSON object of `field__suffix` keywords.
    pub fn from_json(object: &JsonValue) -> Result<Self, QueryError> {
        let JsonValue::Object(map) = object else {
            return Err(QueryError::unsupported(
                "keyword constraints must be a JSON object",
            ));
        };

        map.iter().try_fold(Self::new(), |q, (key, value)| {
            Ok(q.kwarg(key.as_str(), Operand::try_from(value)?))
        })
    }

    /// Returns true if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Builds the conjunction of everything added.
    ///
    /// Clauses come first (positional values, then field constraints), nested
    /// expressions after, each in insertion order.
    pub fn build(self) -> Result<QueryExpr, QueryError> {
        let style = self.style;
        let mut positional = Vec::new();
        let mut fields = Vec::new();
        let mut nested = Vec::new();

        for part in self.parts {
            match part {
                Part::Positional(value) => {
                    positional.push(QueryExpr::Clause(Clause::positional(value, style)));
                }
                Part::Field {
                    field,
                    modifier,
                    operand,
                } => fields.extend(field_clauses(&field, modifier, operand, style)?),
                Part::Keyword { key, operand } => {
                    let FieldKey { field, modifier } = FieldKey::parse(&key)?;
                    fields.extend(field_clauses(&field, modifier, operand, style)?);
                }
                Part::MatchAll => positional.push(QueryExpr::match_all()),
                Part::Expr(expr) => nested.push(expr),
                Part::Sub(q) => nested.push(q.build()?),
            }
        }

        positional.extend(fields);
        positional.extend(nested);
        Ok(QueryExpr::and(positional))
    }
}

impl From<QueryExpr> for Q {
    fn from(expr: QueryExpr) -> Self {
        Self::new().expr(expr)
    }
}

/// Builds clause expressions for one field constraint.
fn field_clauses(
    field: &str,
    modifier: Modifier,
    operand: Operand,
    style: ClauseStyle,
) -> Result<Vec<QueryExpr>, QueryError> {
    Ok(Clause::build(field, modifier, operand, style)?
        .into_iter()
        .map(QueryExpr::Clause)
        .collect())
}
