//! Query expression tree.
//!
//! Boolean combinations of clauses, built programmatically and rendered to
//! Lucene query text by [`crate::render`].

use std::{fmt, ops};

use crate::{clause::Clause, error::QueryError, render};

/// A boolean query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    /// Matches nothing in particular; the identity of `And` and `Or`.
    Empty,

    /// A single clause.
    Clause(Clause),

    /// Conjunction: all sub-expressions must match.
    And(Vec<Self>),

    /// Disjunction: at least one sub-expression must match.
    Or(Vec<Self>),

    /// Negation: results must NOT match this expression.
    Not(Box<Self>),

    /// Boosted query: weights the score of the inner expression.
    Boost {
        /// The expression to boost.
        expr: Box<Self>,
        /// The boost factor.
        factor: f64,
    },
}

impl QueryExpr {
    /// Creates an And expression, dropping empties and flattening nested Ands.
    pub fn and(exprs: Vec<Self>) -> Self {
        let flattened: Vec<Self> = exprs
            .into_iter()
            .flat_map(|e| match e {
                Self::Empty => vec![],
                Self::And(inner) => inner,
                other => vec![other],
            })
            .collect();

        Self::collapse(flattened, Self::And)
    }

    /// Creates an Or expression, dropping empties and flattening nested Ors.
    pub fn or(exprs: Vec<Self>) -> Self {
        let flattened: Vec<Self> = exprs
            .into_iter()
            .flat_map(|e| match e {
                Self::Empty => vec![],
                Self::Or(inner) => inner,
                other => vec![other],
            })
            .collect();

        Self::collapse(flattened, Self::Or)
    }

    /// Negates an expression, cancelling an existing negation.
    pub fn negate(expr: Self) -> Self {
        match expr {
            Self::Empty => Self::Empty,
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Creates a boosted expression.
    ///
    /// Boosting an already boosted expression wraps it again; factors are not
    /// multiplied. The factor must be finite and greater than zero.
    pub fn boost(expr: Self, factor: f64) -> Result<Self, QueryError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(QueryError::InvalidBoost {
                factor: factor.to_string(),
            });
        }
        Ok(match expr {
            Self::Empty => Self::Empty,
            other => Self::Boost {
                expr: Box::new(other),
                factor,
            },
        })
    }

    /// The `*:*` expression.
    pub fn match_all() -> Self {
        Self::Clause(Clause::match_all())
    }

    /// Returns true for the empty expression.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Rewrites the expression into canonical form.
    pub fn normalize(&self) -> Self {
        crate::normalize::normalize(self)
    }

    /// Renders the expression as query text.
    pub fn to_query_string(&self) -> String {
        render::render(self)
    }

    /// Unwraps single-element lists; wraps longer ones with `wrap`.
    fn collapse(mut exprs: Vec<Self>, wrap: fn(Vec<Self>) -> Self) -> Self {
        match exprs.len() {
            0 => Self::Empty,
            1 => exprs.pop().unwrap_or(Self::Empty),
            _ => wrap(exprs),
        }
    }

    /// Formats the expression as a tree structure with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Empty => writeln!(f, "{prefix}Empty"),
            Self::Clause(clause) => writeln!(f, "{prefix}Clause({})", clause.render()),
            Self::Not(inner) => {
                writeln!(f, "{prefix}Not")?;
                inner.fmt_tree(f, indent + 1)
            }
            Self::And(exprs) => {
                writeln!(f, "{prefix}And")?;
                for expr in exprs {
                    expr.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Or(exprs) => {
                writeln!(f, "{prefix}Or")?;
                for expr in exprs {
                    expr.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Boost { expr, factor } => {
                writeln!(f, "{prefix}Boost({factor})")?;
                expr.fmt_tree(f, indent + 1)
            }
        }
    }
}

impl From<Clause> for QueryExpr {
    fn from(clause: Clause) -> Self {
        Self::Clause(clause)
    }
}

impl ops::BitAnd for QueryExpr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self::and(vec![self, rhs])
    }
}

impl ops::BitOr for QueryExpr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::or(vec![self, rhs])
    }
}

impl ops::Not for QueryExpr {
    type Output = Self;

    fn not(self) -> Self {
        Self::negate(self)
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::ClauseStyle;

    fn term(s: &str) -> QueryExpr {
        QueryExpr::Clause(Clause::positional(s, ClauseStyle::Auto))
    }

    #[test]
    fn and_flattens_nested() {
        let nested = QueryExpr::and(vec![
            term("a"),
            QueryExpr::And(vec![term("b"), term("c")]),
        ]);

        assert_eq!(nested, QueryExpr::And(vec![term("a"), term("b"), term("c")]));
    }

    #[test]
    fn and_single_element_unwraps() {
        let single = QueryExpr::and(vec![term("a")]);
        assert_eq!(single, term("a"));
    }

    #[test]
    fn and_absorbs_empty() {
        assert_eq!(QueryExpr::Empty & term("a"), term("a"));
        assert_eq!(term("a") & QueryExpr::Empty, term("a"));
        assert_eq!(QueryExpr::and(vec![QueryExpr::Empty, QueryExpr::Empty]), QueryExpr::Empty);
    }

    #[test]
    fn or_flattens_nested() {
        let nested = QueryExpr::or(vec![
            term("a"),
            QueryExpr::Or(vec![term("b"), term("c")]),
        ]);

        assert_eq!(nested, QueryExpr::Or(vec![term("a"), term("b"), term("c")]));
    }

    #[test]
    fn or_absorbs_empty() {
        assert_eq!(QueryExpr::Empty | term("a"), term("a"));
        assert_eq!(QueryExpr::or(vec![]), QueryExpr::Empty);
    }

    #[test]
    fn negation_cancels() {
        assert_eq!(!!term("a"), term("a"));
        assert_eq!(!!!term("a"), QueryExpr::Not(Box::new(term("a"))));
        assert_eq!(!QueryExpr::Empty, QueryExpr::Empty);
    }

    #[test]
    fn boost_wraps_rather_than_merging() {
        let twice = QueryExpr::boost(QueryExpr::boost(term("a"), 1.5).unwrap(), 2.0).unwrap();
        assert_eq!(
            twice,
            QueryExpr::Boost {
                expr: Box::new(QueryExpr::Boost {
                    expr: Box::new(term("a")),
                    factor: 1.5
                }),
                factor: 2.0
            }
        );
        assert_eq!(
            QueryExpr::boost(QueryExpr::Empty, 2.0).unwrap(),
            QueryExpr::Empty
        );
    }

    #[test]
    fn boost_factor_must_be_positive_and_finite() {
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = QueryExpr::boost(term("a"), factor).unwrap_err();
            assert!(matches!(err, QueryError::InvalidBoost { .. }));
        }
        assert_eq!(
            QueryExpr::boost(term("a"), -1.0).unwrap_err().to_string(),
            "boost factor must be a positive finite number, got -1"
        );
        assert!(QueryExpr::boost(QueryExpr::Empty, 0.0).is_err());
    }

    #[test]
    fn tree_display() {
        let expr = term("a") & !term("b");
        assert_eq!(expr.to_string(), "And\n  Clause(a)\n  Not\n    Clause(b)\n");
    }
}
