//! Canonical form for query expressions.

use tracing::trace;

use crate::ast::QueryExpr;

/// Normalize an expression into canonical form.
///
/// Guarantees:
/// - nested And / Or nodes of the same operator are flattened
/// - `Empty` is removed from And / Or and absorbs Not / Boost
/// - And / Or with a single child collapse to that child
/// - negation parity is tracked: `NOT NOT x` becomes `x`
///
/// Child order is preserved; ordering for output is the renderer's concern.
/// Normalizing an already normalized expression returns an equal expression.
#[must_use]
pub fn normalize(expr: &QueryExpr) -> QueryExpr {
    match expr {
        QueryExpr::Empty => QueryExpr::Empty,
        QueryExpr::Clause(clause) => QueryExpr::Clause(clause.clone()),
        QueryExpr::And(children) => normalize_and(children),
        QueryExpr::Or(children) => normalize_or(children),
        QueryExpr::Not(inner) => normalize_not(inner),
        QueryExpr::Boost { expr, factor } => normalize_boost(expr, *factor),
    }
}

///
/// Rules:
/// - NOT Empty      → Empty
/// - NOT (NOT x)    → x
///
fn normalize_not(inner: &QueryExpr) -> QueryExpr {
    match normalize(inner) {
        QueryExpr::Empty => QueryExpr::Empty,
        QueryExpr::Not(double) => {
            trace!("cancelled double negation");
            *double
        }
        other => QueryExpr::Not(Box::new(other)),
    }
}

///
/// Rules:
/// - AND(Empty, x)      → x
/// - AND(AND(a, b), c)  → AND(a, b, c)
/// - AND(x)             → x
/// - AND()              → Empty
///
fn normalize_and(children: &[QueryExpr]) -> QueryExpr {
    let mut out = Vec::with_capacity(children.len());

    for child in children {
        match normalize(child) {
            QueryExpr::Empty => {}
            QueryExpr::And(grandchildren) => out.extend(grandchildren),
            other => out.push(other),
        }
    }

    collapse(out, QueryExpr::And)
}

///
/// Rules:
/// - OR(Empty, x)     → x
/// - OR(OR(a, b), c)  → OR(a, b, c)
/// - OR(x)            → x
/// - OR()             → Empty
///
fn normalize_or(children: &[QueryExpr]) -> QueryExpr {
    let mut out = Vec::with_capacity(children.len());

    for child in children {
        match normalize(child) {
            QueryExpr::Empty => {}
            QueryExpr::Or(grandchildren) => out.extend(grandchildren),
            other => out.push(other),
        }
    }

    collapse(out, QueryExpr::Or)
}

/// A boost over nothing is nothing.
fn normalize_boost(expr: &QueryExpr, factor: f64) -> QueryExpr {
    match normalize(expr) {
        QueryExpr::Empty => QueryExpr::Empty,
        inner => QueryExpr::Boost {
            expr: Box::new(inner),
            factor,
        },
    }
}

/// Collapses zero- and one-element child lists.
fn collapse(mut out: Vec<QueryExpr>, wrap: fn(Vec<QueryExpr>) -> QueryExpr) -> QueryExpr {
    if out.len() > 1 {
        return wrap(out);
    }
    out.pop().unwrap_or(QueryExpr::Empty)
}
