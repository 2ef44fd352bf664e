//! Query text rendering.
//!
//! Renders a normalized expression into Lucene standard-parser syntax.
//!
//! # Grammar
//!
//! ```text
//! expr  → leaf | "(" expr bool expr (bool expr)* ")" | "NOT" expr | expr "^" weight
//! bool  → "AND" | "OR"
//! ```
//!
//! # Ordering
//!
//! Inside a conjunction, clause children are emitted first (terms, then phrases,
//! then ranges, each group sorted and de-duplicated) followed by compound
//! children in the order they were added. Disjunction children keep their order.
//!
//! # Negation
//!
//! A negation directly inside a conjunction (or at the top level) renders as
//! `NOT x`. Anywhere else the parser cannot evaluate it alone, so it is anchored
//! to the match-everything clause: `(*:* AND NOT x)`.

use std::collections::BTreeSet;

use crate::{ast::QueryExpr, clause::MATCH_ALL};

/// The operator a node is rendered beneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parent {
    /// The whole query string or one filter parameter.
    Top,
    /// A conjunction.
    And,
    /// A disjunction.
    Or,
    /// A negation.
    Not,
    /// A boost.
    Boost,
}

/// Renders an expression as a single query string (the `q` role).
///
/// The expression is normalized first. An empty expression renders as an empty
/// string.
pub fn render(expr: &QueryExpr) -> String {
    render_node(&expr.normalize(), Parent::Top)
}

/// Renders an expression as independent filter strings (the `fq` role).
///
/// Each top-level conjunct becomes its own filter. The result is sorted and
/// free of duplicates so repeated renders are identical.
pub fn render_filters(expr: &QueryExpr) -> Vec<String> {
    let filters: BTreeSet<String> = match expr.normalize() {
        QueryExpr::Empty => BTreeSet::new(),
        QueryExpr::And(children) => children
            .iter()
            .map(|child| render_node(child, Parent::Top))
            .collect(),
        other => BTreeSet::from([render_node(&other, Parent::Top)]),
    };
    filters.into_iter().collect()
}

/// Renders a node without its own surrounding parentheses.
fn render_node(expr: &QueryExpr, parent: Parent) -> String {
    match expr {
        QueryExpr::Empty => String::new(),
        QueryExpr::Clause(clause) => clause.render(),
        QueryExpr::And(children) => render_and(children),
        QueryExpr::Or(children) => children
            .iter()
            .map(|child| wrap(child, Parent::Or))
            .collect::<Vec<_>>()
            .join(" OR "),
        QueryExpr::Not(inner) => {
            let body = wrap(inner, Parent::Not);
            match parent {
                Parent::Top | Parent::And => format!("NOT {body}"),
                Parent::Or | Parent::Not | Parent::Boost => {
                    format!("{MATCH_ALL} AND NOT {body}")
                }
            }
        }
        QueryExpr::Boost { expr, factor } => format!("{}^{factor}", wrap(expr, Parent::Boost)),
    }
}

/// Renders conjunction children: grouped clauses first, compound children after.
fn render_and(children: &[QueryExpr]) -> String {
    let mut groups: [BTreeSet<String>; 3] = Default::default();
    let mut compound = Vec::new();

    for child in children {
        match child {
            QueryExpr::Clause(clause) => {
                groups[usize::from(clause.group())].insert(clause.render());
            }
            QueryExpr::Empty => {}
            other => compound.push(wrap(other, Parent::And)),
        }
    }

    groups
        .into_iter()
        .flatten()
        .chain(compound)
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Renders a child, parenthesizing it when its parent requires.
fn wrap(child: &QueryExpr, parent: Parent) -> String {
    let text = render_node(child, parent);
    if needs_parens(child, parent) {
        format!("({text})")
    } else {
        text
    }
}

/// Returns true if `child` must be parenthesized beneath `parent`.
fn needs_parens(child: &QueryExpr, parent: Parent) -> bool {
    match child {
        QueryExpr::Empty | QueryExpr::Clause(_) => false,
        QueryExpr::And(_) => !matches!(parent, Parent::Top | Parent::And),
        QueryExpr::Or(_) => !matches!(parent, Parent::Top | Parent::Or),
        QueryExpr::Not(_) => !matches!(parent, Parent::Top | Parent::And),
        QueryExpr::Boost { .. } => parent == Parent::Boost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clause::{Clause, ClauseStyle, Modifier};

    fn term(s: &str) -> QueryExpr {
        QueryExpr::Clause(Clause::positional(s, ClauseStyle::Auto))
    }

    fn phrase(s: &str) -> QueryExpr {
        QueryExpr::Clause(Clause::positional(s, ClauseStyle::Phrase))
    }

    fn field(name: &str, value: i64) -> QueryExpr {
        let mut clauses =
            Clause::build(name, Modifier::Eq, value.into(), ClauseStyle::Auto).unwrap();
        QueryExpr::Clause(clauses.remove(0))
    }

    fn boost(e: QueryExpr, factor: f64) -> QueryExpr {
        QueryExpr::boost(e, factor).unwrap()
    }

    #[test]
    fn single_clause() {
        assert_eq!(render(&field("int_field", 3)), "int_field:3");
    }

    #[test]
    fn empty_renders_nothing() {
        assert_eq!(render(&QueryExpr::Empty), "");
        assert!(render_filters(&QueryExpr::Empty).is_empty());
    }

    #[test]
    fn top_level_not_is_bare() {
        assert_eq!(render(&!term("hello world")), "NOT hello\\ world");
    }

    #[test]
    fn not_in_and_is_bare() {
        assert_eq!(
            render(&(!term("hello world") & !field("int_field", 3))),
            "NOT hello\\ world AND NOT int_field:3"
        );
    }

    #[test]
    fn not_in_or_is_anchored() {
        assert_eq!(render(&(term("abc") | !term("def"))), "abc OR (*:* AND NOT def)");
    }

    #[test]
    fn not_over_compound_is_parenthesized() {
        let expr = term("blah") & !(term("abc") | term("def") | term("ghi"));
        assert_eq!(render(&expr), "blah AND NOT (abc OR def OR ghi)");

        let expr = !(term("a") & term("b"));
        assert_eq!(render(&expr), "NOT (a AND b)");
    }

    #[test]
    fn clauses_sort_before_compound_children() {
        let expr = QueryExpr::And(vec![
            !field("int_field", 3),
            term("def"),
            term("abc"),
        ]);
        assert_eq!(render(&expr), "abc AND def AND NOT int_field:3");
    }

    #[test]
    fn terms_precede_phrases() {
        let expr = phrase("hello") & field("int_field", 3);
        assert_eq!(render(&expr), "int_field:3 AND hello");
    }

    #[test]
    fn duplicate_clauses_collapse() {
        let expr = term("a") & term("b") & term("a");
        assert_eq!(render(&expr), "a AND b");
    }

    #[test]
    fn or_keeps_insertion_order() {
        let expr = term("xyz") | term("def");
        assert_eq!(render(&expr), "xyz OR def");
    }

    #[test]
    fn boosts() {
        assert_eq!(render(&(term("blah") & boost(term("def"), 1.5))), "blah AND def^1.5");
        assert_eq!(
            render(&(term("blah") & boost(term("def") | term("ghi"), 1.5))),
            "blah AND (def OR ghi)^1.5"
        );
        assert_eq!(render(&boost(term("a"), 2.0)), "a^2");
    }

    #[test]
    fn nested_boost_is_parenthesized() {
        assert_eq!(render(&boost(boost(term("a"), 1.5), 2.0)), "(a^1.5)^2");
    }

    #[test]
    fn boosted_negation_is_anchored() {
        assert_eq!(render(&boost(!term("a"), 2.0)), "(*:* AND NOT a)^2");
    }

    #[test]
    fn deep_mixture() {
        let inner = term("def") & (!term("pqr") | term("mno"));
        let expr = term("blah") & boost(inner, 1.5);
        assert_eq!(
            render(&expr),
            "blah AND (def AND ((*:* AND NOT pqr) OR mno))^1.5"
        );
    }

    #[test]
    fn filters_explode_conjunctions() {
        let expr = term("hello") & field("int_field", 3);
        assert_eq!(render_filters(&expr), ["hello", "int_field:3"]);
    }

    #[test]
    fn filters_sort_and_keep_disjunctions_whole() {
        let expr = (term("text") | term("other")) & field("a", 1);
        assert_eq!(render_filters(&expr), ["a:1", "text OR other"]);
    }

    #[test]
    fn empty_text_filter_is_never_blank() {
        let expr = term("") & field("int_field", 3);
        assert_eq!(render_filters(&expr), ["\"\"", "int_field:3"]);
    }

    #[test]
    fn filter_negation_is_bare() {
        assert_eq!(render_filters(&!term("x")), ["NOT x"]);
    }
}
