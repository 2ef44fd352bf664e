//! Boolean query expressions for Lucene-style search servers.
//!
//! This crate builds query strings from structured input instead of string
//! concatenation:
//!
//! - **Values**: booleans, numbers, timestamps, text and wildcard text, each with
//!   one escaping rule
//! - **Clauses**: `field:value`, positional terms and phrases, ranges such as
//!   `int_field:{3 TO *}`
//! - **Expressions**: conjunction, disjunction, negation and boosting, with
//!   flattening, empty elimination and double-negation cancellation
//! - **Rendering**: deterministic query text for the `q` role and independent
//!   filter strings for the `fq` role
//!
//! # Example
//!
//! ```
//! use scour_query::{Q, render};
//!
//! let expr = Q::new().value("hello world").build().unwrap()
//!     & !Q::new().field("int_field", 3).build().unwrap();
//! assert_eq!(render(&expr), "hello\\ world AND NOT int_field:3");
//! ```

#![warn(missing_docs)]

mod ast;
mod builder;
mod clause;
mod error;
mod normalize;
mod render;
mod value;

pub use ast::QueryExpr;
pub use builder::Q;
pub use clause::{Clause, ClauseKind, ClauseStyle, FieldKey, MATCH_ALL, Modifier, Operand, Range};
pub use error::QueryError;
pub use normalize::normalize;
pub use render::{render, render_filters};
pub use value::{BoolLiteral, Value, escape_term, escape_wildcard, format_datetime, format_float};
