//! Search request assembly for Solr-style search servers.
//!
//! Builds the flat parameter list of a select (or MoreLikeThis) request from
//! structured pieces:
//!
//! - **Queries and filters**: [`scour_query`] expressions, rendered into `q` and
//!   one `fq` per top-level filter conjunct
//! - **Relevancy boosts**: `primary OR (primary AND boosts)`, which reorders
//!   matches without changing them
//! - **Feature options**: faceting, grouping, highlighting, MoreLikeThis, sort,
//!   pagination, field lists and alternate parsers, each validated against a
//!   static schema
//!
//! Configuration comes as `serde_json` objects. Rejected updates return
//! [`SearchError::InvalidOption`] and leave the request untouched.
//!
//! # Example
//!
//! ```
//! use scour_query::{Modifier, Q};
//! use scour_search::SearchRequest;
//! use serde_json::json;
//!
//! let params = SearchRequest::new()
//!     .query(Q::new().value("game"))
//!     .unwrap()
//!     .facet_query(Q::new().field_op("price", Modifier::Lt, 7))
//!     .unwrap()
//!     .group_by("major_value", &json!({"limit": 10}))
//!     .unwrap()
//!     .params();
//!
//! assert!(params.contains(&("facet.query".to_string(), "price:{* TO 7}".to_string())));
//! assert!(params.contains(&("group.ngroups".to_string(), "true".to_string())));
//! ```

#![warn(missing_docs)]

mod error;
mod options;
mod params;
mod request;

pub use error::SearchError;
pub use options::{
    AltParser, Dismax, DismaxOptions, Edismax, EdismaxOptions, Facet, FacetOptions, Feature,
    FieldLimit, FieldLimitOptions, Group, GroupOptions, Highlight, HighlightOptions, MltHandler,
    MltHandlerOptions, MoreLikeThis, MoreLikeThisOptions, OptionKind, OptionSpec, OptionState,
    OptionValue, Options, Paginate, PaginateOptions, ParserOptions, Sort, SortOptions,
};
pub use params::{ParamValue, Params, params_from_pairs};
pub use request::SearchRequest;
