//! Error types for search request assembly.

use scour_query::QueryError;
use thiserror::Error;

/// Errors that can occur while configuring or assembling a search request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// An option update was rejected; nothing from that update was applied.
    #[error("invalid {feature} option '{key}': {reason}")]
    InvalidOption {
        /// Feature namespace the option belongs to (e.g. `facet`).
        feature: String,
        /// The offending option key.
        key: String,
        /// Why the option was rejected.
        reason: String,
    },

    /// A query expression could not be built.
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl SearchError {
    /// Creates an `InvalidOption` error.
    pub(crate) fn invalid_option(
        feature: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            feature: feature.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}
