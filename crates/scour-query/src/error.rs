//! Error types for clause construction and value encoding.

use thiserror::Error;

/// Errors raised while building query clauses.
///
/// These are caller-input errors: they are reported synchronously from the
/// construction call that received the bad input, and no query text is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A field key carried a comparison suffix that is not recognised.
    #[error("unknown modifier '{suffix}' on field '{field}'")]
    InvalidModifier {
        /// Field the modifier was attached to.
        field: String,
        /// The unrecognised suffix.
        suffix: String,
    },

    /// A range operand had the wrong shape.
    #[error("invalid range for '{field}__{modifier}': {reason}")]
    InvalidRange {
        /// Field the range applies to.
        field: String,
        /// Modifier suffix the operand was supplied for.
        modifier: String,
        /// Why the operand was rejected.
        reason: String,
    },

    /// A boost factor was zero, negative or not finite.
    #[error("boost factor must be a positive finite number, got {factor}")]
    InvalidBoost {
        /// The rejected factor, as written.
        factor: String,
    },

    /// A value has no query-language encoding.
    #[error("unsupported value kind: {kind}")]
    UnsupportedValueKind {
        /// Description of the offending value.
        kind: String,
    },
}

impl QueryError {
    /// Creates an `InvalidRange` error.
    pub(crate) fn invalid_range(
        field: impl Into<String>,
        modifier: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRange {
            field: field.into(),
            modifier: modifier.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `UnsupportedValueKind` error.
    pub(crate) fn unsupported(kind: impl Into<String>) -> Self {
        Self::UnsupportedValueKind { kind: kind.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_modifier_display() {
        let err = QueryError::InvalidModifier {
            field: "int_field".into(),
            suffix: "between".into(),
        };
        assert_eq!(
            err.to_string(),
            "unknown modifier 'between' on field 'int_field'"
        );
    }

    #[test]
    fn invalid_range_display() {
        let err = QueryError::invalid_range("int_field", "range", "expected 2 bounds, got 3");
        let display = err.to_string();
        assert!(display.contains("int_field__range"));
        assert!(display.contains("expected 2 bounds"));
    }

    #[test]
    fn unsupported_display() {
        let err = QueryError::unsupported("array");
        assert_eq!(err.to_string(), "unsupported value kind: array");
    }
}
