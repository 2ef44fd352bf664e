//! Returned-field list.

use super::{Feature, OptionKind, OptionSpec, OptionState, OptionValue, join_fields};
use crate::params::Params;

/// The `fl` parameter: named fields, all fields (`*`), and the relevancy score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldLimit;

impl Feature for FieldLimit {
    const NAME: &'static str = "fl";
    const SCHEMA: &'static [OptionSpec] = &[
        OptionSpec::global("fields", OptionKind::Fields),
        OptionSpec::global("all_fields", OptionKind::Bool),
        OptionSpec::global("score", OptionKind::Bool),
    ];

    fn render(state: &OptionState) -> Params {
        let flag = |key| state.get(key).and_then(OptionValue::as_bool) == Some(true);
        let fields = state.get("fields").map_or(&[][..], OptionValue::as_fields);

        let mut parts = Vec::new();
        if flag("all_fields") {
            parts.push("*".to_string());
        } else if !fields.is_empty() {
            parts.push(join_fields(fields));
        }
        if flag("score") {
            parts.push("score".to_string());
        }

        if parts.is_empty() {
            Vec::new()
        } else {
            vec![("fl".to_string(), parts.join(",").into())]
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{FieldLimitOptions, params_from_pairs};

    fn fl(config: &serde_json::Value) -> Vec<(String, String)> {
        let mut options = FieldLimitOptions::default();
        options.update(config).unwrap();
        params_from_pairs(options.params())
    }

    fn expected(value: &str) -> Vec<(String, String)> {
        vec![("fl".to_string(), value.to_string())]
    }

    #[test]
    fn empty_renders_nothing() {
        assert!(fl(&json!({})).is_empty());
    }

    #[test]
    fn fields_and_score() {
        assert_eq!(fl(&json!({"fields": "int_field"})), expected("int_field"));
        assert_eq!(
            fl(&json!({"fields": ["text_field", "int_field"]})),
            expected("int_field,text_field")
        );
        assert_eq!(fl(&json!({"score": true})), expected("score"));
        assert_eq!(
            fl(&json!({"fields": "int_field", "score": true})),
            expected("int_field,score")
        );
    }

    #[test]
    fn all_fields_wins_over_names() {
        assert_eq!(fl(&json!({"all_fields": true})), expected("*"));
        assert_eq!(
            fl(&json!({"all_fields": true, "score": true})),
            expected("*,score")
        );
        assert_eq!(
            fl(&json!({"all_fields": true, "fields": "int_field"})),
            expected("*")
        );
    }
}
