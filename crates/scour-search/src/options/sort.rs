//! Result ordering.

use super::{Feature, OptionSpec, OptionState, OptionValue};
use crate::{error::SearchError, params::Params};

/// Sort order, one field per update; a leading `-` sorts descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort;

impl Feature for Sort {
    const NAME: &'static str = "sort";
    const SCHEMA: &'static [OptionSpec] = &[OptionSpec::accumulating("field")];

    fn check(state: &OptionState) -> Result<(), SearchError> {
        let fields = state.get("field").map_or(&[][..], OptionValue::as_fields);
        if fields.iter().any(|f| f.strip_prefix('-').unwrap_or(f).is_empty()) {
            return Err(SearchError::invalid_option(
                Self::NAME,
                "field",
                "sort field names must not be empty",
            ));
        }
        Ok(())
    }

    fn render(state: &OptionState) -> Params {
        let fields = state.get("field").map_or(&[][..], OptionValue::as_fields);
        if fields.is_empty() {
            return Vec::new();
        }
        let order = fields
            .iter()
            .map(|field| match field.strip_prefix('-') {
                Some(name) => format!("{name} desc"),
                None => format!("{field} asc"),
            })
            .collect::<Vec<_>>()
            .join(",");
        vec![("sort".to_string(), order.into())]
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{SortOptions, params_from_pairs};

    #[test]
    fn updates_accumulate_in_order() {
        let mut sort = SortOptions::default();
        sort.update(&json!({"field": "int_field"})).unwrap();
        sort.update(&json!({"field": "-text_field"})).unwrap();
        assert_eq!(
            params_from_pairs(sort.params()),
            [("sort".to_string(), "int_field asc,text_field desc".to_string())]
        );
    }

    #[test]
    fn nothing_set_renders_nothing() {
        assert!(SortOptions::default().params().is_empty());
    }

    #[test]
    fn bare_dash_is_rejected() {
        let mut sort = SortOptions::default();
        sort.update(&json!({"field": "a"})).unwrap();
        assert!(sort.update(&json!({"field": "-"})).is_err());
        assert_eq!(
            params_from_pairs(sort.params()),
            [("sort".to_string(), "a asc".to_string())]
        );
    }
}
