//! Request parameter values and their flat string encoding.

use scour_query::format_float;
use serde::Serialize;

/// A parameter value before stringification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Encoded as `true` / `false`.
    Bool(bool),
    /// Encoded in decimal.
    Int(i64),
    /// Encoded with a decimal point.
    Float(f64),
    /// Passed through as is.
    Text(String),
    /// Encoded as one pair per element.
    List(Vec<String>),
}

impl ParamValue {
    /// Stringifies the value; lists yield one string per element.
    fn into_strings(self) -> Vec<String> {
        match self {
            Self::Bool(b) => vec![b.to_string()],
            Self::Int(n) => vec![n.to_string()],
            Self::Float(x) => vec![format_float(x)],
            Self::Text(text) => vec![text],
            Self::List(items) => items,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Parameter pairs produced by one feature, before encoding.
pub type Params = Vec<(String, ParamValue)>;

/// Flattens parameter pairs into sorted `(name, value)` strings.
///
/// Lists become repeated pairs with the same name. The output is sorted by name
/// then value, and identical pairs are emitted once.
///
/// ```
/// use scour_search::{ParamValue, params_from_pairs};
///
/// let params = params_from_pairs([
///     ("rows", ParamValue::Int(3)),
///     ("facet", ParamValue::Bool(true)),
/// ]);
/// assert_eq!(params, [("facet".into(), "true".into()), ("rows".into(), "3".into())]);
/// ```
pub fn params_from_pairs<I, K>(pairs: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, ParamValue)>,
    K: Into<String>,
{
    let mut out: Vec<(String, String)> = pairs
        .into_iter()
        .flat_map(|(name, value)| {
            let name = name.into();
            value
                .into_strings()
                .into_iter()
                .map(move |v| (name.clone(), v))
        })
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn scalars_are_stringified() {
        let params = params_from_pairs([
            ("int", ParamValue::Int(3)),
            ("string", ParamValue::from("string")),
            ("unicode", ParamValue::from("\u{2602}nicode")),
        ]);
        assert_eq!(
            params,
            pairs(&[("int", "3"), ("string", "string"), ("unicode", "\u{2602}nicode")])
        );
    }

    #[test]
    fn booleans_are_lowercase() {
        let params =
            params_from_pairs([("true", ParamValue::Bool(true)), ("false", ParamValue::Bool(false))]);
        assert_eq!(params, pairs(&[("false", "false"), ("true", "true")]));
    }

    #[test]
    fn lists_repeat_the_name() {
        let params = params_from_pairs([(
            "list",
            ParamValue::List(vec!["first".into(), "second".into(), "third".into()]),
        )]);
        assert_eq!(
            params,
            pairs(&[("list", "first"), ("list", "second"), ("list", "third")])
        );
    }

    #[test]
    fn floats_keep_decimal_point() {
        let params = params_from_pairs([("x", ParamValue::Float(3.0))]);
        assert_eq!(params, pairs(&[("x", "3.0")]));
    }

    #[test]
    fn identical_pairs_collapse() {
        let params =
            params_from_pairs([("facet", ParamValue::Bool(true)), ("facet", ParamValue::Bool(true))]);
        assert_eq!(params, pairs(&[("facet", "true")]));
    }

    #[test]
    fn same_name_orders_by_value_not_insertion() {
        let params = params_from_pairs([
            ("facet.query", ParamValue::from("price:{* TO 7}")),
            ("facet.query", ParamValue::from("int_field:3")),
        ]);
        assert_eq!(
            params,
            pairs(&[("facet.query", "int_field:3"), ("facet.query", "price:{* TO 7}")])
        );
    }
}
