//! Validated option sets for search features.
//!
//! Each feature (faceting, highlighting, grouping and so on) declares a static
//! schema of the options it accepts. [`Options`] holds the values set so far and
//! applies updates from JSON objects atomically: either every key of an update
//! validates and is applied, or the update is rejected and nothing changes.
//!
//! Features scoped by field (faceting, highlighting) treat a `fields` key as the
//! scope of the other keys in the same update:
//!
//! ```
//! use scour_search::FacetOptions;
//! use serde_json::json;
//!
//! let mut facet = FacetOptions::default();
//! facet.update(&json!({"fields": "int_field", "prefix": "abc"})).unwrap();
//! facet.update(&json!({"limit": 3})).unwrap();
//!
//! let params = scour_search::params_from_pairs(facet.params());
//! assert_eq!(
//!     params,
//!     [
//!         ("f.int_field.facet.prefix".to_string(), "abc".to_string()),
//!         ("facet".to_string(), "true".to_string()),
//!         ("facet.field".to_string(), "int_field".to_string()),
//!         ("facet.limit".to_string(), "3".to_string()),
//!     ]
//! );
//! ```

mod facet;
mod field_limit;
mod group;
mod highlight;
mod mlt;
mod paginate;
mod parser;
mod sort;

use std::{
    collections::{BTreeMap, BTreeSet},
    marker::PhantomData,
};

pub use facet::Facet;
pub use field_limit::FieldLimit;
pub use group::Group;
pub use highlight::Highlight;
pub use mlt::{MltHandler, MoreLikeThis};
pub use paginate::Paginate;
pub use parser::{AltParser, Dismax, Edismax, ParserOptions};
use scour_query::{BoolLiteral, format_float};
use serde::Serialize;
use serde_json::Value as JsonValue;
pub use sort::Sort;
use tracing::debug;

use crate::{
    error::SearchError,
    params::{ParamValue, Params},
};

/// Pagination options (`start`, `rows`).
pub type PaginateOptions = Options<Paginate>;
/// Sort order (`sort`).
pub type SortOptions = Options<Sort>;
/// Returned-field list (`fl`).
pub type FieldLimitOptions = Options<FieldLimit>;
/// Faceting options (`facet.*`).
pub type FacetOptions = Options<Facet>;
/// Result grouping options (`group.*`).
pub type GroupOptions = Options<Group>;
/// Highlighting options (`hl.*`).
pub type HighlightOptions = Options<Highlight>;
/// In-query MoreLikeThis component options (`mlt.*`).
pub type MoreLikeThisOptions = Options<MoreLikeThis>;
/// Dedicated MoreLikeThis handler options (`mlt.*`, no `mlt` flag).
pub type MltHandlerOptions = Options<MltHandler>;
/// DisMax parser options.
pub type DismaxOptions = Options<Dismax>;
/// Extended DisMax parser options.
pub type EdismaxOptions = Options<Edismax>;

/// The accepted shape of one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// A boolean, or the strings `true` / `false`.
    Bool,
    /// An integer, or a string holding one.
    Int {
        /// Inclusive lower bound, if any.
        min: Option<i64>,
    },
    /// A number, or a string holding one.
    Float,
    /// Free text; numbers are accepted and stringified.
    Text,
    /// One of a closed set of strings.
    Choice(&'static [&'static str]),
    /// A boolean, or one of a closed set of strings.
    BoolOrChoice(&'static [&'static str]),
    /// A field name or a list of field names.
    Fields,
    /// An object mapping field names to numeric weights.
    Weights,
}

impl OptionKind {
    /// Validates and coerces a JSON value into an option value.
    fn parse(self, value: &JsonValue) -> Result<OptionValue, String> {
        match self {
            Self::Bool => parse_bool(value).map(OptionValue::Bool),
            Self::Int { min } => {
                let n = parse_int(value)?;
                match min {
                    Some(min) if n < min => Err(format!("must be at least {min}, got {n}")),
                    _ => Ok(OptionValue::Int(n)),
                }
            }
            Self::Float => parse_float(value).map(OptionValue::Float),
            Self::Text => match value {
                JsonValue::String(s) => Ok(OptionValue::Text(s.clone())),
                JsonValue::Number(n) => Ok(OptionValue::Text(n.to_string())),
                other => Err(format!("expected text, got {}", json_kind(other))),
            },
            Self::Choice(choices) => parse_choice(value, choices).map(OptionValue::Text),
            Self::BoolOrChoice(choices) => match parse_bool(value) {
                Ok(b) => Ok(OptionValue::Bool(b)),
                Err(_) => parse_choice(value, choices)
                    .map(OptionValue::Text)
                    .map_err(|_| {
                        format!("expected a boolean or one of {}", choices.join(", "))
                    }),
            },
            Self::Fields => parse_fields(value).map(OptionValue::Fields),
            Self::Weights => parse_weights(value).map(OptionValue::Weights),
        }
    }
}

/// Schema entry for one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Option name, as given in configuration and used in parameter names.
    pub key: &'static str,
    /// Accepted shape.
    pub kind: OptionKind,
    /// Whether the option can be scoped to fields.
    pub per_field: bool,
    /// Whether updates append to the previous list instead of replacing it.
    pub accumulate: bool,
}

impl OptionSpec {
    /// An option that always applies to the whole feature.
    pub const fn global(key: &'static str, kind: OptionKind) -> Self {
        Self {
            key,
            kind,
            per_field: false,
            accumulate: false,
        }
    }

    /// An option that can be scoped to the fields named in the same update.
    pub const fn per_field(key: &'static str, kind: OptionKind) -> Self {
        Self {
            key,
            kind,
            per_field: true,
            accumulate: false,
        }
    }

    /// A field list that grows with every update.
    pub const fn accumulating(key: &'static str) -> Self {
        Self {
            key,
            kind: OptionKind::Fields,
            per_field: false,
            accumulate: true,
        }
    }
}

/// A validated option value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Text, including choice values.
    Text(String),
    /// Field names, in the order given.
    Fields(Vec<String>),
    /// Field weights.
    Weights(BTreeMap<String, f64>),
}

impl OptionValue {
    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the field list, or an empty slice for other kinds.
    pub fn as_fields(&self) -> &[String] {
        match self {
            Self::Fields(fields) => fields,
            _ => &[],
        }
    }

    /// Converts the value into a parameter value.
    ///
    /// Field lists join sorted and comma separated; weights render as
    /// space-separated `field^weight` pairs.
    pub fn to_param(&self) -> ParamValue {
        match self {
            Self::Bool(b) => ParamValue::Bool(*b),
            Self::Int(n) => ParamValue::Int(*n),
            Self::Float(x) => ParamValue::Float(*x),
            Self::Text(text) => ParamValue::Text(text.clone()),
            Self::Fields(fields) => ParamValue::Text(join_fields(fields)),
            Self::Weights(weights) => ParamValue::Text(format_weights(weights)),
        }
    }
}

/// The values held by an option set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptionState {
    /// Options applying to the whole feature.
    global: BTreeMap<&'static str, OptionValue>,
    /// Fields of a field-scoped feature.
    fields: BTreeSet<String>,
    /// Per-field overrides of a field-scoped feature.
    per_field: BTreeMap<String, BTreeMap<&'static str, OptionValue>>,
}

impl OptionState {
    /// Returns a global option value.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.global.get(key)
    }

    /// Iterates over global options in key order.
    pub fn global(&self) -> impl Iterator<Item = (&'static str, &OptionValue)> {
        self.global.iter().map(|(key, value)| (*key, value))
    }

    /// Fields of a field-scoped feature, sorted.
    pub fn fields(&self) -> &BTreeSet<String> {
        &self.fields
    }

    /// Iterates over per-field overrides as `(field, key, value)`.
    pub fn field_options(&self) -> impl Iterator<Item = (&str, &'static str, &OptionValue)> {
        self.per_field.iter().flat_map(|(field, options)| {
            options
                .iter()
                .map(move |(key, value)| (field.as_str(), *key, value))
        })
    }

    /// Returns true if nothing has been set.
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.fields.is_empty() && self.per_field.is_empty()
    }
}

/// A search feature with a schema of options and a parameter rendering.
pub trait Feature {
    /// Namespace used in parameter names and error messages.
    const NAME: &'static str;
    /// Options this feature accepts.
    const SCHEMA: &'static [OptionSpec];
    /// Whether a `fields` key scopes the per-field options of its update.
    const FIELD_SCOPED: bool = false;

    /// Looks up the schema entry for `key`.
    fn spec(key: &str) -> Option<&'static OptionSpec> {
        Self::SCHEMA.iter().find(|spec| spec.key == key)
    }

    /// Checks constraints spanning several options, after an update is merged.
    fn check(_state: &OptionState) -> Result<(), SearchError> {
        Ok(())
    }

    /// Renders request parameters for the current values.
    fn render(state: &OptionState) -> Params;
}

/// A validated option set for feature `F`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent, bound = "")]
pub struct Options<F> {
    /// Current values.
    state: OptionState,
    /// Feature marker.
    #[serde(skip)]
    feature: PhantomData<F>,
}

impl<F: Feature> Options<F> {
    /// Applies a JSON object of options.
    ///
    /// A `null` value unsets the option. Unknown keys, values of the wrong kind
    /// and values out of range reject the whole update.
    pub fn update(&mut self, config: &JsonValue) -> Result<(), SearchError> {
        let next = self.merged(config).inspect_err(|err| {
            debug!(feature = F::NAME, error = %err, "rejected option update");
        })?;
        self.state = next;
        Ok(())
    }

    /// Renders the request parameters for this option set.
    pub fn params(&self) -> Params {
        F::render(&self.state)
    }

    /// Returns a global option value.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.state.get(key)
    }

    /// Returns the current values.
    pub fn state(&self) -> &OptionState {
        &self.state
    }

    /// Builds the state that results from applying `config`.
    fn merged(&self, config: &JsonValue) -> Result<OptionState, SearchError> {
        let JsonValue::Object(map) = config else {
            return Err(SearchError::invalid_option(
                F::NAME,
                "config",
                format!("expected a JSON object, got {}", json_kind(config)),
            ));
        };

        let mut state = self.state.clone();
        let mut scope = Vec::new();

        if F::FIELD_SCOPED {
            match map.get("fields") {
                Some(JsonValue::Null) => state.fields.clear(),
                Some(raw) => {
                    scope = parse_fields(raw)
                        .map_err(|reason| SearchError::invalid_option(F::NAME, "fields", reason))?;
                    state.fields.extend(scope.iter().cloned());
                }
                None => {}
            }
        }

        for (key, raw) in map {
            let spec = F::spec(key)
                .ok_or_else(|| SearchError::invalid_option(F::NAME, key, "unknown option"))?;
            if F::FIELD_SCOPED && spec.key == "fields" {
                continue;
            }

            let scoped = spec.per_field && !scope.is_empty();
            if raw.is_null() {
                if scoped {
                    for field in &scope {
                        if let Some(options) = state.per_field.get_mut(field) {
                            options.remove(spec.key);
                        }
                    }
                } else {
                    state.global.remove(spec.key);
                }
                continue;
            }

            let value = spec
                .kind
                .parse(raw)
                .map_err(|reason| SearchError::invalid_option(F::NAME, key, reason))?;
            if scoped {
                for field in &scope {
                    assign(
                        state.per_field.entry(field.clone()).or_default(),
                        spec,
                        value.clone(),
                    );
                }
            } else {
                assign(&mut state.global, spec, value);
            }
        }

        state.per_field.retain(|_, options| !options.is_empty());
        F::check(&state)?;
        Ok(state)
    }
}

/// Stores `value` under `spec.key`, appending to an accumulating list.
fn assign(scope: &mut BTreeMap<&'static str, OptionValue>, spec: &OptionSpec, value: OptionValue) {
    if spec.accumulate {
        if let (Some(OptionValue::Fields(existing)), OptionValue::Fields(more)) =
            (scope.get_mut(spec.key), &value)
        {
            existing.extend(more.iter().cloned());
            return;
        }
    }
    scope.insert(spec.key, value);
}

/// Renders global and per-field options under a namespace.
///
/// Global options become `{ns}.{key}`, per-field ones `f.{field}.{ns}.{key}`.
/// Keys listed in `skip` are left to the caller.
pub(crate) fn render_namespaced(ns: &str, state: &OptionState, skip: &[&str]) -> Params {
    let global = state
        .global()
        .filter(|(key, _)| !skip.contains(key))
        .map(|(key, value)| (format!("{ns}.{key}"), value.to_param()));
    let per_field = state
        .field_options()
        .map(|(field, key, value)| (format!("f.{field}.{ns}.{key}"), value.to_param()));
    global.chain(per_field).collect()
}

/// Joins field names sorted, deduplicated and comma separated.
pub(crate) fn join_fields(fields: &[String]) -> String {
    fields
        .iter()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(",")
}

/// Formats weights as `field^weight` pairs in field order.
pub(crate) fn format_weights(weights: &BTreeMap<String, f64>) -> String {
    weights
        .iter()
        .map(|(field, weight)| format!("{field}^{}", format_float(*weight)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Names a JSON value's kind for error messages.
fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "an object",
    }
}

/// Accepts a boolean or a `"true"` / `"false"` string.
fn parse_bool(value: &JsonValue) -> Result<bool, String> {
    match value {
        JsonValue::Bool(b) => Ok(*b),
        JsonValue::String(s) => s
            .parse::<BoolLiteral>()
            .map(|literal| literal.0)
            .map_err(|_| format!("expected a boolean, got {s:?}")),
        other => Err(format!("expected a boolean, got {}", json_kind(other))),
    }
}

/// Accepts an integer or a string holding one.
fn parse_int(value: &JsonValue) -> Result<i64, String> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("expected an integer, got {n}")),
        JsonValue::String(s) => s
            .trim()
            .parse()
            .map_err(|_| format!("expected an integer, got {s:?}")),
        other => Err(format!("expected an integer, got {}", json_kind(other))),
    }
}

/// Accepts a finite number or a string holding one.
fn parse_float(value: &JsonValue) -> Result<f64, String> {
    let parsed = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        other => return Err(format!("expected a number, got {}", json_kind(other))),
    };
    parsed
        .filter(|x: &f64| x.is_finite())
        .ok_or_else(|| format!("expected a number, got {value}"))
}

/// Accepts one of `choices`.
fn parse_choice(value: &JsonValue, choices: &[&str]) -> Result<String, String> {
    match value {
        JsonValue::String(s) if choices.contains(&s.as_str()) => Ok(s.clone()),
        _ => Err(format!("expected one of {}, got {value}", choices.join(", "))),
    }
}

/// Accepts a field name or a list of field names.
fn parse_fields(value: &JsonValue) -> Result<Vec<String>, String> {
    let fields = match value {
        JsonValue::String(s) => vec![s.clone()],
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(s) => Ok(s.clone()),
                other => Err(format!(
                    "expected field names, got {} in the list",
                    json_kind(other)
                )),
            })
            .collect::<Result<_, _>>()?,
        other => {
            return Err(format!(
                "expected a field name or a list of them, got {}",
                json_kind(other)
            ));
        }
    };
    if fields.iter().any(String::is_empty) {
        return Err("field names must not be empty".to_string());
    }
    Ok(fields)
}

/// Accepts an object of numeric weights.
fn parse_weights(value: &JsonValue) -> Result<BTreeMap<String, f64>, String> {
    let JsonValue::Object(map) = value else {
        return Err(format!(
            "expected an object of field weights, got {}",
            json_kind(value)
        ));
    };
    map.iter()
        .map(|(field, weight)| {
            parse_float(weight)
                .map(|w| (field.clone(), w))
                .map_err(|_| format!("weight for '{field}' must be a number, got {weight}"))
        })
        .collect()
}
