//! MoreLikeThis: similar-document retrieval.

use super::{Feature, OptionKind, OptionSpec, OptionState, OptionValue, render_namespaced};
use crate::{
    error::SearchError,
    params::{ParamValue, Params},
};

/// Schema shared by the in-query component and the dedicated handler, plus any
/// extra entries.
macro_rules! mlt_schema {
    ($($extra:expr),* $(,)?) => {
        &[
            OptionSpec::global("fields", OptionKind::Fields),
            OptionSpec::global("query_fields", OptionKind::Weights),
            OptionSpec::global("count", OptionKind::Int { min: Some(0) }),
            OptionSpec::global("mintf", OptionKind::Int { min: Some(0) }),
            OptionSpec::global("mindf", OptionKind::Int { min: Some(0) }),
            OptionSpec::global("maxdf", OptionKind::Int { min: Some(0) }),
            OptionSpec::global("minwl", OptionKind::Int { min: Some(0) }),
            OptionSpec::global("maxwl", OptionKind::Int { min: Some(0) }),
            OptionSpec::global("maxqt", OptionKind::Int { min: Some(0) }),
            OptionSpec::global("maxntp", OptionKind::Int { min: Some(0) }),
            OptionSpec::global("boost", OptionKind::Bool),
            $($extra,)*
        ]
    };
}

/// The MoreLikeThis component attached to a regular query (`mlt=true`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoreLikeThis;

impl Feature for MoreLikeThis {
    const NAME: &'static str = "mlt";
    const SCHEMA: &'static [OptionSpec] = mlt_schema![];

    fn check(state: &OptionState) -> Result<(), SearchError> {
        check_fields(Self::NAME, state)
    }

    fn render(state: &OptionState) -> Params {
        let mut params = vec![("mlt".to_string(), ParamValue::Bool(true))];
        params.extend(render_mlt(Self::NAME, state));
        params
    }
}

/// The dedicated MoreLikeThis handler; no `mlt` flag, plus handler-only options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MltHandler;

impl Feature for MltHandler {
    const NAME: &'static str = "mlt";
    const SCHEMA: &'static [OptionSpec] = mlt_schema![
        OptionSpec::global(
            "interestingTerms",
            OptionKind::Choice(&["list", "details", "none"]),
        ),
        OptionSpec::global("match.include", OptionKind::Bool),
        OptionSpec::global("match.offset", OptionKind::Int { min: Some(0) }),
    ];

    fn check(state: &OptionState) -> Result<(), SearchError> {
        check_fields(Self::NAME, state)
    }

    fn render(state: &OptionState) -> Params {
        render_mlt(Self::NAME, state)
    }
}

/// Requires at least one similarity field, and query fields drawn from them.
fn check_fields(feature: &str, state: &OptionState) -> Result<(), SearchError> {
    let fields = state.get("fields").map_or(&[][..], OptionValue::as_fields);
    if fields.is_empty() {
        return Err(SearchError::invalid_option(
            feature,
            "fields",
            "at least one similarity field is required",
        ));
    }

    if let Some(OptionValue::Weights(weights)) = state.get("query_fields") {
        if let Some(stray) = weights.keys().find(|f| !fields.contains(f)) {
            return Err(SearchError::invalid_option(
                feature,
                "query_fields",
                format!("'{stray}' is not one of the similarity fields"),
            ));
        }
    }
    Ok(())
}

/// Renders `mlt.fl`, `mlt.qf` and the remaining `mlt.*` options.
fn render_mlt(ns: &str, state: &OptionState) -> Params {
    let mut params = Vec::new();
    if let Some(fields) = state.get("fields") {
        params.push((format!("{ns}.fl"), fields.to_param()));
    }
    if let Some(query_fields @ OptionValue::Weights(weights)) = state.get("query_fields") {
        if !weights.is_empty() {
            params.push((format!("{ns}.qf"), query_fields.to_param()));
        }
    }
    params.extend(render_namespaced(ns, state, &["fields", "query_fields"]));
    params
}
