//! Field faceting.

use super::{Feature, OptionKind, OptionSpec, OptionState, render_namespaced};
use crate::params::{ParamValue, Params};

/// Faceting on field values.
///
/// `facet.field` repeats once per field. Options given together with `fields`
/// apply to those fields only (`f.<field>.facet.<key>`); options given alone
/// apply to every faceted field (`facet.<key>`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Facet;

impl Feature for Facet {
    const NAME: &'static str = "facet";
    const FIELD_SCOPED: bool = true;
    const SCHEMA: &'static [OptionSpec] = &[
        OptionSpec::global("fields", OptionKind::Fields),
        OptionSpec::per_field("prefix", OptionKind::Text),
        OptionSpec::per_field("sort", OptionKind::BoolOrChoice(&["count", "index"])),
        OptionSpec::per_field("limit", OptionKind::Int { min: None }),
        OptionSpec::per_field("offset", OptionKind::Int { min: Some(0) }),
        OptionSpec::per_field("mincount", OptionKind::Int { min: Some(0) }),
        OptionSpec::per_field("missing", OptionKind::Bool),
        OptionSpec::per_field("method", OptionKind::Choice(&["enum", "fc", "fcs"])),
        OptionSpec::per_field("enum.cache.minDf", OptionKind::Int { min: Some(0) }),
    ];

    fn render(state: &OptionState) -> Params {
        let mut params = vec![("facet".to_string(), ParamValue::Bool(true))];
        if !state.fields().is_empty() {
            params.push((
                "facet.field".to_string(),
                ParamValue::List(state.fields().iter().cloned().collect()),
            ));
        }
        params.extend(render_namespaced(Self::NAME, state, &[]));
        params
    }
}
