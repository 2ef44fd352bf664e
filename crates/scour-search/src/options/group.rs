//! Result grouping.

use super::{Feature, OptionKind, OptionSpec, OptionState, render_namespaced};
use crate::{
    error::SearchError,
    params::{ParamValue, Params},
};

/// Grouping of results by a field value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Group;

impl Feature for Group {
    const NAME: &'static str = "group";
    const SCHEMA: &'static [OptionSpec] = &[
        OptionSpec::global("field", OptionKind::Text),
        OptionSpec::global("limit", OptionKind::Int { min: None }),
        OptionSpec::global("offset", OptionKind::Int { min: Some(0) }),
        OptionSpec::global("sort", OptionKind::Text),
        OptionSpec::global("format", OptionKind::Choice(&["grouped", "simple"])),
        OptionSpec::global("main", OptionKind::Bool),
        OptionSpec::global("ngroups", OptionKind::Bool),
        OptionSpec::global("truncate", OptionKind::Bool),
        OptionSpec::global("facet", OptionKind::Bool),
        OptionSpec::global("cache.percent", OptionKind::Int { min: Some(0) }),
    ];

    fn check(state: &OptionState) -> Result<(), SearchError> {
        if state.get("field").is_none() {
            return Err(SearchError::invalid_option(
                Self::NAME,
                "field",
                "a group field is required",
            ));
        }
        Ok(())
    }

    fn render(state: &OptionState) -> Params {
        let mut params = vec![("group".to_string(), ParamValue::Bool(true))];
        params.extend(render_namespaced(Self::NAME, state, &[]));
        params
    }
}
