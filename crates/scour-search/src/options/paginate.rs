//! Result window.

use super::{Feature, OptionKind, OptionSpec, OptionState};
use crate::params::Params;

/// Pagination: `start` offset and `rows` count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paginate;

impl Feature for Paginate {
    const NAME: &'static str = "paginate";
    const SCHEMA: &'static [OptionSpec] = &[
        OptionSpec::global("start", OptionKind::Int { min: Some(0) }),
        OptionSpec::global("rows", OptionKind::Int { min: Some(0) }),
    ];

    fn render(state: &OptionState) -> Params {
        state
            .global()
            .map(|(key, value)| (key.to_string(), value.to_param()))
            .collect()
    }
}
