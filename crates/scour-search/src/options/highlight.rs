//! Result highlighting.

use super::{Feature, OptionKind, OptionSpec, OptionState, render_namespaced};
use crate::params::{ParamValue, Params};

/// Highlighting of matched terms, optionally per field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Highlight;

impl Feature for Highlight {
    const NAME: &'static str = "hl";
    const FIELD_SCOPED: bool = true;
    const SCHEMA: &'static [OptionSpec] = &[
        OptionSpec::global("fields", OptionKind::Fields),
        OptionSpec::per_field("snippets", OptionKind::Int { min: Some(0) }),
        OptionSpec::per_field("fragsize", OptionKind::Int { min: Some(0) }),
        OptionSpec::per_field("mergeContinuous", OptionKind::Bool),
        OptionSpec::per_field("requireFieldMatch", OptionKind::Bool),
        OptionSpec::per_field("maxAnalyzedChars", OptionKind::Int { min: Some(0) }),
        OptionSpec::per_field("alternateField", OptionKind::Text),
        OptionSpec::per_field("maxAlternateFieldLength", OptionKind::Int { min: Some(0) }),
        OptionSpec::per_field("formatter", OptionKind::Choice(&["simple"])),
        OptionSpec::per_field("simple.pre", OptionKind::Text),
        OptionSpec::per_field("simple.post", OptionKind::Text),
        OptionSpec::per_field("fragmenter", OptionKind::Choice(&["gap", "regex"])),
        OptionSpec::per_field("usePhraseHighlighter", OptionKind::Bool),
        OptionSpec::per_field("highlightMultiTerm", OptionKind::Bool),
        OptionSpec::per_field("regex.slop", OptionKind::Float),
        OptionSpec::per_field("regex.pattern", OptionKind::Text),
        OptionSpec::per_field("regex.maxAnalyzedChars", OptionKind::Int { min: Some(0) }),
    ];

    fn render(state: &OptionState) -> Params {
        let mut params = vec![("hl".to_string(), ParamValue::Bool(true))];
        if !state.fields().is_empty() {
            let fields: Vec<&str> = state.fields().iter().map(String::as_str).collect();
            params.push(("hl.fl".to_string(), fields.join(",").into()));
        }
        params.extend(render_namespaced(Self::NAME, state, &[]));
        params
    }
}
