//! Alternate query parsers.

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{DismaxOptions, EdismaxOptions, Feature, OptionKind, OptionSpec, OptionState};
use crate::{
    error::SearchError,
    params::{ParamValue, Params},
};

/// Parser options shared by both DisMax variants, plus any extra entries.
macro_rules! dismax_schema {
    ($($extra:expr),* $(,)?) => {
        &[
            OptionSpec::global("qf", OptionKind::Weights),
            OptionSpec::global("pf", OptionKind::Weights),
            OptionSpec::global("mm", OptionKind::Text),
            OptionSpec::global("ps", OptionKind::Int { min: Some(0) }),
            OptionSpec::global("qs", OptionKind::Int { min: Some(0) }),
            OptionSpec::global("tie", OptionKind::Float),
            OptionSpec::global("bq", OptionKind::Text),
            OptionSpec::global("bf", OptionKind::Text),
            $($extra,)*
        ]
    };
}

/// The DisMax parser (`defType=dismax`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dismax;

impl Feature for Dismax {
    const NAME: &'static str = "dismax";
    const SCHEMA: &'static [OptionSpec] = dismax_schema![];

    fn render(state: &OptionState) -> Params {
        render_parser(Self::NAME, state)
    }
}

/// The extended DisMax parser (`defType=edismax`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Edismax;

impl Feature for Edismax {
    const NAME: &'static str = "edismax";
    const SCHEMA: &'static [OptionSpec] = dismax_schema![
        OptionSpec::global("pf2", OptionKind::Weights),
        OptionSpec::global("pf3", OptionKind::Weights),
        OptionSpec::global("ps2", OptionKind::Int { min: Some(0) }),
        OptionSpec::global("ps3", OptionKind::Int { min: Some(0) }),
        OptionSpec::global("uf", OptionKind::Text),
        OptionSpec::global("lowercaseOperators", OptionKind::Bool),
    ];

    fn render(state: &OptionState) -> Params {
        render_parser(Self::NAME, state)
    }
}

/// `defType` plus each option under its bare name.
fn render_parser(name: &str, state: &OptionState) -> Params {
    let mut params = vec![("defType".to_string(), ParamValue::from(name))];
    params.extend(
        state
            .global()
            .map(|(key, value)| (key.to_string(), value.to_param())),
    );
    params
}

/// A supported alternate query parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltParser {
    /// `dismax`.
    Dismax,
    /// `edismax`.
    Edismax,
}

impl FromStr for AltParser {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dismax" => Ok(Self::Dismax),
            "edismax" => Ok(Self::Edismax),
            other => Err(SearchError::invalid_option(
                "defType",
                other,
                "unsupported query parser (expected dismax or edismax)",
            )),
        }
    }
}

/// Options for whichever alternate parser is selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParserOptions {
    /// DisMax options.
    Dismax(DismaxOptions),
    /// Extended DisMax options.
    Edismax(EdismaxOptions),
}

impl ParserOptions {
    /// Empty options for `parser`.
    pub fn new(parser: AltParser) -> Self {
        match parser {
            AltParser::Dismax => Self::Dismax(DismaxOptions::default()),
            AltParser::Edismax => Self::Edismax(EdismaxOptions::default()),
        }
    }

    /// The selected parser.
    pub fn parser(&self) -> AltParser {
        match self {
            Self::Dismax(_) => AltParser::Dismax,
            Self::Edismax(_) => AltParser::Edismax,
        }
    }

    /// Applies a JSON object of options to the selected parser.
    pub fn update(&mut self, config: &JsonValue) -> Result<(), SearchError> {
        match self {
            Self::Dismax(options) => options.update(config),
            Self::Edismax(options) => options.update(config),
        }
    }

    /// Renders `defType` and the parser options.
    pub fn params(&self) -> Params {
        match self {
            Self::Dismax(options) => options.params(),
            Self::Edismax(options) => options.params(),
        }
    }
}
