//! Search request assembly.
//!
//! A [`SearchRequest`] accumulates queries, filters, boosts and feature options,
//! then flattens them into sorted request parameters. Every builder method takes
//! `&self` and returns a new request, so a base request can be shared and
//! extended in several directions.

use scour_query::{ClauseStyle, MATCH_ALL, Q, QueryExpr, render, render_filters};
use serde_json::{Map, Value as JsonValue, json};
use tracing::debug;

use crate::{
    error::SearchError,
    options::{
        AltParser, FacetOptions, Feature, FieldLimitOptions, GroupOptions, HighlightOptions,
        MltHandlerOptions, MoreLikeThisOptions, Options, PaginateOptions, ParserOptions,
        SortOptions,
    },
    params::{ParamValue, Params, params_from_pairs},
};

/// Which request handler the parameters target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Handler {
    /// The standard select handler.
    #[default]
    Select,
    /// The dedicated MoreLikeThis handler.
    MoreLikeThis,
}

/// An immutable search request under construction.
///
/// ```
/// use scour_query::Q;
/// use scour_search::SearchRequest;
/// use serde_json::json;
///
/// let request = SearchRequest::new()
///     .query(Q::new().value("hello world"))
///     .unwrap()
///     .filter(Q::new().field("text_field", "tow"))
///     .unwrap()
///     .highlight(&json!({"fields": "title"}))
///     .unwrap();
///
/// let params = request.params();
/// assert_eq!(params[0], ("fq".to_string(), "text_field:tow".to_string()));
/// assert_eq!(params[3], ("q".to_string(), "hello\\ world".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    /// Target handler.
    handler: Handler,
    /// Primary query expressions, conjoined.
    queries: Vec<QueryExpr>,
    /// Filter expressions, conjoined then split into `fq` parameters.
    filters: Vec<QueryExpr>,
    /// Boosted expressions used to reorder matches of the primary query.
    boosts: Vec<QueryExpr>,
    /// Facet queries, one `facet.query` each.
    facet_queries: Vec<QueryExpr>,
    /// Pagination.
    paginate: Option<PaginateOptions>,
    /// Sort order.
    sort: Option<SortOptions>,
    /// Returned fields.
    field_limit: Option<FieldLimitOptions>,
    /// Field faceting.
    facet: Option<FacetOptions>,
    /// Grouping.
    group: Option<GroupOptions>,
    /// Highlighting.
    highlight: Option<HighlightOptions>,
    /// In-query MoreLikeThis.
    mlt: Option<MoreLikeThisOptions>,
    /// MoreLikeThis handler options.
    mlt_handler: Option<MltHandlerOptions>,
    /// Alternate parser.
    parser: Option<ParserOptions>,
    /// `debugQuery=true`.
    debug: bool,
    /// `spellcheck=true`.
    spellcheck: bool,
}

impl SearchRequest {
    /// Creates an empty request for the standard handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty request for the dedicated MoreLikeThis handler.
    ///
    /// The handler never receives an injected match-all query, and
    /// [`mlt`](Self::mlt) options render without the `mlt` flag.
    pub fn mlt_handler() -> Self {
        Self {
            handler: Handler::MoreLikeThis,
            ..Self::default()
        }
    }

    /// Conjoins a clause set into the primary query.
    pub fn query(&self, q: impl Into<Q>) -> Result<Self, SearchError> {
        Ok(self.with_query(q.into().build()?))
    }

    /// Like [`query`](Self::query), with text values forced to terms.
    pub fn query_by_term(&self, q: impl Into<Q>) -> Result<Self, SearchError> {
        Ok(self.with_query(q.into().style(ClauseStyle::Term).build()?))
    }

    /// Like [`query`](Self::query), with text values forced to phrases.
    pub fn query_by_phrase(&self, q: impl Into<Q>) -> Result<Self, SearchError> {
        Ok(self.with_query(q.into().style(ClauseStyle::Phrase).build()?))
    }

    /// Conjoins the negation of a clause set into the primary query.
    pub fn exclude(&self, q: impl Into<Q>) -> Result<Self, SearchError> {
        Ok(self.with_query(QueryExpr::negate(q.into().build()?)))
    }

    /// Conjoins a clause set into the filter.
    pub fn filter(&self, q: impl Into<Q>) -> Result<Self, SearchError> {
        Ok(self.with_filter(q.into().build()?))
    }

    /// Like [`filter`](Self::filter), with text values forced to terms.
    pub fn filter_by_term(&self, q: impl Into<Q>) -> Result<Self, SearchError> {
        Ok(self.with_filter(q.into().style(ClauseStyle::Term).build()?))
    }

    /// Like [`filter`](Self::filter), with text values forced to phrases.
    pub fn filter_by_phrase(&self, q: impl Into<Q>) -> Result<Self, SearchError> {
        Ok(self.with_filter(q.into().style(ClauseStyle::Phrase).build()?))
    }

    /// Boosts documents matching `q` without changing which documents match.
    ///
    /// The final query becomes `primary OR (primary AND (boost1 OR boost2 ...))`.
    pub fn boost_relevancy(&self, factor: f64, q: impl Into<Q>) -> Result<Self, SearchError> {
        let boosted = QueryExpr::boost(q.into().build()?, factor)?;
        let mut next = self.clone();
        if !boosted.is_empty() {
            next.boosts.push(boosted);
        }
        Ok(next)
    }

    /// Adds faceting options; see [`FacetOptions`].
    pub fn facet_by(&self, config: &JsonValue) -> Result<Self, SearchError> {
        let mut next = self.clone();
        next.facet = Some(merged(self.facet.as_ref(), config)?);
        Ok(next)
    }

    /// Adds a `facet.query` and activates faceting.
    pub fn facet_query(&self, q: impl Into<Q>) -> Result<Self, SearchError> {
        let expr = q.into().build()?;
        let mut next = self.clone();
        if !expr.is_empty() {
            next.facet_queries.push(expr);
        }
        Ok(next)
    }

    /// Groups results by `field`; `group.ngroups` defaults to true.
    pub fn group_by(&self, field: &str, config: &JsonValue) -> Result<Self, SearchError> {
        let mut combined = Map::new();
        combined.insert("field".to_string(), json!(field));
        combined.insert("ngroups".to_string(), json!(true));
        match config {
            JsonValue::Object(extra) => combined.extend(extra.clone()),
            JsonValue::Null => {}
            other => {
                return Err(SearchError::invalid_option(
                    "group",
                    "config",
                    format!("expected a JSON object, got {other}"),
                ));
            }
        }

        let mut next = self.clone();
        next.group = Some(merged(self.group.as_ref(), &JsonValue::Object(combined))?);
        Ok(next)
    }

    /// Adds highlighting options; see [`HighlightOptions`].
    pub fn highlight(&self, config: &JsonValue) -> Result<Self, SearchError> {
        let mut next = self.clone();
        next.highlight = Some(merged(self.highlight.as_ref(), config)?);
        Ok(next)
    }

    /// Adds MoreLikeThis options.
    ///
    /// On a standard request these configure the in-query component
    /// ([`MoreLikeThisOptions`]); on a [`mlt_handler`](Self::mlt_handler)
    /// request they configure the handler ([`MltHandlerOptions`]).
    pub fn mlt(&self, config: &JsonValue) -> Result<Self, SearchError> {
        let mut next = self.clone();
        match self.handler {
            Handler::Select => next.mlt = Some(merged(self.mlt.as_ref(), config)?),
            Handler::MoreLikeThis => {
                next.mlt_handler = Some(merged(self.mlt_handler.as_ref(), config)?);
            }
        }
        Ok(next)
    }

    /// Selects an alternate query parser and applies its options.
    ///
    /// Selecting the parser already in use updates its options; selecting the
    /// other one starts afresh.
    pub fn alt_parser(&self, parser: AltParser, config: &JsonValue) -> Result<Self, SearchError> {
        let mut options = match &self.parser {
            Some(current) if current.parser() == parser => current.clone(),
            _ => ParserOptions::new(parser),
        };
        options.update(config)?;

        let mut next = self.clone();
        next.parser = Some(options);
        Ok(next)
    }

    /// Limits the returned fields; see [`FieldLimitOptions`].
    pub fn field_limit(&self, config: &JsonValue) -> Result<Self, SearchError> {
        let mut next = self.clone();
        next.field_limit = Some(merged(self.field_limit.as_ref(), config)?);
        Ok(next)
    }

    /// Appends a sort field; a leading `-` sorts descending.
    pub fn sort_by(&self, field: &str) -> Result<Self, SearchError> {
        let mut next = self.clone();
        next.sort = Some(merged(self.sort.as_ref(), &json!({ "field": field }))?);
        Ok(next)
    }

    /// Sets the result window; `None` leaves a bound unset.
    pub fn paginate(&self, start: Option<i64>, rows: Option<i64>) -> Result<Self, SearchError> {
        let mut next = self.clone();
        next.paginate = Some(merged(
            self.paginate.as_ref(),
            &json!({ "start": start, "rows": rows }),
        )?);
        Ok(next)
    }

    /// Requests query debugging output.
    pub fn debug(&self) -> Self {
        Self {
            debug: true,
            ..self.clone()
        }
    }

    /// Requests spellchecking.
    pub fn spellcheck(&self) -> Self {
        Self {
            spellcheck: true,
            ..self.clone()
        }
    }

    /// Renders the request parameters, sorted by name then value.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params: Params = Vec::new();

        let query = render(&self.primary());
        if !query.is_empty() {
            params.push(("q".to_string(), query.into()));
        } else if self.handler == Handler::Select {
            params.push(("q".to_string(), MATCH_ALL.into()));
        }

        let filters = render_filters(&QueryExpr::and(self.filters.clone()));
        params.extend(filters.into_iter().map(|f| ("fq".to_string(), f.into())));

        if !self.facet_queries.is_empty() {
            params.push(("facet".to_string(), ParamValue::Bool(true)));
            params.extend(
                self.facet_queries
                    .iter()
                    .map(|q| ("facet.query".to_string(), render(q).into())),
            );
        }

        extend_with(&mut params, self.paginate.as_ref());
        extend_with(&mut params, self.sort.as_ref());
        extend_with(&mut params, self.field_limit.as_ref());
        extend_with(&mut params, self.facet.as_ref());
        extend_with(&mut params, self.group.as_ref());
        extend_with(&mut params, self.highlight.as_ref());
        extend_with(&mut params, self.mlt.as_ref());
        extend_with(&mut params, self.mlt_handler.as_ref());
        if let Some(parser) = &self.parser {
            params.extend(parser.params());
        }
        if self.debug {
            params.push(("debugQuery".to_string(), ParamValue::Bool(true)));
        }
        if self.spellcheck {
            params.push(("spellcheck".to_string(), ParamValue::Bool(true)));
        }

        let encoded = params_from_pairs(params);
        debug!(
            queries = self.queries.len(),
            filters = self.filters.len(),
            boosts = self.boosts.len(),
            params = encoded.len(),
            "assembled search parameters"
        );
        encoded
    }

    /// The primary query with relevancy boosts applied.
    ///
    /// Boosts without a primary query are anchored on `*:*`, so they reorder
    /// all documents instead of restricting them.
    fn primary(&self) -> QueryExpr {
        let primary = QueryExpr::and(self.queries.clone());
        if self.boosts.is_empty() {
            return primary;
        }

        let base = if primary.is_empty() {
            QueryExpr::match_all()
        } else {
            primary
        };
        let boosted = base.clone() & QueryExpr::or(self.boosts.clone());
        base | boosted
    }

    /// Returns a copy with `expr` conjoined into the primary query.
    fn with_query(&self, expr: QueryExpr) -> Self {
        let mut next = self.clone();
        if !expr.is_empty() {
            next.queries.push(expr);
        }
        next
    }

    /// Returns a copy with `expr` conjoined into the filter.
    fn with_filter(&self, expr: QueryExpr) -> Self {
        let mut next = self.clone();
        if !expr.is_empty() {
            next.filters.push(expr);
        }
        next
    }
}

/// Applies `config` on top of `current`, or on fresh options.
fn merged<F>(current: Option<&Options<F>>, config: &JsonValue) -> Result<Options<F>, SearchError>
where
    F: Feature + Clone + Default,
{
    let mut options = current.cloned().unwrap_or_default();
    options.update(config)?;
    Ok(options)
}

/// Appends the parameters of an attached option set.
fn extend_with<F: Feature>(params: &mut Params, options: Option<&Options<F>>) {
    if let Some(options) = options {
        params.extend(options.params());
    }
}

#[cfg(test)]
mod tests {
    use scour_query::{Modifier, QueryError};

    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn empty_request_matches_all() {
        assert_eq!(SearchRequest::new().params(), pairs(&[("q", "*:*")]));
    }

    #[test]
    fn empty_mlt_handler_has_no_query() {
        assert!(SearchRequest::mlt_handler().params().is_empty());
    }

    #[test]
    fn filter_alone_anchors_query() {
        let request = SearchRequest::new().filter(Q::new().value("hello")).unwrap();
        assert_eq!(request.params(), pairs(&[("fq", "hello"), ("q", "*:*")]));
    }

    #[test]
    fn empty_text_stays_a_query() {
        let request = SearchRequest::new().query(Q::new().value("")).unwrap();
        assert_eq!(request.params(), pairs(&[("q", "\"\"")]));

        let request = SearchRequest::new()
            .query(Q::new().value("abc").value(""))
            .unwrap()
            .filter(Q::new().field("text_field", ""))
            .unwrap();
        assert_eq!(
            request.params(),
            pairs(&[("fq", "text_field:\"\""), ("q", "abc AND \"\"")])
        );
    }

    #[test]
    fn rendering_twice_is_stable() {
        let request = SearchRequest::new()
            .query(Q::new().value("a").field("b", 1))
            .unwrap()
            .facet_by(&json!({"fields": "c"}))
            .unwrap();
        assert_eq!(request.params(), request.params());
    }

    #[test]
    fn queries_conjoin() {
        let request = SearchRequest::new()
            .query(Q::new().value("hello"))
            .unwrap()
            .query(Q::new().field("int_field", 3))
            .unwrap();
        assert_eq!(request.params(), pairs(&[("q", "hello AND int_field:3")]));
    }

    #[test]
    fn exclude_negates() {
        let request = SearchRequest::new()
            .query(Q::new().value("hello"))
            .unwrap()
            .exclude(Q::new().field("int_field", 3))
            .unwrap();
        assert_eq!(request.params(), pairs(&[("q", "hello AND NOT int_field:3")]));
    }

    #[test]
    fn term_and_phrase_styles() {
        let by_phrase = SearchRequest::new()
            .query_by_phrase(Q::new().value("hello").field("int_field", 3))
            .unwrap();
        assert_eq!(by_phrase.params(), pairs(&[("q", "int_field:3 AND hello")]));

        let by_term = SearchRequest::new()
            .filter_by_term(Q::new().field("text_field", "hello world"))
            .unwrap();
        assert_eq!(
            by_term.params(),
            pairs(&[("fq", "text_field:hello\\ world"), ("q", "*:*")])
        );
    }

    #[test]
    fn filters_split_on_conjunction() {
        let request = SearchRequest::new()
            .filter(
                Q::new()
                    .field("text_field", "tow")
                    .field("boolean_field", false)
                    .field_op("int_field", Modifier::Gt, 3),
            )
            .unwrap();
        assert_eq!(
            request.params(),
            pairs(&[
                ("fq", "boolean_field:false"),
                ("fq", "int_field:{3 TO *}"),
                ("fq", "text_field:tow"),
                ("q", "*:*"),
            ])
        );
    }

    #[test]
    fn boosts_without_primary_anchor_on_match_all() {
        let request = SearchRequest::new()
            .boost_relevancy(2.0, Q::new().field("int_field", 3))
            .unwrap();
        assert_eq!(
            request.params(),
            pairs(&[("q", "*:* OR (*:* AND int_field:3^2)")])
        );
    }

    #[test]
    fn invalid_boost_factor() {
        for factor in [0.0, -1.0, f64::NAN] {
            let err = SearchRequest::new()
                .boost_relevancy(factor, Q::new().value("a"))
                .unwrap_err();
            assert!(matches!(
                err,
                SearchError::Query(QueryError::InvalidBoost { .. })
            ));
        }
    }

    #[test]
    fn query_errors_propagate() {
        let err = SearchRequest::new()
            .query(Q::new().kwarg("int_field__near", 3))
            .unwrap_err();
        assert!(matches!(err, SearchError::Query(_)));
    }

    #[test]
    fn facet_flag_appears_once() {
        let request = SearchRequest::new()
            .facet_by(&json!({"fields": "a"}))
            .unwrap()
            .facet_query(Q::new().field("b", 1))
            .unwrap();
        assert_eq!(
            request.params(),
            pairs(&[
                ("facet", "true"),
                ("facet.field", "a"),
                ("facet.query", "b:1"),
                ("q", "*:*"),
            ])
        );
    }

    #[test]
    fn mlt_follows_handler() {
        let config = json!({"fields": "text_field"});
        let component = SearchRequest::new()
            .query(Q::new().value("hello"))
            .unwrap()
            .mlt(&config)
            .unwrap();
        assert_eq!(
            component.params(),
            pairs(&[("mlt", "true"), ("mlt.fl", "text_field"), ("q", "hello")])
        );

        let handler = SearchRequest::mlt_handler().mlt(&config).unwrap();
        assert_eq!(handler.params(), pairs(&[("mlt.fl", "text_field")]));
    }

    #[test]
    fn switching_parsers_starts_afresh() {
        let request = SearchRequest::new()
            .alt_parser(AltParser::Dismax, &json!({"mm": 2}))
            .unwrap()
            .alt_parser(AltParser::Edismax, &json!({"ps": 1}))
            .unwrap();
        assert_eq!(
            request.params(),
            pairs(&[("defType", "edismax"), ("ps", "1"), ("q", "*:*")])
        );
    }

    #[test]
    fn debug_and_spellcheck() {
        let request = SearchRequest::new().debug().spellcheck();
        assert_eq!(
            request.params(),
            pairs(&[("debugQuery", "true"), ("q", "*:*"), ("spellcheck", "true")])
        );
    }

    #[test]
    fn paginate_and_sort() {
        let request = SearchRequest::new()
            .paginate(Some(10), Some(20))
            .unwrap()
            .sort_by("-int_field")
            .unwrap();
        assert_eq!(
            request.params(),
            pairs(&[
                ("q", "*:*"),
                ("rows", "20"),
                ("sort", "int_field desc"),
                ("start", "10"),
            ])
        );
        assert!(SearchRequest::new().paginate(Some(-1), None).is_err());
    }

    #[test]
    fn rejected_options_leave_request_usable() {
        let base = SearchRequest::new().facet_by(&json!({"limit": 3})).unwrap();
        assert!(base.facet_by(&json!({"limit": "a"})).is_err());
        assert_eq!(
            base.params(),
            pairs(&[("facet", "true"), ("facet.limit", "3"), ("q", "*:*")])
        );
    }
}
