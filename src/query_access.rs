//! Validation and rewriting of untrusted queries.
//!
//! A [`QueryAccess`] owns an access policy: fields that may not be queried,
//! fields that are the only ones that may be queried, mandatory constraint
//! queries and a few switches. [`QueryAccess::restrict`] checks a query
//! against the policy and returns the query text to run, with the
//! constraints ANDed on. [`QueryAccess::restrict_search_query`] also
//! translates the result into Elasticsearch search parameters.
//!
//! ```
//! use xlucene::query_access::{QueryAccess, QueryAccessConfig, RestrictOptions};
//! use xlucene::types::{FieldType, TypeConfig};
//!
//! let access = QueryAccess::new(
//!     QueryAccessConfig::new()
//!         .with_excludes(["bar"])
//!         .with_type_config(
//!             TypeConfig::new()
//!                 .with_field("foo", FieldType::String)
//!                 .with_field("bar", FieldType::String),
//!         ),
//! );
//!
//! let options = RestrictOptions::default();
//! assert_eq!(access.restrict("foo:example", &options).unwrap(), "foo:example");
//!
//! let err = access.restrict("bar:example", &options).unwrap_err();
//! assert_eq!(err.to_string(), "Field bar in query is restricted");
//! assert_eq!(err.status_code(), 403);
//! ```

mod config;
mod fields;
mod source;

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::ast::Node;
use crate::ast::walk::for_each_node;
use crate::error::{Result, XluceneError};
use crate::geo::DistanceUnit;
use crate::parser::{CachedParser, Parser, ParserOptions, Variables};
use crate::translator::{CachedTranslator, TranslatorOptions, geo_distance_sort};
use crate::types::TypeConfig;
use crate::util::wildcard::has_prefix_wildcard;

pub use self::config::{QueryAccessConfig, RestrictOptions};
use self::fields::FieldPolicy;
use self::source::restrict_source_fields;

const EMPTY_QUERY: &str = "Empty queries are restricted";
const IMPLICIT_FIELD: &str = "Implicit fields are restricted, please specify a field";
const PREFIX_WILDCARD: &str = "Wildcard queries of the form 'fieldname:*value' or 'fieldname:?value' in query are restricted";

/// An access policy with its parse and translation caches.
#[derive(Debug)]
pub struct QueryAccess {
    config: QueryAccessConfig,
    policy: FieldPolicy,
    type_config: TypeConfig,
    parser: CachedParser,
    translator: CachedTranslator,
}

impl QueryAccess {
    pub fn new(config: QueryAccessConfig) -> Self {
        let policy = FieldPolicy::new(&config.excludes, &config.includes, &config.type_config);
        let type_config = config
            .type_config
            .retain(|field, _| policy.is_allowed(field));
        debug!(
            fields = config.type_config.len(),
            allowed = type_config.len(),
            "built query access type config"
        );

        let parser = Parser::new(type_config.clone()).with_options(
            ParserOptions::default().with_filter_nil_variables(config.filter_nil_variables),
        );

        QueryAccess {
            config,
            policy,
            type_config,
            parser: CachedParser::new(parser),
            translator: CachedTranslator::new(),
        }
    }

    pub fn config(&self) -> &QueryAccessConfig {
        &self.config
    }

    /// The type config with every field the policy forbids removed.
    pub fn type_config(&self) -> &TypeConfig {
        &self.type_config
    }

    /// Parse `query` against the restricted type config.
    ///
    /// Any parse failure is reported as "Query could not be parsed".
    pub fn parse_query(&self, query: &str, variables: &Variables) -> Result<Node> {
        self.parser.parse(query, variables).map_err(|e| {
            debug!(error = %e, "rejecting unparsable query");
            XluceneError::invalid_query(e)
        })
    }

    /// Validate `query` and return it with the constraints ANDed on.
    pub fn restrict(&self, query: &str, options: &RestrictOptions) -> Result<String> {
        let ast = self.parse_query(query, &options.variables)?;

        if ast.is_empty() {
            if !self.config.allow_empty_queries {
                return Err(violation(EMPTY_QUERY));
            }
            return Ok(self.add_constraints(""));
        }

        self.check_fields(&ast)?;
        Ok(self.add_constraints(query))
    }

    /// Restrict `query` and build Elasticsearch search parameters for it.
    ///
    /// The caller's `params` pass through, except that `sort` is merged
    /// after any generated geo sort and `_source_includes` /
    /// `_source_excludes` are narrowed by the policy.
    pub async fn restrict_search_query(
        &self,
        query: &str,
        options: &RestrictOptions,
    ) -> Result<Value> {
        let restricted = self.restrict(query, options)?;
        let ast = self.parse_query(&restricted, &options.variables)?;

        let unit = options.geo_sort_unit.or(self.config.default_geo_sort_unit);
        let order = options
            .geo_sort_order
            .unwrap_or(self.config.default_geo_sort_order);
        let mut translator_options = TranslatorOptions::new()
            .with_type_config(self.type_config.clone())
            .with_geo_sort_order(order);
        if let Some(unit) = unit {
            translator_options = translator_options.with_geo_sort_unit(unit);
        }

        let dsl = self.translator.translate(
            &translation_key(&restricted, &options.variables),
            &ast,
            &translator_options,
        );
        if !dsl.is_complete() {
            warn!(unsupported = ?dsl.unsupported, "restricted query was translated partially");
        }

        let mut params = options.params.clone();
        let requested_sort = params.remove("sort");
        let requested_includes = params.remove("_source_includes");
        let requested_excludes = params.remove("_source_excludes");

        let mut sort = Vec::new();
        sort.extend(dsl.sort.clone());
        if let Some(point) = &options.geo_sort_point {
            let field = self.config.default_geo_field.as_deref().ok_or_else(|| {
                XluceneError::other("a geo sort point requires a default geo field")
            })?;
            let unit = unit.unwrap_or(DistanceUnit::Meters);
            sort.push(geo_distance_sort(field, point, order, unit));
        }
        match requested_sort {
            Some(Value::Array(items)) => sort.extend(items),
            Some(Value::Null) | None => {}
            Some(other) => sort.push(other),
        }

        let mut body = Map::new();
        body.insert("query".to_string(), dsl.query);
        if !sort.is_empty() {
            body.insert("sort".to_string(), Value::Array(sort));
        }
        params.insert("body".to_string(), Value::Object(body));

        let source = restrict_source_fields(
            &self.policy,
            requested_includes.as_ref(),
            requested_excludes.as_ref(),
        );
        if !source.includes.is_empty() {
            params.insert("_source_includes".to_string(), json!(source.includes));
        }
        if !source.excludes.is_empty() {
            params.insert("_source_excludes".to_string(), json!(source.excludes));
        }

        Ok(Value::Object(params))
    }

    /// Clear the parse and translation caches.
    pub fn reset(&self) {
        self.parser.reset();
        self.translator.reset();
    }

    fn check_fields(&self, ast: &Node) -> Result<()> {
        let mut checked = Vec::new();
        for_each_node(ast, &mut |node| {
            if node.is_term_like() || matches!(node, Node::Exists(_)) {
                checked.push(node);
            }
        });

        for node in checked {
            match node.field() {
                Some(field) if !self.policy.is_allowed(field) => {
                    return Err(violation(format!("Field {field} in query is restricted")));
                }
                Some(_) => {}
                None if !self.config.allow_implicit_queries => {
                    return Err(violation(IMPLICIT_FIELD));
                }
                None => {}
            }

            // applies to fieldless wildcards too
            if let Node::Wildcard(wildcard) = node {
                if self.config.prevent_prefix_wildcard && has_prefix_wildcard(&wildcard.value) {
                    return Err(violation(PREFIX_WILDCARD));
                }
            }
        }
        Ok(())
    }

    /// `(c1) AND (c2) AND (query)`; a lone constraint on an empty query is
    /// returned as is.
    fn add_constraints(&self, query: &str) -> String {
        let constraints = &self.config.constraints;
        let query = query.trim();
        if constraints.is_empty() {
            return query.to_string();
        }
        if query.is_empty() && constraints.len() == 1 {
            return constraints[0].clone();
        }

        let mut parts: Vec<String> = constraints.iter().map(|c| format!("({c})")).collect();
        if !query.is_empty() {
            parts.push(format!("({query})"));
        }
        parts.join(" AND ")
    }
}

fn violation<S: Into<String>>(message: S) -> XluceneError {
    let error = XluceneError::access_violation(message);
    debug!(reason = %error, "query access violation");
    error
}

fn translation_key(query: &str, variables: &Variables) -> String {
    if variables.is_empty() {
        return query.to_string();
    }
    let variables = serde_json::to_string(variables).unwrap_or_default();
    format!("{query}\u{0}{variables}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::types::FieldType;

    fn type_config() -> TypeConfig {
        TypeConfig::new()
            .with_field("foo", FieldType::String)
            .with_field("bar", FieldType::String)
            .with_field("count", FieldType::Integer)
            .with_field("location", FieldType::GeoPoint)
    }

    fn access(config: QueryAccessConfig) -> QueryAccess {
        QueryAccess::new(config.with_type_config(type_config()))
    }

    #[test]
    fn test_restricted_type_config() {
        let access = access(QueryAccessConfig::new().with_excludes(["bar"]));
        assert!(access.type_config().contains("foo"));
        assert!(!access.type_config().contains("bar"));
    }

    #[test]
    fn test_unparsable_query() {
        let access = access(QueryAccessConfig::new());
        let err = access.restrict("foo:(", &RestrictOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Query could not be parsed");
        assert_eq!(err.status_code(), 422);
        assert!(err.is_safe());
    }

    #[test]
    fn test_exists_is_checked() {
        let access = access(QueryAccessConfig::new().with_excludes(["bar"]));
        let err = access
            .restrict("_exists_:bar", &RestrictOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Field bar in query is restricted");
    }

    #[test]
    fn test_implicit_fields() {
        let options = RestrictOptions::default();
        let err = access(QueryAccessConfig::new())
            .restrict("hello", &options)
            .unwrap_err();
        assert_eq!(err.to_string(), IMPLICIT_FIELD);

        let allowed = access(QueryAccessConfig::new().with_allow_implicit_queries(true));
        assert_eq!(allowed.restrict("hello", &options).unwrap(), "hello");
    }

    #[test]
    fn test_prefix_wildcard() {
        let options = RestrictOptions::default();
        let strict = access(QueryAccessConfig::new().with_prevent_prefix_wildcard(true));
        let err = strict.restrict("foo:*world", &options).unwrap_err();
        assert!(err.to_string().contains("Wildcard queries of the form"));
        assert_eq!(strict.restrict("foo:wor*", &options).unwrap(), "foo:wor*");

        let lenient = access(QueryAccessConfig::new());
        assert!(lenient.restrict("foo:*world", &options).is_ok());

        let implicit = access(
            QueryAccessConfig::new()
                .with_prevent_prefix_wildcard(true)
                .with_allow_implicit_queries(true),
        );
        let err = implicit.restrict("*world", &options).unwrap_err();
        assert_eq!(err.to_string(), PREFIX_WILDCARD);
        assert_eq!(implicit.restrict("wor*", &options).unwrap(), "wor*");
    }

    #[test]
    fn test_constraints() {
        let options = RestrictOptions::default();
        let one = access(QueryAccessConfig::new().with_constraint("count:>1"));
        assert_eq!(one.restrict("", &options).unwrap(), "count:>1");
        assert_eq!(
            one.restrict("foo:bar", &options).unwrap(),
            "(count:>1) AND (foo:bar)"
        );

        let two = access(
            QueryAccessConfig::new()
                .with_constraint("count:>1")
                .with_constraint("foo:x"),
        );
        assert_eq!(two.restrict(" ", &options).unwrap(), "(count:>1) AND (foo:x)");
    }

    #[test]
    fn test_reset_clears_caches() {
        let access = access(QueryAccessConfig::new());
        access.restrict("foo:bar", &RestrictOptions::default()).unwrap();
        assert!(!access.parser.is_empty());
        access.reset();
        assert!(access.parser.is_empty());
        assert!(access.translator.is_empty());
    }

    #[tokio::test]
    async fn test_search_query_sort_and_source() {
        let access = access(
            QueryAccessConfig::new()
                .with_excludes(["bar"])
                .with_default_geo_field("location"),
        );
        let options = RestrictOptions::new()
            .with_geo_sort_point(GeoPoint::new(1.0, 2.0).unwrap())
            .with_param("size", json!(10))
            .with_param("sort", json!({"count": "desc"}))
            .with_param("_source_excludes", json!("foo"));

        let params = access
            .restrict_search_query("foo:bar", &options)
            .await
            .unwrap();

        assert_eq!(params["size"], json!(10));
        assert_eq!(
            params["body"]["query"],
            json!({"constant_score": {"filter": {"match": {"foo": {"operator": "and", "query": "bar"}}}}})
        );
        assert_eq!(
            params["body"]["sort"],
            json!([
                {"_geo_distance": {"order": "asc", "unit": "meters", "location": {"lat": 1.0, "lon": 2.0}}},
                {"count": "desc"}
            ])
        );
        assert_eq!(params["_source_excludes"], json!(["foo", "bar"]));
        assert!(params.get("_source_includes").is_none());
    }

    #[tokio::test]
    async fn test_geo_sort_point_requires_field() {
        let access = access(QueryAccessConfig::new());
        let options = RestrictOptions::new().with_geo_sort_point(GeoPoint::new(1.0, 2.0).unwrap());
        assert!(access.restrict_search_query("foo:bar", &options).await.is_err());
    }
}
