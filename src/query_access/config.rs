//! Access policy configuration.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::geo::{DistanceUnit, GeoPoint};
use crate::parser::Variables;
use crate::translator::SortOrder;
use crate::types::TypeConfig;

/// Policy of a [`QueryAccess`](crate::query_access::QueryAccess).
///
/// Deserializes from JSON with every key optional:
///
/// ```
/// use xlucene::query_access::QueryAccessConfig;
///
/// let config: QueryAccessConfig = serde_json::from_str(r#"{
///     "excludes": ["secret"],
///     "constraint": "public:true",
///     "type_config": {"secret": "string", "public": "boolean"}
/// }"#).unwrap();
///
/// assert_eq!(config.constraints, vec!["public:true".to_string()]);
/// assert!(config.allow_empty_queries);
/// assert!(!config.allow_implicit_queries);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryAccessConfig {
    /// Fields that may never be queried or returned.
    pub excludes: Vec<String>,
    /// When non-empty, the only fields that may be queried or returned.
    pub includes: Vec<String>,
    /// Queries ANDed onto every restricted query.
    #[serde(alias = "constraint", deserialize_with = "one_or_many")]
    pub constraints: Vec<String>,
    pub allow_empty_queries: bool,
    /// Allow terms without a `field:` prefix.
    pub allow_implicit_queries: bool,
    /// Reject wildcards of the form `field:*value` and `field:?value`.
    pub prevent_prefix_wildcard: bool,
    /// Field used for sorts built from a caller's geo sort point.
    pub default_geo_field: Option<String>,
    pub default_geo_sort_order: SortOrder,
    pub default_geo_sort_unit: Option<DistanceUnit>,
    /// Types of the searchable fields, before the policy is applied.
    pub type_config: TypeConfig,
    pub filter_nil_variables: bool,
}

impl Default for QueryAccessConfig {
    fn default() -> Self {
        QueryAccessConfig {
            excludes: Vec::new(),
            includes: Vec::new(),
            constraints: Vec::new(),
            allow_empty_queries: true,
            allow_implicit_queries: false,
            prevent_prefix_wildcard: false,
            default_geo_field: None,
            default_geo_sort_order: SortOrder::Asc,
            default_geo_sort_unit: None,
            type_config: TypeConfig::default(),
            filter_nil_variables: false,
        }
    }
}

impl QueryAccessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_config(mut self, type_config: TypeConfig) -> Self {
        self.type_config = type_config;
        self
    }

    pub fn with_excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = excludes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_includes<I, S>(mut self, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = includes.into_iter().map(Into::into).collect();
        self
    }

    /// Add a constraint query.
    pub fn with_constraint<S: Into<String>>(mut self, constraint: S) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn with_allow_empty_queries(mut self, allow: bool) -> Self {
        self.allow_empty_queries = allow;
        self
    }

    pub fn with_allow_implicit_queries(mut self, allow: bool) -> Self {
        self.allow_implicit_queries = allow;
        self
    }

    pub fn with_prevent_prefix_wildcard(mut self, prevent: bool) -> Self {
        self.prevent_prefix_wildcard = prevent;
        self
    }

    pub fn with_default_geo_field<S: Into<String>>(mut self, field: S) -> Self {
        self.default_geo_field = Some(field.into());
        self
    }

    pub fn with_default_geo_sort_order(mut self, order: SortOrder) -> Self {
        self.default_geo_sort_order = order;
        self
    }

    pub fn with_default_geo_sort_unit(mut self, unit: DistanceUnit) -> Self {
        self.default_geo_sort_unit = Some(unit);
        self
    }

    pub fn with_filter_nil_variables(mut self, filter: bool) -> Self {
        self.filter_nil_variables = filter;
        self
    }
}

/// Accept a single string, a list of strings, or null.
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if s.trim().is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(many)) => many.into_iter().filter(|s| !s.trim().is_empty()).collect(),
    })
}

/// Per-call inputs of [`QueryAccess::restrict`](crate::query_access::QueryAccess::restrict)
/// and [`QueryAccess::restrict_search_query`](crate::query_access::QueryAccess::restrict_search_query).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestrictOptions {
    pub variables: Variables,
    /// Search parameters passed through to the output, e.g. `size`, `sort`,
    /// `_source_includes`.
    pub params: Map<String, Value>,
    /// Sort results by distance from this point on the default geo field.
    pub geo_sort_point: Option<GeoPoint>,
    pub geo_sort_order: Option<SortOrder>,
    pub geo_sort_unit: Option<DistanceUnit>,
}

impl RestrictOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_variable<S: Into<String>>(mut self, name: S, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    pub fn with_param<S: Into<String>>(mut self, name: S, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn with_geo_sort_point(mut self, point: GeoPoint) -> Self {
        self.geo_sort_point = Some(point);
        self
    }

    pub fn with_geo_sort_order(mut self, order: SortOrder) -> Self {
        self.geo_sort_order = Some(order);
        self
    }

    pub fn with_geo_sort_unit(mut self, unit: DistanceUnit) -> Self {
        self.geo_sort_unit = Some(unit);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_constraint_forms() {
        let one: QueryAccessConfig = serde_json::from_value(json!({"constraint": "a:1"})).unwrap();
        assert_eq!(one.constraints, vec!["a:1"]);

        let many: QueryAccessConfig =
            serde_json::from_value(json!({"constraints": ["a:1", "", "b:2"]})).unwrap();
        assert_eq!(many.constraints, vec!["a:1", "b:2"]);

        let none: QueryAccessConfig = serde_json::from_value(json!({"constraint": null})).unwrap();
        assert!(none.constraints.is_empty());
    }

    #[test]
    fn test_defaults() {
        let config: QueryAccessConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, QueryAccessConfig::default());
        assert!(config.allow_empty_queries);
        assert!(!config.prevent_prefix_wildcard);
    }

    #[test]
    fn test_restrict_options() {
        let options: RestrictOptions = serde_json::from_value(json!({
            "variables": {"v": 1},
            "params": {"size": 10},
            "geo_sort_point": {"lat": 1.0, "lon": 2.0},
            "geo_sort_unit": "kilometers"
        }))
        .unwrap();
        assert_eq!(options.variables["v"], json!(1));
        assert_eq!(options.geo_sort_point.map(|p| p.lat), Some(1.0));
        assert_eq!(options.geo_sort_unit, Some(DistanceUnit::Kilometers));
    }
}
