//! Compile an xlucene AST into an Elasticsearch Query DSL object.
//!
//! The output has the shape `{ "query": ..., "sort"?: ... }`. A non-empty
//! query is always wrapped in `constant_score.filter` since the engine only
//! does boolean matching; an empty AST becomes `match_all`.
//!
//! Nodes without an Elasticsearch rendering (for example `geoContainsPoint`
//! on a geo-point field) are dropped from the output and reported in
//! [`ElasticsearchDsl::unsupported`] instead of failing the translation.
//!
//! ```
//! use serde_json::json;
//! use xlucene::parser::{Variables, parse};
//! use xlucene::translator::{TranslatorOptions, to_elasticsearch_dsl};
//! use xlucene::types::{FieldType, TypeConfig};
//!
//! let config = TypeConfig::new().with_field("age", FieldType::Integer);
//! let ast = parse("age:>=21", &config, &Variables::new()).unwrap();
//! let dsl = to_elasticsearch_dsl(&ast, &config, &TranslatorOptions::default());
//!
//! assert_eq!(
//!     dsl.to_json(),
//!     json!({"query": {"constant_score": {"filter": {"range": {"age": {"gte": 21}}}}}})
//! );
//! ```

mod cached;
mod compact;
mod dsl;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::ast::Node;
use crate::geo::{DistanceUnit, GeoPoint};
use crate::types::TypeConfig;

pub use self::cached::CachedTranslator;
pub use self::compact::compact;

/// Sort direction of generated geo sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options controlling translation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorOptions {
    /// Used to expand wildcard field names into concrete fields.
    pub type_config: TypeConfig,
    pub geo_sort_order: SortOrder,
    /// Unit of generated geo sorts; defaults to the unit of the distance.
    pub geo_sort_unit: Option<DistanceUnit>,
}

impl TranslatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type_config(mut self, type_config: TypeConfig) -> Self {
        self.type_config = type_config;
        self
    }

    pub fn with_geo_sort_order(mut self, order: SortOrder) -> Self {
        self.geo_sort_order = order;
        self
    }

    pub fn with_geo_sort_unit(mut self, unit: DistanceUnit) -> Self {
        self.geo_sort_unit = Some(unit);
        self
    }

    /// Stable identity, used as part of translation cache keys.
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.type_config.cache_key(),
            self.geo_sort_order,
            self.geo_sort_unit.map(|u| u.as_str()).unwrap_or("")
        )
    }
}

/// A translated query.
#[derive(Debug, Clone, PartialEq)]
pub struct ElasticsearchDsl {
    /// The value of the top-level `query` key.
    pub query: Value,
    pub sort: Option<Value>,
    /// Descriptions of AST branches that had no Elasticsearch rendering and
    /// were dropped.
    pub unsupported: Vec<String>,
}

impl ElasticsearchDsl {
    /// Whether every branch of the AST made it into the output.
    pub fn is_complete(&self) -> bool {
        self.unsupported.is_empty()
    }

    /// `{ "query": ..., "sort"?: ... }`
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.clone());
        if let Some(sort) = &self.sort {
            body.insert("sort".to_string(), sort.clone());
        }
        Value::Object(body)
    }
}

/// AST to Elasticsearch DSL compiler.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    options: TranslatorOptions,
}

impl Translator {
    pub fn new(options: TranslatorOptions) -> Self {
        Translator { options }
    }

    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    pub fn translate(&self, node: &Node) -> ElasticsearchDsl {
        if node.is_empty() {
            return ElasticsearchDsl {
                query: json!({ "match_all": {} }),
                sort: None,
                unsupported: Vec::new(),
            };
        }

        let mut builder = dsl::DslBuilder::new(&self.options);
        let clause = builder.clause(node);
        let (sort, unsupported) = builder.finish();

        let query = match clause {
            Some(clause) => json!({ "constant_score": { "filter": compact(clause) } }),
            None => json!({ "match_none": {} }),
        };
        debug!(
            kind = node.kind(),
            unsupported = unsupported.len(),
            "translated xlucene query"
        );

        ElasticsearchDsl {
            query,
            sort,
            unsupported,
        }
    }
}

/// Translate `node` with `type_config` replacing the options' type config.
pub fn to_elasticsearch_dsl(
    node: &Node,
    type_config: &TypeConfig,
    options: &TranslatorOptions,
) -> ElasticsearchDsl {
    let options = options.clone().with_type_config(type_config.clone());
    Translator::new(options).translate(node)
}

/// `{ "_geo_distance": { order, unit, <field>: {lat, lon} } }`
pub fn geo_distance_sort(
    field: &str,
    point: &GeoPoint,
    order: SortOrder,
    unit: DistanceUnit,
) -> Value {
    json!({
        "_geo_distance": {
            "order": order.as_str(),
            "unit": unit.as_str(),
            field: point.to_json(),
        }
    })
}
