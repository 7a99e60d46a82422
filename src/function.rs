//! Named query functions (`field:name(param:value ...)`).
//!
//! Functions are looked up by name in an explicit [`FunctionRegistry`] that
//! the parser is built with. A [`FunctionDefinition`] validates the call's
//! parameters and produces a [`FunctionInstance`], which knows how to match a
//! field value directly and how to render itself as an Elasticsearch query.
//!
//! ```
//! use xlucene::function::FunctionRegistry;
//!
//! let registry = FunctionRegistry::default();
//! assert!(registry.get("geoDistance").is_some());
//! assert!(registry.get("nope").is_none());
//! ```

pub mod geo_box;
pub mod geo_contains_point;
pub mod geo_distance;
pub mod geo_polygon;

use std::fmt::Debug;
use std::sync::Arc;

use ahash::AHashMap;
use serde_json::Value;

use crate::ast::FunctionParam;
use crate::error::{Result, XluceneError};
use crate::geo::{GeoPoint, parse_geo_point};
use crate::translator::TranslatorOptions;
use crate::types::FieldType;

pub use self::geo_box::GeoBoxFunction;
pub use self::geo_contains_point::GeoContainsPointFunction;
pub use self::geo_distance::GeoDistanceFunction;
pub use self::geo_polygon::GeoPolygonFunction;

/// The Elasticsearch rendering of a function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionQuery {
    pub query: Value,
    pub sort: Option<Value>,
}

impl FunctionQuery {
    pub fn new(query: Value) -> Self {
        FunctionQuery { query, sort: None }
    }

    pub fn with_sort(mut self, sort: Value) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// A validated function call.
pub trait FunctionInstance: Debug + Send + Sync {
    /// Test a single field value.
    fn matches(&self, value: &Value) -> bool;

    /// Render as an Elasticsearch clause; `None` when the call has no
    /// Elasticsearch equivalent for its field type.
    fn to_elasticsearch_query(&self, field: &str, options: &TranslatorOptions)
    -> Option<FunctionQuery>;
}

/// A named function that can be invoked from query text.
pub trait FunctionDefinition: Send + Sync {
    fn name(&self) -> &'static str;

    /// Validate the call and build its instance.
    fn create(&self, context: &FunctionContext<'_>) -> Result<Arc<dyn FunctionInstance>>;
}

/// What a function definition gets to see of the call site.
#[derive(Debug, Clone, Copy)]
pub struct FunctionContext<'a> {
    pub name: &'a str,
    pub field: &'a str,
    /// Declared type of `field`, `None` when unmapped.
    pub field_type: Option<FieldType>,
    pub params: &'a [FunctionParam],
}

impl<'a> FunctionContext<'a> {
    pub fn param(&self, name: &str) -> Option<&'a Value> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn required(&self, name: &str) -> Result<&'a Value> {
        self.param(name)
            .ok_or_else(|| self.error(format!("{name} parameter is required")))
    }

    pub fn error<S: Into<String>>(&self, message: S) -> XluceneError {
        XluceneError::function(self.name, message)
    }

    /// Parse a required geo point parameter.
    pub fn geo_point(&self, name: &str) -> Result<GeoPoint> {
        let value = self.required(name)?;
        parse_geo_point(value).map_err(|e| self.error(format!("{name} parameter: {e}")))
    }

    /// The field's geo type; unmapped fields are treated as geo points.
    pub fn geo_field_type(&self) -> Result<FieldType> {
        match self.field_type {
            None => Ok(FieldType::GeoPoint),
            Some(t) if t.is_geo() => Ok(t),
            Some(t) => Err(self.error(format!(
                "field \"{}\" must be a geo-point or geo-json field, got {t}",
                self.field
            ))),
        }
    }
}

/// Lookup table of available functions.
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: AHashMap<String, Arc<dyn FunctionDefinition>>,
}

impl FunctionRegistry {
    /// A registry without any functions.
    pub fn empty() -> Self {
        FunctionRegistry {
            functions: AHashMap::new(),
        }
    }

    /// Register (or replace) a function under its own name.
    pub fn register(&mut self, function: Arc<dyn FunctionDefinition>) {
        self.functions.insert(function.name().to_string(), function);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, function: Arc<dyn FunctionDefinition>) -> Self {
        self.register(function);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn FunctionDefinition>> {
        self.functions.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve and instantiate a call.
    pub fn create(&self, context: &FunctionContext<'_>) -> Result<Arc<dyn FunctionInstance>> {
        let definition = self.get(context.name).ok_or_else(|| {
            XluceneError::function(
                context.name,
                format!("could not find an xlucene function with name \"{}\"", context.name),
            )
        })?;
        definition.create(context)
    }
}

impl Default for FunctionRegistry {
    /// The built-in geo functions.
    fn default() -> Self {
        FunctionRegistry::empty()
            .with(Arc::new(GeoDistanceFunction))
            .with(Arc::new(GeoBoxFunction))
            .with(Arc::new(GeoPolygonFunction))
            .with(Arc::new(GeoContainsPointFunction))
    }
}

impl Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn params(pairs: &[(&str, Value)]) -> Vec<FunctionParam> {
        pairs
            .iter()
            .map(|(name, value)| FunctionParam {
                name: name.to_string(),
                value: value.clone(),
            })
            .collect()
    }

    #[test]
    fn test_builtin_names() {
        let registry = FunctionRegistry::default();
        assert_eq!(
            registry.names(),
            vec!["geoBox", "geoContainsPoint", "geoDistance", "geoPolygon"]
        );
    }

    #[test]
    fn test_unknown_function() {
        let registry = FunctionRegistry::default();
        let params = params(&[]);
        let context = FunctionContext {
            name: "geoNope",
            field: "location",
            field_type: None,
            params: &params,
        };
        let err = registry.create(&context).unwrap_err();
        assert!(err.to_string().contains("could not find an xlucene function"));
    }

    #[test]
    fn test_context_helpers() {
        let params = params(&[("point", json!("33.4,-111.8"))]);
        let context = FunctionContext {
            name: "geoDistance",
            field: "location",
            field_type: Some(FieldType::String),
            params: &params,
        };
        assert_eq!(context.geo_point("point").unwrap().lat, 33.4);
        assert!(context.required("distance").is_err());
        assert!(context.geo_field_type().is_err());
    }
}
