//! # xlucene
//!
//! A Lucene-syntax query engine for JSON records.
//!
//! ## Features
//!
//! - Recursive descent parser with field-type coercion and `$variables`
//! - Geo functions: `geoDistance`, `geoBox`, `geoPolygon`, `geoContainsPoint`
//! - In-memory document matcher over `serde_json::Value` records
//! - Translator to the Elasticsearch Query DSL
//! - Field level query access control
//!
//! ```
//! use serde_json::json;
//! use xlucene::prelude::*;
//!
//! let config = TypeConfig::new()
//!     .with_field("name", FieldType::String)
//!     .with_field("age", FieldType::Integer);
//! let ast = parse("name:bob AND age:>=21", &config, &Variables::new()).unwrap();
//!
//! assert!(DocumentMatcher::new(&ast).matches(&json!({"name": "bob", "age": 30})));
//!
//! let dsl = to_elasticsearch_dsl(&ast, &config, &TranslatorOptions::default());
//! assert!(dsl.is_complete());
//! ```

pub mod ast;
pub mod error;
pub mod function;
pub mod geo;
pub mod matcher;
pub mod parser;
pub mod query_access;
pub mod translator;
pub mod types;
pub mod util;

pub mod prelude {
    pub use crate::ast::{Node, Scalar};
    pub use crate::error::{Result, XluceneError};
    pub use crate::function::{FunctionDefinition, FunctionInstance, FunctionRegistry};
    pub use crate::matcher::DocumentMatcher;
    pub use crate::parser::{CachedParser, Parser, ParserOptions, Variables, parse};
    pub use crate::query_access::{QueryAccess, QueryAccessConfig, RestrictOptions};
    pub use crate::translator::{
        CachedTranslator, ElasticsearchDsl, SortOrder, Translator, TranslatorOptions,
        to_elasticsearch_dsl,
    };
    pub use crate::types::{FieldType, TypeConfig};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
