//! xlucene query parsing.
//!
//! Parsing runs in two phases. The grammar builds a raw AST whose values are
//! only lexically typed, then the coercion pass converts every term-like
//! node to the type declared for its field in the [`TypeConfig`].
//!
//! ```
//! use xlucene::ast::{Node, Scalar};
//! use xlucene::parser::{Parser, Variables};
//! use xlucene::types::{FieldType, TypeConfig};
//!
//! let parser = Parser::new(TypeConfig::new().with_field("count", FieldType::Float));
//! let ast = parser.parse("count:10", &Variables::new()).unwrap();
//!
//! match ast {
//!     Node::Term(term) => assert_eq!(term.value, Scalar::Float(10.0)),
//!     other => panic!("unexpected node {other:?}"),
//! }
//! ```

pub mod cached;
mod coerce;
mod grammar;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::ast::Node;
use crate::error::Result;
use crate::function::FunctionRegistry;
use crate::types::TypeConfig;

pub use cached::CachedParser;
pub use coerce::coerce;

/// Values for `$name` references in a query.
pub type Variables = serde_json::Map<String, Value>;

/// Parser behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Drop terms whose variable is missing or null instead of failing.
    pub filter_nil_variables: bool,
}

impl ParserOptions {
    pub fn with_filter_nil_variables(mut self, filter: bool) -> Self {
        self.filter_nil_variables = filter;
        self
    }
}

/// Parses query strings against a type config.
#[derive(Debug, Clone)]
pub struct Parser {
    type_config: TypeConfig,
    registry: Arc<FunctionRegistry>,
    options: ParserOptions,
}

impl Parser {
    /// Create a parser with the builtin functions and default options.
    pub fn new(type_config: TypeConfig) -> Self {
        Parser {
            type_config,
            registry: Arc::new(FunctionRegistry::default()),
            options: ParserOptions::default(),
        }
    }

    pub fn with_registry(mut self, registry: Arc<FunctionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn type_config(&self) -> &TypeConfig {
        &self.type_config
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse `query`, substituting `variables`, into a typed AST.
    pub fn parse(&self, query: &str, variables: &Variables) -> Result<Node> {
        let context = grammar::GrammarContext {
            type_config: &self.type_config,
            registry: &self.registry,
            variables,
            filter_nil_variables: self.options.filter_nil_variables,
        };
        let raw = grammar::parse_query(query, &context)?;
        let node = coerce::coerce(raw, &self.type_config, query)?;
        debug!(query, kind = node.kind(), "parsed xlucene query");
        Ok(node)
    }
}

/// Parse `query` with the builtin functions and default options.
pub fn parse(query: &str, type_config: &TypeConfig, variables: &Variables) -> Result<Node> {
    Parser::new(type_config.clone()).parse(query, variables)
}
