//! Evaluate an xlucene AST directly against JSON records.
//!
//! The AST is compiled once into a predicate tree; evaluation then only walks
//! the record. Array-valued fields match when any element matches and an
//! empty query matches every record.
//!
//! Nodes the matcher cannot evaluate (a term on a geo field, a regex that
//! does not compile) never match. They are listed by
//! [`DocumentMatcher::unsupported`] so callers can tell "no match" from "not
//! evaluable".
//!
//! ```
//! use serde_json::json;
//! use xlucene::matcher::DocumentMatcher;
//! use xlucene::parser::{Variables, parse};
//! use xlucene::types::{FieldType, TypeConfig};
//!
//! let config = TypeConfig::new()
//!     .with_field("a", FieldType::Integer)
//!     .with_field("b", FieldType::Integer);
//! let ast = parse("a:1 AND b:1", &config, &Variables::new()).unwrap();
//! let matcher = DocumentMatcher::new(&ast);
//!
//! assert!(matcher.matches(&json!({"a": 1, "b": 1})));
//! assert!(!matcher.matches(&json!({"a": 1, "b": 2})));
//! ```

mod compile;
pub mod date;
pub mod field;
pub mod ip;

use serde_json::Value;
use tracing::trace;

use crate::ast::Node;
use crate::matcher::compile::{Plan, compile_node};

/// A compiled record predicate.
#[derive(Debug, Clone)]
pub struct DocumentMatcher {
    plan: Plan,
}

impl DocumentMatcher {
    pub fn new(node: &Node) -> Self {
        let plan = compile_node(node);
        trace!(kind = node.kind(), "compiled document matcher");
        DocumentMatcher { plan }
    }

    /// Whether `record` satisfies the query.
    pub fn matches(&self, record: &Value) -> bool {
        self.plan.eval(record)
    }

    /// Descriptions of the nodes that could not be compiled.
    pub fn unsupported(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.plan.collect_unsupported(&mut out);
        out
    }

    /// Whether every node of the query could be compiled.
    pub fn is_complete(&self) -> bool {
        self.unsupported().is_empty()
    }

    /// Turn into a plain closure.
    pub fn into_predicate(self) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
        move |record| self.matches(record)
    }
}

/// Compile `node` into a boxed predicate.
pub fn compile(node: &Node) -> Box<dyn Fn(&Value) -> bool + Send + Sync> {
    Box::new(DocumentMatcher::new(node).into_predicate())
}
