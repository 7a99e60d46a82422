//! The xlucene abstract syntax tree.
//!
//! [`Node`] is a closed sum type; every consumer (walkers, the document
//! matcher, the translator) matches on it exhaustively. Nodes are built by
//! the parser and never mutated afterwards; passes that change annotations
//! (coercion, default-field propagation) build new nodes.
//!
//! Nodes serialize with a `type` tag:
//!
//! ```
//! use xlucene::ast::{Node, Scalar, Term};
//! use xlucene::types::FieldType;
//!
//! let node = Node::Term(Term::new(Some("a"), FieldType::Integer, Scalar::Integer(1)));
//! let json = serde_json::to_value(&node).unwrap();
//! assert_eq!(json["type"], "term");
//! assert_eq!(json["value"], 1);
//! ```

pub mod walk;

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::function::FunctionInstance;
use crate::geo::{DistanceUnit, GeoPoint};
use crate::types::FieldType;

/// A scalar term value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Scalar {
    /// Convert a JSON scalar. Arrays, objects and null yield `None`.
    pub fn from_json(value: &Value) -> Option<Scalar> {
        match value {
            Value::String(s) => Some(Scalar::String(s.clone())),
            Value::Bool(b) => Some(Scalar::Boolean(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Scalar::Integer(i)),
                None => n.as_f64().map(Scalar::Float),
            },
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::String(s) => Value::String(s.clone()),
            Scalar::Integer(i) => Value::from(*i),
            Scalar::Float(f) => Value::from(*f),
            Scalar::Boolean(b) => Value::Bool(*b),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::String(s) => s.parse().ok(),
            Scalar::Boolean(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Comparison operator of a range bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeOperator {
    Gte,
    Gt,
    Lte,
    Lt,
}

impl RangeOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeOperator::Gte => "gte",
            RangeOperator::Gt => "gt",
            RangeOperator::Lte => "lte",
            RangeOperator::Lt => "lt",
        }
    }

    pub fn is_inclusive(&self) -> bool {
        matches!(self, RangeOperator::Gte | RangeOperator::Lte)
    }

    /// Whether this operator bounds values from below.
    pub fn is_lower(&self) -> bool {
        matches!(self, RangeOperator::Gte | RangeOperator::Gt)
    }
}

/// A range bound value; `*` is unbounded.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeValue {
    Infinity,
    Value(Scalar),
}

impl RangeValue {
    pub fn scalar(&self) -> Option<&Scalar> {
        match self {
            RangeValue::Infinity => None,
            RangeValue::Value(v) => Some(v),
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, RangeValue::Infinity)
    }
}

impl Serialize for RangeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RangeValue::Infinity => serializer.serialize_str("*"),
            RangeValue::Value(v) => v.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeBound {
    pub operator: RangeOperator,
    pub value: RangeValue,
}

impl RangeBound {
    pub fn new(operator: RangeOperator, value: RangeValue) -> Self {
        RangeBound { operator, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Term {
    pub field: Option<String>,
    pub field_type: FieldType,
    pub value: Scalar,
    pub quoted: bool,
    pub restricted: bool,
    pub tokenizer: bool,
}

impl Term {
    pub fn new(field: Option<&str>, field_type: FieldType, value: Scalar) -> Self {
        Term {
            field: field.map(str::to_string),
            field_type,
            value,
            quoted: false,
            restricted: false,
            tokenizer: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Range {
    pub field: Option<String>,
    pub field_type: FieldType,
    pub left: RangeBound,
    pub right: Option<RangeBound>,
}

impl Range {
    /// Both bounds, lower first.
    pub fn bounds(&self) -> impl Iterator<Item = &RangeBound> {
        std::iter::once(&self.left).chain(self.right.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Regexp {
    pub field: Option<String>,
    pub field_type: FieldType,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wildcard {
    pub field: Option<String>,
    pub field_type: FieldType,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exists {
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoDistance {
    pub field: String,
    pub field_type: FieldType,
    pub lat: f64,
    pub lon: f64,
    pub distance: f64,
    pub unit: DistanceUnit,
}

impl GeoDistance {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoBox {
    pub field: String,
    pub field_type: FieldType,
    pub top_left: GeoPoint,
    pub bottom_right: GeoPoint,
}

/// A named function parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionParam {
    pub name: String,
    pub value: Value,
}

/// A `field:name(params...)` invocation with its resolved implementation.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionCall {
    pub field: String,
    pub name: String,
    pub params: Vec<FunctionParam>,
    #[serde(skip)]
    pub instance: Arc<dyn FunctionInstance>,
}

impl PartialEq for FunctionCall {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.name == other.name && self.params == other.params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Negation {
    pub node: Box<Node>,
}

/// Nodes ANDed together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conjunction {
    pub nodes: Vec<Node>,
}

impl Conjunction {
    pub fn new(nodes: Vec<Node>) -> Self {
        Conjunction { nodes }
    }
}

/// Conjunctions ORed together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalGroup {
    pub flow: Vec<Conjunction>,
}

/// A logical group whose children default to `field`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldGroup {
    pub field: String,
    pub flow: Vec<Conjunction>,
}

/// An xlucene AST node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Node {
    Term(Term),
    Range(Range),
    Regexp(Regexp),
    Wildcard(Wildcard),
    Exists(Exists),
    GeoDistance(GeoDistance),
    GeoBoundingBox(GeoBox),
    Function(FunctionCall),
    Negation(Negation),
    Conjunction(Conjunction),
    LogicalGroup(LogicalGroup),
    FieldGroup(FieldGroup),
    Empty,
}

impl Node {
    /// The `type` tag of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Term(_) => "term",
            Node::Range(_) => "range",
            Node::Regexp(_) => "regexp",
            Node::Wildcard(_) => "wildcard",
            Node::Exists(_) => "exists",
            Node::GeoDistance(_) => "geo-distance",
            Node::GeoBoundingBox(_) => "geo-bounding-box",
            Node::Function(_) => "function",
            Node::Negation(_) => "negation",
            Node::Conjunction(_) => "conjunction",
            Node::LogicalGroup(_) => "logical-group",
            Node::FieldGroup(_) => "field-group",
            Node::Empty => "empty",
        }
    }

    /// Field this node applies to, if it names one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Node::Term(n) => n.field.as_deref(),
            Node::Range(n) => n.field.as_deref(),
            Node::Regexp(n) => n.field.as_deref(),
            Node::Wildcard(n) => n.field.as_deref(),
            Node::Exists(n) => Some(&n.field),
            Node::GeoDistance(n) => Some(&n.field),
            Node::GeoBoundingBox(n) => Some(&n.field),
            Node::Function(n) => Some(&n.field),
            Node::FieldGroup(n) => Some(&n.field),
            Node::Negation(_) | Node::Conjunction(_) | Node::LogicalGroup(_) | Node::Empty => None,
        }
    }

    /// Declared type of a term-like node.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Node::Term(n) => Some(n.field_type),
            Node::Range(n) => Some(n.field_type),
            Node::Regexp(n) => Some(n.field_type),
            Node::Wildcard(n) => Some(n.field_type),
            Node::GeoDistance(n) => Some(n.field_type),
            Node::GeoBoundingBox(n) => Some(n.field_type),
            _ => None,
        }
    }

    /// Term-like nodes are concrete field predicates.
    pub fn is_term_like(&self) -> bool {
        matches!(
            self,
            Node::Term(_)
                | Node::Range(_)
                | Node::Regexp(_)
                | Node::Wildcard(_)
                | Node::GeoDistance(_)
                | Node::GeoBoundingBox(_)
                | Node::Function(_)
        )
    }

    pub fn is_empty(&self) -> bool {
        walk::is_empty_ast(self)
    }
}
