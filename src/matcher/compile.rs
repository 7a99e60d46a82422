//! AST to predicate plan compilation.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::ast::{
    Conjunction, FunctionCall, GeoBox, GeoDistance, Node, Range, RangeValue, Regexp, Scalar, Term,
    Wildcard,
};
use crate::function::FunctionInstance;
use crate::function::geo_box::GeoBoxMatch;
use crate::function::geo_distance::GeoDistanceMatch;
use crate::geo::{Distance, GeoBoundingBox};
use crate::matcher::date::{self, DateRange};
use crate::matcher::field::{FieldPath, leaves};
use crate::matcher::ip::{IpRange, parse_ip_range};
use crate::types::FieldType;
use crate::util::wildcard::compile_value_pattern;

/// A compiled predicate tree.
#[derive(Debug, Clone)]
pub(crate) enum Plan {
    Always,
    Leaf(Leaf),
    Not(Box<Plan>),
    All(Vec<Plan>),
    Any(Vec<Plan>),
    /// A node the matcher cannot evaluate; never matches.
    Unsupported(String),
}

impl Plan {
    pub(crate) fn eval(&self, record: &Value) -> bool {
        match self {
            Plan::Always => true,
            Plan::Leaf(leaf) => leaf.eval(record),
            Plan::Not(inner) => !inner.eval(record),
            Plan::All(plans) => plans.iter().all(|p| p.eval(record)),
            Plan::Any(plans) => plans.iter().any(|p| p.eval(record)),
            Plan::Unsupported(_) => false,
        }
    }

    pub(crate) fn collect_unsupported<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Plan::Unsupported(reason) => out.push(reason),
            Plan::Not(inner) => inner.collect_unsupported(out),
            Plan::All(plans) | Plan::Any(plans) => {
                plans.iter().for_each(|p| p.collect_unsupported(out))
            }
            Plan::Always | Plan::Leaf(_) => {}
        }
    }
}

/// A test applied to the values found at a field.
#[derive(Debug, Clone)]
pub(crate) struct Leaf {
    /// `None` tests every scalar leaf of the record.
    path: Option<FieldPath>,
    test: Test,
}

impl Leaf {
    fn eval(&self, record: &Value) -> bool {
        let values = match &self.path {
            Some(path) => path.resolve(record),
            None => leaves(record),
        };
        match &self.test {
            Test::Exists => !values.is_empty(),
            test => values.into_iter().any(|value| test.eval(value)),
        }
    }
}

#[derive(Debug, Clone)]
enum Test {
    Equals(Scalar),
    Tokens(Vec<String>),
    Number {
        lower: Option<(f64, bool)>,
        upper: Option<(f64, bool)>,
    },
    Text {
        lower: Option<(String, bool)>,
        upper: Option<(String, bool)>,
    },
    Date(DateRange),
    Ip(IpRange),
    Pattern(Regex),
    Exists,
    Geo(Arc<dyn FunctionInstance>),
}

impl Test {
    fn eval(&self, value: &Value) -> bool {
        match self {
            Test::Equals(expected) => scalar_equals(expected, value),
            Test::Tokens(wanted) => value.as_str().is_some_and(|text| {
                let tokens = tokenize(text);
                wanted.iter().all(|w| tokens.contains(w))
            }),
            Test::Number { lower, upper } => number_of(value).is_some_and(|n| {
                lower.is_none_or(|(bound, inclusive)| if inclusive { n >= bound } else { n > bound })
                    && upper
                        .is_none_or(|(bound, inclusive)| if inclusive { n <= bound } else { n < bound })
            }),
            Test::Text { lower, upper } => value.as_str().is_some_and(|s| {
                lower.as_ref().is_none_or(|(bound, inclusive)| {
                    if *inclusive { s >= bound.as_str() } else { s > bound.as_str() }
                }) && upper.as_ref().is_none_or(|(bound, inclusive)| {
                    if *inclusive { s <= bound.as_str() } else { s < bound.as_str() }
                })
            }),
            Test::Date(range) => date::value_millis(value).is_some_and(|t| range.contains(t)),
            Test::Ip(range) => value
                .as_str()
                .and_then(parse_ip_range)
                .is_some_and(|candidate| range.overlaps(&candidate)),
            Test::Pattern(regex) => match value {
                Value::String(s) => regex.is_match(s),
                Value::Number(n) => regex.is_match(&n.to_string()),
                _ => false,
            },
            Test::Exists => true,
            Test::Geo(instance) => instance.matches(value),
        }
    }
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_equals(expected: &Scalar, value: &Value) -> bool {
    match (expected, value) {
        (Scalar::String(e), Value::String(v)) => e == v,
        (Scalar::String(e), Value::Number(n)) => *e == n.to_string(),
        (Scalar::String(e), Value::Bool(b)) => *e == b.to_string(),
        (Scalar::Integer(_) | Scalar::Float(_), _) => {
            let expected = expected.as_f64();
            number_of(value).is_some_and(|n| Some(n) == expected)
        }
        (Scalar::Boolean(e), Value::Bool(b)) => e == b,
        (Scalar::Boolean(e), Value::String(s)) => *s == e.to_string(),
        _ => false,
    }
}

/// Lowercase alphanumeric tokens.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Compile `node` into a plan.
pub(crate) fn compile_node(node: &Node) -> Plan {
    match node {
        Node::Empty => Plan::Always,
        Node::Term(term) => compile_term(term),
        Node::Range(range) => compile_range(range),
        Node::Regexp(regexp) => compile_regexp(regexp),
        Node::Wildcard(wildcard) => compile_wildcard(wildcard),
        Node::Exists(exists) => leaf(Some(FieldPath::new(&exists.field)), Test::Exists),
        Node::GeoDistance(geo) => compile_geo_distance(geo),
        Node::GeoBoundingBox(geo) => compile_geo_box(geo),
        Node::Function(call) => compile_function(call),
        Node::Negation(negation) => Plan::Not(Box::new(compile_node(&negation.node))),
        Node::Conjunction(conj) => compile_conjunction(conj),
        Node::LogicalGroup(group) => compile_flow(&group.flow),
        Node::FieldGroup(group) => compile_flow(&group.flow),
    }
}

fn compile_conjunction(conj: &Conjunction) -> Plan {
    Plan::All(conj.nodes.iter().map(compile_node).collect())
}

fn compile_flow(flow: &[Conjunction]) -> Plan {
    Plan::Any(flow.iter().map(compile_conjunction).collect())
}

fn leaf(path: Option<FieldPath>, test: Test) -> Plan {
    Plan::Leaf(Leaf { path, test })
}

fn unsupported(node: &Node, reason: &str) -> Plan {
    let description = format!("{} on {}: {reason}", node.kind(), node.field().unwrap_or("*"));
    debug!(%description, "matcher node is unsupported");
    Plan::Unsupported(description)
}

fn compile_term(term: &Term) -> Plan {
    let field = term.field.as_deref();

    if term.tokenizer {
        // search the container value the sub-field is a token of
        let parent = field.and_then(|f| f.rsplit_once('.')).map(|(parent, _)| parent);
        let wanted = tokenize(&term.value.to_string());
        return leaf(parent.map(FieldPath::new), Test::Tokens(wanted));
    }

    let path = field.map(FieldPath::new);
    let node = || Node::Term(term.clone());
    match term.field_type {
        FieldType::String | FieldType::Integer | FieldType::Float | FieldType::Boolean => {
            leaf(path, Test::Equals(term.value.clone()))
        }
        FieldType::Date => match date::scalar_millis(&term.value) {
            Some(t) => leaf(path, Test::Date(DateRange { min: t, max: t })),
            None => unsupported(&node(), "value is not a date"),
        },
        FieldType::Ip => match term.value.as_str().and_then(parse_ip_range) {
            Some(range) => leaf(path, Test::Ip(range)),
            None => unsupported(&node(), "value is not an ip address or range"),
        },
        FieldType::GeoPoint | FieldType::GeoJson | FieldType::Object => {
            unsupported(&node(), "term queries are not supported for this field type")
        }
    }
}

fn compile_range(range: &Range) -> Plan {
    let path = range.field.as_deref().map(FieldPath::new);
    let node = || Node::Range(range.clone());

    match range.field_type {
        FieldType::Integer | FieldType::Float => {
            let mut lower = None;
            let mut upper = None;
            for bound in range.bounds() {
                let RangeValue::Value(scalar) = &bound.value else {
                    continue;
                };
                let Some(n) = scalar.as_f64() else {
                    return unsupported(&node(), "bound is not a number");
                };
                let side = Some((n, bound.operator.is_inclusive()));
                if bound.operator.is_lower() {
                    lower = side;
                } else {
                    upper = side;
                }
            }
            leaf(path, Test::Number { lower, upper })
        }
        FieldType::Date => match DateRange::from_bounds(range.bounds()) {
            Some(dates) => leaf(path, Test::Date(dates)),
            None => unsupported(&node(), "bound is not a date"),
        },
        FieldType::Ip => match IpRange::from_bounds(range.bounds()) {
            Some(ips) => leaf(path, Test::Ip(ips)),
            None => unsupported(&node(), "bound is not an ip address"),
        },
        FieldType::String => {
            let mut lower = None;
            let mut upper = None;
            for bound in range.bounds() {
                if let RangeValue::Value(scalar) = &bound.value {
                    let side = Some((scalar.to_string(), bound.operator.is_inclusive()));
                    if bound.operator.is_lower() {
                        lower = side;
                    } else {
                        upper = side;
                    }
                }
            }
            leaf(path, Test::Text { lower, upper })
        }
        FieldType::Boolean | FieldType::GeoPoint | FieldType::GeoJson | FieldType::Object => {
            unsupported(&node(), "range queries are not supported for this field type")
        }
    }
}

fn compile_regexp(regexp: &Regexp) -> Plan {
    match Regex::new(&format!("^(?:{})$", regexp.value)) {
        Ok(regex) => leaf(
            regexp.field.as_deref().map(FieldPath::new),
            Test::Pattern(regex),
        ),
        Err(e) => unsupported(&Node::Regexp(regexp.clone()), &e.to_string()),
    }
}

fn compile_wildcard(wildcard: &Wildcard) -> Plan {
    match compile_value_pattern(&wildcard.value) {
        Ok(regex) => leaf(
            wildcard.field.as_deref().map(FieldPath::new),
            Test::Pattern(regex),
        ),
        Err(e) => unsupported(&Node::Wildcard(wildcard.clone()), &e.to_string()),
    }
}

fn compile_geo_distance(geo: &GeoDistance) -> Plan {
    let instance = GeoDistanceMatch::new(
        geo.field_type,
        geo.point(),
        Distance::new(geo.distance, geo.unit),
    );
    leaf(
        Some(FieldPath::new(&geo.field).geo()),
        Test::Geo(Arc::new(instance)),
    )
}

fn compile_geo_box(geo: &GeoBox) -> Plan {
    match GeoBoundingBox::new(geo.top_left, geo.bottom_right) {
        Ok(bbox) => leaf(
            Some(FieldPath::new(&geo.field).geo()),
            Test::Geo(Arc::new(GeoBoxMatch::new(geo.field_type, bbox))),
        ),
        Err(e) => unsupported(&Node::GeoBoundingBox(geo.clone()), &e.to_string()),
    }
}

fn compile_function(call: &FunctionCall) -> Plan {
    trace!(field = %call.field, function = %call.name, "compiling function matcher");
    leaf(
        Some(FieldPath::new(&call.field).geo()),
        Test::Geo(Arc::clone(&call.instance)),
    )
}
