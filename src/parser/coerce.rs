//! Type coercion pass.
//!
//! Turns the lexically typed raw AST into the typed AST: every term-like
//! node gets the type declared for its field (or keeps its lexical type when
//! the field is unmapped) and term values are converted accordingly.
//! Running the pass on its own output returns the same tree.

use crate::ast::{
    Conjunction, FieldGroup, LogicalGroup, Negation, Node, Range, RangeBound, RangeValue, Scalar,
    Term,
};
use crate::error::{Result, XluceneError};
use crate::types::{FieldResolution, FieldType, TypeConfig};

/// Coerce every node of `node` against `type_config`.
///
/// `query` is only used for error messages.
pub fn coerce(node: Node, type_config: &TypeConfig, query: &str) -> Result<Node> {
    Coercion { type_config, query }.node(node)
}

struct Coercion<'a> {
    type_config: &'a TypeConfig,
    query: &'a str,
}

impl Coercion<'_> {
    fn node(&self, node: Node) -> Result<Node> {
        Ok(match node {
            Node::Term(term) => Node::Term(self.term(term)?),
            Node::Range(range) => Node::Range(self.range(range)?),
            Node::Regexp(mut regexp) => {
                regexp.field_type = self.declared(regexp.field.as_deref(), FieldType::String);
                Node::Regexp(regexp)
            }
            Node::Wildcard(mut wildcard) => {
                wildcard.field_type = self.declared(wildcard.field.as_deref(), FieldType::String);
                Node::Wildcard(wildcard)
            }
            Node::GeoDistance(mut geo) => {
                geo.field_type = self.geo_type(&geo.field);
                Node::GeoDistance(geo)
            }
            Node::GeoBoundingBox(mut geo) => {
                geo.field_type = self.geo_type(&geo.field);
                Node::GeoBoundingBox(geo)
            }
            Node::Negation(negation) => Node::Negation(Negation {
                node: Box::new(self.node(*negation.node)?),
            }),
            Node::Conjunction(conj) => Node::Conjunction(self.conjunction(conj)?),
            Node::LogicalGroup(group) => Node::LogicalGroup(LogicalGroup {
                flow: self.flow(group.flow)?,
            }),
            Node::FieldGroup(group) => Node::FieldGroup(FieldGroup {
                flow: self.flow(group.flow)?,
                field: group.field,
            }),
            node @ (Node::Exists(_) | Node::Function(_) | Node::Empty) => node,
        })
    }

    fn conjunction(&self, conj: Conjunction) -> Result<Conjunction> {
        let nodes = conj
            .nodes
            .into_iter()
            .map(|n| self.node(n))
            .collect::<Result<Vec<_>>>()?;
        Ok(Conjunction::new(nodes))
    }

    fn flow(&self, flow: Vec<Conjunction>) -> Result<Vec<Conjunction>> {
        flow.into_iter().map(|c| self.conjunction(c)).collect()
    }

    fn resolve(&self, field: Option<&str>) -> FieldResolution {
        field
            .map(|f| self.type_config.resolve(f))
            .unwrap_or_default()
    }

    fn declared(&self, field: Option<&str>, fallback: FieldType) -> FieldType {
        self.resolve(field).field_type.unwrap_or(fallback)
    }

    fn geo_type(&self, field: &str) -> FieldType {
        match self.type_config.get(field) {
            Some(t) if t.is_geo() => t,
            _ => FieldType::GeoPoint,
        }
    }

    fn term(&self, mut term: Term) -> Result<Term> {
        let resolution = self.resolve(term.field.as_deref());
        let target = resolution.field_type.unwrap_or(term.field_type);

        term.value = coerce_scalar(term.value, target)
            .map_err(|message| self.error(term.field.as_deref(), message))?;
        term.field_type = target;
        term.tokenizer = resolution.tokenizer;
        if target != FieldType::String {
            term.quoted = false;
        }
        Ok(term)
    }

    fn range(&self, mut range: Range) -> Result<Range> {
        let target = self.declared(range.field.as_deref(), range.field_type);
        let field = range.field.as_deref();

        range.left = self.bound(range.left, target, field)?;
        range.right = range
            .right
            .map(|bound| self.bound(bound, target, field))
            .transpose()?;
        range.field_type = target;
        Ok(range)
    }

    fn bound(&self, bound: RangeBound, target: FieldType, field: Option<&str>) -> Result<RangeBound> {
        let value = match bound.value {
            RangeValue::Infinity => RangeValue::Infinity,
            RangeValue::Value(scalar) => {
                let coerced = match target {
                    // fractional bounds are kept as floats on integer fields
                    FieldType::Integer => coerce_scalar(scalar.clone(), FieldType::Integer)
                        .or_else(|e| coerce_scalar(scalar, FieldType::Float).map_err(|_| e)),
                    FieldType::Float => coerce_scalar(scalar, FieldType::Float),
                    _ => coerce_scalar(scalar, FieldType::String),
                };
                RangeValue::Value(coerced.map_err(|message| self.error(field, message))?)
            }
        };
        Ok(RangeBound::new(bound.operator, value))
    }

    fn error(&self, field: Option<&str>, message: String) -> XluceneError {
        let message = match field {
            Some(field) => format!("{message} for field \"{field}\""),
            None => message,
        };
        XluceneError::parse(self.query, message)
    }
}

/// Convert a scalar to the representation of `target`.
pub(crate) fn coerce_scalar(
    value: Scalar,
    target: FieldType,
) -> std::result::Result<Scalar, String> {
    match target {
        FieldType::Integer => match value {
            Scalar::Integer(i) => Ok(Scalar::Integer(i)),
            Scalar::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(Scalar::Integer(f as i64)),
            Scalar::String(s) => parse_integer(&s)
                .map(Scalar::Integer)
                .ok_or_else(|| format!("could not convert \"{s}\" to an integer")),
            other => Err(format!("could not convert {other} to an integer")),
        },
        FieldType::Float => match value {
            Scalar::Float(f) => Ok(Scalar::Float(f)),
            Scalar::Integer(i) => Ok(Scalar::Float(i as f64)),
            Scalar::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Scalar::Float)
                .ok_or_else(|| format!("could not convert \"{s}\" to a float")),
            other => Err(format!("could not convert {other} to a float")),
        },
        FieldType::Boolean => match value {
            Scalar::Boolean(b) => Ok(Scalar::Boolean(b)),
            Scalar::String(s) if s == "true" => Ok(Scalar::Boolean(true)),
            Scalar::String(s) if s == "false" => Ok(Scalar::Boolean(false)),
            other => Err(format!("could not convert \"{other}\" to a boolean")),
        },
        FieldType::String
        | FieldType::Date
        | FieldType::Ip
        | FieldType::GeoPoint
        | FieldType::GeoJson
        | FieldType::Object => Ok(match value {
            Scalar::String(s) => Scalar::String(s),
            other => Scalar::String(other.to_string()),
        }),
    }
}

/// Base-10 integer, also accepting whole floats like `3.0`.
fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(i);
    }
    let f = text.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}
