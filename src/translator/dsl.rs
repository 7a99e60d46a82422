//! Per-node clause construction.

use serde_json::{Map, Value, json};
use tracing::{trace, warn};

use crate::ast::{
    Conjunction, FunctionCall, GeoBox, GeoDistance, Node, Range, RangeValue, Regexp, Term, Wildcard,
};
use crate::geo::Distance;
use crate::translator::{TranslatorOptions, geo_distance_sort};
use crate::types::FieldType;
use crate::util::wildcard::has_wildcard;

/// Accumulates the sort and the dropped branches while clauses are built.
pub(crate) struct DslBuilder<'a> {
    options: &'a TranslatorOptions,
    sort: Option<Value>,
    unsupported: Vec<String>,
}

impl<'a> DslBuilder<'a> {
    pub(crate) fn new(options: &'a TranslatorOptions) -> Self {
        DslBuilder {
            options,
            sort: None,
            unsupported: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> (Option<Value>, Vec<String>) {
        (self.sort, self.unsupported)
    }

    /// The clause for `node`, or `None` when nothing could be rendered.
    pub(crate) fn clause(&mut self, node: &Node) -> Option<Value> {
        match node {
            Node::Term(term) => Some(self.term(term)),
            Node::Range(range) => Some(self.range(range)),
            Node::Regexp(regexp) => Some(self.regexp(regexp)),
            Node::Wildcard(wildcard) => Some(self.wildcard(wildcard)),
            Node::Exists(exists) => Some(self.per_field(&exists.field, |field| {
                json!({ "exists": { "field": field } })
            })),
            Node::GeoDistance(geo) => Some(self.geo_distance(geo)),
            Node::GeoBoundingBox(geo) => Some(geo_bounding_box(geo)),
            Node::Function(call) => self.function(call),
            Node::Negation(negation) => {
                let inner = self.clause(&negation.node)?;
                Some(json!({ "bool": { "must_not": [inner] } }))
            }
            Node::Conjunction(conj) => self.conjunction(conj),
            Node::LogicalGroup(group) => self.flow(&group.flow),
            Node::FieldGroup(group) => self.flow(&group.flow),
            Node::Empty => None,
        }
    }

    fn conjunction(&mut self, conj: &Conjunction) -> Option<Value> {
        let filter: Vec<Value> = conj.nodes.iter().filter_map(|n| self.clause(n)).collect();
        if filter.is_empty() {
            return None;
        }
        Some(json!({ "bool": { "filter": filter } }))
    }

    fn flow(&mut self, flow: &[Conjunction]) -> Option<Value> {
        let should: Vec<Value> = flow.iter().filter_map(|c| self.conjunction(c)).collect();
        if should.is_empty() {
            return None;
        }
        Some(json!({ "bool": { "should": should } }))
    }

    /// Build a clause per concrete field when `field` is a wildcard pattern.
    fn per_field<F>(&self, field: &str, build: F) -> Value
    where
        F: Fn(&str) -> Value,
    {
        if !has_wildcard(field) {
            return build(field);
        }
        let fields = self.options.type_config.matching(field);
        match fields.as_slice() {
            [] => build(field),
            [single] => build(single),
            many => {
                trace!(field, matches = many.len(), "expanding wildcard field");
                let should: Vec<Value> = many.iter().map(|f| build(f)).collect();
                json!({ "bool": { "should": should } })
            }
        }
    }

    fn term(&self, term: &Term) -> Value {
        let value = term.value.to_json();
        let Some(field) = term.field.as_deref() else {
            return json!({ "multi_match": { "query": value, "fields": ["*"] } });
        };

        let is_string = term.field_type == FieldType::String;
        let quoted = term.quoted;
        self.per_field(field, |field| {
            if is_string && quoted {
                json!({ "match_phrase": { field: { "query": value } } })
            } else if is_string {
                json!({ "match": { field: { "operator": "and", "query": value } } })
            } else {
                json!({ "term": { field: value } })
            }
        })
    }

    fn range(&self, range: &Range) -> Value {
        let mut bounds = Map::new();
        for bound in range.bounds() {
            if let RangeValue::Value(value) = &bound.value {
                bounds.insert(bound.operator.as_str().to_string(), value.to_json());
            }
        }
        let field = range.field.as_deref().unwrap_or("*");

        self.per_field(field, |field| {
            if bounds.is_empty() {
                // [* TO *] only requires a value
                json!({ "exists": { "field": field } })
            } else {
                json!({ "range": { field: bounds.clone() } })
            }
        })
    }

    fn regexp(&self, regexp: &Regexp) -> Value {
        match regexp.field.as_deref() {
            Some(field) => self.per_field(field, |field| {
                json!({ "regexp": { field: regexp.value } })
            }),
            None => json!({ "query_string": { "query": format!("/{}/", regexp.value) } }),
        }
    }

    fn wildcard(&self, wildcard: &Wildcard) -> Value {
        match wildcard.field.as_deref() {
            Some(field) => self.per_field(field, |field| {
                json!({ "wildcard": { field: wildcard.value } })
            }),
            None => json!({ "query_string": { "query": wildcard.value } }),
        }
    }

    fn geo_distance(&mut self, geo: &GeoDistance) -> Value {
        let point = geo.point();
        let distance = Distance::new(geo.distance, geo.unit);
        if geo.field_type == FieldType::GeoJson {
            return json!({
                "geo_shape": {
                    geo.field.as_str(): {
                        "shape": {
                            "type": "circle",
                            "coordinates": point.to_coordinates(),
                            "radius": distance.to_string(),
                        },
                        "relation": "intersects",
                    }
                }
            });
        }

        let unit = self.options.geo_sort_unit.unwrap_or(geo.unit);
        let sort = geo_distance_sort(&geo.field, &point, self.options.geo_sort_order, unit);
        self.add_sort(sort);
        json!({
            "geo_distance": {
                "distance": distance.to_string(),
                geo.field.as_str(): point.to_json(),
            }
        })
    }

    fn function(&mut self, call: &FunctionCall) -> Option<Value> {
        match call.instance.to_elasticsearch_query(&call.field, self.options) {
            Some(result) => {
                if let Some(sort) = result.sort {
                    self.add_sort(sort);
                }
                Some(result.query)
            }
            None => {
                self.unsupported
                    .push(format!("{}:{}(...)", call.field, call.name));
                None
            }
        }
    }

    /// The first sort wins.
    fn add_sort(&mut self, sort: Value) {
        if self.sort.is_some() {
            warn!(%sort, "dropping additional geo sort, only one is supported");
            return;
        }
        self.sort = Some(sort);
    }
}

fn geo_bounding_box(geo: &GeoBox) -> Value {
    if geo.field_type == FieldType::GeoJson {
        return json!({
            "geo_shape": {
                geo.field.as_str(): {
                    "shape": {
                        "type": "envelope",
                        "coordinates": [
                            geo.top_left.to_coordinates(),
                            geo.bottom_right.to_coordinates(),
                        ],
                    },
                    "relation": "within",
                }
            }
        });
    }
    json!({
        "geo_bounding_box": {
            geo.field.as_str(): {
                "top_left": geo.top_left.to_json(),
                "bottom_right": geo.bottom_right.to_json(),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{RangeBound, RangeOperator, Scalar};
    use crate::types::TypeConfig;

    fn build(node: &Node, options: &TranslatorOptions) -> Option<Value> {
        DslBuilder::new(options).clause(node)
    }

    fn string_term(field: &str, value: &str) -> Node {
        Node::Term(Term::new(Some(field), FieldType::String, Scalar::String(value.into())))
    }

    #[test]
    fn test_term_clauses() {
        let options = TranslatorOptions::default();
        assert_eq!(
            build(&string_term("name", "bob"), &options),
            Some(json!({"match": {"name": {"operator": "and", "query": "bob"}}}))
        );

        let mut quoted = Term::new(Some("name"), FieldType::String, Scalar::String("bob smith".into()));
        quoted.quoted = true;
        assert_eq!(
            build(&Node::Term(quoted), &options),
            Some(json!({"match_phrase": {"name": {"query": "bob smith"}}}))
        );

        let number = Node::Term(Term::new(Some("age"), FieldType::Integer, Scalar::Integer(3)));
        assert_eq!(build(&number, &options), Some(json!({"term": {"age": 3}})));

        let implicit = Node::Term(Term::new(None, FieldType::String, Scalar::String("hi".into())));
        assert_eq!(
            build(&implicit, &options),
            Some(json!({"multi_match": {"query": "hi", "fields": ["*"]}}))
        );
    }

    #[test]
    fn test_range_omits_infinite_bounds() {
        let range = Node::Range(Range {
            field: Some("age".into()),
            field_type: FieldType::Integer,
            left: RangeBound::new(RangeOperator::Gt, RangeValue::Value(Scalar::Integer(1))),
            right: Some(RangeBound::new(RangeOperator::Lte, RangeValue::Infinity)),
        });
        assert_eq!(
            build(&range, &TranslatorOptions::default()),
            Some(json!({"range": {"age": {"gt": 1}}}))
        );
    }

    #[test]
    fn test_wildcard_field_expansion() {
        let options = TranslatorOptions::default().with_type_config(
            TypeConfig::new()
                .with_field("field_one", FieldType::String)
                .with_field("field_two", FieldType::String)
                .with_field("other", FieldType::String),
        );
        assert_eq!(
            build(&string_term("field_*", "x"), &options),
            Some(json!({"bool": {"should": [
                {"match": {"field_one": {"operator": "and", "query": "x"}}},
                {"match": {"field_two": {"operator": "and", "query": "x"}}}
            ]}}))
        );
    }

    #[test]
    fn test_first_sort_wins() {
        let options = TranslatorOptions::default();
        let geo = |lat: f64| {
            Node::GeoDistance(GeoDistance {
                field: "location".into(),
                field_type: FieldType::GeoPoint,
                lat,
                lon: 0.0,
                distance: 10.0,
                unit: crate::geo::DistanceUnit::Kilometers,
            })
        };
        let mut builder = DslBuilder::new(&options);
        builder.clause(&Node::Conjunction(Conjunction::new(vec![geo(1.0), geo(2.0)])));
        let (sort, _) = builder.finish();
        assert_eq!(sort.unwrap()["_geo_distance"]["location"]["lat"], 1.0);
    }
}
