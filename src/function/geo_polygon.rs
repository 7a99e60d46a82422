//! `geoPolygon(points, [relation])`
//!
//! On geo-point fields only "inside" and "outside" make sense, so `within`,
//! `contains` and `intersects` all test containment and `disjoint` negates
//! it. Geo-json fields evaluate the full relation.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::Result;
use crate::function::{FunctionContext, FunctionDefinition, FunctionInstance, FunctionQuery};
use crate::geo::{GeoRelation, GeoShape, Polygon, parse_geo_point};
use crate::translator::TranslatorOptions;
use crate::types::FieldType;

#[derive(Debug, Clone, Copy, Default)]
pub struct GeoPolygonFunction;

impl FunctionDefinition for GeoPolygonFunction {
    fn name(&self) -> &'static str {
        "geoPolygon"
    }

    fn create(&self, context: &FunctionContext<'_>) -> Result<Arc<dyn FunctionInstance>> {
        let field_type = context.geo_field_type()?;

        let raw = context.required("points")?;
        let items = raw
            .as_array()
            .ok_or_else(|| context.error(format!("points parameter must be a list, got {raw}")))?;
        let points = items
            .iter()
            .map(|item| {
                parse_geo_point(item).map_err(|e| context.error(format!("points parameter: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        let polygon = Polygon::new(points)
            .map_err(|_| context.error("points parameter must have at least three geo-points"))?;

        let relation = match context.param("relation") {
            None => GeoRelation::default(),
            Some(Value::String(s)) => s.parse::<GeoRelation>().map_err(|_| {
                context.error(format!(
                    "relation must be one of within, contains, intersects, disjoint, got \"{s}\""
                ))
            })?,
            Some(other) => {
                return Err(context.error(format!("relation must be a string, got {other}")));
            }
        };

        Ok(Arc::new(GeoPolygonMatch {
            field_type,
            polygon,
            relation,
        }))
    }
}

#[derive(Debug, Clone)]
pub struct GeoPolygonMatch {
    field_type: FieldType,
    polygon: Polygon,
    relation: GeoRelation,
}

impl GeoPolygonMatch {
    fn points_json(&self) -> Value {
        Value::Array(self.polygon.exterior.iter().map(|p| p.to_json()).collect())
    }
}

impl FunctionInstance for GeoPolygonMatch {
    fn matches(&self, value: &Value) -> bool {
        let Some(shape) = GeoShape::from_value(value) else {
            return false;
        };
        match (self.field_type, shape) {
            (FieldType::GeoJson, shape) => shape.relates_to(&self.polygon, self.relation),
            (_, GeoShape::Point(p)) => {
                let inside = self.polygon.contains_point(&p);
                if self.relation == GeoRelation::Disjoint {
                    !inside
                } else {
                    inside
                }
            }
            (_, shape) => shape.relates_to(&self.polygon, self.relation),
        }
    }

    fn to_elasticsearch_query(
        &self,
        field: &str,
        _options: &TranslatorOptions,
    ) -> Option<FunctionQuery> {
        let query = match self.field_type {
            FieldType::GeoJson => json!({
                "geo_shape": {
                    field: {
                        "shape": {
                            "type": "polygon",
                            "coordinates": self.polygon.to_coordinates(),
                        },
                        "relation": self.relation.as_str(),
                    }
                }
            }),
            _ => {
                let inside = json!({
                    "geo_polygon": {
                        field: { "points": self.points_json() }
                    }
                });
                if self.relation == GeoRelation::Disjoint {
                    json!({ "bool": { "must_not": [inside] } })
                } else {
                    inside
                }
            }
        };
        Some(FunctionQuery::new(query))
    }
}
