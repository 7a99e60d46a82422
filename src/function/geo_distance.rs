//! `geoDistance(point, distance, [unit])`

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::Result;
use crate::function::{FunctionContext, FunctionDefinition, FunctionInstance, FunctionQuery};
use crate::geo::{Distance, DistanceUnit, GeoPoint, GeoShape};
use crate::translator::{TranslatorOptions, geo_distance_sort};
use crate::types::FieldType;

#[derive(Debug, Clone, Copy, Default)]
pub struct GeoDistanceFunction;

impl FunctionDefinition for GeoDistanceFunction {
    fn name(&self) -> &'static str {
        "geoDistance"
    }

    fn create(&self, context: &FunctionContext<'_>) -> Result<Arc<dyn FunctionInstance>> {
        let field_type = context.geo_field_type()?;
        let point = context.geo_point("point")?;
        let distance = parse_distance(context)?;

        Ok(Arc::new(GeoDistanceMatch::new(field_type, point, distance)))
    }
}

/// The `unit` parameter only applies to distances that carry no unit of
/// their own.
fn parse_distance(context: &FunctionContext<'_>) -> Result<Distance> {
    let raw = context.required("distance")?;
    let mut distance =
        Distance::parse(raw).map_err(|e| context.error(format!("distance parameter: {e}")))?;

    if let Some(unit) = context.param("unit") {
        let unit: DistanceUnit = unit
            .as_str()
            .ok_or_else(|| context.error(format!("unit parameter must be a string, got {unit}")))?
            .parse()
            .map_err(|e| context.error(format!("unit parameter: {e}")))?;
        let unitless = match raw {
            Value::Number(_) => true,
            Value::String(s) => s.trim().chars().all(|c| c.is_ascii_digit() || c == '.'),
            _ => false,
        };
        if unitless {
            distance.unit = unit;
        }
    }

    Ok(distance)
}

#[derive(Debug, Clone)]
pub struct GeoDistanceMatch {
    field_type: FieldType,
    point: GeoPoint,
    distance: Distance,
}

impl GeoDistanceMatch {
    pub fn new(field_type: FieldType, point: GeoPoint, distance: Distance) -> Self {
        GeoDistanceMatch {
            field_type,
            point,
            distance,
        }
    }

    pub fn point(&self) -> GeoPoint {
        self.point
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }
}

impl FunctionInstance for GeoDistanceMatch {
    fn matches(&self, value: &Value) -> bool {
        let radius = self.distance.in_meters();
        match GeoShape::from_value(value) {
            Some(GeoShape::Point(p)) => p.distance_to(&self.point) <= radius,
            Some(shape) => shape.contains_point(&self.point),
            None => false,
        }
    }

    fn to_elasticsearch_query(
        &self,
        field: &str,
        options: &TranslatorOptions,
    ) -> Option<FunctionQuery> {
        match self.field_type {
            FieldType::GeoJson => Some(FunctionQuery::new(json!({
                "geo_shape": {
                    field: {
                        "shape": {
                            "type": "circle",
                            "coordinates": self.point.to_coordinates(),
                            "radius": self.distance.to_string(),
                        },
                        "relation": "intersects",
                    }
                }
            }))),
            _ => {
                let query = json!({
                    "geo_distance": {
                        "distance": self.distance.to_string(),
                        field: self.point.to_json(),
                    }
                });
                let unit = options.geo_sort_unit.unwrap_or(self.distance.unit);
                let sort = geo_distance_sort(field, &self.point, options.geo_sort_order, unit);
                Some(FunctionQuery::new(query).with_sort(sort))
            }
        }
    }
}
