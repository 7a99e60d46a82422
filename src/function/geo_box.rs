//! `geoBox(top_left, bottom_right)`

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::Result;
use crate::function::{FunctionContext, FunctionDefinition, FunctionInstance, FunctionQuery};
use crate::geo::{GeoBoundingBox, GeoShape};
use crate::translator::TranslatorOptions;
use crate::types::FieldType;

#[derive(Debug, Clone, Copy, Default)]
pub struct GeoBoxFunction;

impl FunctionDefinition for GeoBoxFunction {
    fn name(&self) -> &'static str {
        "geoBox"
    }

    fn create(&self, context: &FunctionContext<'_>) -> Result<Arc<dyn FunctionInstance>> {
        let field_type = context.geo_field_type()?;
        let top_left = context.geo_point("top_left")?;
        let bottom_right = context.geo_point("bottom_right")?;
        let bbox = GeoBoundingBox::new(top_left, bottom_right)
            .map_err(|e| context.error(e.to_string()))?;

        Ok(Arc::new(GeoBoxMatch::new(field_type, bbox)))
    }
}

#[derive(Debug, Clone)]
pub struct GeoBoxMatch {
    field_type: FieldType,
    bbox: GeoBoundingBox,
}

impl GeoBoxMatch {
    pub fn new(field_type: FieldType, bbox: GeoBoundingBox) -> Self {
        GeoBoxMatch { field_type, bbox }
    }
}

impl FunctionInstance for GeoBoxMatch {
    fn matches(&self, value: &Value) -> bool {
        match GeoShape::from_value(value) {
            Some(GeoShape::Point(p)) => self.bbox.contains(&p),
            Some(GeoShape::Polygon(polygon)) => {
                polygon.exterior.iter().all(|p| self.bbox.contains(p))
            }
            Some(GeoShape::MultiPolygon(polygons)) => polygons
                .iter()
                .all(|polygon| polygon.exterior.iter().all(|p| self.bbox.contains(p))),
            None => false,
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
                            "type": "envelope",
                            "coordinates": [
                                self.bbox.top_left.to_coordinates(),
                                self.bbox.bottom_right.to_coordinates(),
                            ],
                        },
                        "relation": "within",
                    }
                }
            }),
            _ => json!({
                "geo_bounding_box": {
                    field: {
                        "top_left": self.bbox.top_left.to_json(),
                        "bottom_right": self.bbox.bottom_right.to_json(),
                    }
                }
            }),
        };
        Some(FunctionQuery::new(query))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ast::FunctionParam;

    fn create(
        field_type: Option<FieldType>,
        top_left: &str,
        bottom_right: &str,
    ) -> Result<Arc<dyn FunctionInstance>> {
        let params = vec![
            FunctionParam {
                name: "top_left".into(),
                value: json!(top_left),
            },
            FunctionParam {
                name: "bottom_right".into(),
                value: json!(bottom_right),
            },
        ];
        GeoBoxFunction.create(&FunctionContext {
            name: "geoBox",
            field: "location",
            field_type,
            params: &params,
        })
    }

    #[test]
    fn test_matches_points() {
        let instance = create(None, "33.906320,-112.758421", "32.813646,-111.058902").unwrap();
        assert!(instance.matches(&json!("33.4,-111.8")));
        assert!(instance.matches(&json!([-111.8, 33.4])));
        assert!(!instance.matches(&json!("40.7,-74.0")));
    }

    #[test]
    fn test_inverted_box_is_rejected() {
        let err = create(None, "32.8,-112.7", "33.9,-111.0").unwrap_err();
        assert!(err.to_string().starts_with("Invalid geoBox function"));
    }

    #[test]
    fn test_elasticsearch_query() {
        let instance = create(None, "34,-113", "32,-111").unwrap();
        let result = instance
            .to_elasticsearch_query("location", &TranslatorOptions::default())
            .unwrap();
        assert_eq!(
            result.query,
            json!({
                "geo_bounding_box": {
                    "location": {
                        "top_left": {"lat": 34.0, "lon": -113.0},
                        "bottom_right": {"lat": 32.0, "lon": -111.0}
                    }
                }
            })
        );
        assert!(result.sort.is_none());

        let instance = create(Some(FieldType::GeoJson), "34,-113", "32,-111").unwrap();
        let result = instance
            .to_elasticsearch_query("shape", &TranslatorOptions::default())
            .unwrap();
        assert_eq!(
            result.query["geo_shape"]["shape"]["shape"]["coordinates"],
            json!([[-113.0, 34.0], [-111.0, 32.0]])
        );
    }
}
