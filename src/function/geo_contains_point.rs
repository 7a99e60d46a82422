//! `geoContainsPoint(point)`

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::Result;
use crate::function::{FunctionContext, FunctionDefinition, FunctionInstance, FunctionQuery};
use crate::geo::{GeoPoint, GeoShape};
use crate::translator::TranslatorOptions;
use crate::types::FieldType;

#[derive(Debug, Clone, Copy, Default)]
pub struct GeoContainsPointFunction;

impl FunctionDefinition for GeoContainsPointFunction {
    fn name(&self) -> &'static str {
        "geoContainsPoint"
    }

    fn create(&self, context: &FunctionContext<'_>) -> Result<Arc<dyn FunctionInstance>> {
        let field_type = context.geo_field_type()?;
        let point = context.geo_point("point")?;
        Ok(Arc::new(GeoContainsPointMatch { field_type, point }))
    }
}

#[derive(Debug, Clone)]
pub struct GeoContainsPointMatch {
    field_type: FieldType,
    point: GeoPoint,
}

impl FunctionInstance for GeoContainsPointMatch {
    fn matches(&self, value: &Value) -> bool {
        GeoShape::from_value(value).is_some_and(|shape| shape.contains_point(&self.point))
    }

    /// Elasticsearch has no point-in-point query for geo-point fields.
    fn to_elasticsearch_query(
        &self,
        field: &str,
        _options: &TranslatorOptions,
    ) -> Option<FunctionQuery> {
        if self.field_type != FieldType::GeoJson {
            return None;
        }
        Some(FunctionQuery::new(json!({
            "geo_shape": {
                field: {
                    "shape": {
                        "type": "point",
                        "coordinates": self.point.to_coordinates(),
                    },
                    "relation": "intersects",
                }
            }
        })))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ast::FunctionParam;

    fn create(field_type: Option<FieldType>) -> Arc<dyn FunctionInstance> {
        let params = vec![FunctionParam {
            name: "point".into(),
            value: json!("5,5"),
        }];
        GeoContainsPointFunction
            .create(&FunctionContext {
                name: "geoContainsPoint",
                field: "boundary",
                field_type,
                params: &params,
            })
            .unwrap()
    }

    #[test]
    fn test_matches_shapes() {
        let instance = create(Some(FieldType::GeoJson));
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
        });
        let elsewhere = json!({
            "type": "Polygon",
            "coordinates": [[[20.0, 20.0], [30.0, 20.0], [30.0, 30.0], [20.0, 30.0], [20.0, 20.0]]]
        });
        assert!(instance.matches(&polygon));
        assert!(!instance.matches(&elsewhere));
        assert!(instance.matches(&json!({"type": "Point", "coordinates": [5.0, 5.0]})));
    }

    #[test]
    fn test_elasticsearch_query() {
        let result = create(Some(FieldType::GeoJson))
            .to_elasticsearch_query("boundary", &TranslatorOptions::default())
            .unwrap();
        assert_eq!(
            result.query,
            json!({
                "geo_shape": {
                    "boundary": {
                        "shape": {"type": "point", "coordinates": [5.0, 5.0]},
                        "relation": "intersects"
                    }
                }
            })
        );

        let point_field = create(None);
        assert!(
            point_field
                .to_elasticsearch_query("boundary", &TranslatorOptions::default())
                .is_none()
        );
        assert!(point_field.matches(&json!("5,5")));
    }

    #[test]
    fn test_missing_point() {
        let err = GeoContainsPointFunction
            .create(&FunctionContext {
                name: "geoContainsPoint",
                field: "boundary",
                field_type: None,
                params: &[],
            })
            .unwrap_err();
        assert_eq!(err.status_code(), 422);
    }
}
