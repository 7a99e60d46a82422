//! Geographical helpers: points, bounding boxes, distances and shapes.

pub mod distance;
pub mod point;
pub mod shape;

pub use self::distance::{Distance, DistanceUnit};
pub use self::point::{GeoBoundingBox, GeoPoint, parse_geo_point, parse_geo_point_str};
pub use self::shape::{GeoRelation, GeoShape, Polygon};
