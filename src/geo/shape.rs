//! GeoJSON shapes and the spatial relations used by `geoPolygon` and
//! `geoContainsPoint`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{Result, XluceneError};
use crate::geo::point::{GeoPoint, parse_geo_point};

/// Spatial relation between a stored shape and a query shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoRelation {
    /// The stored shape lies entirely inside the query shape.
    #[default]
    Within,
    /// The stored shape contains the query shape.
    Contains,
    Intersects,
    Disjoint,
}

impl GeoRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoRelation::Within => "within",
            GeoRelation::Contains => "contains",
            GeoRelation::Intersects => "intersects",
            GeoRelation::Disjoint => "disjoint",
        }
    }
}

impl FromStr for GeoRelation {
    type Err = XluceneError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "within" => Ok(GeoRelation::Within),
            "contains" => Ok(GeoRelation::Contains),
            "intersects" => Ok(GeoRelation::Intersects),
            "disjoint" => Ok(GeoRelation::Disjoint),
            other => Err(XluceneError::other(format!(
                "relation must be one of within, contains, intersects, disjoint, got \"{other}\""
            ))),
        }
    }
}

impl fmt::Display for GeoRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A polygon made of an outer ring and optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<GeoPoint>,
    pub holes: Vec<Vec<GeoPoint>>,
}

impl Polygon {
    /// Build a polygon from at least three points; the ring is closed
    /// automatically.
    pub fn new(mut exterior: Vec<GeoPoint>) -> Result<Self> {
        if exterior.len() >= 2 && exterior.first() == exterior.last() {
            exterior.pop();
        }
        if exterior.len() < 3 {
            return Err(XluceneError::other("polygon must have at least three points"));
        }
        Ok(Polygon {
            exterior,
            holes: Vec::new(),
        })
    }

    /// Point-in-polygon by ray casting; points inside a hole are outside.
    pub fn contains_point(&self, point: &GeoPoint) -> bool {
        ring_contains(&self.exterior, point) && !self.holes.iter().any(|h| ring_contains(h, point))
    }

    fn vertices(&self) -> impl Iterator<Item = &GeoPoint> {
        self.exterior.iter()
    }

    fn edges(&self) -> impl Iterator<Item = (&GeoPoint, &GeoPoint)> {
        let n = self.exterior.len();
        (0..n).map(move |i| (&self.exterior[i], &self.exterior[(i + 1) % n]))
    }

    /// GeoJSON coordinates with a closed outer ring.
    pub fn to_coordinates(&self) -> Value {
        let mut ring: Vec<Value> = self.exterior.iter().map(GeoPoint::to_coordinates).collect();
        if let Some(first) = self.exterior.first() {
            ring.push(first.to_coordinates());
        }
        json!([ring])
    }
}

/// A stored shape value.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoShape {
    Point(GeoPoint),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl GeoShape {
    /// Parse a GeoJSON geometry, falling back to any geo point representation.
    pub fn from_value(value: &Value) -> Option<GeoShape> {
        let kind = value.get("type").and_then(Value::as_str);
        let coordinates = value.get("coordinates");
        match (kind, coordinates) {
            (Some("Polygon"), Some(coords)) => parse_polygon(coords).map(GeoShape::Polygon),
            (Some("MultiPolygon"), Some(Value::Array(polys))) => polys
                .iter()
                .map(parse_polygon)
                .collect::<Option<Vec<_>>>()
                .map(GeoShape::MultiPolygon),
            _ => parse_geo_point(value).ok().map(GeoShape::Point),
        }
    }

    fn polygons(&self) -> Vec<&Polygon> {
        match self {
            GeoShape::Point(_) => Vec::new(),
            GeoShape::Polygon(p) => vec![p],
            GeoShape::MultiPolygon(ps) => ps.iter().collect(),
        }
    }

    fn vertices(&self) -> Vec<GeoPoint> {
        match self {
            GeoShape::Point(p) => vec![*p],
            _ => self
                .polygons()
                .into_iter()
                .flat_map(|p| p.vertices().copied())
                .collect(),
        }
    }

    /// Whether this shape covers the given point.
    pub fn contains_point(&self, point: &GeoPoint) -> bool {
        match self {
            GeoShape::Point(p) => points_equal(p, point),
            _ => self.polygons().iter().any(|p| p.contains_point(point)),
        }
    }

    /// Evaluate `self <relation> query`.
    pub fn relates_to(&self, query: &Polygon, relation: GeoRelation) -> bool {
        match relation {
            GeoRelation::Within => self.vertices().iter().all(|v| query.contains_point(v)),
            GeoRelation::Contains => query.vertices().all(|v| self.contains_point(v)),
            GeoRelation::Intersects => self.intersects(query),
            GeoRelation::Disjoint => !self.intersects(query),
        }
    }

    fn intersects(&self, query: &Polygon) -> bool {
        if self.vertices().iter().any(|v| query.contains_point(v)) {
            return true;
        }
        if query.vertices().any(|v| self.contains_point(v)) {
            return true;
        }
        self.polygons().iter().any(|polygon| {
            polygon
                .edges()
                .any(|(a, b)| query.edges().any(|(c, d)| segments_intersect(a, b, c, d)))
        })
    }
}

fn parse_polygon(coordinates: &Value) -> Option<Polygon> {
    let rings = coordinates.as_array()?;
    let mut parsed = rings.iter().map(|ring| {
        ring.as_array()?
            .iter()
            .map(|p| parse_geo_point(p).ok())
            .collect::<Option<Vec<_>>>()
    });
    let mut polygon = Polygon::new(parsed.next()??).ok()?;
    for hole in parsed {
        polygon.holes.push(hole?);
    }
    Some(polygon)
}

fn ring_contains(ring: &[GeoPoint], point: &GeoPoint) -> bool {
    let mut inside = false;
    let n = ring.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (pi, pj) = (&ring[i], &ring[j]);
        if on_segment(pi, pj, point) {
            return true;
        }
        if (pi.lat > point.lat) != (pj.lat > point.lat)
            && point.lon < (pj.lon - pi.lon) * (point.lat - pi.lat) / (pj.lat - pi.lat) + pi.lon
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

const EPSILON: f64 = 1e-9;

fn points_equal(a: &GeoPoint, b: &GeoPoint) -> bool {
    (a.lat - b.lat).abs() < EPSILON && (a.lon - b.lon).abs() < EPSILON
}

fn cross(o: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> f64 {
    (a.lon - o.lon) * (b.lat - o.lat) - (a.lat - o.lat) * (b.lon - o.lon)
}

fn on_segment(a: &GeoPoint, b: &GeoPoint, p: &GeoPoint) -> bool {
    cross(a, b, p).abs() < EPSILON
        && p.lon >= a.lon.min(b.lon) - EPSILON
        && p.lon <= a.lon.max(b.lon) + EPSILON
        && p.lat >= a.lat.min(b.lat) - EPSILON
        && p.lat <= a.lat.max(b.lat) + EPSILON
}

fn segments_intersect(a: &GeoPoint, b: &GeoPoint, c: &GeoPoint, d: &GeoPoint) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    on_segment(c, d, a) || on_segment(c, d, b) || on_segment(a, b, c) || on_segment(a, b, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn square(min: f64, max: f64) -> Polygon {
        Polygon::new(vec![
            point(min, min),
            point(min, max),
            point(max, max),
            point(max, min),
        ])
        .unwrap()
    }

    #[test]
    fn test_polygon_requires_three_points() {
        assert!(Polygon::new(vec![point(0.0, 0.0), point(1.0, 1.0)]).is_err());
        // a closed ring of three distinct points is still a triangle
        let closed = vec![point(0.0, 0.0), point(1.0, 0.0), point(0.0, 1.0), point(0.0, 0.0)];
        assert_eq!(Polygon::new(closed).unwrap().exterior.len(), 3);
    }

    #[test]
    fn test_point_in_polygon() {
        let polygon = square(0.0, 10.0);
        assert!(polygon.contains_point(&point(5.0, 5.0)));
        assert!(polygon.contains_point(&point(0.0, 5.0)));
        assert!(!polygon.contains_point(&point(11.0, 5.0)));
    }

    #[test]
    fn test_holes() {
        let mut polygon = square(0.0, 10.0);
        polygon.holes.push(square(4.0, 6.0).exterior);
        assert!(!polygon.contains_point(&point(5.0, 5.0)));
        assert!(polygon.contains_point(&point(2.0, 2.0)));
    }

    #[test]
    fn test_relations() {
        let query = square(0.0, 10.0);
        let inner = GeoShape::Polygon(square(2.0, 4.0));
        let outer = GeoShape::Polygon(square(-5.0, 15.0));
        let overlapping = GeoShape::Polygon(square(5.0, 15.0));
        let apart = GeoShape::Polygon(square(20.0, 30.0));

        assert!(inner.relates_to(&query, GeoRelation::Within));
        assert!(!outer.relates_to(&query, GeoRelation::Within));
        assert!(outer.relates_to(&query, GeoRelation::Contains));
        assert!(overlapping.relates_to(&query, GeoRelation::Intersects));
        assert!(!overlapping.relates_to(&query, GeoRelation::Within));
        assert!(apart.relates_to(&query, GeoRelation::Disjoint));
        assert!(!apart.relates_to(&query, GeoRelation::Intersects));
    }

    #[test]
    fn test_crossing_edges_intersect() {
        // a thin horizontal bar crossing a thin vertical bar, no vertex inside the other
        let vertical = Polygon::new(vec![
            point(-10.0, -1.0),
            point(-10.0, 1.0),
            point(10.0, 1.0),
            point(10.0, -1.0),
        ])
        .unwrap();
        let horizontal = GeoShape::Polygon(
            Polygon::new(vec![
                point(-1.0, -10.0),
                point(-1.0, 10.0),
                point(1.0, 10.0),
                point(1.0, -10.0),
            ])
            .unwrap(),
        );
        assert!(horizontal.relates_to(&vertical, GeoRelation::Intersects));
    }

    #[test]
    fn test_from_geojson() {
        let value = serde_json::json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
        });
        let shape = GeoShape::from_value(&value).unwrap();
        assert!(shape.contains_point(&point(5.0, 5.0)));

        let value = serde_json::json!({"type": "Point", "coordinates": [5.0, 5.0]});
        assert_eq!(GeoShape::from_value(&value), Some(GeoShape::Point(point(5.0, 5.0))));
        assert_eq!(GeoShape::from_value(&serde_json::json!("nope nope")), None);
    }
}
