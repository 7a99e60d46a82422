//! Geo points, bounding boxes and the flexible point parser.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, XluceneError};

/// Mean earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

const GEOHASH_ALPHABET: &str = "0123456789bcdefghjkmnpqrstuvwxyz";

lazy_static! {
    static ref LAT_LON_PATTERN: Regex =
        Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$").unwrap();
    static ref GEOHASH_PATTERN: Regex = Regex::new(r"^[0-9b-hjkmnp-z]{1,12}$").unwrap();
}

/// A geographical point with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographical point.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(XluceneError::other(format!(
                "Invalid latitude: {lat} (must be between -90 and 90)"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(XluceneError::other(format!(
                "Invalid longitude: {lon} (must be between -180 and 180)"
            )));
        }

        Ok(GeoPoint { lat, lon })
    }

    /// Haversine distance to another point in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_METERS * c
    }

    /// `{"lat": .., "lon": ..}`, the Elasticsearch object form.
    pub fn to_json(&self) -> Value {
        serde_json::json!({ "lat": self.lat, "lon": self.lon })
    }

    /// `[lon, lat]`, the GeoJSON coordinate order.
    pub fn to_coordinates(&self) -> Value {
        serde_json::json!([self.lon, self.lat])
    }
}

/// A geographical bounding box defined by its top-left and bottom-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    /// Top-left corner
    pub top_left: GeoPoint,
    /// Bottom-right corner
    pub bottom_right: GeoPoint,
}

impl GeoBoundingBox {
    /// Create a new bounding box.
    pub fn new(top_left: GeoPoint, bottom_right: GeoPoint) -> Result<Self> {
        if top_left.lat < bottom_right.lat {
            return Err(XluceneError::other(
                "Top-left latitude must be greater than bottom-right latitude",
            ));
        }

        Ok(GeoBoundingBox {
            top_left,
            bottom_right,
        })
    }

    /// Check if a point is within this bounding box.
    ///
    /// Boxes whose left edge lies east of the right edge cross the
    /// antimeridian.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let lat_ok = point.lat <= self.top_left.lat && point.lat >= self.bottom_right.lat;
        let lon_ok = if self.top_left.lon <= self.bottom_right.lon {
            point.lon >= self.top_left.lon && point.lon <= self.bottom_right.lon
        } else {
            point.lon >= self.top_left.lon || point.lon <= self.bottom_right.lon
        };
        lat_ok && lon_ok
    }
}

/// Parse a geo point from any of the accepted representations.
///
/// - `"lat,lon"` strings
/// - geohash strings
/// - `[lon, lat]` arrays
/// - `{"lat": .., "lon": ..}` or `{"latitude": .., "longitude": ..}` objects
/// - GeoJSON `Point` objects
pub fn parse_geo_point(value: &Value) -> Result<GeoPoint> {
    match value {
        Value::String(s) => parse_geo_point_str(s),
        Value::Array(items) if items.len() == 2 => {
            let lon = number_of(&items[0]);
            let lat = number_of(&items[1]);
            match (lat, lon) {
                (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
                _ => Err(invalid_point(value)),
            }
        }
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("Point") {
                return match map.get("coordinates") {
                    Some(coordinates @ Value::Array(_)) => parse_geo_point(coordinates),
                    _ => Err(invalid_point(value)),
                };
            }
            let lat = map.get("lat").or_else(|| map.get("latitude"));
            let lon = map.get("lon").or_else(|| map.get("longitude"));
            match (lat.and_then(number_of), lon.and_then(number_of)) {
                (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
                _ => Err(invalid_point(value)),
            }
        }
        _ => Err(invalid_point(value)),
    }
}

/// Parse a `"lat,lon"` or geohash string.
pub fn parse_geo_point_str(s: &str) -> Result<GeoPoint> {
    if let Some(captures) = LAT_LON_PATTERN.captures(s) {
        let lat: f64 = captures[1]
            .parse()
            .map_err(|_| XluceneError::other(format!("Invalid geo point \"{s}\"")))?;
        let lon: f64 = captures[2]
            .parse()
            .map_err(|_| XluceneError::other(format!("Invalid geo point \"{s}\"")))?;
        return GeoPoint::new(lat, lon);
    }

    let trimmed = s.trim().to_lowercase();
    if GEOHASH_PATTERN.is_match(&trimmed) {
        return decode_geohash(&trimmed);
    }

    Err(XluceneError::other(format!("Invalid geo point \"{s}\"")))
}

/// Decode a geohash into the center of its cell.
pub fn decode_geohash(hash: &str) -> Result<GeoPoint> {
    let (mut lat_min, mut lat_max) = (-90.0_f64, 90.0_f64);
    let (mut lon_min, mut lon_max) = (-180.0_f64, 180.0_f64);
    let mut even = true;

    for ch in hash.chars() {
        let index = GEOHASH_ALPHABET
            .find(ch)
            .ok_or_else(|| XluceneError::other(format!("Invalid geohash \"{hash}\"")))?;
        for bit in (0..5).rev() {
            let on = (index >> bit) & 1 == 1;
            if even {
                let mid = (lon_min + lon_max) / 2.0;
                if on {
                    lon_min = mid;
                } else {
                    lon_max = mid;
                }
            } else {
                let mid = (lat_min + lat_max) / 2.0;
                if on {
                    lat_min = mid;
                } else {
                    lat_max = mid;
                }
            }
            even = !even;
        }
    }

    GeoPoint::new((lat_min + lat_max) / 2.0, (lon_min + lon_max) / 2.0)
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn invalid_point(value: &Value) -> XluceneError {
    XluceneError::other(format!("Invalid geo point {value}"))
}
