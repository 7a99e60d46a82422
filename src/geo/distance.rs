//! Distance units and distance strings such as `5000m` or `10 miles`.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, XluceneError};

lazy_static! {
    static ref DISTANCE_PATTERN: Regex =
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*([A-Za-z]*)\s*$").unwrap();
}

/// Units accepted in distances and geo sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Miles,
    Yards,
    Feet,
    Inch,
    Kilometers,
    Meters,
    Centimeters,
    Millimeters,
    NauticalMiles,
}

impl DistanceUnit {
    /// Canonical Elasticsearch name, e.g. `meters`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Miles => "miles",
            DistanceUnit::Yards => "yards",
            DistanceUnit::Feet => "feet",
            DistanceUnit::Inch => "inch",
            DistanceUnit::Kilometers => "kilometers",
            DistanceUnit::Meters => "meters",
            DistanceUnit::Centimeters => "centimeters",
            DistanceUnit::Millimeters => "millimeters",
            DistanceUnit::NauticalMiles => "nauticalmiles",
        }
    }

    /// How many meters one unit is.
    pub fn meters(&self) -> f64 {
        match self {
            DistanceUnit::Miles => 1_609.344,
            DistanceUnit::Yards => 0.9144,
            DistanceUnit::Feet => 0.3048,
            DistanceUnit::Inch => 0.0254,
            DistanceUnit::Kilometers => 1_000.0,
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Centimeters => 0.01,
            DistanceUnit::Millimeters => 0.001,
            DistanceUnit::NauticalMiles => 1_852.0,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = XluceneError;

    fn from_str(s: &str) -> Result<Self> {
        let unit = match s {
            "mi" | "mile" | "miles" => DistanceUnit::Miles,
            "yd" | "yard" | "yards" => DistanceUnit::Yards,
            "ft" | "foot" | "feet" => DistanceUnit::Feet,
            "in" | "inch" | "inches" => DistanceUnit::Inch,
            "km" | "kilometer" | "kilometers" => DistanceUnit::Kilometers,
            "m" | "meter" | "meters" => DistanceUnit::Meters,
            "cm" | "centimeter" | "centimeters" => DistanceUnit::Centimeters,
            "mm" | "millimeter" | "millimeters" => DistanceUnit::Millimeters,
            "NM" | "nmi" | "nauticalmile" | "nauticalmiles" => DistanceUnit::NauticalMiles,
            other => {
                return Err(XluceneError::other(format!(
                    "Invalid distance unit \"{other}\""
                )));
            }
        };
        Ok(unit)
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A distance with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub distance: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    pub fn new(distance: f64, unit: DistanceUnit) -> Self {
        Distance { distance, unit }
    }

    /// Parse `5000m`, `5 km`, `12` (meters) or a JSON number (meters).
    pub fn parse(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(|d| Distance::new(d, DistanceUnit::Meters))
                .ok_or_else(|| XluceneError::other(format!("Invalid distance {value}"))),
            Value::String(s) => s.parse(),
            _ => Err(XluceneError::other(format!("Invalid distance {value}"))),
        }
    }

    pub fn in_meters(&self) -> f64 {
        self.distance * self.unit.meters()
    }
}

impl FromStr for Distance {
    type Err = XluceneError;

    fn from_str(s: &str) -> Result<Self> {
        let captures = DISTANCE_PATTERN
            .captures(s)
            .ok_or_else(|| XluceneError::other(format!("Invalid distance \"{s}\"")))?;
        let distance: f64 = captures[1]
            .parse()
            .map_err(|_| XluceneError::other(format!("Invalid distance \"{s}\"")))?;
        let unit = match &captures[2] {
            "" => DistanceUnit::Meters,
            unit => unit.parse()?,
        };
        Ok(Distance::new(distance, unit))
    }
}

impl fmt::Display for Distance {
    /// Elasticsearch form, e.g. `5000meters`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.distance, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_distance_strings() {
        let distance: Distance = "5000m".parse().unwrap();
        assert_eq!(distance, Distance::new(5000.0, DistanceUnit::Meters));
        assert_eq!(distance.to_string(), "5000meters");

        let distance: Distance = "1.5 km".parse().unwrap();
        assert_eq!(distance.in_meters(), 1500.0);
        assert_eq!(distance.to_string(), "1.5kilometers");

        let distance: Distance = "10".parse().unwrap();
        assert_eq!(distance.unit, DistanceUnit::Meters);

        assert!("10 parsecs".parse::<Distance>().is_err());
        assert!("far".parse::<Distance>().is_err());
    }

    #[test]
    fn test_parse_distance_json() {
        assert_eq!(
            Distance::parse(&json!(250)).unwrap(),
            Distance::new(250.0, DistanceUnit::Meters)
        );
        assert_eq!(
            Distance::parse(&json!("2mi")).unwrap().unit,
            DistanceUnit::Miles
        );
        assert!(Distance::parse(&json!(true)).is_err());
    }

    #[test]
    fn test_unit_names() {
        assert_eq!("nmi".parse::<DistanceUnit>().unwrap().as_str(), "nauticalmiles");
        assert_eq!("ft".parse::<DistanceUnit>().unwrap().meters(), 0.3048);
        let unit: DistanceUnit = serde_json::from_value(json!("kilometers")).unwrap();
        assert_eq!(unit, DistanceUnit::Kilometers);
    }
}
