//! Date handling for the matcher. Dates are compared as epoch milliseconds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::ast::{RangeBound, RangeValue, Scalar};

/// Lowest representable date, used for an open lower bound.
pub const MIN_DATE_MILLIS: i64 = -8_640_000_000_000_000;
/// Highest representable date, used for an open upper bound.
pub const MAX_DATE_MILLIS: i64 = 8_640_000_000_000_000;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a date string into epoch milliseconds (UTC when no offset is given).
pub fn parse_date_millis(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = input.parse::<DateTime<Utc>>() {
        return Some(dt.timestamp_millis());
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
    }
    // bare digits are epoch millis
    input.parse::<i64>().ok()
}

/// Epoch milliseconds of a record value.
pub fn value_millis(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_date_millis(s),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
}

pub fn scalar_millis(scalar: &Scalar) -> Option<i64> {
    match scalar {
        Scalar::String(s) => parse_date_millis(s),
        Scalar::Integer(i) => Some(*i),
        Scalar::Float(f) => Some(*f as i64),
        Scalar::Boolean(_) => None,
    }
}

/// Inclusive millisecond interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub min: i64,
    pub max: i64,
}

impl DateRange {
    /// Build from range bounds. `*` maps to the date sentinels and an
    /// exclusive bound moves one millisecond inwards.
    ///
    /// Returns `None` when a finite bound is not a date.
    pub fn from_bounds<'a, I>(bounds: I) -> Option<DateRange>
    where
        I: IntoIterator<Item = &'a RangeBound>,
    {
        let mut range = DateRange {
            min: MIN_DATE_MILLIS,
            max: MAX_DATE_MILLIS,
        };
        for bound in bounds {
            let RangeValue::Value(scalar) = &bound.value else {
                continue;
            };
            let millis = scalar_millis(scalar)?;
            let shift = if bound.operator.is_inclusive() { 0 } else { 1 };
            if bound.operator.is_lower() {
                range.min = millis.saturating_add(shift);
            } else {
                range.max = millis.saturating_sub(shift);
            }
        }
        Some(range)
    }

    pub fn contains(&self, millis: i64) -> bool {
        self.min <= millis && millis <= self.max
    }
}
