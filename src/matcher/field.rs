//! Resolving dotted field paths against JSON records.

use regex::Regex;
use serde_json::Value;

use crate::util::wildcard::{compile_field_pattern, has_wildcard};

#[derive(Debug, Clone)]
enum Segment {
    Key(String),
    Pattern(Regex),
}

impl Segment {
    fn select<'a>(&self, value: &'a Value, out: &mut Vec<&'a Value>) {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.select(item, out);
                }
            }
            Value::Object(map) => match self {
                Segment::Key(key) => out.extend(map.get(key)),
                Segment::Pattern(pattern) => out.extend(
                    map.iter()
                        .filter(|(key, _)| pattern.is_match(key))
                        .map(|(_, v)| v),
                ),
            },
            _ => {}
        }
    }
}

/// A compiled field path; `*` and `?` segments match any key at their level.
#[derive(Debug, Clone)]
pub struct FieldPath {
    path: String,
    segments: Vec<Segment>,
    geo: bool,
}

impl FieldPath {
    pub fn new(path: &str) -> Self {
        let segments = path
            .split('.')
            .map(|segment| {
                if has_wildcard(segment) {
                    if let Ok(pattern) = compile_field_pattern(segment) {
                        return Segment::Pattern(pattern);
                    }
                }
                Segment::Key(segment.to_string())
            })
            .collect();
        FieldPath {
            path: path.to_string(),
            segments,
            geo: false,
        }
    }

    /// Keep `[lon, lat]` pairs together instead of flattening them.
    pub fn geo(mut self) -> Self {
        self.geo = true;
        self
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Every non-null value at this path, arrays flattened.
    pub fn resolve<'a>(&self, record: &'a Value) -> Vec<&'a Value> {
        // a literal dotted key wins over nesting
        if let Some(value) = record.as_object().and_then(|map| map.get(&self.path)) {
            let mut out = Vec::new();
            flatten(value, self.geo, &mut out);
            return out;
        }

        let mut current = vec![record];
        for segment in &self.segments {
            let mut next = Vec::new();
            for value in current {
                segment.select(value, &mut next);
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }

        let mut out = Vec::new();
        for value in current {
            flatten(value, self.geo, &mut out);
        }
        out
    }
}

fn flatten<'a>(value: &'a Value, geo: bool, out: &mut Vec<&'a Value>) {
    match value {
        Value::Null => {}
        Value::Array(items) if geo && is_coordinate_pair(items) => out.push(value),
        Value::Array(items) => {
            for item in items {
                flatten(item, geo, out);
            }
        }
        _ => out.push(value),
    }
}

fn is_coordinate_pair(items: &[Value]) -> bool {
    items.len() == 2 && items.iter().all(Value::is_number)
}

/// Every scalar leaf of a record, used for fieldless terms.
pub fn leaves(record: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    collect_leaves(record, &mut out);
    out
}

fn collect_leaves<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Null => {}
        Value::Array(items) => items.iter().for_each(|item| collect_leaves(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_leaves(item, out)),
        scalar => out.push(scalar),
    }
}
