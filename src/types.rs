//! Field types and the per-field type configuration.
//!
//! A [`TypeConfig`] maps dotted field paths (`a.b.c`) to a declared
//! [`FieldType`]. It drives value coercion in the parser, wildcard-field
//! expansion in the translator and nested-field exclusion in query access
//! control.
//!
//! ```
//! use xlucene::types::{FieldType, TypeConfig};
//!
//! let config: TypeConfig = serde_json::from_str(r#"{"age": "integer", "geo": "geo"}"#).unwrap();
//! assert_eq!(config.get("age"), Some(FieldType::Integer));
//! assert_eq!(config.get("geo"), Some(FieldType::GeoPoint));
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::util::wildcard::{field_matches, has_wildcard};

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// Text and keyword values.
    #[serde(alias = "keyword", alias = "text")]
    String,
    /// 64-bit signed integers.
    #[serde(alias = "long", alias = "short", alias = "byte")]
    Integer,
    /// 64-bit floats.
    #[serde(alias = "double", alias = "half-float", alias = "scaled-float")]
    Float,
    /// `true` / `false`.
    Boolean,
    /// Dates, compared as epoch milliseconds.
    Date,
    /// IPv4/IPv6 addresses and CIDR ranges.
    Ip,
    /// Geo points.
    #[serde(alias = "geo")]
    GeoPoint,
    /// GeoJSON shapes.
    GeoJson,
    /// Containers whose children are typed independently.
    Object,
}

impl FieldType {
    /// Name used in type configs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Ip => "ip",
            FieldType::GeoPoint => "geo-point",
            FieldType::GeoJson => "geo-json",
            FieldType::Object => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }

    pub fn is_geo(&self) -> bool {
        matches!(self, FieldType::GeoPoint | FieldType::GeoJson)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of looking a field up in a [`TypeConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldResolution {
    /// Declared (or inferred) type, `None` for unmapped fields.
    pub field_type: Option<FieldType>,
    /// The field is a sub-field of a mapped, non-object container and has to
    /// be searched as a token of the container value.
    pub tokenizer: bool,
}

/// Ordered mapping from dotted field path to declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeConfig {
    fields: IndexMap<String, FieldType>,
}

impl TypeConfig {
    /// Create an empty type config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style.
    pub fn with_field<S: Into<String>>(mut self, field: S, field_type: FieldType) -> Self {
        self.fields.insert(field.into(), field_type);
        self
    }

    /// Add or replace a field.
    pub fn insert<S: Into<String>>(&mut self, field: S, field_type: FieldType) {
        self.fields.insert(field.into(), field_type);
    }

    /// Declared type of an exact field path.
    pub fn get(&self, field: &str) -> Option<FieldType> {
        self.fields.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Whether the field is declared as an object container.
    pub fn is_object(&self, field: &str) -> bool {
        self.get(field) == Some(FieldType::Object)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Concrete fields matching a (possibly wildcard) field pattern.
    pub fn matching(&self, pattern: &str) -> Vec<&str> {
        if !has_wildcard(pattern) {
            return self
                .fields
                .get_key_value(pattern)
                .map(|(k, _)| vec![k.as_str()])
                .unwrap_or_default();
        }
        self.fields()
            .filter(|field| field_matches(pattern, field))
            .collect()
    }

    /// Resolve the type a query against `field` should be coerced to.
    ///
    /// Exact entries win. Wildcard fields take the type shared by every
    /// concrete match. A sub-field of a mapped non-object parent resolves to
    /// a tokenized string search on the parent.
    pub fn resolve(&self, field: &str) -> FieldResolution {
        if let Some(field_type) = self.get(field) {
            return FieldResolution {
                field_type: Some(field_type),
                tokenizer: false,
            };
        }

        if has_wildcard(field) {
            let mut types = self
                .matching(field)
                .into_iter()
                .filter_map(|f| self.get(f))
                .filter(|t| *t != FieldType::Object);
            let first = types.next();
            let uniform = first.is_some_and(|first| types.all(|t| t == first));
            return FieldResolution {
                field_type: if uniform { first } else { None },
                tokenizer: false,
            };
        }

        if let Some((parent, _)) = field.rsplit_once('.') {
            if let Some(parent_type) = self.get(parent) {
                if parent_type != FieldType::Object {
                    return FieldResolution {
                        field_type: Some(FieldType::String),
                        tokenizer: true,
                    };
                }
            }
        }

        FieldResolution::default()
    }

    /// Keep only the fields for which `keep` returns true.
    pub fn retain<F>(&self, mut keep: F) -> TypeConfig
    where
        F: FnMut(&str, FieldType) -> bool,
    {
        TypeConfig {
            fields: self
                .fields
                .iter()
                .filter(|(k, v)| keep(k, **v))
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
        }
    }

    /// Stable identity of this config, usable as a cache key.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(&self.fields).unwrap_or_default()
    }
}

impl<S: Into<String>> FromIterator<(S, FieldType)> for TypeConfig {
    fn from_iter<I: IntoIterator<Item = (S, FieldType)>>(iter: I) -> Self {
        TypeConfig {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
