//! Field include/exclude policy.
//!
//! Exclusion is checked against the raw type config so nested and object
//! fields are judged by their declared structure. A wildcard field is
//! excluded when any concrete field it matches is excluded, but included
//! only when every concrete field it matches is included.

use crate::types::TypeConfig;
use crate::util::wildcard::{field_matches, has_wildcard};

#[derive(Debug, Clone)]
pub(crate) struct FieldPolicy {
    excludes: Vec<String>,
    includes: Vec<String>,
    type_config: TypeConfig,
}

impl FieldPolicy {
    pub(crate) fn new(excludes: &[String], includes: &[String], type_config: &TypeConfig) -> Self {
        FieldPolicy {
            excludes: excludes.to_vec(),
            includes: includes.to_vec(),
            type_config: type_config.clone(),
        }
    }

    pub(crate) fn includes(&self) -> &[String] {
        &self.includes
    }

    pub(crate) fn excludes(&self) -> &[String] {
        &self.excludes
    }

    /// Whether a query may reference `field`.
    pub(crate) fn is_allowed(&self, field: &str) -> bool {
        !self.is_excluded(field) && self.is_included(field)
    }

    pub(crate) fn is_excluded(&self, field: &str) -> bool {
        if self.excludes.is_empty() {
            return false;
        }
        if !has_wildcard(field) {
            return self.excludes.iter().any(|e| self.excludes_field(e, field));
        }
        if self.excludes.iter().any(|e| field_matches(field, e)) {
            return true;
        }
        self.type_config
            .matching(field)
            .into_iter()
            .any(|concrete| self.excludes.iter().any(|e| self.excludes_field(e, concrete)))
    }

    pub(crate) fn is_included(&self, field: &str) -> bool {
        if self.includes.is_empty() {
            return true;
        }
        if !has_wildcard(field) {
            return self.includes.iter().any(|i| covers(i, field));
        }
        let matches = self.type_config.matching(field);
        !matches.is_empty()
            && matches
                .into_iter()
                .all(|concrete| self.includes.iter().any(|i| covers(i, concrete)))
    }

    /// `exclude` hides `field` when they are equal, when `field` is nested
    /// under it, or when `field` is an object holding it.
    fn excludes_field(&self, exclude: &str, field: &str) -> bool {
        covers(exclude, field) || (covers(field, exclude) && self.type_config.is_object(field))
    }
}

/// `field` equals `prefix` or is nested somewhere under it.
fn covers(prefix: &str, field: &str) -> bool {
    field == prefix
        || field
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    fn policy(excludes: &[&str], includes: &[&str]) -> FieldPolicy {
        let type_config = TypeConfig::new()
            .with_field("foo", FieldType::String)
            .with_field("bar", FieldType::String)
            .with_field("field_one", FieldType::String)
            .with_field("field_two", FieldType::String)
            .with_field("obj", FieldType::Object)
            .with_field("obj.public", FieldType::String)
            .with_field("obj.secret", FieldType::String)
            .with_field("text", FieldType::String);
        let to_vec = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        FieldPolicy::new(&to_vec(excludes), &to_vec(includes), &type_config)
    }

    #[test]
    fn test_exact_and_nested_excludes() {
        let p = policy(&["bar", "text"], &[]);
        assert!(p.is_excluded("bar"));
        assert!(p.is_excluded("text.raw"));
        assert!(!p.is_excluded("foo"));
        assert!(!p.is_excluded("barn"));
    }

    #[test]
    fn test_object_container_of_exclude() {
        let p = policy(&["obj.secret"], &[]);
        assert!(p.is_excluded("obj"));
        assert!(p.is_excluded("obj.secret"));
        assert!(!p.is_excluded("obj.public"));

        // a non-object prefix does not hide its children
        let p = policy(&["foo.bar"], &[]);
        assert!(!p.is_excluded("foo"));
    }

    #[test]
    fn test_wildcard_exclude_on_any() {
        let p = policy(&["field_two"], &[]);
        assert!(p.is_excluded("field_*"));
        assert!(!p.is_excluded("obj.*"));
        assert!(p.is_excluded("*_two"));
    }

    #[test]
    fn test_wildcard_include_requires_all() {
        let p = policy(&[], &["field_one"]);
        assert!(!p.is_included("field_*"));
        assert!(p.is_included("field_o*"));

        let p = policy(&[], &["field_one", "field_two"]);
        assert!(p.is_included("field_*"));
        assert!(!p.is_included("nothing_*"));
    }

    #[test]
    fn test_nested_includes() {
        let p = policy(&[], &["obj"]);
        assert!(p.is_included("obj.public"));
        assert!(!p.is_included("foo"));
        assert!(p.is_allowed("obj.secret"));

        let p = policy(&["obj.secret"], &["obj"]);
        assert!(!p.is_allowed("obj.secret"));
        assert!(p.is_allowed("obj.public"));
    }
}
