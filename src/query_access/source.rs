//! `_source` projection narrowing.

use serde_json::Value;

use crate::query_access::fields::FieldPolicy;

/// The `_source_includes` / `_source_excludes` lists for a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SourceFields {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

/// Narrow a caller's projection so it never exposes more than the policy.
///
/// Requested includes are kept only when the policy includes them; if none
/// survive, the policy's own includes are used. Excludes are the union of
/// both sides.
pub(crate) fn restrict_source_fields(
    policy: &FieldPolicy,
    requested_includes: Option<&Value>,
    requested_excludes: Option<&Value>,
) -> SourceFields {
    let requested_includes = field_list(requested_includes);
    let requested_excludes = field_list(requested_excludes);

    let includes = if policy.includes().is_empty() {
        requested_includes
    } else {
        let narrowed: Vec<String> = requested_includes
            .into_iter()
            .filter(|field| policy.is_included(field))
            .collect();
        if narrowed.is_empty() {
            policy.includes().to_vec()
        } else {
            narrowed
        }
    };

    let mut excludes = requested_excludes;
    for field in policy.excludes() {
        if !excludes.contains(field) {
            excludes.push(field.clone());
        }
    }

    SourceFields { includes, excludes }
}

/// A field list given as an array or a comma separated string.
fn field_list(value: Option<&Value>) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let mut push = |field: &str| {
        let field = field.trim();
        if !field.is_empty() && !fields.iter().any(|f| f == field) {
            fields.push(field.to_string());
        }
    };
    match value {
        Some(Value::String(s)) => s.split(',').for_each(&mut push),
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).for_each(&mut push),
        _ => {}
    }
    fields
}
