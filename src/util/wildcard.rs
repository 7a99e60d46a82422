//! Glob-style wildcard helpers shared by the matcher, the type config and
//! query access control.
//!
//! Supports the following wildcards:
//! - `*` matches zero or more characters
//! - `?` matches exactly one character
//! - `\*` and `\?` match literal `*` and `?` characters

use regex::Regex;

use crate::error::{Result, XluceneError};

/// Check whether `value` contains an unescaped `*` or `?`.
pub fn has_wildcard(value: &str) -> bool {
    let mut escaped = false;
    for ch in value.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '*' | '?' => return true,
            _ => {}
        }
    }
    false
}

/// Check whether `value` starts with an unescaped `*` or `?`.
pub fn has_prefix_wildcard(value: &str) -> bool {
    value.starts_with('*') || value.starts_with('?')
}

/// Translate a wildcard pattern into an anchored regex source.
///
/// `single` is the regex fragment used for `?`; values use `\S` while field
/// names use `[^.]` so a single segment never spans a path separator.
pub fn wildcard_to_regex(pattern: &str, single: &str, many: &str) -> String {
    let mut regex_pattern = String::with_capacity(pattern.len() + 8);
    regex_pattern.push('^');

    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped) => regex_pattern.push_str(&regex::escape(&escaped.to_string())),
                None => regex_pattern.push_str("\\\\"),
            },
            '*' => regex_pattern.push_str(many),
            '?' => regex_pattern.push_str(single),
            c => regex_pattern.push_str(&regex::escape(&c.to_string())),
        }
    }

    regex_pattern.push('$');
    regex_pattern
}

/// Compile a wildcard value pattern (`?` matches one non-whitespace char).
pub fn compile_value_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(&wildcard_to_regex(pattern, "\\S", ".*"))
        .map_err(|e| XluceneError::other(format!("Invalid wildcard pattern: {e}")))
}

/// Compile a wildcard field-name pattern.
pub fn compile_field_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(&wildcard_to_regex(pattern, "[^.]", ".*"))
        .map_err(|e| XluceneError::other(format!("Invalid field pattern: {e}")))
}

/// Check whether a concrete field name matches a wildcard field pattern.
pub fn field_matches(pattern: &str, field: &str) -> bool {
    if !has_wildcard(pattern) {
        return pattern == field;
    }
    compile_field_pattern(pattern)
        .map(|regex| regex.is_match(field))
        .unwrap_or(false)
}
