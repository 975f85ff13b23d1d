//! Name casing and validation
//!
//! Field names are declared in snake_case. Attribute names default to the
//! camelCase form of the field name, child tags to the UpperCamelCase form.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

// Simplified XML Name production: no colons, since tags are matched by local name only
static NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\-\.0-9\u{B7}]*$")
        .unwrap()
});

fn first_upper(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert a snake_case name to UpperCamelCase (`bar_null1` -> `BarNull1`)
pub fn to_upper_camelcase(name: &str) -> String {
    name.split('_').map(first_upper).collect()
}

/// Convert a snake_case name to camelCase (`field_one` -> `fieldOne`)
///
/// The first segment is kept as-is.
pub fn to_camelcase(name: &str) -> String {
    let mut parts = name.split('_');
    let mut result = parts.next().unwrap_or_default().to_string();
    for part in parts {
        result.push_str(&first_upper(part));
    }
    result
}

/// Check if a string is a valid (unprefixed) element or attribute name
pub fn is_valid_name(name: &str) -> bool {
    NAME.is_match(name)
}

/// Validate a name and return an error if invalid
pub fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::Name(format!("Invalid XML Name: '{}'", name)))
    }
}

/// Compare two names, folding case unless `case_sensitive`
pub fn names_equal(expected: &str, actual: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        expected == actual
    } else {
        expected.to_lowercase() == actual.to_lowercase()
    }
}
