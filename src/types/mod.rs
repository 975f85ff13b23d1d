//! Scalar type converters
//!
//! A scalar type converts between the raw string found in an attribute or in
//! element text and a native [`Value`]. Converters are stateless once built
//! and shared between schemas through `Arc`.

mod boolean;
mod enumeration;
mod scalars;

pub use boolean::BooleanType;
pub use enumeration::EnumType;
pub use scalars::{DecimalType, FloatType, IntType, StringType};

use crate::error::{ConversionError, Result};
use crate::names::names_equal;
use crate::values::Value;
use std::fmt;

/// Bidirectional converter between raw strings and native values
pub trait ScalarType: fmt::Debug + Send + Sync {
    /// Short name of the native type, used in error messages
    fn type_name(&self) -> &'static str;

    /// Convert a raw string to a native value
    fn to_native(&self, raw: &str) -> Result<Value>;

    /// Convert a native value back to its raw string
    fn to_primitive(&self, value: &Value) -> Result<String>;
}

/// A raw token recognised by boolean and enumeration types
///
/// Numeric tokens compare by parsing the raw value into the token's type, so
/// `Int(1)` also matches `"01"` and `" 1"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Compared as a string
    Text(String),
    /// Compared as an integer
    Int(i64),
    /// Compared as a float
    Float(f64),
}

impl Token {
    /// Check if a raw value matches this token
    pub fn matches(&self, raw: &str, case_sensitive: bool) -> bool {
        match self {
            Token::Text(text) => names_equal(text, raw, case_sensitive),
            Token::Int(i) => raw.trim().parse::<i64>().map_or(false, |v| v == *i),
            Token::Float(f) => raw.trim().parse::<f64>().map_or(false, |v| v == *f),
        }
    }

    /// Raw string written on export
    pub fn to_raw(&self) -> String {
        match self {
            Token::Text(text) => text.clone(),
            Token::Int(i) => i.to_string(),
            Token::Float(f) => f.to_string(),
        }
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token::Text(s.to_string())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token::Text(s)
    }
}

impl From<i64> for Token {
    fn from(i: i64) -> Self {
        Token::Int(i)
    }
}

impl From<f64> for Token {
    fn from(f: f64) -> Self {
        Token::Float(f)
    }
}

/// Error for a native value of the wrong kind handed to `to_primitive`
pub(crate) fn type_mismatch(expected: &str, value: &Value) -> ConversionError {
    ConversionError::new(format!(
        "Expected {} value, found {}",
        expected,
        value.type_name()
    ))
}

/// Closed-choice check shared by the string and numeric types
pub(crate) fn check_choice<T: PartialEq>(
    choices: Option<&[T]>,
    value: &T,
    raw: &str,
) -> Result<()> {
    match choices {
        Some(choices) if !choices.contains(value) => Err(ConversionError::new(
            "Value was not in the set of allowed choices",
        )
        .with_raw(raw)
        .into()),
        _ => Ok(()),
    }
}
