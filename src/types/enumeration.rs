//! Enumeration scalar type

use super::{type_mismatch, ScalarType, Token};
use crate::error::{ConversionError, Result};
use crate::values::Value;
use indexmap::IndexMap;

/// A fixed set of named variants, each bound to a raw token
///
/// Native values are [`Value::Enum`] holding the variant name. Raw values are
/// matched against the variants in declaration order; the first match wins.
#[derive(Debug, Clone)]
pub struct EnumType {
    variants: IndexMap<String, Token>,
    case_sensitive: bool,
}

impl Default for EnumType {
    fn default() -> Self {
        Self {
            variants: IndexMap::new(),
            case_sensitive: true,
        }
    }
}

impl EnumType {
    /// Create an enumeration with no variants
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variant
    pub fn with_variant(mut self, name: impl Into<String>, raw: impl Into<Token>) -> Self {
        self.variants.insert(name.into(), raw.into());
        self
    }

    /// Set case sensitivity of text tokens
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Iterate the variant names in declaration order
    pub fn variant_names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }
}

impl ScalarType for EnumType {
    fn type_name(&self) -> &'static str {
        "enum"
    }

    fn to_native(&self, raw: &str) -> Result<Value> {
        self.variants
            .iter()
            .find(|(_, token)| token.matches(raw, self.case_sensitive))
            .map(|(name, _)| Value::Enum(name.clone()))
            .ok_or_else(|| {
                let names: Vec<&str> = self.variant_names().collect();
                ConversionError::new(format!(
                    "'{}' matches no variant of {}",
                    raw,
                    names.join(", ")
                ))
                .with_raw(raw)
                .into()
            })
    }

    fn to_primitive(&self, value: &Value) -> Result<String> {
        match value {
            Value::Enum(name) => self.variants.get(name).map(Token::to_raw).ok_or_else(|| {
                ConversionError::new(format!("'{}' is not a declared variant", name)).into()
            }),
            other => Err(type_mismatch(self.type_name(), other).into()),
        }
    }
}
