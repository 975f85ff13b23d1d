//! Boolean scalar type with configurable tokens

use super::{type_mismatch, ScalarType, Token};
use crate::error::{ConversionError, Result};
use crate::values::Value;

/// Boolean encoded as one of two raw tokens
///
/// Defaults to `"1"` for true and `"0"` for false, compared case-sensitively.
#[derive(Debug, Clone)]
pub struct BooleanType {
    true_token: Token,
    false_token: Token,
    case_sensitive: bool,
}

impl Default for BooleanType {
    fn default() -> Self {
        Self {
            true_token: Token::from("1"),
            false_token: Token::from("0"),
            case_sensitive: true,
        }
    }
}

impl BooleanType {
    /// Create a boolean type with the default `"1"`/`"0"` tokens
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a boolean type with custom tokens
    pub fn with_tokens(true_token: impl Into<Token>, false_token: impl Into<Token>) -> Self {
        Self {
            true_token: true_token.into(),
            false_token: false_token.into(),
            ..Self::default()
        }
    }

    /// Set case sensitivity of text tokens
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// The tokens as `(true, false)`
    pub fn tokens(&self) -> (&Token, &Token) {
        (&self.true_token, &self.false_token)
    }
}

impl ScalarType for BooleanType {
    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn to_native(&self, raw: &str) -> Result<Value> {
        if self.true_token.matches(raw, self.case_sensitive) {
            Ok(Value::Bool(true))
        } else if self.false_token.matches(raw, self.case_sensitive) {
            Ok(Value::Bool(false))
        } else {
            Err(ConversionError::new(format!(
                "'{}' is neither '{}' nor '{}'",
                raw,
                self.true_token.to_raw(),
                self.false_token.to_raw()
            ))
            .with_raw(raw)
            .into())
        }
    }

    fn to_primitive(&self, value: &Value) -> Result<String> {
        match value {
            Value::Bool(true) => Ok(self.true_token.to_raw()),
            Value::Bool(false) => Ok(self.false_token.to_raw()),
            other => Err(type_mismatch(self.type_name(), other).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tokens() {
        let t = BooleanType::new();
        assert_eq!(t.to_native("1").unwrap(), Value::Bool(true));
        assert_eq!(t.to_native("0").unwrap(), Value::Bool(false));
        assert!(t.to_native("true").is_err());
        assert_eq!(t.to_primitive(&Value::Bool(true)).unwrap(), "1");
        assert_eq!(t.to_primitive(&Value::Bool(false)).unwrap(), "0");
    }

    #[test]
    fn test_text_tokens_case_rule() {
        let t = BooleanType::with_tokens("Yes", "No");
        assert_eq!(t.to_native("Yes").unwrap(), Value::Bool(true));
        assert!(t.to_native("yes").is_err());

        let t = t.with_case_sensitive(false);
        assert_eq!(t.to_native("yes").unwrap(), Value::Bool(true));
        assert_eq!(t.to_native("NO").unwrap(), Value::Bool(false));
        assert_eq!(t.to_primitive(&Value::Bool(false)).unwrap(), "No");
    }

    #[test]
    fn test_numeric_tokens() {
        let t = BooleanType::with_tokens(1i64, 0i64);
        assert_eq!(t.to_native("001").unwrap(), Value::Bool(true));
        assert_eq!(t.to_native("-0").unwrap(), Value::Bool(false));
        assert!(t.to_native("2").is_err());
    }

    #[test]
    fn test_primitive_rejects_non_bool() {
        let t = BooleanType::new();
        assert!(t.to_primitive(&Value::Int(1)).is_err());
    }
}
