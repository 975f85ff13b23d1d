//! String and numeric scalar types

use super::{check_choice, type_mismatch, ScalarType};
use crate::error::{ConversionError, Result};
use crate::values::Value;
use rust_decimal::Decimal;
use std::str::FromStr;

// =============================================================================
// String
// =============================================================================

/// Identity conversion with an optional closed choice set
#[derive(Debug, Clone, Default)]
pub struct StringType {
    choices: Option<Vec<String>>,
}

impl StringType {
    /// Create an unconstrained string type
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict accepted values to `choices`
    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }
}

impl ScalarType for StringType {
    fn type_name(&self) -> &'static str {
        "string"
    }

    fn to_native(&self, raw: &str) -> Result<Value> {
        let value = raw.to_string();
        check_choice(self.choices.as_deref(), &value, raw)?;
        Ok(Value::String(value))
    }

    fn to_primitive(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(type_mismatch(self.type_name(), other).into()),
        }
    }
}

// =============================================================================
// Numbers
// =============================================================================

fn parse_number<T: FromStr>(raw: &str, type_name: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        ConversionError::new(format!("'{}' is not a valid {} value", raw, type_name))
            .with_raw(raw)
            .into()
    })
}

/// Signed integer type with an optional closed choice set
#[derive(Debug, Clone, Default)]
pub struct IntType {
    choices: Option<Vec<i64>>,
}

impl IntType {
    /// Create an unconstrained integer type
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict accepted values to `choices`
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = i64>) -> Self {
        self.choices = Some(choices.into_iter().collect());
        self
    }
}

impl ScalarType for IntType {
    fn type_name(&self) -> &'static str {
        "integer"
    }

    fn to_native(&self, raw: &str) -> Result<Value> {
        let value: i64 = parse_number(raw, self.type_name())?;
        check_choice(self.choices.as_deref(), &value, raw)?;
        Ok(Value::Int(value))
    }

    fn to_primitive(&self, value: &Value) -> Result<String> {
        match value {
            Value::Int(i) => Ok(i.to_string()),
            other => Err(type_mismatch(self.type_name(), other).into()),
        }
    }
}

/// Double precision float type with an optional closed choice set
#[derive(Debug, Clone, Default)]
pub struct FloatType {
    choices: Option<Vec<f64>>,
}

impl FloatType {
    /// Create an unconstrained float type
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict accepted values to `choices`
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = f64>) -> Self {
        self.choices = Some(choices.into_iter().collect());
        self
    }
}

impl ScalarType for FloatType {
    fn type_name(&self) -> &'static str {
        "float"
    }

    fn to_native(&self, raw: &str) -> Result<Value> {
        let value: f64 = parse_number(raw, self.type_name())?;
        check_choice(self.choices.as_deref(), &value, raw)?;
        Ok(Value::Float(value))
    }

    fn to_primitive(&self, value: &Value) -> Result<String> {
        match value {
            Value::Float(f) => Ok(f.to_string()),
            // Integers are accepted where floats are expected
            Value::Int(i) => Ok(i.to_string()),
            other => Err(type_mismatch(self.type_name(), other).into()),
        }
    }
}

/// Arbitrary precision decimal type with an optional closed choice set
#[derive(Debug, Clone, Default)]
pub struct DecimalType {
    choices: Option<Vec<Decimal>>,
}

impl DecimalType {
    /// Create an unconstrained decimal type
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict accepted values to `choices`
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = Decimal>) -> Self {
        self.choices = Some(choices.into_iter().collect());
        self
    }
}

impl ScalarType for DecimalType {
    fn type_name(&self) -> &'static str {
        "decimal"
    }

    fn to_native(&self, raw: &str) -> Result<Value> {
        let value: Decimal = parse_number(raw, self.type_name())?;
        check_choice(self.choices.as_deref(), &value, raw)?;
        Ok(Value::Decimal(value))
    }

    fn to_primitive(&self, value: &Value) -> Result<String> {
        match value {
            Value::Decimal(d) => Ok(d.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            other => Err(type_mismatch(self.type_name(), other).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_string_type() {
        let t = StringType::new();
        assert_eq!(t.to_native("hello").unwrap(), Value::from("hello"));
        assert_eq!(t.to_primitive(&Value::from("hello")).unwrap(), "hello");
        assert!(t.to_primitive(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_string_choices() {
        let t = StringType::new().with_choices(["A", "B"]);
        assert_eq!(t.to_native("B").unwrap(), Value::from("B"));
        assert!(matches!(t.to_native("C"), Err(Error::Conversion(_))));
    }

    #[test]
    fn test_int_type() {
        let t = IntType::new();
        assert_eq!(t.to_native("23").unwrap(), Value::Int(23));
        assert_eq!(t.to_native(" -7 ").unwrap(), Value::Int(-7));
        assert!(t.to_native("2.5").is_err());
        assert!(t.to_native("abc").is_err());
        assert_eq!(t.to_primitive(&Value::Int(23)).unwrap(), "23");
    }

    #[test]
    fn test_int_choices_compare_parsed_value() {
        let t = IntType::new().with_choices([1, 2, 3]);
        assert_eq!(t.to_native("02").unwrap(), Value::Int(2));
        assert!(t.to_native("4").is_err());
    }

    #[test]
    fn test_float_type() {
        let t = FloatType::new();
        assert_eq!(t.to_native("1.5").unwrap(), Value::Float(1.5));
        assert_eq!(t.to_native("3").unwrap(), Value::Float(3.0));
        assert_eq!(t.to_primitive(&Value::Float(1.5)).unwrap(), "1.5");
        assert!(t.to_native("x").is_err());

        let t = FloatType::new().with_choices([0.5, 1.0]);
        assert!(t.to_native("1").is_ok());
        assert!(t.to_native("2").is_err());
    }

    #[test]
    fn test_decimal_type() {
        let t = DecimalType::new();
        let value = t.to_native("12.50").unwrap();
        assert_eq!(value, Value::Decimal(Decimal::new(1250, 2)));
        assert_eq!(t.to_primitive(&value).unwrap(), "12.50");
        assert!(t.to_native("twelve").is_err());
    }
}
