//! Content field

use super::DefaultValue;
use crate::error::Result;
use crate::types::ScalarType;
use crate::values::Value;
use std::sync::Arc;

/// The field bound to an element's direct text
///
/// Surrounding whitespace is stripped before conversion unless disabled.
/// Whitespace-only text read by [`parse_tree`](crate::documents::parse_tree)
/// arrives as no text, so the field is left untouched in that case.
#[derive(Debug, Clone)]
pub struct ContentField {
    ty: Arc<dyn ScalarType>,
    strip: bool,
    default: DefaultValue,
}

impl ContentField {
    /// Content converted through a scalar type
    pub fn new(ty: impl ScalarType + 'static) -> Self {
        Self {
            ty: Arc::new(ty),
            strip: true,
            default: DefaultValue::Undefined,
        }
    }

    /// Set whether surrounding whitespace is stripped on import
    pub fn strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    /// Set a static default
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultValue::Static(value.into());
        self
    }

    /// Set a computed default
    pub fn default_with(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = DefaultValue::Factory(Arc::new(factory));
        self
    }

    /// Get the default
    pub fn default(&self) -> &DefaultValue {
        &self.default
    }

    /// Convert the element's text
    pub fn import(&self, text: &str) -> Result<Value> {
        let text = if self.strip { text.trim() } else { text };
        self.ty.to_native(text)
    }

    /// Write the value as element text; null writes no text
    pub fn export(&self, value: &Value) -> Result<Option<String>> {
        match value {
            Value::Null => Ok(None),
            value => self.ty.to_primitive(value).map(Some),
        }
    }
}
