//! Attribute fields

use super::DefaultValue;
use crate::error::Result;
use crate::names::{names_equal, to_camelcase};
use crate::types::ScalarType;
use crate::values::Value;
use std::sync::Arc;

/// What an attribute field converts its raw value into
#[derive(Debug, Clone)]
pub enum AttributeKind {
    /// Raw value converted by a scalar type
    Scalar(Arc<dyn ScalarType>),
    /// Presence flag written as `name="name"`
    Boolean,
}

/// A field bound to one attribute of the element
///
/// The attribute name is the field name in camelCase unless overridden, and
/// is matched case-sensitively unless configured otherwise.
#[derive(Debug, Clone)]
pub struct AttributeField {
    kind: AttributeKind,
    serialized_name: Option<String>,
    case_sensitive: bool,
    default: DefaultValue,
    xml_name: String,
}

impl AttributeField {
    fn with_kind(kind: AttributeKind, default: DefaultValue) -> Self {
        Self {
            kind,
            serialized_name: None,
            case_sensitive: true,
            default,
            xml_name: String::new(),
        }
    }

    /// Attribute converted through a scalar type
    pub fn scalar(ty: impl ScalarType + 'static) -> Self {
        Self::with_kind(AttributeKind::Scalar(Arc::new(ty)), DefaultValue::Undefined)
    }

    /// Attribute whose value must equal its own name, e.g. `checked="checked"`
    ///
    /// Defaults to false.
    pub fn boolean() -> Self {
        Self::with_kind(AttributeKind::Boolean, DefaultValue::Static(Value::Bool(false)))
    }

    /// Override the attribute name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.serialized_name = Some(name.into());
        self
    }

    /// Set case sensitivity of the name match
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
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

    /// Get the field kind
    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    /// Get the explicitly configured attribute name
    pub fn serialized_name(&self) -> Option<&str> {
        self.serialized_name.as_deref()
    }

    /// Get the attribute name used for matching and export
    pub fn xml_name(&self) -> &str {
        &self.xml_name
    }

    /// Get the default
    pub fn default(&self) -> &DefaultValue {
        &self.default
    }

    pub(crate) fn bind(&mut self, field_name: &str) {
        self.xml_name = self
            .serialized_name
            .clone()
            .unwrap_or_else(|| to_camelcase(field_name));
    }

    /// Check if an attribute name belongs to this field
    pub fn matches(&self, attr_name: &str) -> bool {
        names_equal(&self.xml_name, attr_name, self.case_sensitive)
    }

    /// Convert a matched raw attribute value
    pub fn import(&self, raw: &str) -> Result<Value> {
        match &self.kind {
            AttributeKind::Scalar(ty) => ty.to_native(raw),
            AttributeKind::Boolean => Ok(Value::Bool(names_equal(
                &self.xml_name,
                raw,
                self.case_sensitive,
            ))),
        }
    }

    /// Write the value as an attribute, or nothing for null and false
    pub fn export(&self, value: &Value) -> Result<Option<(String, String)>> {
        match (&self.kind, value) {
            (_, Value::Null) => Ok(None),
            (AttributeKind::Scalar(ty), value) => {
                Ok(Some((self.xml_name.clone(), ty.to_primitive(value)?)))
            }
            (AttributeKind::Boolean, Value::Bool(true)) => {
                Ok(Some((self.xml_name.clone(), self.xml_name.clone())))
            }
            (AttributeKind::Boolean, _) => Ok(None),
        }
    }
}
