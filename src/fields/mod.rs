//! Field descriptors
//!
//! A declared field is one of three families:
//! - [`AttributeField`]: bound to an attribute of the element
//! - [`ChildField`]: bound to one or more child elements
//! - [`ContentField`]: bound to the element's direct text
//!
//! Every descriptor knows how to recognise the fragment it consumes, how to
//! fold a matched fragment into the field's current value, and how to write
//! the value back out.

mod attributes;
mod children;
mod content;

pub use attributes::{AttributeField, AttributeKind};
pub use children::{ChildField, ChildKind};
pub use content::ContentField;

use crate::values::Value;
use std::fmt;
use std::sync::Arc;

/// Factory producing a fresh default value for every new instance
pub type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// Default value of a field
#[derive(Clone, Default)]
pub enum DefaultValue {
    /// No default; the field stays absent until imported or set
    #[default]
    Undefined,
    /// A fixed value, cloned into each instance
    Static(Value),
    /// A value computed per instance
    Factory(DefaultFactory),
}

impl DefaultValue {
    /// Produce the default, if any
    pub fn produce(&self) -> Option<Value> {
        match self {
            DefaultValue::Undefined => None,
            DefaultValue::Static(value) => Some(value.clone()),
            DefaultValue::Factory(factory) => Some(factory()),
        }
    }

    /// Check if a default exists
    pub fn is_defined(&self) -> bool {
        !matches!(self, DefaultValue::Undefined)
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Undefined => write!(f, "Undefined"),
            DefaultValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            DefaultValue::Factory(_) => write!(f, "Factory(..)"),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Static(value)
    }
}

/// Set of candidate models accepted by a child slot
///
/// With `allow_variants`, every model registered as extending a candidate
/// (transitively) is accepted too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    candidates: Vec<String>,
    allow_variants: bool,
}

impl ModelSpec {
    /// Accept a single model
    pub fn of(model: impl Into<String>) -> Self {
        Self {
            candidates: vec![model.into()],
            allow_variants: false,
        }
    }

    /// Accept any of several models, tried in the given order
    pub fn any_of<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: models.into_iter().map(Into::into).collect(),
            allow_variants: false,
        }
    }

    /// Also accept registered variants of the candidates
    pub fn with_variants(mut self) -> Self {
        self.allow_variants = true;
        self
    }

    /// Get the declared candidate names
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Check if variants are accepted
    pub fn allows_variants(&self) -> bool {
        self.allow_variants
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.candidates.join("|"))?;
        if self.allow_variants {
            write!(f, " (+variants)")?;
        }
        Ok(())
    }
}
