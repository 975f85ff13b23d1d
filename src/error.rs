//! Error types for xmlelem
//!
//! This module defines all error types used throughout the library:
//! scalar conversion failures, rogue fragments met during a strict import,
//! reads of unset fields and schema declaration conflicts.

use std::fmt;
use thiserror::Error;

/// Result type alias using xmlelem Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xmlelem operations
#[derive(Error, Debug)]
pub enum Error {
    /// A scalar value could not be converted
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// An attribute, child or text matched no declared field (strict import)
    #[error("unexpected {fragment} in model '{model}'")]
    UnexpectedFragment {
        /// Declared name of the model being imported
        model: String,
        /// The fragment that was not consumed
        fragment: Fragment,
    },

    /// A field was read before being set and has no default
    #[error("field '{field}' of model '{model}' has no value")]
    MissingValue {
        /// Declared name of the model
        model: String,
        /// Name of the field that was read
        field: String,
    },

    /// A field name is not declared by the model
    #[error("model '{model}' has no field '{field}'")]
    UnknownField {
        /// Declared name of the model
        model: String,
        /// The undeclared field name
        field: String,
    },

    /// A model declaration could not be compiled
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A model name did not resolve to any declaration
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Invalid tag or attribute name
    #[error("name error: {0}")]
    Name(String),

    /// A registered field validator rejected a value
    #[error("validation of '{model}.{field}' failed: {message}")]
    Validation {
        /// Declared name of the model
        model: String,
        /// Name of the validated field
        field: String,
        /// Message returned by the validator
        message: String,
    },

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// XML parsing or writing error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A piece of an element that an import pass tried to consume
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// An attribute, by name
    Attribute(String),
    /// A child element, by tag
    Child(String),
    /// The element's direct text
    Text,
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Attribute(name) => write!(f, "attribute '{}'", name),
            Fragment::Child(tag) => write!(f, "child '{}'", tag),
            Fragment::Text => write!(f, "text content"),
        }
    }
}

/// Scalar conversion error with context
#[derive(Debug, Clone)]
pub struct ConversionError {
    /// Error message
    pub message: String,
    /// Raw value that failed to convert
    pub raw: Option<String>,
    /// Field being converted
    pub field: Option<String>,
}

impl ConversionError {
    /// Create a new conversion error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raw: None,
            field: None,
        }
    }

    /// Set the raw value
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Set the field name
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref raw) = self.raw {
            write!(f, "\n\nValue: '{}'", raw)?;
        }

        if let Some(ref field) = self.field {
            write!(f, "\n\nField: {}", field)?;
        }

        Ok(())
    }
}

impl std::error::Error for ConversionError {}

/// Model declaration error
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Error message
    pub message: String,
    /// Declared name of the offending model
    pub model: Option<String>,
    /// Offending field
    pub field: Option<String>,
}

impl SchemaError {
    /// Create a new schema error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model: None,
            field: None,
        }
    }

    /// Set the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the field name
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref model) = self.model {
            write!(f, "\n\nModel: {}", model)?;
        }

        if let Some(ref field) = self.field {
            write!(f, "\n\nField: {}", field)?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Attach a field name to a conversion failure, leaving other errors as they are
pub(crate) fn in_field(err: Error, field: &str) -> Error {
    match err {
        Error::Conversion(conv) if conv.field.is_none() => {
            Error::Conversion(conv.with_field(field))
        }
        other => other,
    }
}
