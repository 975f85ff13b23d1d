//! Import configuration
//!
//! Controls how an import pass treats fragments that no declared field
//! consumes, and which [`Limits`] apply to the imported tree.

use crate::error::{Error, Result};
use crate::limits::Limits;
use std::fmt;

/// Policy for attributes, children and text matched by no field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Unmatched fragments fail the import
    Strict,
    /// Unmatched fragments are dropped
    #[default]
    Lenient,
}

impl ImportMode {
    /// Parse import mode from string
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "strict" => Ok(ImportMode::Strict),
            "lenient" => Ok(ImportMode::Lenient),
            _ => Err(Error::Name(format!(
                "Invalid import mode: '{}'. Must be 'strict' or 'lenient'",
                s
            ))),
        }
    }

    /// Get the mode as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Strict => "strict",
            ImportMode::Lenient => "lenient",
        }
    }

    /// Check if this is the strict mode
    pub fn is_strict(&self) -> bool {
        matches!(self, ImportMode::Strict)
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for an import pass
///
/// The same configuration is used for every nested model imported from
/// child elements.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    mode: ImportMode,
    limits: Limits,
}

impl ImportConfig {
    /// Create a new lenient configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a strict configuration with default limits
    pub fn strict() -> Self {
        Self::default().with_mode(ImportMode::Strict)
    }

    /// Get the import mode
    pub fn mode(&self) -> ImportMode {
        self.mode
    }

    /// Get the limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Set the import mode
    pub fn with_mode(mut self, mode: ImportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}
