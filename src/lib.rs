//! # xmlelem
//!
//! Declarative, bidirectional mapping between element trees and typed models.
//!
//! A model is declared as a list of fields. Each field is bound to one part of
//! an element:
//!
//! - an attribute ([`AttributeField`])
//! - one or more child elements ([`ChildField`])
//! - the element's direct text ([`ContentField`])
//!
//! Declarations are compiled into a [`Registry`], which imports a
//! [`TreeNode`] into a [`ModelInstance`] and exports instances back to trees.
//! Child fields may accept several candidate models, and optionally every
//! model derived from them; the child's tag selects which one is built.
//!
//! ## Example
//!
//! ```rust
//! use xmlelem::{
//!     parse_tree, write_tree, AttributeField, ChildField, ContentField, ImportConfig,
//!     IntType, ModelDecl, Registry, StringType,
//! };
//!
//! let registry = Registry::builder()
//!     .with(
//!         ModelDecl::new("Foo")
//!             .attribute("field1", AttributeField::scalar(IntType::new()))
//!             .child("bar", ChildField::content(StringType::new()))
//!             .content("text", ContentField::new(StringType::new())),
//!     )?
//!     .build()?;
//!
//! let node = parse_tree(r#"<Foo field1="23"><Bar>Hello!</Bar>Some content</Foo>"#)?;
//! let mut foo = registry.import("Foo", &node, &ImportConfig::new())?;
//! assert_eq!(foo.get_int("field1")?, Some(23));
//! assert_eq!(foo.get_str("bar")?, Some("Hello!"));
//!
//! foo.set("field1", 2)?;
//! assert_eq!(
//!     write_tree(&foo.export()?)?,
//!     r#"<Foo field1="2">Some content<Bar>Hello!</Bar></Foo>"#
//! );
//! # Ok::<(), xmlelem::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod names;

// Trees and values
pub mod tree;
pub mod values;
pub mod types;

// Declarations
pub mod fields;
pub mod schema;
pub mod registry;

// Engine
pub mod config;
pub mod model;

// Markup adapter
pub mod documents;

// Re-exports for convenience
pub use config::{ImportConfig, ImportMode};
pub use documents::{parse_tree, parse_tree_with_limits, write_tree};
pub use error::{ConversionError, Error, Fragment, Result, SchemaError};
pub use fields::{AttributeField, ChildField, ContentField, DefaultValue, ModelSpec};
pub use limits::Limits;
pub use model::ModelInstance;
pub use registry::{Registry, RegistryBuilder};
pub use schema::{ModelDecl, Schema};
pub use tree::TreeNode;
pub use types::{BooleanType, DecimalType, EnumType, FloatType, IntType, ScalarType, StringType, Token};
pub use values::Value;

/// Version of the xmlelem library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
