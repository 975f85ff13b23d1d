//! Model declarations and compiled schemas
//!
//! A [`ModelDecl`] lists a model's fields in declaration order. Compiling it
//! (through [`RegistryBuilder::declare`](crate::registry::RegistryBuilder::declare))
//! merges it over the compiled schema of its base model and yields an
//! immutable [`Schema`].
//!
//! Inheritance rules:
//! - base fields come first, in the base's order
//! - a field redeclared by the derived model replaces the inherited one in place
//! - validators are inherited the same way
//! - the tag name is never inherited; tag case sensitivity is

use crate::error::{Result, SchemaError};
use crate::fields::{AttributeField, ChildField, ContentField};
use crate::names::{names_equal, validate_name};
use crate::values::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Validator run against a present field value by [`ModelInstance::validate`](crate::model::ModelInstance::validate)
pub type FieldValidator = Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>;

/// A field of any family, as declared
#[derive(Debug, Clone)]
pub enum FieldDecl {
    /// Attribute field
    Attribute(AttributeField),
    /// Child field
    Child(ChildField),
    /// Content field
    Content(ContentField),
}

impl FieldDecl {
    fn category(&self) -> &'static str {
        match self {
            FieldDecl::Attribute(_) => "attribute",
            FieldDecl::Child(_) => "child",
            FieldDecl::Content(_) => "content",
        }
    }
}

/// Declaration of a model: its name, optional base, tag rules and fields
#[derive(Clone)]
pub struct ModelDecl {
    name: String,
    base: Option<String>,
    tag_name: Option<String>,
    tag_case_sensitive: Option<bool>,
    fields: Vec<(String, FieldDecl)>,
    validators: Vec<(String, FieldValidator)>,
}

impl ModelDecl {
    /// Start declaring a model
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            tag_name: None,
            tag_case_sensitive: None,
            fields: Vec::new(),
            validators: Vec::new(),
        }
    }

    /// Derive from an already declared model
    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Override the tag name (defaults to the model name)
    pub fn tag_name(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = Some(tag.into());
        self
    }

    /// Set case sensitivity of the model's own tag match
    pub fn tag_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.tag_case_sensitive = Some(case_sensitive);
        self
    }

    /// Declare an attribute field
    pub fn attribute(mut self, name: impl Into<String>, field: AttributeField) -> Self {
        self.fields.push((name.into(), FieldDecl::Attribute(field)));
        self
    }

    /// Declare a child field
    pub fn child(mut self, name: impl Into<String>, field: ChildField) -> Self {
        self.fields.push((name.into(), FieldDecl::Child(field)));
        self
    }

    /// Declare the content field
    pub fn content(mut self, name: impl Into<String>, field: ContentField) -> Self {
        self.fields.push((name.into(), FieldDecl::Content(field)));
        self
    }

    /// Register a validator for a field
    pub fn validator(
        mut self,
        field: impl Into<String>,
        validator: impl Fn(&Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push((field.into(), Arc::new(validator)));
        self
    }

    /// Get the declared model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the base model name
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }
}

impl fmt::Debug for ModelDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDecl")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("tag_name", &self.tag_name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Compiled, immutable description of a model
#[derive(Clone)]
pub struct Schema {
    name: String,
    lineage: Vec<String>,
    tag_name: String,
    tag_case_sensitive: bool,
    attributes: IndexMap<String, AttributeField>,
    children: IndexMap<String, ChildField>,
    content: Option<(String, ContentField)>,
    validators: IndexMap<String, FieldValidator>,
}

impl Schema {
    /// Compile a declaration over its (already compiled) base
    pub(crate) fn compile(decl: ModelDecl, base: Option<&Schema>) -> Result<Self> {
        let conflict = |message: String, field: &str| {
            SchemaError::new(message).with_model(&decl.name).with_field(field)
        };

        let mut lineage = vec![decl.name.clone()];
        let mut attributes = IndexMap::new();
        let mut children = IndexMap::new();
        let mut content = None;
        let mut validators = IndexMap::new();
        let mut tag_case_sensitive = false;

        if let Some(base) = base {
            lineage.extend(base.lineage.iter().cloned());
            attributes = base.attributes.clone();
            children = base.children.clone();
            content = base.content.clone();
            validators = base.validators.clone();
            tag_case_sensitive = base.tag_case_sensitive;
        }

        for (name, field) in decl.fields.iter().cloned() {
            let taken = if attributes.contains_key(&name) {
                Some("attribute")
            } else if children.contains_key(&name) {
                Some("child")
            } else if matches!(&content, Some((existing, _)) if *existing == name) {
                Some("content")
            } else {
                None
            };
            if let Some(taken) = taken.filter(|taken| *taken != field.category()) {
                return Err(conflict(
                    format!(
                        "Field '{}' is already declared as {} field",
                        name, taken
                    ),
                    &name,
                )
                .into());
            }

            match field {
                FieldDecl::Attribute(mut attr) => {
                    if let Some(serialized) = attr.serialized_name() {
                        validate_name(serialized)?;
                    }
                    attr.bind(&name);
                    attributes.insert(name, attr);
                }
                FieldDecl::Child(mut child) => {
                    if let Some(serialized) = child.serialized_name() {
                        validate_name(serialized)?;
                    }
                    child.bind(&name);
                    children.insert(name, child);
                }
                FieldDecl::Content(field) => match &content {
                    Some((existing, _)) if *existing != name => {
                        return Err(conflict(
                            format!(
                                "Cannot have more than one content field ('{}' already declared)",
                                existing
                            ),
                            &name,
                        )
                        .into());
                    }
                    _ => content = Some((name, field)),
                },
            }
        }

        for (field, validator) in decl.validators.iter().cloned() {
            let declared = attributes.contains_key(&field)
                || children.contains_key(&field)
                || matches!(&content, Some((name, _)) if *name == field);
            if !declared {
                return Err(conflict(
                    format!("Validator registered for undeclared field '{}'", field),
                    &field,
                )
                .into());
            }
            validators.insert(field, validator);
        }

        let tag_name = decl.tag_name.clone().unwrap_or_else(|| decl.name.clone());
        validate_name(&tag_name)?;
        if let Some(case_sensitive) = decl.tag_case_sensitive {
            tag_case_sensitive = case_sensitive;
        }

        tracing::debug!(
            model = %decl.name,
            base = ?decl.base,
            tag = %tag_name,
            attributes = attributes.len(),
            children = children.len(),
            content = content.is_some(),
            "Compiled model schema"
        );

        Ok(Self {
            name: decl.name,
            lineage,
            tag_name,
            tag_case_sensitive,
            attributes,
            children,
            content,
            validators,
        })
    }

    /// Get the declared model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the direct base model name
    pub fn base(&self) -> Option<&str> {
        self.lineage.get(1).map(String::as_str)
    }

    /// The model name followed by its bases, nearest first
    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    /// Check if this model is `name` or derives from it
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.lineage.iter().any(|n| n == name)
    }

    /// Get the tag name
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Check if the tag is matched case-sensitively
    pub fn tag_case_sensitive(&self) -> bool {
        self.tag_case_sensitive
    }

    /// Check if a tag names this model
    pub fn compare_tag_name(&self, tag: &str) -> bool {
        names_equal(&self.tag_name, tag, self.tag_case_sensitive)
    }

    /// Attribute fields in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeField)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Child fields in declaration order
    pub fn children(&self) -> impl Iterator<Item = (&str, &ChildField)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The content field, if declared
    pub fn content(&self) -> Option<(&str, &ContentField)> {
        self.content.as_ref().map(|(k, v)| (k.as_str(), v))
    }

    /// Get an attribute field by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeField> {
        self.attributes.get(name)
    }

    /// Get a child field by name
    pub fn child(&self, name: &str) -> Option<&ChildField> {
        self.children.get(name)
    }

    /// Registered validators, by field name
    pub fn validators(&self) -> impl Iterator<Item = (&str, &FieldValidator)> {
        self.validators.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All field names: attributes, then children, then content
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .keys()
            .chain(self.children.keys())
            .chain(self.content.iter().map(|(k, _)| k))
            .map(String::as_str)
    }

    /// Check if a field is declared
    pub fn has_field(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
            || self.children.contains_key(name)
            || matches!(&self.content, Some((k, _)) if k == name)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("lineage", &self.lineage)
            .field("tag_name", &self.tag_name)
            .field("tag_case_sensitive", &self.tag_case_sensitive)
            .field("attributes", &self.attributes)
            .field("children", &self.children)
            .field("content", &self.content)
            .field("validators", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}
