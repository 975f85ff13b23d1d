//! Model registry and polymorphic resolution
//!
//! Models are declared into a [`RegistryBuilder`] in dependency order: a
//! derived model must be declared after its base, and is recorded as a
//! variant of that base. [`RegistryBuilder::build`] closes registration;
//! the resulting [`Registry`] is immutable and can be shared between threads.
//! Models declared into another builder are never visible to it.

use crate::config::ImportConfig;
use crate::error::{Error, Fragment, Result, SchemaError};
use crate::fields::ModelSpec;
use crate::model::ModelInstance;
use crate::schema::{ModelDecl, Schema};
use crate::tree::TreeNode;
use indexmap::IndexMap;
use std::sync::Arc;

/// Collects model declarations before the registry is closed
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    schemas: IndexMap<String, Arc<Schema>>,
    variants: IndexMap<String, Vec<String>>,
}

impl RegistryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and register a declaration
    ///
    /// The base model, if any, must already be declared.
    pub fn declare(&mut self, decl: ModelDecl) -> Result<Arc<Schema>> {
        if self.schemas.contains_key(decl.name()) {
            return Err(SchemaError::new("Model is already declared")
                .with_model(decl.name())
                .into());
        }

        let base = match decl.base() {
            Some(base) => Some(
                self.schemas
                    .get(base)
                    .cloned()
                    .ok_or_else(|| Error::UnknownModel(base.to_string()))?,
            ),
            None => None,
        };

        let schema = Arc::new(Schema::compile(decl, base.as_deref())?);
        if let Some(base) = &base {
            self.variants
                .entry(base.name().to_string())
                .or_default()
                .push(schema.name().to_string());
            tracing::debug!(model = %schema.name(), base = %base.name(), "Registered model variant");
        }
        self.schemas
            .insert(schema.name().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Chaining form of [`declare`](Self::declare)
    pub fn with(mut self, decl: ModelDecl) -> Result<Self> {
        self.declare(decl)?;
        Ok(self)
    }

    /// Close registration
    ///
    /// Fails if any child field names a candidate model that was never declared.
    pub fn build(self) -> Result<Registry> {
        for schema in self.schemas.values() {
            for (field, child) in schema.children() {
                let Some(spec) = child.model_spec() else {
                    continue;
                };
                if let Some(missing) = spec
                    .candidates()
                    .iter()
                    .find(|c| !self.schemas.contains_key(c.as_str()))
                {
                    return Err(Error::UnknownModel(format!(
                        "{} (referenced by {}.{})",
                        missing,
                        schema.name(),
                        field
                    )));
                }
            }
        }

        tracing::debug!(models = self.schemas.len(), "Closed model registry");
        Ok(Registry {
            schemas: self.schemas,
            variants: self.variants,
        })
    }
}

/// Immutable set of compiled models and their variant relations
#[derive(Debug, Clone)]
pub struct Registry {
    schemas: IndexMap<String, Arc<Schema>>,
    variants: IndexMap<String, Vec<String>>,
}

impl Registry {
    /// Start declaring models
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Get a compiled schema by model name
    pub fn schema(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    /// Get a compiled schema, failing for unknown names
    pub fn require(&self, name: &str) -> Result<&Arc<Schema>> {
        self.schema(name)
            .ok_or_else(|| Error::UnknownModel(name.to_string()))
    }

    /// All schemas in declaration order
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.values()
    }

    /// Every model transitively derived from `name`, depth-first in declaration order
    pub fn variants(&self, name: &str) -> Vec<&Arc<Schema>> {
        let mut result = Vec::new();
        self.collect_variants(name, &mut result);
        result
    }

    fn collect_variants<'a>(&'a self, name: &str, out: &mut Vec<&'a Arc<Schema>>) {
        for variant in self.variants.get(name).into_iter().flatten() {
            if let Some(schema) = self.schemas.get(variant) {
                out.push(schema);
                self.collect_variants(variant, out);
            }
        }
    }

    /// The effective candidate list of a spec, in resolution order
    pub fn candidates(&self, spec: &ModelSpec) -> Vec<&Arc<Schema>> {
        let mut result = Vec::new();
        for name in spec.candidates() {
            if let Some(schema) = self.schemas.get(name) {
                result.push(schema);
                if spec.allows_variants() {
                    self.collect_variants(name, &mut result);
                }
            }
        }
        result
    }

    fn find_variant(&self, name: &str, tag: &str) -> Option<&Arc<Schema>> {
        for variant in self.variants.get(name).into_iter().flatten() {
            if let Some(schema) = self.schemas.get(variant) {
                if schema.compare_tag_name(tag) {
                    return Some(schema);
                }
                if let Some(found) = self.find_variant(variant, tag) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Resolve a tag to the first matching candidate model
    ///
    /// Each candidate's tag is compared with that candidate's own case rule.
    pub fn resolve(&self, spec: &ModelSpec, tag: &str) -> Option<&Arc<Schema>> {
        for name in spec.candidates() {
            if let Some(schema) = self.schemas.get(name) {
                if schema.compare_tag_name(tag) {
                    return Some(schema);
                }
            }
            if spec.allows_variants() {
                if let Some(found) = self.find_variant(name, tag) {
                    return Some(found);
                }
            }
        }
        tracing::trace!(spec = %spec, tag = %tag, "No candidate model matches tag");
        None
    }

    /// Create an instance with defaults applied
    pub fn new_instance(&self, name: &str) -> Result<ModelInstance> {
        Ok(ModelInstance::new(Arc::clone(self.require(name)?)))
    }

    /// Import a node as the named model
    ///
    /// The node's own tag is not checked.
    pub fn import(&self, name: &str, node: &TreeNode, config: &ImportConfig) -> Result<ModelInstance> {
        let mut instance = self.new_instance(name)?;
        instance.import(self, node, config)?;
        Ok(instance)
    }

    /// Import a node as whichever candidate its tag resolves to
    pub fn import_any(&self, spec: &ModelSpec, node: &TreeNode, config: &ImportConfig) -> Result<ModelInstance> {
        let schema = self
            .resolve(spec, &node.tag)
            .ok_or_else(|| Error::UnexpectedFragment {
                model: spec.to_string(),
                fragment: Fragment::Child(node.tag.clone()),
            })?;
        let mut instance = ModelInstance::new(Arc::clone(schema));
        instance.import(self, node, config)?;
        Ok(instance)
    }
}
