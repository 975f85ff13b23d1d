//! Model instances and the import/export engine
//!
//! Import is a three-phase pass over one [`TreeNode`]:
//!
//! 1. attributes, in the node's attribute order
//! 2. children, in document order
//! 3. direct text
//!
//! Each fragment is offered to the schema's fields of the matching family in
//! declaration order and consumed by the first field that accepts it. A
//! fragment consumed by no field fails a strict import and is dropped by a
//! lenient one.
//!
//! Import is not transactional: when a conversion fails, fields converted
//! earlier in the pass keep their new values.

use crate::config::ImportConfig;
use crate::error::{in_field, Error, Fragment, Result};
use crate::registry::Registry;
use crate::schema::Schema;
use crate::tree::{AttributeMap, TreeNode};
use crate::types::type_mismatch;
use crate::values::Value;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::sync::Arc;

/// State shared by one import pass and the nested imports it triggers
pub(crate) struct ImportContext<'r> {
    pub(crate) registry: &'r Registry,
    pub(crate) config: &'r ImportConfig,
    depth: usize,
}

impl<'r> ImportContext<'r> {
    fn new(registry: &'r Registry, config: &'r ImportConfig) -> Self {
        Self {
            registry,
            config,
            depth: 0,
        }
    }

    /// Import a child element as a fresh instance of `schema`
    pub(crate) fn import_model(&self, schema: &Arc<Schema>, node: &TreeNode) -> Result<ModelInstance> {
        let depth = self.depth + 1;
        self.config.limits().check_depth(depth)?;

        let nested = ImportContext {
            registry: self.registry,
            config: self.config,
            depth,
        };
        let mut instance = ModelInstance::new(Arc::clone(schema));
        instance.import_with(node, &nested)?;
        Ok(instance)
    }
}

/// An instance of a compiled model
///
/// Each declared field is either absent or present with a [`Value`];
/// a present `Value::Null` is distinct from an absent field.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    schema: Arc<Schema>,
    data: IndexMap<String, Value>,
}

impl PartialEq for ModelInstance {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name() && self.data == other.data
    }
}

impl ModelInstance {
    /// Create an instance holding the schema's defaults
    pub fn new(schema: Arc<Schema>) -> Self {
        let mut data = IndexMap::new();
        for (name, field) in schema.attributes() {
            if let Some(value) = field.default().produce() {
                data.insert(name.to_string(), value);
            }
        }
        for (name, field) in schema.children() {
            if let Some(value) = field.default().produce() {
                data.insert(name.to_string(), value);
            }
        }
        if let Some((name, field)) = schema.content() {
            if let Some(value) = field.default().produce() {
                data.insert(name.to_string(), value);
            }
        }
        Self { schema, data }
    }

    /// Get the compiled schema
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Get the declared model name
    pub fn model_name(&self) -> &str {
        self.schema.name()
    }

    /// Check if this instance's model is `name` or derives from it
    pub fn is_instance_of(&self, name: &str) -> bool {
        self.schema.is_subtype_of(name)
    }

    // =========================================================================
    // Field access
    // =========================================================================

    fn check_field(&self, name: &str) -> Result<()> {
        if self.schema.has_field(name) {
            Ok(())
        } else {
            Err(Error::UnknownField {
                model: self.schema.name().to_string(),
                field: name.to_string(),
            })
        }
    }

    /// Check if a field holds a value (null included)
    pub fn is_set(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// Get a field value, or `None` when absent
    pub fn try_get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Get a field value
    ///
    /// Fails with [`Error::MissingValue`] when the field was never set and
    /// has no default.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.check_field(name)?;
        self.data.get(name).ok_or_else(|| Error::MissingValue {
            model: self.schema.name().to_string(),
            field: name.to_string(),
        })
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: &str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.get(name)? {
            Value::Null => Ok(None),
            value => match extract(value) {
                Some(v) => Ok(Some(v)),
                None => Err(in_field(type_mismatch(expected, value).into(), name)),
            },
        }
    }

    /// Get a string field; `None` when null
    pub fn get_str(&self, name: &str) -> Result<Option<&str>> {
        self.typed(name, "string", Value::as_str)
    }

    /// Get an integer field; `None` when null
    pub fn get_int(&self, name: &str) -> Result<Option<i64>> {
        self.typed(name, "integer", Value::as_int)
    }

    /// Get a float field; `None` when null
    pub fn get_float(&self, name: &str) -> Result<Option<f64>> {
        self.typed(name, "float", Value::as_float)
    }

    /// Get a decimal field; `None` when null
    pub fn get_decimal(&self, name: &str) -> Result<Option<Decimal>> {
        self.typed(name, "decimal", Value::as_decimal)
    }

    /// Get a boolean field; `None` when null
    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        self.typed(name, "boolean", Value::as_bool)
    }

    /// Get an enumeration field's variant name; `None` when null
    pub fn get_enum(&self, name: &str) -> Result<Option<&str>> {
        self.typed(name, "enum", Value::as_enum)
    }

    /// Get a nested model field; `None` when null
    pub fn get_model(&self, name: &str) -> Result<Option<&ModelInstance>> {
        self.typed(name, "model", Value::as_model)
    }

    /// Get a list field; `None` when null
    pub fn get_list(&self, name: &str) -> Result<Option<&[Value]>> {
        self.typed(name, "list", Value::as_list)
    }

    /// Get a list-of-models field, skipping null items
    pub fn get_models(&self, name: &str) -> Result<Vec<&ModelInstance>> {
        self.get_list(name)?
            .unwrap_or_default()
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| {
                item.as_model()
                    .ok_or_else(|| in_field(type_mismatch("model", item).into(), name))
            })
            .collect()
    }

    /// Set a field value
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.check_field(name)?;
        self.data.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Make a field absent again, returning its previous value
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.data.shift_remove(name)
    }

    /// Run the schema's validators against every present field
    pub fn validate(&self) -> Result<()> {
        for (field, validator) in self.schema.validators() {
            if let Some(value) = self.data.get(field) {
                validator(value).map_err(|message| Error::Validation {
                    model: self.schema.name().to_string(),
                    field: field.to_string(),
                    message,
                })?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Import
    // =========================================================================

    /// Merge a node into this instance
    ///
    /// Fields matched by the node are overwritten (or appended to, for list
    /// fields); others keep their current values. On error, fields converted
    /// before the failure stay converted.
    pub fn import(&mut self, registry: &Registry, node: &TreeNode, config: &ImportConfig) -> Result<()> {
        let ctx = ImportContext::new(registry, config);
        self.import_with(node, &ctx)
    }

    fn import_with(&mut self, node: &TreeNode, ctx: &ImportContext<'_>) -> Result<()> {
        let limits = ctx.config.limits();
        limits.check_attributes(node.attributes.len())?;
        limits.check_children(node.children.len())?;

        self.import_attributes(&node.attributes, ctx)?;
        self.import_children(&node.children, ctx)?;
        self.import_content(node.text.as_deref(), ctx)
    }

    fn reject(&self, fragment: Fragment, ctx: &ImportContext<'_>) -> Result<()> {
        if ctx.config.mode().is_strict() {
            return Err(Error::UnexpectedFragment {
                model: self.schema.name().to_string(),
                fragment,
            });
        }
        tracing::debug!(model = %self.schema.name(), fragment = %fragment, "Dropping unmatched fragment");
        Ok(())
    }

    fn import_attributes(&mut self, attributes: &AttributeMap, ctx: &ImportContext<'_>) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        for (attr_name, raw) in attributes {
            match schema.attributes().find(|(_, field)| field.matches(attr_name)) {
                Some((name, field)) => {
                    let value = field.import(raw).map_err(|e| in_field(e, name))?;
                    self.data.insert(name.to_string(), value);
                }
                None => self.reject(Fragment::Attribute(attr_name.clone()), ctx)?,
            }
        }
        Ok(())
    }

    fn import_children(&mut self, children: &[TreeNode], ctx: &ImportContext<'_>) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        for child in children {
            let matched = schema
                .children()
                .find_map(|(name, field)| field.matches(ctx.registry, child).map(|m| (name, field, m)));

            match matched {
                Some((name, field, m)) => {
                    let mut slot = self.data.shift_remove(name);
                    let result = field.incorporate(m, &mut slot, child, ctx);
                    if let Some(value) = slot {
                        self.data.insert(name.to_string(), value);
                    }
                    result.map_err(|e| in_field(e, name))?;
                }
                None => self.reject(Fragment::Child(child.tag.clone()), ctx)?,
            }
        }
        Ok(())
    }

    fn import_content(&mut self, text: Option<&str>, ctx: &ImportContext<'_>) -> Result<()> {
        let Some(text) = text else {
            return Ok(());
        };
        match self.schema.content() {
            Some((name, field)) => {
                let value = field.import(text).map_err(|e| in_field(e, name))?;
                self.data.insert(name.to_string(), value);
                Ok(())
            }
            None => self.reject(Fragment::Text, ctx),
        }
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Write the instance back out as a node
    ///
    /// Absent fields are skipped; null attributes are omitted.
    pub fn export(&self) -> Result<TreeNode> {
        let mut node = TreeNode::new(self.schema.tag_name());

        for (name, field) in self.schema.attributes() {
            if let Some(value) = self.data.get(name) {
                if let Some((attr, raw)) = field.export(value).map_err(|e| in_field(e, name))? {
                    node.attributes.insert(attr, raw);
                }
            }
        }

        for (name, field) in self.schema.children() {
            if let Some(value) = self.data.get(name) {
                let children = field.export(value).map_err(|e| in_field(e, name))?;
                node.children.extend(children);
            }
        }

        if let Some((name, field)) = self.schema.content() {
            if let Some(value) = self.data.get(name) {
                node.text = field.export(value).map_err(|e| in_field(e, name))?;
            }
        }

        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportMode;
    use crate::fields::{AttributeField, ChildField, ContentField, ModelSpec};
    use crate::limits::Limits;
    use crate::registry::RegistryBuilder;
    use crate::schema::ModelDecl;
    use crate::types::{BooleanType, IntType, StringType};
    use pretty_assertions::assert_eq;

    fn registry(decls: Vec<ModelDecl>) -> Registry {
        let mut builder = RegistryBuilder::new();
        for decl in decls {
            builder.declare(decl).unwrap();
        }
        builder.build().unwrap()
    }

    fn simple() -> Registry {
        registry(vec![ModelDecl::new("Item")
            .attribute("id", AttributeField::scalar(IntType::new()))
            .attribute("label", AttributeField::scalar(StringType::new()).default_value("none"))
            .child("note", ChildField::content(StringType::new()))
            .content("text", ContentField::new(StringType::new()))])
    }

    #[test]
    fn test_defaults_applied() {
        let item = simple().new_instance("Item").unwrap();
        assert_eq!(item.get_str("label").unwrap(), Some("none"));
        assert!(!item.is_set("id"));
        assert!(matches!(item.get("id"), Err(Error::MissingValue { .. })));
        assert!(matches!(item.get("nope"), Err(Error::UnknownField { .. })));
    }

    #[test]
    fn test_null_distinct_from_absent() {
        let mut item = simple().new_instance("Item").unwrap();
        item.set("id", Value::Null).unwrap();
        assert!(item.is_set("id"));
        assert_eq!(item.get_int("id").unwrap(), None);

        assert_eq!(item.unset("id"), Some(Value::Null));
        assert!(item.get_int("id").is_err());
    }

    #[test]
    fn test_set_unknown_field_fails() {
        let mut item = simple().new_instance("Item").unwrap();
        assert!(matches!(item.set("bogus", 1), Err(Error::UnknownField { .. })));
    }

    #[test]
    fn test_typed_getter_mismatch() {
        let item = simple().new_instance("Item").unwrap().with("id", 5).unwrap();
        match item.get_str("id") {
            Err(Error::Conversion(err)) => assert_eq!(err.field.as_deref(), Some("id")),
            other => panic!("expected conversion error, got {:?}", other),
        }
    }

    #[test]
    fn test_import_phases() {
        let registry = simple();
        let node = TreeNode::new("Item")
            .with_attribute("id", "7")
            .with_child(TreeNode::new("note").with_text("hi"))
            .with_text("  body ");
        let item = registry.import("Item", &node, &ImportConfig::strict()).unwrap();

        assert_eq!(item.get_int("id").unwrap(), Some(7));
        assert_eq!(item.get_str("label").unwrap(), Some("none"));
        assert_eq!(item.get_str("note").unwrap(), Some("hi"));
        assert_eq!(item.get_str("text").unwrap(), Some("body"));
    }

    #[test]
    fn test_strict_rejects_each_fragment_kind() {
        let registry = registry(vec![ModelDecl::new("Empty")]);
        let strict = ImportConfig::strict();

        let cases = vec![
            (TreeNode::new("Empty").with_attribute("a", "1"), Fragment::Attribute("a".into())),
            (TreeNode::new("Empty").with_child(TreeNode::new("C")), Fragment::Child("C".into())),
            (TreeNode::new("Empty").with_text("t"), Fragment::Text),
        ];
        for (node, expected) in cases {
            match registry.import("Empty", &node, &strict) {
                Err(Error::UnexpectedFragment { model, fragment }) => {
                    assert_eq!(model, "Empty");
                    assert_eq!(fragment, expected);
                }
                other => panic!("expected rogue fragment, got {:?}", other),
            }
            assert!(registry.import("Empty", &node, &ImportConfig::new()).is_ok());
        }
    }

    #[test]
    fn test_first_match_wins() {
        let registry = registry(vec![ModelDecl::new("Dup")
            .attribute("first", AttributeField::scalar(StringType::new()).named("x"))
            .attribute("second", AttributeField::scalar(StringType::new()).named("x"))
            .child("a", ChildField::content_list(StringType::new()).named("Item"))
            .child("b", ChildField::content_list(StringType::new()).named("Item"))]);

        let node = TreeNode::new("Dup")
            .with_attribute("x", "1")
            .with_child(TreeNode::new("Item").with_text("one"))
            .with_child(TreeNode::new("Item").with_text("two"));
        let dup = registry.import("Dup", &node, &ImportConfig::strict()).unwrap();

        assert_eq!(dup.get_str("first").unwrap(), Some("1"));
        assert!(!dup.is_set("second"));
        assert_eq!(dup.get_list("a").unwrap().map(<[Value]>::len), Some(2));
        assert_eq!(dup.get_list("b").unwrap().map(<[Value]>::len), Some(0));
    }

    #[test]
    fn test_single_child_last_match_wins() {
        let registry = registry(vec![
            ModelDecl::new("Leaf").attribute("n", AttributeField::scalar(IntType::new())),
            ModelDecl::new("Holder").child("leaf", ChildField::model(ModelSpec::of("Leaf"))),
        ]);
        let node = TreeNode::new("Holder")
            .with_child(TreeNode::new("Leaf").with_attribute("n", "1"))
            .with_child(TreeNode::new("Leaf").with_attribute("n", "2"));
        let holder = registry.import("Holder", &node, &ImportConfig::new()).unwrap();

        let leaf = holder.get_model("leaf").unwrap().unwrap();
        assert_eq!(leaf.get_int("n").unwrap(), Some(2));
        assert!(!registry.new_instance("Holder").unwrap().is_set("leaf"));
    }

    #[test]
    fn test_import_not_transactional() {
        let registry = registry(vec![ModelDecl::new("Pair")
            .attribute("a", AttributeField::scalar(IntType::new()))
            .attribute("b", AttributeField::scalar(IntType::new()))]);
        let node = TreeNode::new("Pair")
            .with_attribute("a", "1")
            .with_attribute("b", "oops");

        let mut pair = registry.new_instance("Pair").unwrap();
        let err = pair.import(&registry, &node, &ImportConfig::new()).unwrap_err();
        match err {
            Error::Conversion(conv) => assert_eq!(conv.field.as_deref(), Some("b")),
            other => panic!("expected conversion error, got {:?}", other),
        }
        assert_eq!(pair.get_int("a").unwrap(), Some(1));
        assert!(!pair.is_set("b"));
    }

    #[test]
    fn test_failed_append_keeps_list() {
        let registry = registry(vec![ModelDecl::new("Nums")
            .child("n", ChildField::content_list(IntType::new()))]);
        let node = TreeNode::new("Nums")
            .with_child(TreeNode::new("N").with_text("1"))
            .with_child(TreeNode::new("N").with_text("x"));

        let mut nums = registry.new_instance("Nums").unwrap();
        assert!(nums.import(&registry, &node, &ImportConfig::new()).is_err());
        assert_eq!(nums.get_list("n").unwrap(), Some(&[Value::Int(1)][..]));
    }

    #[test]
    fn test_export_skips_absent_and_null() {
        let registry = simple();
        let item = registry
            .new_instance("Item")
            .unwrap()
            .with("label", Value::Null)
            .unwrap();
        assert_eq!(item.export().unwrap(), TreeNode::new("Item"));
    }

    #[test]
    fn test_export_order_follows_schema() {
        let registry = registry(vec![ModelDecl::new("Flags")
            .attribute("on", AttributeField::scalar(BooleanType::new()))
            .child("z", ChildField::flag())
            .child("a", ChildField::flag())]);
        let flags = registry
            .new_instance("Flags")
            .unwrap()
            .with("on", true)
            .and_then(|f| f.with("a", true))
            .and_then(|f| f.with("z", true))
            .unwrap();

        let node = flags.export().unwrap();
        assert_eq!(node.attribute("on"), Some("1"));
        let tags: Vec<&str> = node.children().iter().map(TreeNode::tag).collect();
        assert_eq!(tags, vec!["Z", "A"]);
    }

    #[test]
    fn test_depth_limit() {
        let registry = registry(vec![ModelDecl::new("Node")
            .child("next", ChildField::model(ModelSpec::of("Node")))]);
        let mut node = TreeNode::new("Node");
        for _ in 0..5 {
            node = TreeNode::new("Node").with_child(node);
        }

        let shallow = ImportConfig::new().with_limits(Limits {
            max_depth: 3,
            ..Limits::default()
        });
        assert!(matches!(
            registry.import("Node", &node, &shallow),
            Err(Error::LimitExceeded(_))
        ));
        assert!(registry.import("Node", &node, &ImportConfig::new()).is_ok());
    }

    #[test]
    fn test_mode_propagates_to_nested_models() {
        let registry = registry(vec![
            ModelDecl::new("Inner"),
            ModelDecl::new("Outer").child("inner", ChildField::model(ModelSpec::of("Inner"))),
        ]);
        let node = TreeNode::new("Outer")
            .with_child(TreeNode::new("Inner").with_attribute("rogue", "1"));

        assert!(registry.import("Outer", &node, &ImportConfig::new()).is_ok());
        let strict = ImportConfig::new().with_mode(ImportMode::Strict);
        assert!(matches!(
            registry.import("Outer", &node, &strict),
            Err(Error::UnexpectedFragment { model, .. }) if model == "Inner"
        ));
    }

    #[test]
    fn test_validate() {
        let registry = registry(vec![ModelDecl::new("Range")
            .attribute("low", AttributeField::scalar(IntType::new()))
            .validator("low", |v| match v.as_int() {
                Some(n) if n < 0 => Err("must not be negative".to_string()),
                _ => Ok(()),
            })]);

        let ok = registry.new_instance("Range").unwrap().with("low", 3).unwrap();
        assert!(ok.validate().is_ok());
        assert!(registry.new_instance("Range").unwrap().validate().is_ok());

        let bad = registry.new_instance("Range").unwrap().with("low", -1).unwrap();
        match bad.validate() {
            Err(Error::Validation { field, message, .. }) => {
                assert_eq!(field, "low");
                assert_eq!(message, "must not be negative");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
