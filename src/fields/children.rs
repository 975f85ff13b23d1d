//! Child element fields

use super::{DefaultValue, ModelSpec};
use crate::error::Result;
use crate::model::ImportContext;
use crate::names::{names_equal, to_upper_camelcase};
use crate::registry::Registry;
use crate::schema::Schema;
use crate::tree::TreeNode;
use crate::types::{type_mismatch, ScalarType};
use crate::values::Value;
use std::sync::Arc;

/// How a child field matches and folds child elements
#[derive(Debug, Clone)]
pub enum ChildKind {
    /// One nested model; the last matching child wins
    Model(ModelSpec),
    /// Every matching child, as nested models in document order
    Models(ModelSpec),
    /// Text of a named child converted through a scalar type
    Content(Arc<dyn ScalarType>),
    /// True when a named child is present
    Flag,
    /// Text of every named child, in document order
    ContentList(Arc<dyn ScalarType>),
    /// Models found inside a named wrapper child
    NestedList(ModelSpec),
}

/// Result of a successful match against a child element
#[derive(Debug)]
pub(crate) enum ChildMatch<'r> {
    /// The child's tag resolved to this model
    Model(&'r Arc<Schema>),
    /// The child's tag equals the field's tag
    Tag,
}

/// A field bound to child elements
///
/// Named kinds match the field name in UpperCamelCase unless overridden, and
/// compare tags case-insensitively unless configured otherwise. Model kinds
/// match on the candidate models' own tag names instead.
#[derive(Debug, Clone)]
pub struct ChildField {
    kind: ChildKind,
    serialized_name: Option<String>,
    case_sensitive: bool,
    default: DefaultValue,
    null_value: Option<Value>,
    xml_name: String,
}

fn empty_list() -> DefaultValue {
    DefaultValue::Static(Value::List(Vec::new()))
}

fn push(slot: &mut Option<Value>, item: Value) {
    match slot {
        Some(Value::List(items)) => items.push(item),
        _ => *slot = Some(Value::List(vec![item])),
    }
}

impl ChildField {
    fn with_kind(kind: ChildKind, default: DefaultValue) -> Self {
        Self {
            kind,
            serialized_name: None,
            case_sensitive: false,
            default,
            null_value: None,
            xml_name: String::new(),
        }
    }

    /// A single nested model. No default.
    pub fn model(spec: ModelSpec) -> Self {
        Self::with_kind(ChildKind::Model(spec), DefaultValue::Undefined)
    }

    /// A list of nested models. Defaults to an empty list.
    pub fn models(spec: ModelSpec) -> Self {
        Self::with_kind(ChildKind::Models(spec), empty_list())
    }

    /// The text of a named child. No default.
    pub fn content(ty: impl ScalarType + 'static) -> Self {
        Self::with_kind(ChildKind::Content(Arc::new(ty)), DefaultValue::Undefined)
    }

    /// Presence of a named child. Defaults to false.
    pub fn flag() -> Self {
        Self::with_kind(ChildKind::Flag, DefaultValue::Static(Value::Bool(false)))
    }

    /// The texts of all named children. Defaults to an empty list.
    pub fn content_list(ty: impl ScalarType + 'static) -> Self {
        Self::with_kind(ChildKind::ContentList(Arc::new(ty)), empty_list())
    }

    /// Models wrapped in a named child. Defaults to an empty list.
    pub fn nested_list(spec: ModelSpec) -> Self {
        Self::with_kind(ChildKind::NestedList(spec), empty_list())
    }

    /// Override the tag name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.serialized_name = Some(name.into());
        self
    }

    /// Set case sensitivity of the tag match
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

    /// Value taken by a content child that has no text (instead of null)
    pub fn null_value(mut self, value: impl Into<Value>) -> Self {
        self.null_value = Some(value.into());
        self
    }

    /// Get the field kind
    pub fn kind(&self) -> &ChildKind {
        &self.kind
    }

    /// Get the explicitly configured tag name
    pub fn serialized_name(&self) -> Option<&str> {
        self.serialized_name.as_deref()
    }

    /// Get the tag used by named kinds
    pub fn xml_name(&self) -> &str {
        &self.xml_name
    }

    /// Get the default
    pub fn default(&self) -> &DefaultValue {
        &self.default
    }

    /// Get the candidate models, for model kinds
    pub fn model_spec(&self) -> Option<&ModelSpec> {
        match &self.kind {
            ChildKind::Model(spec) | ChildKind::Models(spec) | ChildKind::NestedList(spec) => {
                Some(spec)
            }
            _ => None,
        }
    }

    pub(crate) fn bind(&mut self, field_name: &str) {
        self.xml_name = self
            .serialized_name
            .clone()
            .unwrap_or_else(|| to_upper_camelcase(field_name));
    }

    fn matches_tag(&self, tag: &str) -> bool {
        names_equal(&self.xml_name, tag, self.case_sensitive)
    }

    pub(crate) fn matches<'r>(&self, registry: &'r Registry, child: &TreeNode) -> Option<ChildMatch<'r>> {
        match &self.kind {
            ChildKind::Model(spec) | ChildKind::Models(spec) => {
                registry.resolve(spec, &child.tag).map(ChildMatch::Model)
            }
            _ if self.matches_tag(&child.tag) => Some(ChildMatch::Tag),
            _ => None,
        }
    }

    fn text_value(&self, ty: &dyn ScalarType, child: &TreeNode) -> Result<Value> {
        match &child.text {
            Some(text) => ty.to_native(text),
            None => Ok(self.null_value.clone().unwrap_or(Value::Null)),
        }
    }

    /// Fold a matched child into the field's current value
    ///
    /// `slot` is only written once the child has been fully converted.
    pub(crate) fn incorporate(
        &self,
        matched: ChildMatch<'_>,
        slot: &mut Option<Value>,
        child: &TreeNode,
        ctx: &ImportContext<'_>,
    ) -> Result<()> {
        match (&self.kind, matched) {
            (ChildKind::Model(_), ChildMatch::Model(schema)) => {
                let model = ctx.import_model(schema, child)?;
                *slot = Some(Value::from(model));
            }
            (ChildKind::Models(_), ChildMatch::Model(schema)) => {
                let model = ctx.import_model(schema, child)?;
                push(slot, Value::from(model));
            }
            (ChildKind::Content(ty), _) => {
                *slot = Some(self.text_value(ty.as_ref(), child)?);
            }
            (ChildKind::Flag, _) => {
                *slot = Some(Value::Bool(true));
            }
            (ChildKind::ContentList(ty), _) => {
                let item = self.text_value(ty.as_ref(), child)?;
                push(slot, item);
            }
            (ChildKind::NestedList(spec), _) => {
                ctx.config.limits().check_children(child.children.len())?;
                let mut items = Vec::new();
                for grandchild in &child.children {
                    match ctx.registry.resolve(spec, &grandchild.tag) {
                        Some(schema) => {
                            items.push(Value::from(ctx.import_model(schema, grandchild)?));
                        }
                        None => tracing::trace!(
                            wrapper = %child.tag,
                            tag = %grandchild.tag,
                            "Skipping nested child matching no candidate"
                        ),
                    }
                }
                *slot = Some(Value::List(items));
            }
            // Model kinds only ever produce model matches
            (ChildKind::Model(_) | ChildKind::Models(_), ChildMatch::Tag) => {}
        }
        Ok(())
    }

    fn text_node(&self, ty: &dyn ScalarType, value: &Value) -> Result<TreeNode> {
        let node = TreeNode::new(self.xml_name.as_str());
        if value.is_null() || self.null_value.as_ref() == Some(value) {
            Ok(node)
        } else {
            Ok(node.with_text(ty.to_primitive(value)?))
        }
    }

    fn export_models(&self, items: &[Value]) -> Result<Vec<TreeNode>> {
        items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                Value::Model(model) => model.export(),
                other => Err(type_mismatch("model", other).into()),
            })
            .collect()
    }

    /// Write the value as zero or more child elements
    pub fn export(&self, value: &Value) -> Result<Vec<TreeNode>> {
        match (&self.kind, value) {
            (ChildKind::Model(_), Value::Null) => Ok(Vec::new()),
            (ChildKind::Model(_), Value::Model(model)) => Ok(vec![model.export()?]),
            (ChildKind::Models(_), Value::List(items)) => self.export_models(items),
            (ChildKind::Models(_) | ChildKind::NestedList(_), Value::Null) => Ok(Vec::new()),
            // An empty element re-imports as the configured null value
            (ChildKind::Content(_), Value::Null) if self.null_value.is_some() => Ok(Vec::new()),
            (ChildKind::Content(ty), value) => Ok(vec![self.text_node(ty.as_ref(), value)?]),
            (ChildKind::Flag, Value::Bool(true)) => Ok(vec![TreeNode::new(self.xml_name.as_str())]),
            (ChildKind::Flag, Value::Bool(false) | Value::Null) => Ok(Vec::new()),
            (ChildKind::ContentList(ty), Value::List(items)) => items
                .iter()
                .map(|item| self.text_node(ty.as_ref(), item))
                .collect(),
            (ChildKind::ContentList(_), Value::Null) => Ok(Vec::new()),
            (ChildKind::NestedList(_), Value::List(items)) => {
                let wrapper = TreeNode::new(self.xml_name.as_str())
                    .with_children(self.export_models(items)?);
                Ok(vec![wrapper])
            }
            (ChildKind::Model(_), other) => Err(type_mismatch("model", other).into()),
            (ChildKind::Flag, other) => Err(type_mismatch("boolean", other).into()),
            (_, other) => Err(type_mismatch("list", other).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntType, StringType};

    fn bound(mut field: ChildField, name: &str) -> ChildField {
        field.bind(name);
        field
    }

    #[test]
    fn test_named_child_tag() {
        let field = bound(ChildField::content(StringType::new()), "bar_null1");
        assert_eq!(field.xml_name(), "BarNull1");
        assert!(field.matches_tag("BarNull1"));
        assert!(field.matches_tag("barnull1"));

        let field = bound(
            ChildField::content(StringType::new()).named("title").case_sensitive(true),
            "heading",
        );
        assert!(field.matches_tag("title"));
        assert!(!field.matches_tag("Title"));
    }

    #[test]
    fn test_defaults_per_kind() {
        assert!(!ChildField::model(ModelSpec::of("A")).default().is_defined());
        assert!(!ChildField::content(StringType::new()).default().is_defined());
        assert_eq!(
            ChildField::models(ModelSpec::of("A")).default().produce(),
            Some(Value::List(vec![]))
        );
        assert_eq!(ChildField::flag().default().produce(), Some(Value::Bool(false)));
        assert_eq!(
            ChildField::content_list(StringType::new()).default().produce(),
            Some(Value::List(vec![]))
        );
        assert_eq!(
            ChildField::nested_list(ModelSpec::of("A")).default().produce(),
            Some(Value::List(vec![]))
        );
    }

    #[test]
    fn test_text_value_null_handling() {
        let field = bound(ChildField::content(IntType::new()), "count");
        let ty = IntType::new();
        assert_eq!(field.text_value(&ty, &TreeNode::new("Count")).unwrap(), Value::Null);
        assert_eq!(
            field.text_value(&ty, &TreeNode::new("Count").with_text("5")).unwrap(),
            Value::Int(5)
        );

        let field = field.null_value(0);
        assert_eq!(field.text_value(&ty, &TreeNode::new("Count")).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_push_creates_and_appends() {
        let mut slot = None;
        push(&mut slot, Value::Int(1));
        push(&mut slot, Value::Int(2));
        assert_eq!(slot, Some(Value::List(vec![Value::Int(1), Value::Int(2)])));
    }

    #[test]
    fn test_export_content_child() {
        let field = bound(ChildField::content(StringType::new()), "bar");
        assert_eq!(
            field.export(&Value::from("Hello!")).unwrap(),
            vec![TreeNode::new("Bar").with_text("Hello!")]
        );
        assert_eq!(field.export(&Value::Null).unwrap(), vec![TreeNode::new("Bar")]);

        let field = field.null_value("-");
        assert_eq!(field.export(&Value::from("-")).unwrap(), vec![TreeNode::new("Bar")]);
        assert!(field.export(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_export_flag() {
        let field = bound(ChildField::flag(), "check");
        assert_eq!(field.export(&Value::Bool(true)).unwrap(), vec![TreeNode::new("Check")]);
        assert!(field.export(&Value::Bool(false)).unwrap().is_empty());
        assert!(field.export(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_export_content_list() {
        let field = bound(ChildField::content_list(StringType::new()), "baz");
        let nodes = field
            .export(&Value::from(vec![Value::from("Item1"), Value::Null]))
            .unwrap();
        assert_eq!(
            nodes,
            vec![TreeNode::new("Baz").with_text("Item1"), TreeNode::new("Baz")]
        );
        assert!(field.export(&Value::from("x")).is_err());
    }

    #[test]
    fn test_export_empty_nested_list_keeps_wrapper() {
        let field = bound(ChildField::nested_list(ModelSpec::of("Bar")), "bars");
        assert_eq!(
            field.export(&Value::List(vec![])).unwrap(),
            vec![TreeNode::new("Bars")]
        );
    }
}
