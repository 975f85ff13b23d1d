//! Generic element tree
//!
//! [`TreeNode`] is the value exchanged with the markup parser and serializer:
//! a tag, ordered attributes, ordered children and optional direct text.

use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Type alias for attribute mappings (insertion ordered)
pub type AttributeMap = IndexMap<String, String>;

/// One element of a generic labeled tree
///
/// The JSON form uses the keys `tag`, `attrib`, `children` and `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// The local element name
    pub tag: String,
    /// Element attributes
    #[serde(rename = "attrib", default)]
    pub attributes: AttributeMap,
    /// Child elements in document order
    #[serde(default)]
    pub children: Vec<TreeNode>,
    /// Direct text content
    #[serde(default)]
    pub text: Option<String>,
}

impl TreeNode {
    /// Create a new node with a tag and nothing else
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Get the tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Get the text content
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Get the attributes
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Get the children
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// Get an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add multiple attributes
    pub fn with_attributes(mut self, attrs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.attributes.extend(attrs);
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add multiple child elements
    pub fn with_children(mut self, children: impl IntoIterator<Item = TreeNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Check if the node has children
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Check if the node has attributes
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Find children by tag (exact match)
    pub fn find_children(&self, tag: &str) -> Vec<&TreeNode> {
        self.children.iter().filter(|c| c.tag == tag).collect()
    }

    /// Decode a node from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the node to its JSON form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
