//! Markup adapter between XML text and [`TreeNode`]
//!
//! The engine itself only sees [`TreeNode`]s. This module reads XML text into
//! a tree and writes a tree back out, using quick-xml.
//!
//! Reading keeps local names only: prefixes are dropped and `xmlns`
//! declarations are not kept as attributes. An element's text is the
//! concatenation of its direct text and CDATA sections, kept raw. Text that
//! is entirely whitespace is read as no text at all, so indentation between
//! child elements never reaches a content field or trips a strict import.
//! A consequence is that a [`ContentField`](crate::fields::ContentField)
//! with `strip(false)` only ever sees whitespace-only text when the tree is
//! built by hand, never through [`parse_tree`]. Comments and processing
//! instructions are ignored.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::tree::TreeNode;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// Parse an XML document into its root node
pub fn parse_tree(xml: &str) -> Result<TreeNode> {
    parse_tree_with_limits(xml, &Limits::default())
}

/// Parse an XML document, enforcing nesting and size limits
pub fn parse_tree_with_limits(xml: &str, limits: &Limits) -> Result<TreeNode> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let mut stack: Vec<(TreeNode, String)> = Vec::new();
    let mut root: Option<TreeNode> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::Xml(format!(
                "Error parsing XML at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => {
                let node = parse_element(&e, limits)?;
                limits.check_depth(stack.len() + 1)?;
                stack.push((node, String::new()));
            }
            Event::Empty(e) => {
                let node = parse_element(&e, limits)?;
                limits.check_depth(stack.len() + 1)?;
                attach(&mut stack, &mut root, node, limits)?;
            }
            Event::End(_) => {
                let (mut node, text) = stack
                    .pop()
                    .ok_or_else(|| Error::Xml("Unexpected closing tag".to_string()))?;
                if !text.trim().is_empty() {
                    node.text = Some(text);
                }
                attach(&mut stack, &mut root, node, limits)?;
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                match stack.last_mut() {
                    Some((_, buf)) => buf.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(Error::Xml("Text outside of the root element".to_string())),
                }
            }
            Event::CData(e) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| Error::Xml(format!("Invalid CDATA section: {}", e)))?;
                if let Some((_, buf)) = stack.last_mut() {
                    buf.push_str(text);
                }
            }
            Event::Eof => break,
            _ => {} // Declarations, comments, processing instructions, doctype
        }
    }

    if let Some((node, _)) = stack.last() {
        return Err(Error::Xml(format!("Unclosed element '{}'", node.tag)));
    }
    root.ok_or_else(|| Error::Xml("Document has no root element".to_string()))
}

fn attach(
    stack: &mut [(TreeNode, String)],
    root: &mut Option<TreeNode>,
    node: TreeNode,
    limits: &Limits,
) -> Result<()> {
    match stack.last_mut() {
        Some((parent, _)) => {
            limits.check_children(parent.children.len() + 1)?;
            parent.children.push(node);
            Ok(())
        }
        None if root.is_some() => Err(Error::Xml(format!(
            "Document has more than one root element ('{}')",
            node.tag
        ))),
        None => {
            *root = Some(node);
            Ok(())
        }
    }
}

fn parse_element(start: &BytesStart, limits: &Limits) -> Result<TreeNode> {
    let local = start.local_name();
    let tag = std::str::from_utf8(local.as_ref())
        .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?;
    let mut node = TreeNode::new(tag);

    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

        let raw_key = attr.key.as_ref();
        if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
            continue;
        }

        let key = attr.key.local_name();
        let name = std::str::from_utf8(key.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?;
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?;

        node.attributes.insert(name.to_string(), value.into_owned());
        limits.check_attributes(node.attributes.len())?;
    }

    Ok(node)
}

/// Write a node as XML text, without declaration or indentation
///
/// Elements with neither children nor text are written self-closed.
pub fn write_tree(node: &TreeNode) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_node(&mut writer, node)?;
    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| Error::Xml(format!("Written XML is not UTF-8: {}", e)))
}

fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, node: &TreeNode) -> Result<()> {
    let mut start = BytesStart::new(node.tag.as_str());
    for (name, value) in &node.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if node.children.is_empty() && node.text.is_none() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    if let Some(text) = &node.text {
        emit(writer, Event::Text(BytesText::new(text)))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(node.tag.as_str())))
}

fn emit(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(format!("Failed to write XML: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_xml() {
        let root = parse_tree(r#"<root><child>text</child></root>"#).unwrap();

        assert_eq!(root.tag, "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].tag, "child");
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
        assert_eq!(root.text, None);
    }

    #[test]
    fn test_parse_with_attributes() {
        let root = parse_tree(r#"<root attr1="value1" attr2="a &amp; b"><child/></root>"#).unwrap();

        assert_eq!(root.attribute("attr1"), Some("value1"));
        assert_eq!(root.attribute("attr2"), Some("a & b"));
        let names: Vec<&str> = root.attributes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["attr1", "attr2"]);
        assert_eq!(root.children[0], TreeNode::new("child"));
    }

    #[test]
    fn test_parse_drops_prefixes_and_namespace_declarations() {
        let xml = r#"<p:root xmlns:p="urn:x" xmlns="urn:y" p:id="1"><p:item/></p:root>"#;
        let root = parse_tree(xml).unwrap();

        assert_eq!(root.tag, "root");
        assert_eq!(root.attributes.len(), 1);
        assert_eq!(root.attribute("id"), Some("1"));
        assert_eq!(root.children[0].tag, "item");
    }

    #[test]
    fn test_parse_text_handling() {
        let xml = "<?xml version=\"1.0\"?>\n<a>\n  <!-- note -->\n  <b>  padded  </b>\n  <c><![CDATA[1 < 2]]></c>\n</a>";
        let root = parse_tree(xml).unwrap();

        assert_eq!(root.text, None);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].text.as_deref(), Some("  padded  "));
        assert_eq!(root.children[1].text.as_deref(), Some("1 < 2"));
    }

    #[test]
    fn test_parse_whitespace_only_text_is_none() {
        let root = parse_tree("<a>  \n\t </a>").unwrap();
        assert_eq!(root.text, None);

        let root = parse_tree("<a> x\n</a>").unwrap();
        assert_eq!(root.text.as_deref(), Some(" x\n"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_tree(""), Err(Error::Xml(_))));
        assert!(matches!(parse_tree("<a><b></a>"), Err(Error::Xml(_))));
        assert!(matches!(parse_tree("<a>"), Err(Error::Xml(_))));
        assert!(matches!(parse_tree("<a/><b/>"), Err(Error::Xml(_))));
    }

    #[test]
    fn test_parse_depth_limit() {
        let limits = Limits {
            max_depth: 2,
            ..Limits::default()
        };
        assert!(parse_tree_with_limits("<a><b/></a>", &limits).is_ok());
        assert!(matches!(
            parse_tree_with_limits("<a><b><c/></b></a>", &limits),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_write_tree() {
        let node = TreeNode::new("Foo")
            .with_attribute("field1", "2")
            .with_child(TreeNode::new("Bar").with_text("a < b"))
            .with_child(TreeNode::new("Check"));

        assert_eq!(
            write_tree(&node).unwrap(),
            r#"<Foo field1="2"><Bar>a &lt; b</Bar><Check/></Foo>"#
        );
    }

    #[test]
    fn test_write_then_parse() {
        let node = TreeNode::new("Foo")
            .with_attribute("quote", "say \"hi\"")
            .with_child(TreeNode::new("Bars").with_child(TreeNode::new("Bar").with_text("Item1")))
            .with_text("Some content");

        let xml = write_tree(&node).unwrap();
        assert_eq!(parse_tree(&xml).unwrap(), node);
    }
}
