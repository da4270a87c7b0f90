//! Minimal element tree over a streaming XML reader.
//!
//! Layout sources are small, attribute-heavy documents, so the builder
//! wants random access to child nodes rather than an event stream. This
//! module materializes the document into a tree and provides the attribute
//! extraction helper that enforces the known/required attribute contract.

use anyhow::{bail, Context, Result};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One XML element: tag, attributes in document order, child elements.
/// Text content is not modeled; the layout format carries everything in
/// attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    pub tag: String,
    /// (name, value) pairs in document order.
    pub attrs: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.with_context(|| format!("malformed attribute in <{tag}>"))?;
            let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .with_context(|| format!("malformed attribute value in <{tag}>"))?
                .into_owned();
            attrs.push((name, value));
        }
        Ok(Self {
            tag,
            attrs,
            children: Vec::new(),
        })
    }

    /// Returns the value of a root-level attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Parses a whole document into its root element.
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(Element::from_start(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let element = Element::from_start(e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => bail!("multiple root elements"),
                }
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().context("unbalanced closing tag")?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => bail!("multiple root elements"),
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => bail!("XML parse error at byte {}: {e}", reader.buffer_position()),
        }
    }

    if !stack.is_empty() {
        bail!("unexpected end of document inside <{}>", stack[0].tag);
    }
    root.context("empty document")
}

/// Extracts named attributes from an element, enforcing the tag name, the
/// known-attribute constraint and the required-attribute constraint.
///
/// `specs` lists `(name, required)` pairs; the returned vector is aligned
/// with it. The raw traversal is logged at debug level.
pub fn expect_attrs(
    node: &Element,
    tag: &str,
    specs: &[(&str, bool)],
) -> Result<Vec<Option<String>>> {
    if node.tag != tag {
        bail!("tag = {}, but {tag} expected", node.tag);
    }

    let mut values: Vec<Option<String>> = vec![None; specs.len()];

    for (name, value) in &node.attrs {
        let Some(idx) = specs.iter().position(|(k, _)| k == name) else {
            bail!("{}: unknown attribute {name}", node.tag);
        };
        values[idx] = Some(value.clone());
    }

    for (idx, (name, required)) in specs.iter().enumerate() {
        if *required && values[idx].is_none() {
            bail!("{}: {name} is missing", node.tag);
        }
    }

    debug!("{tag} {values:?}");
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let root = parse_document(
            r#"<?xml version="1.0"?>
            <Root a="1"><Child b="2"/><Child b="3"><Leaf/></Child></Root>"#,
        )
        .unwrap();
        assert_eq!(root.tag, "Root");
        assert_eq!(root.attr("a"), Some("1"));
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].children.len(), 1);
        assert_eq!(root.children[1].attr("b"), Some("3"));
    }

    #[test]
    fn test_parse_unbalanced_document() {
        assert!(parse_document("<Root><Child></Root>").is_err());
    }

    #[test]
    fn test_attribute_unescaping() {
        let root = parse_document(r#"<Root text="&amp;&#x27;"/>"#).unwrap();
        assert_eq!(root.attr("text"), Some("&'"));
    }

    #[test]
    fn test_expect_attrs_extracts_in_spec_order() {
        let root = parse_document(r#"<PK VK="VK_A" SC="1E"/>"#).unwrap();
        let values = expect_attrs(&root, "PK", &[("SC", true), ("VK", true), ("Name", false)])
            .unwrap();
        assert_eq!(values[0].as_deref(), Some("1E"));
        assert_eq!(values[1].as_deref(), Some("VK_A"));
        assert_eq!(values[2], None);
    }

    #[test]
    fn test_expect_attrs_rejects_unknown() {
        let root = parse_document(r#"<PK SC="1E" Bogus="x"/>"#).unwrap();
        assert!(expect_attrs(&root, "PK", &[("SC", true)]).is_err());
    }

    #[test]
    fn test_expect_attrs_rejects_missing_required() {
        let root = parse_document(r#"<PK VK="VK_A"/>"#).unwrap();
        assert!(expect_attrs(&root, "PK", &[("SC", true), ("VK", true)]).is_err());
    }

    #[test]
    fn test_expect_attrs_rejects_wrong_tag() {
        let root = parse_document(r#"<Result/>"#).unwrap();
        assert!(expect_attrs(&root, "PK", &[]).is_err());
    }
}
