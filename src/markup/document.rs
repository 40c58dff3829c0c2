//! Owned block-markup tree.
//!
//! Strategy documents are small, so they are parsed into a plain owned tree
//! rather than kept as a streaming reader. The tree is what the validator
//! normalizes and what workspaces consume.

use super::{MAX_DEPTH, ValidationError};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;

/// A node in a markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Character data (already unescaped).
    Text(String),
}

/// A markup element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute (builder style).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Add a child element (builder style).
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Add a text child (builder style).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Element name, including any prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Look up an attribute value.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// All child nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements only.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Depth-first search for an element with the given name, including `self`.
    pub fn find_descendant(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.child_elements()
            .find_map(|child| child.find_descendant(name))
    }

    /// Count descendant elements (excluding `self`) with the given name.
    pub fn count_descendants(&self, name: &str) -> usize {
        self.child_elements()
            .map(|child| usize::from(child.name == name) + child.count_descendants(name))
            .sum()
    }

    /// Parse a complete document and return its root element.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let mut reader = Reader::from_str(raw);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let position = reader.buffer_position() as u64;
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(ValidationError::NestingTooDeep(MAX_DEPTH));
                    }
                    let element = element_from_start(&start, position)?;
                    if stack.is_empty() && root.is_some() {
                        return Err(ValidationError::MultipleRoots);
                    }
                    stack.push(element);
                }
                Ok(Event::Empty(start)) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(ValidationError::NestingTooDeep(MAX_DEPTH));
                    }
                    let element = element_from_start(&start, position)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or_else(|| {
                        ValidationError::parse(position, "closing tag without an open element")
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text
                        .unescape()
                        .map_err(|e| ValidationError::parse(position, e.to_string()))?;
                    push_text(&mut stack, &text, position)?;
                }
                Ok(Event::CData(data)) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    push_text(&mut stack, &text, position)?;
                }
                Ok(Event::Eof) => break,
                // Declarations, comments, processing instructions and doctypes
                Ok(_) => {}
                Err(e) => {
                    return Err(ValidationError::parse(
                        reader.error_position() as u64,
                        e.to_string(),
                    ));
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(ValidationError::parse(
                reader.buffer_position() as u64,
                format!("unclosed element <{}>", open.name),
            ));
        }

        root.ok_or(ValidationError::NoRootElement)
    }

    /// Serialize back to markup text.
    pub fn to_markup(&self) -> Result<String, ValidationError> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner()).map_err(|e| ValidationError::Serialize(e.to_string()))
    }
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<Element, ValidationError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ValidationError::parse(position, e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ValidationError::parse(position, e.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ValidationError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_some() => Err(ValidationError::MultipleRoots),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

fn push_text(stack: &mut [Element], text: &str, position: u64) -> Result<(), ValidationError> {
    // Indentation between elements carries no meaning for block documents.
    if text.trim().is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Text(text.to_string()));
            Ok(())
        }
        None => Err(ValidationError::parse(
            position,
            "text content outside of the root element",
        )),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), ValidationError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| ValidationError::Serialize(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| ValidationError::Serialize(e.to_string()))?;
    for child in &element.children {
        match child {
            Node::Element(el) => write_element(writer, el)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| ValidationError::Serialize(e.to_string()))?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| ValidationError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rejects_runaway_nesting() {
        let raw = "<a>".repeat(MAX_DEPTH + 44);
        assert_eq!(
            Element::parse(&raw),
            Err(ValidationError::NestingTooDeep(MAX_DEPTH))
        );
    }

    #[test]
    fn test_accepts_nesting_at_the_limit() {
        let raw = format!("{}{}", "<a>".repeat(MAX_DEPTH), "</a>".repeat(MAX_DEPTH));
        let root = Element::parse(&raw).unwrap();
        assert_eq!(root.count_descendants("a"), MAX_DEPTH - 1);
    }

    #[test]
    fn test_parse_nested_document() {
        let root = Element::parse(
            r#"<xml><variables><variable id="v1">stake</variable></variables>
               <block type="trade_definition" id="b1"><field name="MARKET">synthetic</field></block></xml>"#,
        )
        .unwrap();

        assert_eq!(root.name(), "xml");
        assert_eq!(root.child_elements().count(), 2);
        let variable = root.find_descendant("variable").unwrap();
        assert_eq!(variable.attribute("id"), Some("v1"));
        assert_eq!(variable.text(), "stake");
        assert_eq!(root.count_descendants("block"), 1);
    }

    #[test]
    fn test_parse_unescapes_entities() {
        let root = Element::parse(r#"<xml note="a &amp; b">1 &lt; 2</xml>"#).unwrap();
        assert_eq!(root.attribute("note"), Some("a & b"));
        assert_eq!(root.text(), "1 < 2");
    }

    #[test]
    fn test_unclosed_tag_is_rejected() {
        assert!(Element::parse("<not valid xml").is_err());
        assert!(Element::parse("<xml><block>").is_err());
    }

    #[test]
    fn test_mismatched_end_tag_is_rejected() {
        assert!(Element::parse("<xml><block></field></xml>").is_err());
    }

    #[test]
    fn test_multiple_roots_are_rejected() {
        assert_eq!(
            Element::parse("<a/><b/>"),
            Err(ValidationError::MultipleRoots)
        );
    }

    #[test]
    fn test_empty_input_has_no_root() {
        assert_eq!(Element::parse("   "), Err(ValidationError::NoRootElement));
    }

    #[test]
    fn test_stray_text_is_rejected() {
        assert!(Element::parse("hello <xml/>").is_err());
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut el = Element::new("xml").with_attribute("a", "1").with_attribute("b", "2");
        el.set_attribute("a", "3");
        assert_eq!(
            el.attributes(),
            &[("a".to_string(), "3".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_to_markup_escapes_and_collapses_empty() {
        let el = Element::new("xml")
            .with_attribute("q", "\"x\"")
            .with_child(Element::new("block").with_attribute("type", "math_number"))
            .with_child(Element::new("field").with_text("a<b"));
        assert_eq!(
            el.to_markup().unwrap(),
            r#"<xml q="&quot;x&quot;"><block type="math_number"/><field>a&lt;b</field></xml>"#
        );
    }
}
