//! Generic XML element tree
//!
//! Builds a small owned tree from the `quick-xml` event stream so the reader
//! can work with elements, attributes and concatenated text the way the
//! registry format is described, without caring about events.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{BindError, Result};

/// A node inside an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Parse a whole document and return its root element.
    ///
    /// Syntax and structure errors carry the line the parser stopped on.
    pub fn parse_document(text: &str) -> Result<Element> {
        let mut reader = Reader::from_str(text);
        read_tree(&mut reader).map_err(|source| BindError::AtLine {
            line: line_at(text, reader.buffer_position() as usize),
            source: Box::new(source),
        })
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Element> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an optional attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Look up an attribute the document format requires
    pub fn required_attribute(&self, name: &str) -> Result<&str> {
        self.attribute(name)
            .ok_or_else(|| BindError::missing_attribute(&self.name, name))
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Child elements with the given name
    pub fn elements_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Element> + 'n
    where
        'a: 'n,
    {
        self.elements().filter(move |element| element.name == name)
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// First child element with the given name, which must be present
    pub fn required_child(&self, name: &str) -> Result<&Element> {
        self.child(name)
            .ok_or_else(|| BindError::missing_element(&self.name, name))
    }

    /// Concatenated text of this element and all its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }
}

fn read_tree(reader: &mut Reader<&[u8]>) -> Result<Element> {
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    BindError::MalformedDocument("closing tag without opening tag".into())
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text.unescape()?.into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = std::str::from_utf8(&data)?;
                    parent.children.push(Node::Text(text.to_string()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(BindError::MalformedDocument(format!(
            "element <{}> is never closed",
            open.name
        )));
    }

    root.ok_or_else(|| BindError::MalformedDocument("document has no root element".into()))
}

/// 1-based line containing byte offset `position`
fn line_at(text: &str, position: usize) -> usize {
    let end = position.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }

    if root.is_some() {
        return Err(BindError::MalformedDocument(format!(
            "second root element <{}>",
            element.name
        )));
    }

    *root = Some(element);
    Ok(())
}
