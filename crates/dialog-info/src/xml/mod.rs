//! Structural XML layer: parsing into an element tree, generic
//! attribute/child lookup, and canonical re-serialization of sub-trees.
//!
//! Published dialog-info documents arrive as semi-structured external input.
//! The parser here is strict: anything other than a single well-formed root
//! element is rejected outright, never partially extracted. Lookup helpers
//! match names either exactly or by the local part of a prefixed name, so
//! documents work the same whether or not the publisher bound the namespace
//! to a prefix.

use std::io::Cursor;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{DialogInfoError, Result};

/// One node in a parsed document sub-tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

/// A parsed XML element: name as written, attributes in document order,
/// children in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    /// Element name as written in the document, prefix included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All attribute values whose name matches `name`, in document order.
    pub fn attr_values(&self, name: &str) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(key, _)| name_matches(key, name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Replace the value of the first attribute matching `name`, appending
    /// the attribute if no match exists. All other attributes keep their
    /// position and value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| name_matches(key, name))
        {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Direct child elements matching `name`, in document order.
    /// Grandchildren are never searched.
    pub fn child_elements(&self, name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Element(elem) if name_matches(&elem.name, name) => Some(elem),
                _ => None,
            })
            .collect()
    }

    fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        // Duplicate checking stays off so duplicated attributes reach the
        // extraction layer, which rejects them with a precise diagnostic.
        for attr in start.attributes().with_checks(false) {
            let attr = attr.map_err(|e| DialogInfoError::BadDocument(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| DialogInfoError::BadDocument(e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
            self_closing,
        })
    }
}

/// Match an element or attribute name against a wanted bare name: an exact
/// match, or the local part of a prefixed name.
pub fn name_matches(name: &str, wanted: &str) -> bool {
    if name == wanted {
        return true;
    }
    match name.split_once(':') {
        Some((prefix, local)) => !prefix.is_empty() && local == wanted,
        None => false,
    }
}

/// Parse raw text into the single root element of the document.
///
/// Accepts an optional XML declaration and doctype before the root.
/// Malformed markup, content outside the root, or more than one root all
/// fail with `BadDocument`.
pub fn parse_document(input: &str) -> Result<Element> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Decl(_)) | Ok(Event::DocType(_)) | Ok(Event::PI(_)) => {}
            Ok(Event::Start(start)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(DialogInfoError::BadDocument(
                        "more than one root element".into(),
                    ));
                }
                stack.push(Element::from_start(&start, false)?);
            }
            Ok(Event::Empty(start)) => {
                let elem = Element::from_start(&start, true)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(elem)),
                    None if root.is_none() => root = Some(elem),
                    None => {
                        return Err(DialogInfoError::BadDocument(
                            "more than one root element".into(),
                        ));
                    }
                }
            }
            Ok(Event::End(_)) => {
                let elem = stack.pop().ok_or_else(|| {
                    DialogInfoError::BadDocument("unexpected closing tag".into())
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(elem)),
                    None => root = Some(elem),
                }
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| DialogInfoError::BadDocument(e.to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Text(text.into_owned())),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(DialogInfoError::BadDocument(
                            "text content outside root element".into(),
                        ));
                    }
                }
            }
            Ok(Event::CData(cdata)) => {
                let content = String::from_utf8_lossy(cdata.as_ref()).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::CData(content)),
                    None => {
                        return Err(DialogInfoError::BadDocument(
                            "CDATA outside root element".into(),
                        ));
                    }
                }
            }
            Ok(Event::Comment(comment)) => {
                if let Some(parent) = stack.last_mut() {
                    let content = String::from_utf8_lossy(comment.as_ref()).into_owned();
                    parent.children.push(Node::Comment(content));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DialogInfoError::BadDocument(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(DialogInfoError::BadDocument(
            "document truncated inside an element".into(),
        ));
    }
    root.ok_or_else(|| DialogInfoError::BadDocument("no root element".into()))
}

/// Render an element sub-tree back to canonical text.
///
/// Attribute order is preserved, children are reproduced in document order,
/// and self-closing elements stay self-closing. No XML declaration is
/// emitted, so the output nests directly into a larger document.
pub fn render_fragment(elem: &Element) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_element(&mut writer, elem)?;
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| DialogInfoError::InternalSerializationError(e.to_string()))
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, elem: &Element) -> Result<()> {
    let mut start = BytesStart::new(elem.name.as_str());
    for (key, value) in &elem.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if elem.self_closing && elem.children.is_empty() {
        return write_event(writer, Event::Empty(start));
    }

    write_event(writer, Event::Start(start))?;
    for child in &elem.children {
        match child {
            Node::Element(inner) => write_element(writer, inner)?,
            Node::Text(text) => write_event(writer, Event::Text(BytesText::new(text)))?,
            Node::CData(content) => {
                write_event(writer, Event::CData(BytesCData::new(content.as_str())))?
            }
            Node::Comment(content) => write_event(
                writer,
                Event::Comment(BytesText::from_escaped(content.as_str())),
            )?,
        }
    }
    write_event(writer, Event::End(BytesEnd::new(elem.name.as_str())))
}

fn write_event(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| DialogInfoError::InternalSerializationError(e.to_string()))
}
