//! Minimal XML element tree built on `quick-xml`.
//!
//! The whole document is transcoded to UTF-8 (BOM first, then the
//! `encoding` declaration) and materialized into an [`Element`] tree.
//! Element names lose their namespace prefix, so `<atom:entry>` and
//! `<entry>` are the same element for lookups. Attribute names keep theirs:
//! `x:href` is not `href`. Namespace declarations are not kept.

use encoding_rs::{Encoding, UTF_8};
use quick_xml::encoding::{detect_encoding, Decoder};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::borrow::Cow;
use tracing::warn;

use crate::traits::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Local name (prefix stripped)
    pub name: String,

    /// Attributes as `(qualified name, unescaped value)` pairs
    pub attributes: Vec<(String, String)>,

    pub children: Vec<Node>,
}

impl Element {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the value of the attribute with exactly this qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text of this element and all of its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Pre-order walk over every descendant element, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// Every descendant element with the given local name, in document order.
    pub fn find_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Element> + 'n
    where
        'a: 'n,
    {
        self.descendants().filter(move |element| element.name == name)
    }

    /// First descendant element with the given local name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.find_all(name).next()
    }
}

pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(Node::Element(element)) => {
                    self.stack.push(element.children.iter());
                    return Some(element);
                }
                Some(Node::Text(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Parses raw bytes into the document's root element.
///
/// # Errors
///
/// Returns [`ParseError`] if the document is not well-formed: bytes that do
/// not decode in the detected encoding, mismatched or unclosed tags, bad
/// attributes or entity references, no root element, or a second top-level
/// element.
pub fn parse_document(bytes: &[u8]) -> Result<Element, ParseError> {
    let document = decode_input(bytes)?;
    let mut reader = Reader::from_str(&document);
    let decoder = reader.decoder();

    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => open.push(start_element(&start, decoder)?),
            Event::Empty(start) => {
                let element = start_element(&start, decoder)?;
                attach(element, &mut open, &mut root)?;
            }
            Event::End(_) => {
                // quick-xml has already matched the end tag against its start.
                if let Some(element) = open.pop() {
                    attach(element, &mut open, &mut root)?;
                }
            }
            Event::Text(text) => {
                if let Some(parent) = open.last_mut() {
                    parent.children.push(Node::Text(text.unescape()?.into_owned()));
                }
            }
            Event::CData(cdata) => {
                if let Some(parent) = open.last_mut() {
                    parent.children.push(Node::Text(decoder.decode(&cdata)?.into_owned()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.pop() {
        return Err(ParseError::UnclosedElement(unclosed.name));
    }
    root.ok_or(ParseError::MissingRoot)
}

/// Transcodes the raw document to UTF-8.
///
/// A BOM or a UTF-16 byte pattern decides the encoding outright; otherwise
/// the `<?xml encoding="..."?>` declaration does, defaulting to UTF-8.
fn decode_input(bytes: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    let (encoding, bom_len) = match detect_encoding(bytes) {
        Some((encoding, bom_len)) if bom_len > 0 || encoding != UTF_8 => (encoding, bom_len),
        _ => (declared_encoding(bytes)?, 0),
    };
    Ok(quick_xml::encoding::decode(&bytes[bom_len..], encoding)?)
}

fn declared_encoding(bytes: &[u8]) -> Result<&'static Encoding, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    // The declaration can only be the very first event.
    let Event::Decl(decl) = reader.read_event()? else {
        return Ok(UTF_8);
    };
    let Some(label) = decl.encoding() else {
        return Ok(UTF_8);
    };
    let label = label?;

    match Encoding::for_label(&label) {
        // UTF-16 labels in an ASCII-compatible byte stream mean UTF-8.
        Some(encoding) => Ok(encoding.output_encoding()),
        None => {
            warn!(
                encoding = %String::from_utf8_lossy(&label),
                "Unknown document encoding, assuming UTF-8"
            );
            Ok(UTF_8)
        }
    }
}

fn start_element(start: &BytesStart<'_>, decoder: Decoder) -> Result<Element, ParseError> {
    let mut element = Element::named(decoder.decode(start.local_name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        if attribute.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = decoder.decode(attribute.key.as_ref())?.into_owned();
        let value = attribute.decode_and_unescape_value(decoder)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    element: Element,
    open: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), ParseError> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(Node::Element(element));
    } else if root.is_some() {
        return Err(ParseError::ContentAfterRoot(element.name));
    } else {
        *root = Some(element);
    }
    Ok(())
}
