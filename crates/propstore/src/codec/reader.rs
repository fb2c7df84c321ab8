// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Document reader.
//!
//! A thin pull layer over `quick_xml::Reader` that tracks nesting depth.
//! Every scope opened with [`XmlReader::within`] is consumed up to its end tag
//! whatever the body did, so a failing or short-reading body never leaves
//! the reader mid-element.
//!
//! ```text
//! Root:   Start -> (Group)* -> End
//! Group:  Start -> (Field)* -> End
//! Field:  Start -> text | (Item0 -> ... -> Item{rank-1} -> text)* -> End
//! ```

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::text::parse_scalar;
use super::{item_name, CodecError, ATTR_LENGTH, ATTR_NAME, ATTR_TYPE, GROUP};
use crate::config::CodecConfig;
use crate::descriptor::PropertyDescriptor;
use crate::registry::DescriptorRegistry;
use crate::store::ValueMap;
use crate::value::{ArrayValue, PropertyValue, Scalar, ScalarKind, ValueType};

/// An opened element, with owned name and attributes.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    /// Self-closing in the source document.
    pub empty: bool,
    depth: usize,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn from_start(start: &BytesStart<'_>, depth: usize, empty: bool) -> Result<Self, CodecError> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            empty,
            depth,
        })
    }
}

#[derive(Debug)]
enum Node {
    Open(Element),
    Close,
    Text(String),
    Eof,
}

pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    depth: usize,
    /// A self-closing element was just reported; its close comes next.
    pending_close: bool,
}

impl<R: BufRead> XmlReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            reader: Reader::from_reader(input),
            buf: Vec::new(),
            depth: 0,
            pending_close: false,
        }
    }

    fn next_node(&mut self) -> Result<Node, CodecError> {
        if self.pending_close {
            self.pending_close = false;
            self.depth = self.depth.saturating_sub(1);
            return Ok(Node::Close);
        }
        loop {
            self.buf.clear();
            let node = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(start) => {
                    self.depth += 1;
                    Node::Open(Element::from_start(&start, self.depth, false)?)
                }
                Event::Empty(start) => {
                    self.depth += 1;
                    self.pending_close = true;
                    Node::Open(Element::from_start(&start, self.depth, true)?)
                }
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    Node::Close
                }
                Event::Text(text) => Node::Text(text.unescape()?.into_owned()),
                Event::CData(data) => Node::Text(std::str::from_utf8(&data)?.to_string()),
                Event::Eof => Node::Eof,
                _ => continue,
            };
            return Ok(node);
        }
    }

    /// Next child element of the current scope, or `None` once its end tag
    /// has been consumed.
    pub fn next_child(&mut self) -> Result<Option<Element>, CodecError> {
        loop {
            match self.next_node()? {
                Node::Open(element) => return Ok(Some(element)),
                Node::Close => return Ok(None),
                Node::Text(text) if text.trim().is_empty() => {}
                Node::Text(text) => {
                    log::warn!("[codec] ignoring stray text '{}'", text.trim());
                }
                Node::Eof => return Err(CodecError::UnexpectedEof),
            }
        }
    }

    /// First element of the document.
    pub fn root(&mut self) -> Result<Element, CodecError> {
        loop {
            match self.next_node()? {
                Node::Open(element) => return Ok(element),
                Node::Text(text) if text.trim().is_empty() => {}
                Node::Text(text) => {
                    log::warn!("[codec] ignoring text before root '{}'", text.trim());
                }
                Node::Close | Node::Eof => return Err(CodecError::UnexpectedEof),
            }
        }
    }

    /// Text content of the current scope, up to and including its end tag.
    ///
    /// Child elements are not expected here and are skipped.
    pub fn read_text(&mut self) -> Result<String, CodecError> {
        let mut text = String::new();
        loop {
            match self.next_node()? {
                Node::Text(chunk) => text.push_str(&chunk),
                Node::Open(child) => {
                    log::warn!("[codec] skipping unexpected element <{}> in text", child.name);
                    self.close_scope(&child)?;
                }
                Node::Close => return Ok(text),
                Node::Eof => return Err(CodecError::UnexpectedEof),
            }
        }
    }

    /// Run `body` inside `element`, then make sure its end tag is consumed.
    ///
    /// The body's error wins over any error met while closing.
    pub fn within<T>(
        &mut self,
        element: &Element,
        body: impl FnOnce(&mut Self) -> Result<T, CodecError>,
    ) -> Result<T, CodecError> {
        let result = body(self);
        let closed = self.close_scope(element);
        let value = result?;
        if closed? {
            log::warn!(
                "[codec] reader was not at </{}>; skipped unexpected content",
                element.name
            );
        }
        Ok(value)
    }

    /// Consume `element` quietly, whatever it contains.
    pub fn skip(&mut self, element: &Element) -> Result<(), CodecError> {
        self.close_scope(element).map(|_| ())
    }

    /// Consume nodes until `element` is closed. Returns whether anything
    /// other than whitespace had to be skipped.
    fn close_scope(&mut self, element: &Element) -> Result<bool, CodecError> {
        let mut skipped = false;
        while self.depth >= element.depth {
            match self.next_node()? {
                Node::Eof => return Err(CodecError::UnexpectedEof),
                Node::Close if self.depth < element.depth => break,
                Node::Text(text) if text.trim().is_empty() => {}
                _ => skipped = true,
            }
        }
        Ok(skipped)
    }
}

// ---------------------------------------------------------------------------
// Document decoding
// ---------------------------------------------------------------------------

pub(crate) fn read_document<R: BufRead>(
    input: R,
    registry: &DescriptorRegistry,
    config: &CodecConfig,
) -> Result<ValueMap, CodecError> {
    let mut xml = XmlReader::new(input);
    let root = xml.root()?;
    if root.name != config.root_element {
        if config.strict_root {
            return Err(CodecError::UnexpectedElement {
                expected: config.root_element.clone(),
                found: root.name,
            });
        }
        log::warn!(
            "[codec] root element is <{}>, expected <{}>",
            root.name,
            config.root_element
        );
    }

    let mut values = ValueMap::new();
    xml.within(&root, |xml| {
        while let Some(group) = xml.next_child()? {
            xml.within(&group, |xml| read_group(xml, &group, registry, &mut values))?;
        }
        Ok(())
    })?;
    Ok(values)
}

fn read_group<R: BufRead>(
    xml: &mut XmlReader<R>,
    group: &Element,
    registry: &DescriptorRegistry,
    values: &mut ValueMap,
) -> Result<(), CodecError> {
    if group.name != GROUP {
        log::warn!("[codec] skipping unexpected element <{}>", group.name);
        return xml.skip(group);
    }
    let Some(category) = group.attr(ATTR_NAME) else {
        log::warn!("[codec] skipping <{}> without a {} attribute", GROUP, ATTR_NAME);
        return xml.skip(group);
    };

    while let Some(field) = xml.next_child()? {
        let Some(descriptor) = registry.by_address(category, &field.name) else {
            log::warn!(
                "[codec] skipping unknown field {}{}{}",
                category,
                crate::descriptor::KEY_SEPARATOR,
                field.name
            );
            xml.skip(&field)?;
            continue;
        };
        if field.empty
            && matches!(descriptor.value_type(), ValueType::Scalar(kind) if kind != ScalarKind::String)
        {
            log::warn!(
                "[codec] skipping empty element <{}> for {}",
                field.name,
                descriptor.key()
            );
            xml.skip(&field)?;
            continue;
        }
        let value = xml.within(&field, |xml| read_field(xml, &field, &descriptor))?;
        values.insert(descriptor.key().to_string(), value);
    }
    Ok(())
}

fn read_field<R: BufRead>(
    xml: &mut XmlReader<R>,
    field: &Element,
    descriptor: &PropertyDescriptor,
) -> Result<PropertyValue, CodecError> {
    match descriptor.value_type() {
        ValueType::Scalar(kind) => {
            let text = xml.read_text()?;
            Ok(PropertyValue::Scalar(parse_leaf(descriptor, kind, &text)?))
        }
        ValueType::Array { element, rank } => {
            Ok(PropertyValue::Array(read_array(xml, field, descriptor, element, rank)?))
        }
    }
}

fn parse_leaf(
    descriptor: &PropertyDescriptor,
    kind: ScalarKind,
    text: &str,
) -> Result<Scalar, CodecError> {
    parse_scalar(kind, text).map_err(|e| CodecError::InvalidScalar {
        key: descriptor.key().to_string(),
        kind,
        reason: e.reason,
    })
}

fn read_array<R: BufRead>(
    xml: &mut XmlReader<R>,
    field: &Element,
    descriptor: &PropertyDescriptor,
    element: ScalarKind,
    rank: usize,
) -> Result<ArrayValue, CodecError> {
    let malformed = |reason: String| CodecError::MalformedArrayEncoding {
        key: descriptor.key().to_string(),
        reason,
    };

    let length = field
        .attr(ATTR_LENGTH)
        .ok_or_else(|| malformed(format!("missing {} attribute", ATTR_LENGTH)))?;
    let type_name = field
        .attr(ATTR_TYPE)
        .ok_or_else(|| malformed(format!("missing {} attribute", ATTR_TYPE)))?;

    let kind = ScalarKind::from_type_name(type_name).ok_or_else(|| {
        CodecError::UnsupportedElementType {
            key: descriptor.key().to_string(),
            type_name: type_name.to_string(),
        }
    })?;
    if kind != element {
        return Err(CodecError::TypeMismatch {
            key: descriptor.key().to_string(),
            expected: descriptor.value_type(),
            got: ValueType::Array {
                element: kind,
                rank,
            },
        });
    }

    let shape = length
        .split_whitespace()
        .map(str::parse::<usize>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| malformed(format!("invalid {} '{}': {}", ATTR_LENGTH, length, e)))?;
    if shape.len() != rank {
        return Err(malformed(format!(
            "{} has {} extents, expected {}",
            ATTR_LENGTH,
            shape.len(),
            rank
        )));
    }

    let mut elements = Vec::new();
    read_dimension(xml, descriptor, kind, &shape, 0, &mut elements)?;
    ArrayValue::from_shape_vec(kind, &shape, elements).map_err(|e| malformed(e.to_string()))
}

/// Read the `Item{dim}` children of the current scope, appending leaves in
/// row-major order. The item count must match the extent exactly.
fn read_dimension<R: BufRead>(
    xml: &mut XmlReader<R>,
    descriptor: &PropertyDescriptor,
    kind: ScalarKind,
    shape: &[usize],
    dim: usize,
    out: &mut Vec<Scalar>,
) -> Result<(), CodecError> {
    let expected = item_name(dim);
    let leaf = dim + 1 == shape.len();
    let mut count = 0usize;

    while let Some(item) = xml.next_child()? {
        if item.name != expected {
            log::warn!(
                "[codec] {}: skipping <{}>, expected <{}>",
                descriptor.key(),
                item.name,
                expected
            );
            xml.skip(&item)?;
            continue;
        }
        count += 1;
        if count > shape[dim] {
            xml.skip(&item)?;
            return Err(CodecError::MalformedArrayEncoding {
                key: descriptor.key().to_string(),
                reason: format!("more than {} <{}> elements", shape[dim], expected),
            });
        }
        if leaf {
            let text = xml.within(&item, |xml| xml.read_text())?;
            out.push(parse_leaf(descriptor, kind, &text)?);
        } else {
            xml.within(&item, |xml| {
                read_dimension(xml, descriptor, kind, shape, dim + 1, out)
            })?;
        }
    }

    if count != shape[dim] {
        return Err(CodecError::MalformedArrayEncoding {
            key: descriptor.key().to_string(),
            reason: format!(
                "expected {} <{}> elements, found {}",
                shape[dim], expected, count
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(text: &str) -> XmlReader<&[u8]> {
        XmlReader::new(text.as_bytes())
    }

    #[test]
    fn test_self_closing_is_open_then_close() {
        let mut xml = reader("<a><b x=\"1\"/><c>t</c></a>");
        let a = xml.root().expect("root");
        assert_eq!(a.name, "a");
        let b = xml.next_child().expect("b").expect("some");
        assert!(b.empty);
        assert_eq!(b.attr("x"), Some("1"));
        assert!(xml.next_child().expect("close of b").is_none());
        let c = xml.next_child().expect("c").expect("some");
        assert_eq!(xml.within(&c, |xml| xml.read_text()).expect("text"), "t");
        assert!(xml.next_child().expect("close of a").is_none());
    }

    #[test]
    fn test_within_consumes_rest_of_scope() {
        let mut xml = reader("<a><b><c/><d>x</d></b><e/></a>");
        let a = xml.root().expect("root");
        let b = xml.next_child().expect("b").expect("some");
        // Body reads nothing; the whole of <b> must still be consumed.
        xml.within(&b, |_| Ok(())).expect("within");
        let e = xml.next_child().expect("e").expect("some");
        assert_eq!(e.name, "e");
        xml.skip(&e).expect("skip");
        assert!(xml.next_child().expect("end").is_none());
        assert_eq!(a.name, "a");
    }

    #[test]
    fn test_within_closes_scope_on_error() {
        let mut xml = reader("<a><b><c/></b><e/></a>");
        xml.root().expect("root");
        let b = xml.next_child().expect("b").expect("some");
        let err = xml
            .within(&b, |_| -> Result<(), CodecError> { Err(CodecError::UnexpectedEof) })
            .unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedEof));
        assert_eq!(xml.next_child().expect("e").expect("some").name, "e");
    }

    #[test]
    fn test_read_text_joins_chunks_and_unescapes() {
        let mut xml = reader("<a>x &amp; <![CDATA[<y>]]> z</a>");
        let a = xml.root().expect("root");
        let text = xml.within(&a, |xml| xml.read_text()).expect("text");
        assert_eq!(text, "x & <y> z");
    }

    #[test]
    fn test_read_text_skips_child_elements() {
        let mut xml = reader("<a>1<junk><deep/></junk>2</a>");
        let a = xml.root().expect("root");
        assert_eq!(xml.within(&a, |xml| xml.read_text()).expect("text"), "12");
    }

    #[test]
    fn test_truncated_document() {
        let mut xml = reader("<a><b>");
        let a = xml.root().expect("root");
        let err = xml
            .within(&a, |xml| {
                while let Some(child) = xml.next_child()? {
                    xml.skip(&child)?;
                }
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnexpectedEof | CodecError::Xml(_)
        ));
    }
}
