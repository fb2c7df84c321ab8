// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Document writer.
//!
//! ```text
//! <Configuration>
//!   <Group Name="Net">
//!     <Port>9090</Port>
//!     <Hosts Length="2" Type="string">
//!       <Item0>a</Item0>
//!       <Item0>b</Item0>
//!     </Hosts>
//!   </Group>
//! </Configuration>
//! ```

use std::collections::BTreeMap;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::sparse::worth_persisting;
use super::text::format_scalar;
use super::{item_name, CodecError, ATTR_LENGTH, ATTR_NAME, ATTR_TYPE, GROUP};
use crate::config::CodecConfig;
use crate::descriptor::PropertyDescriptor;
use crate::registry::DescriptorRegistry;
use crate::store::ValueMap;
use crate::value::{ArrayValue, PropertyValue, Scalar};

type Selected<'a> = BTreeMap<&'a str, Vec<(&'a PropertyDescriptor, &'a PropertyValue)>>;

/// Pick the values worth writing, grouped by category.
///
/// Groups come out in category order, fields in registration order.
fn select<'a>(
    values: &'a ValueMap,
    descriptors: &'a [std::sync::Arc<PropertyDescriptor>],
    registry: &DescriptorRegistry,
) -> Result<Selected<'a>, CodecError> {
    for key in values.keys() {
        if registry.descriptor(key).is_none() {
            log::warn!("[codec] skipping value with unregistered key '{}'", key);
        }
    }

    let mut groups: Selected<'a> = BTreeMap::new();
    for descriptor in descriptors {
        let Some(value) = values.get(descriptor.key()) else {
            continue;
        };
        if !descriptor.accepts(value) {
            return Err(CodecError::TypeMismatch {
                key: descriptor.key().to_string(),
                expected: descriptor.value_type(),
                got: value.value_type(),
            });
        }
        if worth_persisting(descriptor, value) {
            groups
                .entry(descriptor.category())
                .or_default()
                .push((descriptor.as_ref(), value));
        }
    }
    Ok(groups)
}

pub(crate) fn write_document<W: Write>(
    values: &ValueMap,
    registry: &DescriptorRegistry,
    config: &CodecConfig,
    out: W,
) -> Result<(), CodecError> {
    let descriptors = registry.descriptors();
    let groups = select(values, &descriptors, registry)?;

    let mut writer = if config.indent == 0 {
        Writer::new(out)
    } else {
        Writer::new_with_indent(out, b' ', config.indent)
    };

    if config.xml_declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    }

    let root = config.root_element.as_str();
    if groups.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(root)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(root)))?;
        for (category, fields) in &groups {
            let group = BytesStart::new(GROUP).with_attributes([(ATTR_NAME, *category)]);
            writer.write_event(Event::Start(group))?;
            for (descriptor, value) in fields {
                write_field(&mut writer, descriptor, value)?;
            }
            writer.write_event(Event::End(BytesEnd::new(GROUP)))?;
        }
        writer.write_event(Event::End(BytesEnd::new(root)))?;
    }

    writer.into_inner().flush()?;
    Ok(())
}

fn write_field<W: Write>(
    writer: &mut Writer<W>,
    descriptor: &PropertyDescriptor,
    value: &PropertyValue,
) -> Result<(), CodecError> {
    let name = descriptor.name();
    match value {
        PropertyValue::Scalar(scalar) => write_text_element(writer, name, scalar),
        PropertyValue::Array(array) => {
            let length = array
                .shape()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            let start = BytesStart::new(name).with_attributes([
                (ATTR_LENGTH, length.as_str()),
                (ATTR_TYPE, array.element().type_name()),
            ]);
            if array.shape()[0] == 0 {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }
            writer.write_event(Event::Start(start))?;
            let mut leaves = array.iter();
            write_dimension(writer, descriptor, array, 0, &mut leaves)?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
            Ok(())
        }
    }
}

/// Write `Item{dim}` children for one index along `dim`, consuming leaves in
/// row-major order.
fn write_dimension<'a, W: Write>(
    writer: &mut Writer<W>,
    descriptor: &PropertyDescriptor,
    array: &ArrayValue,
    dim: usize,
    leaves: &mut impl Iterator<Item = &'a Scalar>,
) -> Result<(), CodecError> {
    let shape = array.shape();
    let item = item_name(dim);
    let leaf = dim + 1 == shape.len();

    for _ in 0..shape[dim] {
        if leaf {
            let scalar = leaves
                .next()
                .ok_or_else(|| CodecError::MalformedArrayEncoding {
                    key: descriptor.key().to_string(),
                    reason: "fewer elements than the shape requires".to_string(),
                })?;
            write_text_element(writer, &item, scalar)?;
        } else if shape[dim + 1] == 0 {
            writer.write_event(Event::Empty(BytesStart::new(item.as_str())))?;
        } else {
            writer.write_event(Event::Start(BytesStart::new(item.as_str())))?;
            write_dimension(writer, descriptor, array, dim + 1, leaves)?;
            writer.write_event(Event::End(BytesEnd::new(item.as_str())))?;
        }
    }
    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    scalar: &Scalar,
) -> Result<(), CodecError> {
    let text = format_scalar(scalar);
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(&text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
