// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sparse XML Codec
//!
//! Serializes a [`ValueMap`] against a [`DescriptorRegistry`] and reads it
//! back. Only values that differ from their applicable default are written
//! (see [`worth_persisting`]).
//!
//! # Document format
//!
//! ```text
//! root -> Group[@Name] -> <Name>[@Length][@Type] -> text | Item0 ... Item{rank-1}
//! ```
//!
//! - One `Group` per category, in category order.
//! - Arrays carry their extents in `Length` (space separated) and their
//!   element type name in `Type`; `Item{d}` nests one level per dimension.
//! - Names are case-sensitive.
//!
//! # Example
//!
//! ```rust,ignore
//! use propstore::{CodecConfig, XmlCodec};
//!
//! let codec = XmlCodec::new(CodecConfig::default());
//! let xml = codec.serialize_to_string(store.as_map(), &registry)?;
//! let values = codec.deserialize_str(&xml, &registry)?;
//! ```

mod reader;
mod sparse;
mod text;
mod writer;

pub use sparse::worth_persisting;
pub use text::{format_duration, format_scalar, parse_duration, parse_scalar, ScalarParseError};

use std::io::{BufRead, Write};

use thiserror::Error;

use crate::config::CodecConfig;
use crate::registry::DescriptorRegistry;
use crate::store::ValueMap;
use crate::value::{ScalarKind, ValueType};

pub(crate) const GROUP: &str = "Group";
pub(crate) const ATTR_NAME: &str = "Name";
pub(crate) const ATTR_LENGTH: &str = "Length";
pub(crate) const ATTR_TYPE: &str = "Type";

/// Element name of the items along dimension `dim`.
pub(crate) fn item_name(dim: usize) -> String {
    format!("Item{}", dim)
}

/// Errors produced by the XML codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed array encoding for '{key}': {reason}")]
    MalformedArrayEncoding { key: String, reason: String },

    #[error("unsupported element type '{type_name}' for '{key}'")]
    UnsupportedElementType { key: String, type_name: String },

    #[error("invalid {kind} value for '{key}': {reason}")]
    InvalidScalar {
        key: String,
        kind: ScalarKind,
        reason: String,
    },

    #[error("type mismatch for '{key}': expected {expected}, got {got}")]
    TypeMismatch {
        key: String,
        expected: ValueType,
        got: ValueType,
    },

    #[error("expected element <{expected}>, found <{found}>")]
    UnexpectedElement { expected: String, found: String },

    #[error("unexpected end of document")]
    UnexpectedEof,
}

/// Sparse XML codec.
#[derive(Debug, Clone, Default)]
pub struct XmlCodec {
    config: CodecConfig,
}

impl XmlCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Write the values worth persisting to `out`, then flush it.
    ///
    /// Keys unknown to `registry` are skipped with a warning; a value whose
    /// type disagrees with its descriptor is an error.
    pub fn serialize<W: Write>(
        &self,
        values: &ValueMap,
        registry: &DescriptorRegistry,
        out: W,
    ) -> Result<(), CodecError> {
        writer::write_document(values, registry, &self.config, out)
    }

    pub fn serialize_to_string(
        &self,
        values: &ValueMap,
        registry: &DescriptorRegistry,
    ) -> Result<String, CodecError> {
        let mut buf = Vec::new();
        self.serialize(values, registry, &mut buf)?;
        String::from_utf8(buf).map_err(|e| CodecError::Encoding(e.utf8_error()))
    }

    /// Decode a whole document into a fresh map.
    ///
    /// Unknown groups and fields are skipped with a warning. Keys whose value
    /// was not written (equal to its default) are absent from the result.
    pub fn deserialize<R: BufRead>(
        &self,
        input: R,
        registry: &DescriptorRegistry,
    ) -> Result<ValueMap, CodecError> {
        reader::read_document(input, registry, &self.config)
    }

    pub fn deserialize_str(
        &self,
        text: &str,
        registry: &DescriptorRegistry,
    ) -> Result<ValueMap, CodecError> {
        self.deserialize(text.as_bytes(), registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PropertySpec;
    use crate::registry::PropertySource;
    use crate::value::{ArrayValue, PropertyType, PropertyValue, Scalar};

    struct Sample;

    impl PropertySource for Sample {
        fn properties() -> Vec<PropertySpec> {
            vec![
                PropertySpec::field::<Sample, i32, _, _>("Net", "Port", |_| None, |_, _| {})
                    .with_default(8080),
                PropertySpec::field::<Sample, Vec<String>, _, _>("Net", "Hosts", |_| None, |_, _| {}),
                PropertySpec::field::<Sample, String, _, _>("App", "Title", |_| None, |_, _| {}),
                PropertySpec::array::<Sample, _, _>(
                    "App",
                    "Grid",
                    ScalarKind::U8,
                    2,
                    |_| None,
                    |_, _| Ok(()),
                ),
            ]
        }
    }

    fn registry() -> DescriptorRegistry {
        let registry = DescriptorRegistry::new();
        registry.register::<Sample>().expect("register");
        registry
    }

    fn compact() -> XmlCodec {
        XmlCodec::new(CodecConfig::builder().indent(0).xml_declaration(false).build())
    }

    #[test]
    fn test_exact_compact_output() {
        let registry = registry();
        let mut values = ValueMap::new();
        values.insert("Net.Port".into(), 9090.into_value());
        values.insert(
            "Net.Hosts".into(),
            vec!["a".to_string(), "<b>".to_string()].into_value(),
        );
        values.insert("App.Title".into(), String::new().into_value());

        let xml = compact().serialize_to_string(&values, &registry).expect("serialize");
        assert_eq!(
            xml,
            "<Configuration>\
             <Group Name=\"App\"><Title></Title></Group>\
             <Group Name=\"Net\"><Port>9090</Port>\
             <Hosts Length=\"2\" Type=\"string\"><Item0>a</Item0><Item0>&lt;b&gt;</Item0></Hosts>\
             </Group></Configuration>"
        );
        assert_eq!(compact().deserialize_str(&xml, &registry).expect("deserialize"), values);
    }

    #[test]
    fn test_hollow_matrix_layout() {
        let registry = registry();
        let mut values = ValueMap::new();
        let grid = ArrayValue::new(ScalarKind::U8, &[2, 0]).expect("shape");
        values.insert("App.Grid".into(), grid.into());

        let xml = compact().serialize_to_string(&values, &registry).expect("serialize");
        assert_eq!(
            xml,
            "<Configuration><Group Name=\"App\">\
             <Grid Length=\"2 0\" Type=\"uint8\"><Item0/><Item0/></Grid>\
             </Group></Configuration>"
        );
        assert_eq!(compact().deserialize_str(&xml, &registry).expect("deserialize"), values);
    }

    #[test]
    fn test_defaults_are_omitted() {
        let registry = registry();
        let mut values = ValueMap::new();
        values.insert("Net.Port".into(), 8080.into_value());
        values.insert("Net.Hosts".into(), Vec::<String>::new().into_value());

        let xml = compact().serialize_to_string(&values, &registry).expect("serialize");
        assert_eq!(xml, "<Configuration/>");
        assert!(compact().deserialize_str(&xml, &registry).expect("deserialize").is_empty());
    }

    #[test]
    fn test_unknown_keys_skipped_and_mismatch_rejected() {
        let registry = registry();
        let mut values = ValueMap::new();
        values.insert("Nope.Nope".into(), 1.into_value());
        let xml = compact().serialize_to_string(&values, &registry).expect("serialize");
        assert_eq!(xml, "<Configuration/>");

        values.insert("Net.Port".into(), PropertyValue::Scalar(Scalar::I64(1)));
        assert!(matches!(
            compact().serialize_to_string(&values, &registry),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_declaration_and_indent() {
        let registry = registry();
        let mut values = ValueMap::new();
        values.insert("Net.Port".into(), 1.into_value());
        let xml = XmlCodec::default()
            .serialize_to_string(&values, &registry)
            .expect("serialize");
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("\n  <Group Name=\"Net\">"));
        assert!(xml.contains("\n    <Port>1</Port>"));
        assert_eq!(
            XmlCodec::default().deserialize_str(&xml, &registry).expect("deserialize"),
            values
        );
    }

    #[test]
    fn test_array_errors() {
        let registry = registry();
        let cases = [
            ("<Hosts Type=\"string\"/>", "missing Length"),
            ("<Hosts Length=\"0\"/>", "missing Type"),
            ("<Hosts Length=\"1 1\" Type=\"string\"><Item0><Item1>a</Item1></Item0></Hosts>", "rank"),
            ("<Hosts Length=\"x\" Type=\"string\"/>", "bad extent"),
            ("<Hosts Length=\"2\" Type=\"string\"><Item0>a</Item0></Hosts>", "too few"),
            ("<Hosts Length=\"1\" Type=\"string\"><Item0>a</Item0><Item0>b</Item0></Hosts>", "too many"),
        ];
        for (field, what) in cases {
            let xml = format!("<Configuration><Group Name=\"Net\">{}</Group></Configuration>", field);
            assert!(
                matches!(
                    compact().deserialize_str(&xml, &registry),
                    Err(CodecError::MalformedArrayEncoding { .. })
                ),
                "{what}"
            );
        }

        let xml = "<Configuration><Group Name=\"Net\"><Hosts Length=\"1\" Type=\"complex\"><Item0>a</Item0></Hosts></Group></Configuration>";
        assert!(matches!(
            compact().deserialize_str(xml, &registry),
            Err(CodecError::UnsupportedElementType { .. })
        ));

        let xml = "<Configuration><Group Name=\"Net\"><Hosts Length=\"1\" Type=\"int32\"><Item0>1</Item0></Hosts></Group></Configuration>";
        assert!(matches!(
            compact().deserialize_str(xml, &registry),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_lenient_reading() {
        let registry = registry();
        let xml = "<?xml version=\"1.0\"?>\n<!-- saved -->\n<Settings>\
                   <Group Name=\"Net\"><Port> 7 </Port><Unknown>1</Unknown></Group>\
                   <Group Name=\"Ghost\"><Port>1</Port></Group>\
                   <Group Name=\"App\"/>\
                   <Other/>\
                   </Settings>";
        let values = compact().deserialize_str(xml, &registry).expect("deserialize");
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("Net.Port"), Some(&7.into_value()));

        let strict = XmlCodec::new(CodecConfig::builder().strict_root(true).build());
        assert!(matches!(
            strict.deserialize_str(xml, &registry),
            Err(CodecError::UnexpectedElement { .. })
        ));
    }

    #[test]
    fn test_self_closing_fields() {
        let registry = registry();
        let xml = "<Configuration>\
                   <Group Name=\"Net\"><Port/>\
                   <Hosts Length=\"1\" Type=\"string\"><Item0>a</Item0></Hosts></Group>\
                   <Group Name=\"App\"><Title/></Group>\
                   </Configuration>";
        let values = compact().deserialize_str(xml, &registry).expect("deserialize");
        assert_eq!(values.len(), 2);
        assert!(!values.contains_key("Net.Port"));
        assert_eq!(
            values.get("Net.Hosts"),
            Some(&vec!["a".to_string()].into_value())
        );
        assert_eq!(values.get("App.Title"), Some(&String::new().into_value()));
    }

    #[test]
    fn test_invalid_scalar() {
        let registry = registry();
        let xml = "<Configuration><Group Name=\"Net\"><Port>eighty</Port></Group></Configuration>";
        assert!(matches!(
            compact().deserialize_str(xml, &registry),
            Err(CodecError::InvalidScalar { kind: ScalarKind::I32, .. })
        ));
    }
}
