// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML codec configuration

use serde::{Deserialize, Serialize};

/// XML codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Name of the document root element
    pub root_element: String,

    /// Spaces per nesting level (0 = single line)
    pub indent: usize,

    /// Emit `<?xml version="1.0" encoding="utf-8"?>`
    pub xml_declaration: bool,

    /// Reject a document whose root name differs (default: warn and continue)
    pub strict_root: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            root_element: "Configuration".to_string(),
            indent: 2,
            xml_declaration: true,
            strict_root: false,
        }
    }
}

impl CodecConfig {
    /// Create a new config builder
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }
}

/// Config builder for fluent API
#[derive(Debug, Default)]
pub struct CodecConfigBuilder {
    root_element: Option<String>,
    indent: Option<usize>,
    xml_declaration: Option<bool>,
    strict_root: Option<bool>,
}

impl CodecConfigBuilder {
    /// Set the root element name
    pub fn root_element(mut self, name: impl Into<String>) -> Self {
        self.root_element = Some(name.into());
        self
    }

    /// Set indentation width (0 = single line)
    pub fn indent(mut self, spaces: usize) -> Self {
        self.indent = Some(spaces);
        self
    }

    /// Emit the XML declaration (default: true)
    pub fn xml_declaration(mut self, emit: bool) -> Self {
        self.xml_declaration = Some(emit);
        self
    }

    /// Fail on a root name mismatch (default: false)
    pub fn strict_root(mut self, strict: bool) -> Self {
        self.strict_root = Some(strict);
        self
    }

    /// Build the configuration
    pub fn build(self) -> CodecConfig {
        let defaults = CodecConfig::default();

        CodecConfig {
            root_element: self.root_element.unwrap_or(defaults.root_element),
            indent: self.indent.unwrap_or(defaults.indent),
            xml_declaration: self.xml_declaration.unwrap_or(defaults.xml_declaration),
            strict_root: self.strict_root.unwrap_or(defaults.strict_root),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = CodecConfig::builder()
            .root_element("Settings")
            .indent(0)
            .strict_root(true)
            .build();

        assert_eq!(config.root_element, "Settings");
        assert_eq!(config.indent, 0);
        assert!(config.xml_declaration);
        assert!(config.strict_root);
    }

    #[test]
    fn test_config_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.root_element, "Configuration");
        assert_eq!(config.indent, 2);
        assert!(config.xml_declaration);
        assert!(!config.strict_root);
        assert_eq!(CodecConfig::builder().build(), config);
    }
}
