// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property descriptors: immutable metadata plus a get/set capability pair.
//!
//! A configurable type hands the registry a list of [`PropertySpec`]s; the
//! registry validates each one into a [`PropertyDescriptor`] addressed by a
//! dotted key `[Declaring.]Category.Name`.

mod spec;

pub use spec::{CandidateType, PropertySpec};

use crate::value::{PropertyValue, ValueError, ValueType};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Separator between key segments.
pub const KEY_SEPARATOR: char = '.';

/// Read capability: `Ok(None)` means the property is currently absent.
pub type Getter =
    Arc<dyn Fn(&dyn Any) -> Result<Option<PropertyValue>, AccessError> + Send + Sync>;

/// Write capability.
pub type Setter = Arc<dyn Fn(&mut dyn Any, PropertyValue) -> Result<(), AccessError> + Send + Sync>;

/// Errors raised by a descriptor's get/set capability.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessError {
    #[error("owner is not a {expected}")]
    OwnerMismatch { expected: &'static str },

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("value rejected: {0}")]
    Rejected(String),
}

/// Opaque scope tag, compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeTag(Arc<str>);

impl ScopeTag {
    pub fn new(tag: &str) -> Self {
        Self(Arc::from(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScopeTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for ScopeTag {
    fn from(tag: String) -> Self {
        Self(Arc::from(tag))
    }
}

impl fmt::Display for ScopeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build a dotted key from its segments.
pub fn compose_key(declaring_type: Option<&str>, category: &str, name: &str) -> String {
    match declaring_type {
        Some(declaring) => format!(
            "{declaring}{sep}{category}{sep}{name}",
            sep = KEY_SEPARATOR
        ),
        None => format!("{category}{sep}{name}", sep = KEY_SEPARATOR),
    }
}

/// Validated, immutable property metadata.
#[derive(Clone)]
pub struct PropertyDescriptor {
    key: String,
    category: String,
    name: String,
    declaring_type: Option<String>,
    value_type: ValueType,
    default_value: Option<PropertyValue>,
    scope: Option<ScopeTag>,
    getter: Getter,
    setter: Setter,
}

impl PropertyDescriptor {
    /// Assemble a descriptor from already validated parts.
    pub(crate) fn from_validated(
        spec: PropertySpec,
        value_type: ValueType,
        getter: Getter,
        setter: Setter,
    ) -> Self {
        let key = compose_key(spec.declaring_type.as_deref(), &spec.category, &spec.name);
        Self {
            key,
            category: spec.category,
            name: spec.name,
            declaring_type: spec.declaring_type,
            value_type,
            default_value: spec.default_value,
            scope: spec.scope,
            getter,
            setter,
        }
    }

    /// Globally unique dotted key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Serialization group.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Name, unique within the category.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Explicit default, `None` when unset.
    pub fn default_value(&self) -> Option<&PropertyValue> {
        self.default_value.as_ref()
    }

    pub fn scope(&self) -> Option<&ScopeTag> {
        self.scope.as_ref()
    }

    /// Whether a pass requesting `request` touches this descriptor.
    ///
    /// An unscoped request matches everything; a scoped request matches
    /// unscoped descriptors and those carrying the same tag.
    pub fn in_scope(&self, request: Option<&ScopeTag>) -> bool {
        match (request, &self.scope) {
            (None, _) | (Some(_), None) => true,
            (Some(requested), Some(own)) => requested == own,
        }
    }

    /// Explicit default, else the implicit zero of the value type.
    pub fn effective_default(&self) -> Option<PropertyValue> {
        self.default_value.clone().or_else(|| {
            self.value_type
                .implicit_default()
                .map(PropertyValue::Scalar)
        })
    }

    /// Whether `value` has exactly the declared type.
    pub fn accepts(&self, value: &PropertyValue) -> bool {
        value.value_type() == self.value_type
    }

    /// Read the current value from `owner`.
    pub fn get_value(&self, owner: &dyn Any) -> Result<Option<PropertyValue>, AccessError> {
        (self.getter)(owner)
    }

    /// Assign `value` to `owner`.
    pub fn set_value(&self, owner: &mut dyn Any, value: PropertyValue) -> Result<(), AccessError> {
        (self.setter)(owner, value)
    }

    /// Two descriptors of the same inherited property may share one key.
    pub(crate) fn is_same_inherited(&self, other: &Self) -> bool {
        self.declaring_type.is_some()
            && self.declaring_type == other.declaring_type
            && self.key == other.key
            && self.value_type == other.value_type
            && self.default_value == other.default_value
            && self.scope == other.scope
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("key", &self.key)
            .field("value_type", &self.value_type)
            .field("default_value", &self.default_value)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
