// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Candidate property records, as supplied by configurable types.

use super::{AccessError, Getter, ScopeTag, Setter};
use crate::value::{ArrayValue, PropertyType, PropertyValue, ScalarKind, ValueError, ValueType};
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Declared type of a candidate property.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateType {
    /// Inside the scalar/array closure.
    Supported(ValueType),
    /// Anything else; carries a human readable type name for diagnostics.
    Foreign(String),
}

/// Candidate property record.
///
/// Built with the typed constructors ([`field`](Self::field),
/// [`try_field`](Self::try_field), [`array`](Self::array)) and refined with
/// the chainable modifiers. The registry validates it into a
/// [`PropertyDescriptor`](super::PropertyDescriptor).
#[derive(Clone)]
pub struct PropertySpec {
    pub(crate) category: String,
    pub(crate) name: String,
    pub(crate) declaring_type: Option<String>,
    pub(crate) value_type: CandidateType,
    pub(crate) default_value: Option<PropertyValue>,
    pub(crate) scope: Option<ScopeTag>,
    pub(crate) getter: Option<Getter>,
    pub(crate) setter: Option<Setter>,
}

fn downcast_ref<T: Any>(owner: &dyn Any) -> Result<&T, AccessError> {
    owner.downcast_ref::<T>().ok_or(AccessError::OwnerMismatch {
        expected: type_name::<T>(),
    })
}

fn downcast_mut<T: Any>(owner: &mut dyn Any) -> Result<&mut T, AccessError> {
    owner.downcast_mut::<T>().ok_or(AccessError::OwnerMismatch {
        expected: type_name::<T>(),
    })
}

impl PropertySpec {
    /// Raw constructor; every part is supplied as-is.
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        value_type: CandidateType,
        getter: Option<Getter>,
        setter: Option<Setter>,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            declaring_type: None,
            value_type,
            default_value: None,
            scope: None,
            getter,
            setter,
        }
    }

    /// Typed read/write property of `T`.
    ///
    /// `get` returning `None` means "absent".
    pub fn field<T, V, G, S>(category: impl Into<String>, name: impl Into<String>, get: G, set: S) -> Self
    where
        T: Any,
        V: PropertyType,
        G: Fn(&T) -> Option<V> + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        Self::try_field::<T, V, _, _, std::convert::Infallible>(category, name, get, move |owner, v| {
            set(owner, v);
            Ok(())
        })
    }

    /// Like [`field`](Self::field), but the setter may reject a value.
    pub fn try_field<T, V, G, S, E>(
        category: impl Into<String>,
        name: impl Into<String>,
        get: G,
        set: S,
    ) -> Self
    where
        T: Any,
        V: PropertyType,
        G: Fn(&T) -> Option<V> + Send + Sync + 'static,
        S: Fn(&mut T, V) -> Result<(), E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        let getter: Getter = Arc::new(move |owner: &dyn Any| {
            let owner = downcast_ref::<T>(owner)?;
            Ok(get(owner).map(V::into_value))
        });
        let setter: Setter = Arc::new(move |owner: &mut dyn Any, value: PropertyValue| {
            let owner = downcast_mut::<T>(owner)?;
            let value = V::from_value(&value)?;
            set(owner, value).map_err(|e| AccessError::Rejected(e.to_string()))
        });
        Self::new(
            category,
            name,
            CandidateType::Supported(V::value_type()),
            Some(getter),
            Some(setter),
        )
    }

    /// Array property whose shape is only known at runtime.
    ///
    /// The setter only sees arrays of the declared element kind and rank.
    pub fn array<T, G, S>(
        category: impl Into<String>,
        name: impl Into<String>,
        element: ScalarKind,
        rank: usize,
        get: G,
        set: S,
    ) -> Self
    where
        T: Any,
        G: Fn(&T) -> Option<ArrayValue> + Send + Sync + 'static,
        S: Fn(&mut T, ArrayValue) -> Result<(), AccessError> + Send + Sync + 'static,
    {
        let declared = ValueType::Array { element, rank };
        let getter: Getter = Arc::new(move |owner: &dyn Any| {
            let owner = downcast_ref::<T>(owner)?;
            Ok(get(owner).map(PropertyValue::Array))
        });
        let setter: Setter = Arc::new(move |owner: &mut dyn Any, value: PropertyValue| {
            let owner = downcast_mut::<T>(owner)?;
            match value {
                PropertyValue::Array(arr) if arr.element() == element && arr.rank() == rank => {
                    set(owner, arr)
                }
                other => Err(AccessError::Value(ValueError::TypeMismatch {
                    expected: declared,
                    got: other.value_type(),
                })),
            }
        });
        Self::new(
            category,
            name,
            CandidateType::Supported(declared),
            Some(getter),
            Some(setter),
        )
    }

    /// Set an explicit default.
    pub fn with_default<V: PropertyType>(mut self, value: V) -> Self {
        self.default_value = Some(value.into_value());
        self
    }

    /// Set an explicit default from an already built value.
    pub fn with_default_value(mut self, value: PropertyValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Restrict the property to passes requesting `tag`.
    pub fn scoped(mut self, tag: impl Into<ScopeTag>) -> Self {
        self.scope = Some(tag.into());
        self
    }

    /// Prefix the key with the declaring type's name.
    pub fn declared_by(mut self, type_name: impl Into<String>) -> Self {
        self.declaring_type = Some(type_name.into());
        self
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySpec")
            .field("category", &self.category)
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("value_type", &self.value_type)
            .field("default_value", &self.default_value)
            .field("scope", &self.scope)
            .field("readable", &self.getter.is_some())
            .field("writable", &self.setter.is_some())
            .finish()
    }
}
