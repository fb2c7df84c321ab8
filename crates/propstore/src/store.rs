// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Configuration store: a key to value map bound to live objects.
//!
//! [`ConfigurationStore::commit`] pulls property values out of objects,
//! [`ConfigurationStore::update`] pushes them back. Both honor an optional
//! scope tag. The store itself is an ordinary sorted map whose writes are
//! checked against the descriptor registry.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::sync::Arc;

use thiserror::Error;

use crate::codec::{worth_persisting, CodecError, XmlCodec};
use crate::descriptor::{AccessError, ScopeTag};
use crate::registry::{Configurable, DescriptorRegistry, RegistryError};
use crate::value::{ArrayValue, PropertyType, PropertyValue, ValueType};

/// Sorted key to value map, as produced and consumed by the codec.
pub type ValueMap = BTreeMap<String, PropertyValue>;

/// Errors produced by the configuration store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("type mismatch for '{key}': expected {expected}, got {got}")]
    TypeMismatch {
        key: String,
        expected: ValueType,
        got: ValueType,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("cannot read '{key}': {source}")]
    Access {
        key: String,
        #[source]
        source: AccessError,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// One assignment swallowed during [`ConfigurationStore::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateFailure {
    pub key: String,
    pub reason: AccessError,
}

/// Outcome of an update pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Assignments that succeeded.
    pub applied: usize,
    /// Assignments that failed; the property kept its previous value.
    pub failures: Vec<UpdateFailure>,
}

impl UpdateReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Key to value store backed by a descriptor registry.
///
/// Not meant for concurrent mutation; wrap it in a lock if it must be shared.
pub struct ConfigurationStore {
    registry: Arc<DescriptorRegistry>,
    values: ValueMap,
}

impl ConfigurationStore {
    /// Create an empty store over `registry`.
    pub fn new(registry: Arc<DescriptorRegistry>) -> Self {
        Self {
            registry,
            values: ValueMap::new(),
        }
    }

    /// Create an empty store over the process-wide registry.
    pub fn with_global_registry() -> Self {
        Self::new(DescriptorRegistry::global())
    }

    pub fn registry(&self) -> &Arc<DescriptorRegistry> {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Object binding
    // -----------------------------------------------------------------------

    /// Pull current values from `objects` into the store.
    ///
    /// Absent values remove their key, and so do values equal to their
    /// default (see [`worth_persisting`]), which keeps the store identical to
    /// what a save and reload would produce. Nothing is written unless every
    /// read succeeds.
    pub fn commit(
        &mut self,
        objects: &[&dyn Configurable],
        scope: Option<&ScopeTag>,
    ) -> Result<(), StoreError> {
        let mut staged: Vec<(String, Option<PropertyValue>)> = Vec::new();

        for object in objects {
            let set = self.registry.descriptors_of(*object)?;
            for descriptor in set.iter().filter(|d| d.in_scope(scope)) {
                let value = descriptor
                    .get_value(object.as_any())
                    .map_err(|source| StoreError::Access {
                        key: descriptor.key().to_string(),
                        source,
                    })?;
                if let Some(value) = &value {
                    if !descriptor.accepts(value) {
                        return Err(StoreError::TypeMismatch {
                            key: descriptor.key().to_string(),
                            expected: descriptor.value_type(),
                            got: value.value_type(),
                        });
                    }
                }
                let value = value.filter(|v| worth_persisting(descriptor, v));
                staged.push((descriptor.key().to_string(), value));
            }
        }

        let read = staged.len();
        for (key, value) in staged {
            match value {
                Some(value) => {
                    self.values.insert(key, value);
                }
                None => {
                    self.values.remove(&key);
                }
            }
        }
        log::debug!(
            "[store] committed {} properties from {} objects",
            read,
            objects.len()
        );
        Ok(())
    }

    /// Push stored values onto `objects`.
    ///
    /// A failed assignment is recorded in the report and the pass moves on;
    /// the property keeps whatever value it had.
    pub fn update(
        &self,
        objects: &mut [&mut dyn Configurable],
        scope: Option<&ScopeTag>,
    ) -> Result<UpdateReport, StoreError> {
        let mut report = UpdateReport::default();

        for object in objects.iter_mut() {
            let set = self.registry.descriptors_of(&**object)?;
            for descriptor in set.iter().filter(|d| d.in_scope(scope)) {
                let Some(value) = self.values.get(descriptor.key()) else {
                    continue;
                };
                match descriptor.set_value(object.as_any_mut(), value.clone()) {
                    Ok(()) => report.applied += 1,
                    Err(reason) => {
                        log::debug!(
                            "[store] skipped {} on {}: {}",
                            descriptor.key(),
                            set.type_name(),
                            reason
                        );
                        report.failures.push(UpdateFailure {
                            key: descriptor.key().to_string(),
                            reason,
                        });
                    }
                }
            }
        }

        log::debug!(
            "[store] update applied {} values, {} failed",
            report.applied,
            report.failures.len()
        );
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Map access
    // -----------------------------------------------------------------------

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    /// Typed lookup; `Ok(None)` when the key is not stored.
    pub fn get_as<T: PropertyType>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => T::from_value(value)
                .map(Some)
                .map_err(|_| StoreError::TypeMismatch {
                    key: key.to_string(),
                    expected: T::value_type(),
                    got: value.value_type(),
                }),
        }
    }

    /// Stored value, else the explicit default, else the implicit zero,
    /// else an empty value of the declared type.
    pub fn get_or_default(&self, key: &str) -> Result<PropertyValue, StoreError> {
        if let Some(value) = self.values.get(key) {
            return Ok(value.clone());
        }
        let descriptor = self
            .registry
            .descriptor(key)
            .ok_or_else(|| StoreError::UnknownKey(key.to_string()))?;
        if let Some(value) = descriptor.effective_default() {
            return Ok(value);
        }
        match descriptor.value_type() {
            ValueType::Scalar(kind) => Ok(PropertyValue::Scalar(kind.fill())),
            ValueType::Array { element, rank } => {
                let empty = ArrayValue::new(element, &vec![0; rank]).map_err(|_| {
                    StoreError::TypeMismatch {
                        key: key.to_string(),
                        expected: descriptor.value_type(),
                        got: descriptor.value_type(),
                    }
                })?;
                Ok(PropertyValue::Array(empty))
            }
        }
    }

    /// Store `value` under a registered key, returning the previous value.
    ///
    /// The store is unchanged on error.
    pub fn set(
        &mut self,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<Option<PropertyValue>, StoreError> {
        let value = value.into();
        self.check(key, &value)?;
        Ok(self.values.insert(key.to_string(), value))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.values.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &PropertyValue> {
        self.values.values()
    }

    pub fn as_map(&self) -> &ValueMap {
        &self.values
    }

    /// Insert every entry of `map`, after checking all of them.
    pub fn merge(&mut self, map: ValueMap) -> Result<(), StoreError> {
        for (key, value) in &map {
            self.check(key, value)?;
        }
        self.values.extend(map);
        Ok(())
    }

    fn check(&self, key: &str, value: &PropertyValue) -> Result<(), StoreError> {
        let descriptor = self
            .registry
            .descriptor(key)
            .ok_or_else(|| StoreError::UnknownKey(key.to_string()))?;
        if !descriptor.accepts(value) {
            return Err(StoreError::TypeMismatch {
                key: key.to_string(),
                expected: descriptor.value_type(),
                got: value.value_type(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Codec glue
    // -----------------------------------------------------------------------

    /// Serialize the store's contents to `writer`.
    pub fn save_xml<W: Write>(&self, codec: &XmlCodec, writer: W) -> Result<(), StoreError> {
        codec.serialize(&self.values, &self.registry, writer)?;
        Ok(())
    }

    /// Decode a document and merge it into the store.
    ///
    /// Decoding fills a fresh map; on any error the store is left untouched.
    pub fn load_xml<R: BufRead>(&mut self, codec: &XmlCodec, reader: R) -> Result<(), StoreError> {
        let decoded = codec.deserialize(reader, &self.registry)?;
        self.merge(decoded)
    }

    /// Build a store from a document.
    pub fn from_xml<R: BufRead>(
        registry: Arc<DescriptorRegistry>,
        codec: &XmlCodec,
        reader: R,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new(registry);
        store.load_xml(codec, reader)?;
        Ok(store)
    }
}

impl<'a> IntoIterator for &'a ConfigurationStore {
    type Item = (&'a String, &'a PropertyValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
