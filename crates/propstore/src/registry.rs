// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-type descriptor sets, built lazily and cached for the process lifetime.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use thiserror::Error;

use crate::descriptor::{
    compose_key, CandidateType, PropertyDescriptor, PropertySpec, KEY_SEPARATOR,
};
use crate::value::ValueType;

static GLOBAL_REGISTRY: OnceLock<Arc<DescriptorRegistry>> = OnceLock::new();

// ---------------------------------------------------------------------------
// PropertySource / Configurable
// ---------------------------------------------------------------------------

/// Implemented by types whose properties can be committed and updated.
pub trait PropertySource: 'static {
    /// Candidate properties, in declaration order.
    fn properties() -> Vec<PropertySpec>;
}

/// Object-safe view of a [`PropertySource`], for heterogeneous object lists.
pub trait Configurable: Any {
    fn type_name(&self) -> &'static str;

    fn property_type_id(&self) -> TypeId;

    fn property_specs(&self) -> Vec<PropertySpec>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: PropertySource> Configurable for T {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn property_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn property_specs(&self) -> Vec<PropertySpec> {
        T::properties()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Errors produced while building a type's descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The property is not readable and writable, or its type is outside the
    /// supported closure.
    #[error("unsupported property {type_name}::{property}: {reason}")]
    UnsupportedProperty {
        type_name: String,
        property: String,
        reason: String,
    },

    /// The key, or its `Category.Name` address, is already taken.
    #[error("duplicate key '{key}' in {type_name}")]
    DuplicateKey { type_name: String, key: String },

    #[error("invalid name for {type_name}::{property}: {reason}")]
    InvalidName {
        type_name: String,
        property: String,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// DescriptorSet
// ---------------------------------------------------------------------------

/// Ordered descriptors of one type.
#[derive(Debug)]
pub struct DescriptorSet {
    type_name: &'static str,
    descriptors: Vec<Arc<PropertyDescriptor>>,
    index: HashMap<String, usize>,
}

impl DescriptorSet {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> &[Arc<PropertyDescriptor>] {
        &self.descriptors
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PropertyDescriptor>> {
        self.descriptors.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Arc<PropertyDescriptor>> {
        self.index.get(key).map(|&i| &self.descriptors[i])
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DescriptorRegistry
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RegistryState {
    sets: HashMap<TypeId, Arc<DescriptorSet>>,
    by_key: HashMap<String, Arc<PropertyDescriptor>>,
    by_address: HashMap<(String, String), Arc<PropertyDescriptor>>,
    ordered: Vec<Arc<PropertyDescriptor>>,
}

/// Append-only cache of descriptor sets, keyed by type.
///
/// Sets are immutable once built; a failed build caches nothing.
#[derive(Default)]
pub struct DescriptorRegistry {
    state: RwLock<RegistryState>,
}

impl DescriptorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> Arc<DescriptorRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(DescriptorRegistry::new()))
            .clone()
    }

    /// Descriptor set of `T`, building it on first use.
    pub fn register<T: PropertySource>(&self) -> Result<Arc<DescriptorSet>, RegistryError> {
        self.register_specs(TypeId::of::<T>(), std::any::type_name::<T>(), T::properties)
    }

    /// Alias of [`register`](Self::register).
    pub fn descriptors_for<T: PropertySource>(&self) -> Result<Arc<DescriptorSet>, RegistryError> {
        self.register::<T>()
    }

    /// Descriptor set of a type-erased object.
    pub fn descriptors_of(
        &self,
        object: &dyn Configurable,
    ) -> Result<Arc<DescriptorSet>, RegistryError> {
        self.register_specs(object.property_type_id(), object.type_name(), || {
            object.property_specs()
        })
    }

    /// Look a descriptor up by key.
    pub fn descriptor(&self, key: &str) -> Option<Arc<PropertyDescriptor>> {
        self.state.read().by_key.get(key).cloned()
    }

    /// Look a descriptor up by `(category, name)`.
    pub fn by_address(&self, category: &str, name: &str) -> Option<Arc<PropertyDescriptor>> {
        self.state
            .read()
            .by_address
            .get(&(category.to_string(), name.to_string()))
            .cloned()
    }

    /// Every registered descriptor, in registration order.
    pub fn descriptors(&self) -> Vec<Arc<PropertyDescriptor>> {
        self.state.read().ordered.clone()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.state.read().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().ordered.is_empty()
    }

    pub fn is_registered<T: PropertySource>(&self) -> bool {
        self.state.read().sets.contains_key(&TypeId::of::<T>())
    }

    fn register_specs(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        specs: impl FnOnce() -> Vec<PropertySpec>,
    ) -> Result<Arc<DescriptorSet>, RegistryError> {
        if let Some(set) = self.state.read().sets.get(&type_id) {
            return Ok(Arc::clone(set));
        }

        let set = build_set(type_name, specs())?;

        let mut state = self.state.write();
        if let Some(set) = state.sets.get(&type_id) {
            return Ok(Arc::clone(set));
        }

        // Validate against other types before touching any index.
        let mut fresh = Vec::new();
        for descriptor in &set.descriptors {
            let address = (
                descriptor.category().to_string(),
                descriptor.name().to_string(),
            );
            let existing = state
                .by_key
                .get(descriptor.key())
                .or_else(|| state.by_address.get(&address));
            match existing {
                Some(other) if other.is_same_inherited(descriptor) => {}
                Some(_) => {
                    return Err(RegistryError::DuplicateKey {
                        type_name: type_name.to_string(),
                        key: descriptor.key().to_string(),
                    });
                }
                None => fresh.push((address, Arc::clone(descriptor))),
            }
        }

        for (address, descriptor) in fresh {
            state
                .by_key
                .insert(descriptor.key().to_string(), Arc::clone(&descriptor));
            state.by_address.insert(address, Arc::clone(&descriptor));
            state.ordered.push(descriptor);
        }

        let set = Arc::new(set);
        state.sets.insert(type_id, Arc::clone(&set));
        log::debug!(
            "[registry] built {} descriptors for {}",
            set.len(),
            type_name
        );
        Ok(set)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn build_set(
    type_name: &'static str,
    specs: Vec<PropertySpec>,
) -> Result<DescriptorSet, RegistryError> {
    let mut descriptors = Vec::with_capacity(specs.len());
    let mut index = HashMap::with_capacity(specs.len());
    let mut addresses = HashSet::with_capacity(specs.len());

    for spec in specs {
        let descriptor = validate(type_name, spec)?;
        let address = (
            descriptor.category().to_string(),
            descriptor.name().to_string(),
        );
        if index.contains_key(descriptor.key()) || !addresses.insert(address) {
            return Err(RegistryError::DuplicateKey {
                type_name: type_name.to_string(),
                key: descriptor.key().to_string(),
            });
        }
        index.insert(descriptor.key().to_string(), descriptors.len());
        descriptors.push(Arc::new(descriptor));
    }

    Ok(DescriptorSet {
        type_name,
        descriptors,
        index,
    })
}

fn validate(type_name: &str, spec: PropertySpec) -> Result<PropertyDescriptor, RegistryError> {
    let unsupported = |spec: &PropertySpec, reason: String| RegistryError::UnsupportedProperty {
        type_name: type_name.to_string(),
        property: compose_key(spec.declaring_type.as_deref(), &spec.category, &spec.name),
        reason,
    };

    check_segment(type_name, &spec, "category", &spec.category)?;
    check_segment(type_name, &spec, "name", &spec.name)?;
    if let Some(declaring) = &spec.declaring_type {
        check_segment(type_name, &spec, "declaring type", declaring)?;
    }
    if !is_xml_name(&spec.name) {
        return Err(RegistryError::InvalidName {
            type_name: type_name.to_string(),
            property: spec.name.clone(),
            reason: "not a valid XML element name".to_string(),
        });
    }

    let value_type = match &spec.value_type {
        CandidateType::Supported(ValueType::Array { rank: 0, .. }) => {
            return Err(unsupported(&spec, "array rank must be at least 1".to_string()));
        }
        CandidateType::Supported(t) => *t,
        CandidateType::Foreign(name) => {
            return Err(unsupported(&spec, format!("type {} is not supported", name)));
        }
    };

    let Some(getter) = spec.getter.clone() else {
        return Err(unsupported(&spec, "not readable".to_string()));
    };
    let Some(setter) = spec.setter.clone() else {
        return Err(unsupported(&spec, "not writable".to_string()));
    };

    if let Some(default) = &spec.default_value {
        let default_type = default.value_type();
        if default_type != value_type {
            return Err(unsupported(
                &spec,
                format!("default has type {}, expected {}", default_type, value_type),
            ));
        }
    }

    Ok(PropertyDescriptor::from_validated(
        spec, value_type, getter, setter,
    ))
}

fn check_segment(
    type_name: &str,
    spec: &PropertySpec,
    what: &str,
    segment: &str,
) -> Result<(), RegistryError> {
    let reason = if segment.is_empty() {
        format!("{} is empty", what)
    } else if segment.contains(KEY_SEPARATOR) {
        format!("{} '{}' contains '{}'", what, segment, KEY_SEPARATOR)
    } else {
        return Ok(());
    };
    Err(RegistryError::InvalidName {
        type_name: type_name.to_string(),
        property: spec.name.clone(),
        reason,
    })
}

/// Conservative XML element name: a letter or `_`, then letters, digits, `_` or `-`.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
