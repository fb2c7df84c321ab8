// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! propstore
//!
//! Binds named, typed properties of live objects to a flat key-value store,
//! and round-trips that store through a sparse, grouped XML document.
//!
//! # Features
//!
//! - **Descriptor Registry** -- One immutable descriptor set per type, built lazily and cached
//! - **Configuration Store** -- `commit` pulls values from objects, `update` pushes them back
//! - **Sparse XML Codec** -- Writes only values that differ from their default
//! - **Arrays of any rank** -- Nested `Item{d}` elements, zero-length dimensions included
//!
//! # Architecture
//!
//! ```text
//! live objects --commit--> ConfigurationStore --XmlCodec::serialize--> bytes
//! live objects <--update-- ConfigurationStore <--XmlCodec::deserialize-- bytes
//!
//! DescriptorRegistry        (leaf: PropertySource -> DescriptorSet, cached per type)
//! +-- ConfigurationStore    (key -> PropertyValue, scope-filtered passes)
//! +-- XmlCodec              (sparse-default policy, recursive array encoding)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use propstore::{ConfigurationStore, DescriptorRegistry, PropertySource, PropertySpec, XmlCodec};
//!
//! struct Net { port: i32, hosts: Vec<String> }
//!
//! impl PropertySource for Net {
//!     fn properties() -> Vec<PropertySpec> {
//!         vec![
//!             PropertySpec::field::<Net, i32, _, _>("Net", "Port", |n| Some(n.port), |n, v| n.port = v)
//!                 .with_default(8080),
//!             PropertySpec::field::<Net, Vec<String>, _, _>(
//!                 "Net", "Hosts", |n| Some(n.hosts.clone()), |n, v| n.hosts = v,
//!             ),
//!         ]
//!     }
//! }
//!
//! let mut store = ConfigurationStore::with_global_registry();
//! store.commit(&[&net], None)?;
//! store.save_xml(&XmlCodec::default(), std::fs::File::create("net.xml")?)?;
//! ```

pub mod codec;
pub mod config;
pub mod descriptor;
pub mod registry;
pub mod store;
pub mod value;

pub use codec::{CodecError, XmlCodec};
pub use config::{CodecConfig, CodecConfigBuilder};
pub use descriptor::{
    AccessError, CandidateType, PropertyDescriptor, PropertySpec, ScopeTag, KEY_SEPARATOR,
};
pub use registry::{
    Configurable, DescriptorRegistry, DescriptorSet, PropertySource, RegistryError,
};
pub use store::{ConfigurationStore, StoreError, UpdateFailure, UpdateReport, ValueMap};
pub use value::{
    ArrayValue, PropertyType, PropertyValue, Scalar, ScalarKind, ScalarType, ValueError,
    ValueType,
};
