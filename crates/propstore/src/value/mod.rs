// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property Values
//!
//! The closed set of value types a property may carry.
//!
//! # Features
//!
//! - **ScalarKind / ValueType**: Runtime type description (18 scalar kinds, arrays of any rank)
//! - **Scalar / PropertyValue**: Owned values, never null
//! - **ArrayValue**: Rectangular n-d arrays backed by `ndarray`
//! - **ScalarType / PropertyType**: Typed conversions for accessors and store lookups
//!
//! # Example
//!
//! ```rust,ignore
//! use propstore::value::{PropertyType, ValueType, ScalarKind};
//!
//! let hosts = vec!["a".to_string(), "b".to_string()].into_value();
//! assert_eq!(hosts.value_type(), ValueType::vector(ScalarKind::String));
//! let back: Vec<String> = Vec::from_value(&hosts)?;
//! ```

mod array;
mod convert;
mod kind;
mod scalar;

pub use array::ArrayValue;
pub use convert::{PropertyType, ScalarType};
pub use kind::{ScalarKind, ValueType};
pub use scalar::{PropertyValue, Scalar};

use thiserror::Error;

/// Errors for value conversion and array manipulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: ValueType, got: ValueType },

    #[error("element kind mismatch: expected {expected}, got {got}")]
    KindMismatch { expected: ScalarKind, got: ScalarKind },

    #[error("arrays must have rank >= 1")]
    ZeroRank,

    #[error("invalid array shape: {0}")]
    Shape(String),

    #[error("index {index:?} out of bounds for shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },
}
