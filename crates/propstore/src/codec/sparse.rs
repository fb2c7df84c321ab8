// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sparse-default policy: which values are worth writing.

use crate::descriptor::PropertyDescriptor;
use crate::value::{PropertyValue, Scalar};

/// Whether `value` must be written for `descriptor`.
///
/// - explicit default set: write iff the value differs from it;
/// - otherwise, type with an implicit zero: write iff the value differs from it;
/// - otherwise, arrays: write iff not every extent is zero;
/// - otherwise (strings without a default): always write.
///
/// Anything not written reads back as an absent key.
pub fn worth_persisting(descriptor: &PropertyDescriptor, value: &PropertyValue) -> bool {
    if let Some(default) = descriptor.default_value() {
        return !same_value(value, default);
    }
    match (descriptor.value_type().implicit_default(), value) {
        (Some(zero), PropertyValue::Scalar(scalar)) => !same_scalar(scalar, &zero),
        (None, PropertyValue::Array(array)) => !array.is_empty(),
        _ => true,
    }
}

/// Equality that also tells offsets apart; chrono compares instants only.
fn same_scalar(a: &Scalar, b: &Scalar) -> bool {
    match (a, b) {
        (Scalar::DateTimeOffset(x), Scalar::DateTimeOffset(y)) => {
            x == y && x.offset() == y.offset()
        }
        _ => a == b,
    }
}

fn same_value(a: &PropertyValue, b: &PropertyValue) -> bool {
    match (a, b) {
        (PropertyValue::Scalar(x), PropertyValue::Scalar(y)) => same_scalar(x, y),
        (PropertyValue::Array(x), PropertyValue::Array(y)) => {
            x.element() == y.element()
                && x.shape() == y.shape()
                && x.iter().zip(y.iter()).all(|(p, q)| same_scalar(p, q))
        }
        _ => false,
    }
}
