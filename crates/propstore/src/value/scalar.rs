// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar and property values.

use crate::value::{ArrayValue, ScalarKind, ValueType};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A single value of one of the supported scalar kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    BigInt(BigInt),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Uuid(Uuid),
    Duration(TimeDelta),
    DateTimeOffset(DateTime<FixedOffset>),
    DateTime(DateTime<Utc>),
}

impl Scalar {
    /// Kind of this scalar.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::String(_) => ScalarKind::String,
            Self::Bool(_) => ScalarKind::Bool,
            Self::I8(_) => ScalarKind::I8,
            Self::I16(_) => ScalarKind::I16,
            Self::I32(_) => ScalarKind::I32,
            Self::I64(_) => ScalarKind::I64,
            Self::U8(_) => ScalarKind::U8,
            Self::U16(_) => ScalarKind::U16,
            Self::U32(_) => ScalarKind::U32,
            Self::U64(_) => ScalarKind::U64,
            Self::BigInt(_) => ScalarKind::BigInt,
            Self::F32(_) => ScalarKind::F32,
            Self::F64(_) => ScalarKind::F64,
            Self::Decimal(_) => ScalarKind::Decimal,
            Self::Uuid(_) => ScalarKind::Uuid,
            Self::Duration(_) => ScalarKind::Duration,
            Self::DateTimeOffset(_) => ScalarKind::DateTimeOffset,
            Self::DateTime(_) => ScalarKind::DateTime,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get any signed or unsigned fixed-width integer as i128.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::I8(v) => Some(i128::from(*v)),
            Self::I16(v) => Some(i128::from(*v)),
            Self::I32(v) => Some(i128::from(*v)),
            Self::I64(v) => Some(i128::from(*v)),
            Self::U8(v) => Some(i128::from(*v)),
            Self::U16(v) => Some(i128::from(*v)),
            Self::U32(v) => Some(i128::from(*v)),
            Self::U64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// Try to get as f64 (f32 widens losslessly).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }
}

/// A property value: one scalar, or an array of them.
///
/// There is no null: an absent value is an absent store key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Scalar(Scalar),
    Array(ArrayValue),
}

impl PropertyValue {
    /// Type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Scalar(s) => ValueType::Scalar(s.kind()),
            Self::Array(a) => ValueType::Array {
                element: a.element(),
                rank: a.rank(),
            },
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Self::Array(a) => Some(a),
            Self::Scalar(_) => None,
        }
    }
}

impl From<Scalar> for PropertyValue {
    fn from(v: Scalar) -> Self {
        Self::Scalar(v)
    }
}

impl From<ArrayValue> for PropertyValue {
    fn from(v: ArrayValue) -> Self {
        Self::Array(v)
    }
}
