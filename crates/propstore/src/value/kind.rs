// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value type descriptions: the closed scalar set and arrays over it.

use crate::value::Scalar;
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// Scalar kinds a property (or an array element) may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    BigInt,
    F32,
    F64,
    Decimal,
    Uuid,
    Duration,
    DateTimeOffset,
    DateTime,
}

impl ScalarKind {
    /// Every supported kind, in declaration order.
    pub const ALL: [ScalarKind; 18] = [
        Self::String,
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::BigInt,
        Self::F32,
        Self::F64,
        Self::Decimal,
        Self::Uuid,
        Self::Duration,
        Self::DateTimeOffset,
        Self::DateTime,
    ];

    /// Name written to the `Type` attribute of array elements.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::BigInt => "bigint",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::Decimal => "decimal",
            Self::Uuid => "uuid",
            Self::Duration => "duration",
            Self::DateTimeOffset => "datetimeoffset",
            Self::DateTime => "datetime",
        }
    }

    /// Inverse of [`type_name`](Self::type_name). Names are case-sensitive.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.type_name() == name)
    }

    /// Value used to pre-fill freshly shaped arrays.
    pub fn fill(&self) -> Scalar {
        match self {
            Self::String => Scalar::String(String::new()),
            Self::Bool => Scalar::Bool(false),
            Self::I8 => Scalar::I8(0),
            Self::I16 => Scalar::I16(0),
            Self::I32 => Scalar::I32(0),
            Self::I64 => Scalar::I64(0),
            Self::U8 => Scalar::U8(0),
            Self::U16 => Scalar::U16(0),
            Self::U32 => Scalar::U32(0),
            Self::U64 => Scalar::U64(0),
            Self::BigInt => Scalar::BigInt(BigInt::default()),
            Self::F32 => Scalar::F32(0.0),
            Self::F64 => Scalar::F64(0.0),
            Self::Decimal => Scalar::Decimal(Decimal::ZERO),
            Self::Uuid => Scalar::Uuid(Uuid::nil()),
            Self::Duration => Scalar::Duration(TimeDelta::zero()),
            Self::DateTimeOffset => Scalar::DateTimeOffset(DateTime::<FixedOffset>::default()),
            Self::DateTime => Scalar::DateTime(DateTime::<Utc>::default()),
        }
    }

    /// The implicit zero of this kind, if it has one.
    ///
    /// Strings have none: an empty string is a real, persistable value.
    pub fn implicit_default(&self) -> Option<Scalar> {
        match self {
            Self::String => None,
            other => Some(other.fill()),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A single scalar.
    Scalar(ScalarKind),
    /// A rectangular array of `rank` dimensions.
    Array { element: ScalarKind, rank: usize },
}

impl ValueType {
    /// Shorthand for a rank-1 array type.
    pub fn vector(element: ScalarKind) -> Self {
        Self::Array { element, rank: 1 }
    }

    /// Scalar kind of the value, or of its elements for arrays.
    pub fn element_kind(&self) -> ScalarKind {
        match self {
            Self::Scalar(kind) | Self::Array { element: kind, .. } => *kind,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array { .. })
    }

    /// Array rank, or `None` for scalars.
    pub fn rank(&self) -> Option<usize> {
        match self {
            Self::Array { rank, .. } => Some(*rank),
            Self::Scalar(_) => None,
        }
    }

    /// Implicit zero of the type. Arrays never have one.
    pub fn implicit_default(&self) -> Option<Scalar> {
        match self {
            Self::Scalar(kind) => kind.implicit_default(),
            Self::Array { .. } => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{}", kind),
            Self::Array { element, rank } => {
                write!(f, "{}[{}]", element, ",".repeat(rank.saturating_sub(1)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_round_trip() {
        for kind in ScalarKind::ALL {
            assert_eq!(ScalarKind::from_type_name(kind.type_name()), Some(kind));
        }
        assert_eq!(ScalarKind::from_type_name("String"), None);
        assert_eq!(ScalarKind::from_type_name("complex"), None);
    }

    #[test]
    fn test_implicit_defaults() {
        assert_eq!(ScalarKind::I32.implicit_default(), Some(Scalar::I32(0)));
        assert_eq!(ScalarKind::Bool.implicit_default(), Some(Scalar::Bool(false)));
        assert!(ScalarKind::String.implicit_default().is_none());
        assert!(ValueType::vector(ScalarKind::I32).implicit_default().is_none());
    }

    #[test]
    fn test_value_type_display() {
        assert_eq!(ValueType::Scalar(ScalarKind::I32).to_string(), "int32");
        assert_eq!(ValueType::vector(ScalarKind::String).to_string(), "string[]");
        let matrix = ValueType::Array {
            element: ScalarKind::F64,
            rank: 2,
        };
        assert_eq!(matrix.to_string(), "float64[,]");
        assert_eq!(matrix.rank(), Some(2));
        assert_eq!(matrix.element_kind(), ScalarKind::F64);
    }
}
