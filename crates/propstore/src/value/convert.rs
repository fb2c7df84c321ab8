// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed conversions between Rust values and [`PropertyValue`].
//!
//! [`ScalarType`] covers the Rust types that map onto one [`ScalarKind`];
//! [`PropertyType`] covers everything a typed property accessor may carry:
//! scalars, `Vec<T>` (rank 1) and `ndarray` arrays of fixed rank 1 to 6.

use crate::value::{ArrayValue, PropertyValue, Scalar, ScalarKind, ValueError, ValueType};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use ndarray::{Array, Array1, ArrayD, Ix1, Ix2, Ix3, Ix4, Ix5, Ix6, IxDyn};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Rust type that maps onto exactly one scalar kind.
pub trait ScalarType: Clone + Sized {
    const KIND: ScalarKind;

    fn into_scalar(self) -> Scalar;

    fn from_scalar(scalar: &Scalar) -> Result<Self, ValueError>;
}

/// Rust type a typed property accessor may produce or consume.
pub trait PropertyType: Sized {
    /// Declared type of properties of this Rust type.
    fn value_type() -> ValueType;

    fn into_value(self) -> PropertyValue;

    fn from_value(value: &PropertyValue) -> Result<Self, ValueError>;
}

macro_rules! impl_scalar_type {
    ($ty:ty, $variant:ident) => {
        impl ScalarType for $ty {
            const KIND: ScalarKind = ScalarKind::$variant;

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            #[allow(clippy::clone_on_copy)]
            fn from_scalar(scalar: &Scalar) -> Result<Self, ValueError> {
                match scalar {
                    Scalar::$variant(v) => Ok(v.clone()),
                    other => Err(ValueError::KindMismatch {
                        expected: ScalarKind::$variant,
                        got: other.kind(),
                    }),
                }
            }
        }

        impl PropertyType for $ty {
            fn value_type() -> ValueType {
                ValueType::Scalar(ScalarKind::$variant)
            }

            fn into_value(self) -> PropertyValue {
                PropertyValue::Scalar(self.into_scalar())
            }

            fn from_value(value: &PropertyValue) -> Result<Self, ValueError> {
                match value {
                    PropertyValue::Scalar(s) => Self::from_scalar(s),
                    other => Err(ValueError::TypeMismatch {
                        expected: Self::value_type(),
                        got: other.value_type(),
                    }),
                }
            }
        }

        impl From<$ty> for PropertyValue {
            fn from(value: $ty) -> Self {
                value.into_value()
            }
        }
    };
}

impl_scalar_type!(String, String);
impl_scalar_type!(bool, Bool);
impl_scalar_type!(i8, I8);
impl_scalar_type!(i16, I16);
impl_scalar_type!(i32, I32);
impl_scalar_type!(i64, I64);
impl_scalar_type!(u8, U8);
impl_scalar_type!(u16, U16);
impl_scalar_type!(u32, U32);
impl_scalar_type!(u64, U64);
impl_scalar_type!(BigInt, BigInt);
impl_scalar_type!(f32, F32);
impl_scalar_type!(f64, F64);
impl_scalar_type!(Decimal, Decimal);
impl_scalar_type!(Uuid, Uuid);
impl_scalar_type!(TimeDelta, Duration);
impl_scalar_type!(DateTime<FixedOffset>, DateTimeOffset);
impl_scalar_type!(DateTime<Utc>, DateTime);

/// Check that `value` is an array of `T` with the expected rank.
fn expect_array<T: ScalarType>(
    value: &PropertyValue,
    rank: Option<usize>,
) -> Result<&ArrayValue, ValueError> {
    let mismatch = || ValueError::TypeMismatch {
        expected: ValueType::Array {
            element: T::KIND,
            rank: rank.unwrap_or(0),
        },
        got: value.value_type(),
    };
    let arr = value.as_array().ok_or_else(mismatch)?;
    if arr.element() != T::KIND || rank.is_some_and(|r| r != arr.rank()) {
        return Err(mismatch());
    }
    Ok(arr)
}

impl<T: ScalarType> PropertyType for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::vector(T::KIND)
    }

    fn into_value(self) -> PropertyValue {
        let data = Array1::from(self).mapv(T::into_scalar).into_dyn();
        PropertyValue::Array(ArrayValue::from_parts(T::KIND, data))
    }

    fn from_value(value: &PropertyValue) -> Result<Self, ValueError> {
        expect_array::<T>(value, Some(1))?
            .iter()
            .map(T::from_scalar)
            .collect()
    }
}

/// Fixed-rank `ndarray` arrays. Rank 0 (`Ix0`) and dynamic rank (`IxDyn`)
/// have no counterpart, since every array property has rank 1 or more.
macro_rules! impl_ndarray_type {
    ($($dim:ty => $rank:expr),* $(,)?) => {$(
        impl<T: ScalarType> PropertyType for Array<T, $dim> {
            fn value_type() -> ValueType {
                ValueType::Array {
                    element: T::KIND,
                    rank: $rank,
                }
            }

            fn into_value(self) -> PropertyValue {
                let data = self.mapv(T::into_scalar).into_dyn();
                PropertyValue::Array(ArrayValue::from_parts(T::KIND, data))
            }

            fn from_value(value: &PropertyValue) -> Result<Self, ValueError> {
                let arr = expect_array::<T>(value, Some($rank))?;
                let elements = arr.iter().map(T::from_scalar).collect::<Result<Vec<_>, _>>()?;
                ArrayD::from_shape_vec(IxDyn(arr.shape()), elements)
                    .and_then(|a| a.into_dimensionality::<$dim>())
                    .map_err(|e| ValueError::Shape(e.to_string()))
            }
        }
    )*};
}

impl_ndarray_type!(Ix1 => 1, Ix2 => 2, Ix3 => 3, Ix4 => 4, Ix5 => 5, Ix6 => 6);
