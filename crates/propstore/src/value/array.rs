// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rectangular arrays of any rank over the scalar set.

use crate::value::{Scalar, ScalarKind, ValueError};
use ndarray::{ArrayD, IxDyn};

/// Array value with a fixed element kind and rank >= 1.
///
/// Elements are stored row-major in an [`ndarray::ArrayD`]; every element has
/// the array's element kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    element: ScalarKind,
    data: ArrayD<Scalar>,
}

impl ArrayValue {
    /// Create an array of the given shape, filled with the element kind's fill value.
    pub fn new(element: ScalarKind, shape: &[usize]) -> Result<Self, ValueError> {
        if shape.is_empty() {
            return Err(ValueError::ZeroRank);
        }
        Ok(Self {
            element,
            data: ArrayD::from_elem(IxDyn(shape), element.fill()),
        })
    }

    /// Create an array from row-major elements.
    pub fn from_shape_vec(
        element: ScalarKind,
        shape: &[usize],
        elements: Vec<Scalar>,
    ) -> Result<Self, ValueError> {
        if shape.is_empty() {
            return Err(ValueError::ZeroRank);
        }
        if let Some(bad) = elements.iter().find(|s| s.kind() != element) {
            return Err(ValueError::KindMismatch {
                expected: element,
                got: bad.kind(),
            });
        }
        let data = ArrayD::from_shape_vec(IxDyn(shape), elements)
            .map_err(|e| ValueError::Shape(e.to_string()))?;
        Ok(Self { element, data })
    }

    /// Create a rank-1 array.
    pub fn from_scalars(element: ScalarKind, elements: Vec<Scalar>) -> Result<Self, ValueError> {
        let len = elements.len();
        Self::from_shape_vec(element, &[len], elements)
    }

    /// Wrap an existing ndarray, validating element kinds.
    pub fn from_ndarray(element: ScalarKind, data: ArrayD<Scalar>) -> Result<Self, ValueError> {
        if data.ndim() == 0 {
            return Err(ValueError::ZeroRank);
        }
        if let Some(bad) = data.iter().find(|s| s.kind() != element) {
            return Err(ValueError::KindMismatch {
                expected: element,
                got: bad.kind(),
            });
        }
        Ok(Self { element, data })
    }

    /// Caller guarantees rank 1 or more and that every element has kind `element`.
    pub(crate) fn from_parts(element: ScalarKind, data: ArrayD<Scalar>) -> Self {
        debug_assert!(data.ndim() > 0);
        Self { element, data }
    }

    pub fn element(&self) -> ScalarKind {
        self.element
    }

    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    /// Per-dimension extents.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Total number of elements (product of extents).
    pub fn element_count(&self) -> usize {
        self.data.len()
    }

    /// True when every dimension has zero extent.
    ///
    /// A `[2, 0]` array holds no elements but still carries shape
    /// information, so it is not empty in this sense.
    pub fn is_empty(&self) -> bool {
        self.shape().iter().all(|&extent| extent == 0)
    }

    /// Element at a multi-index.
    pub fn get(&self, index: &[usize]) -> Option<&Scalar> {
        if index.len() != self.rank() {
            return None;
        }
        self.data.get(index)
    }

    /// Replace the element at a multi-index.
    pub fn set(&mut self, index: &[usize], value: Scalar) -> Result<(), ValueError> {
        if value.kind() != self.element {
            return Err(ValueError::KindMismatch {
                expected: self.element,
                got: value.kind(),
            });
        }
        let shape = self.shape().to_vec();
        let slot = if index.len() == shape.len() {
            self.data.get_mut(index)
        } else {
            None
        };
        match slot {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ValueError::IndexOutOfBounds {
                index: index.to_vec(),
                shape,
            }),
        }
    }

    /// Elements in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Scalar> {
        self.data.iter()
    }

    /// Underlying ndarray.
    pub fn as_ndarray(&self) -> &ArrayD<Scalar> {
        &self.data
    }

    pub fn into_ndarray(self) -> ArrayD<Scalar> {
        self.data
    }
}
