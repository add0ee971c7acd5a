//! Tensor extents and derived strides

use crate::{CognitiveError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of dimensions a tensor can carry
pub const MAX_DIMS: usize = 4;

/// Up to four positive extents, unused trailing extents are 1
///
/// `dims()[0]` is the outermost extent. In a 2-D view, extent 0 is the row
/// count and extent 1 the column count, so cell `(i, j)` lives at linear index
/// `i * extent1 + j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape([usize; MAX_DIMS]);

impl Shape {
    /// Build from 1 to 4 extents, all positive
    pub fn new(dims: &[usize]) -> Result<Self> {
        if dims.is_empty() || dims.len() > MAX_DIMS {
            return Err(CognitiveError::InvalidArgument(format!(
                "tensor needs 1 to {} extents, got {}",
                MAX_DIMS,
                dims.len()
            )));
        }
        if let Some(pos) = dims.iter().position(|&d| d == 0) {
            return Err(CognitiveError::InvalidArgument(format!(
                "extent {} must be positive (shape {:?})",
                pos, dims
            )));
        }

        let mut extents = [1usize; MAX_DIMS];
        extents[..dims.len()].copy_from_slice(dims);
        if extents.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)).is_none() {
            return Err(CognitiveError::InvalidArgument(format!(
                "shape {:?} overflows the element count",
                dims
            )));
        }
        Ok(Self(extents))
    }

    /// Two-dimensional `rows × cols`
    pub fn matrix(rows: usize, cols: usize) -> Result<Self> {
        Self::new(&[rows, cols])
    }

    /// All four extents
    pub fn dims(&self) -> [usize; MAX_DIMS] {
        self.0
    }

    /// Extents up to the last one that is not 1 (at least one)
    pub fn significant_dims(&self) -> &[usize] {
        let rank = self.0.iter().rposition(|&d| d != 1).map_or(1, |p| p + 1);
        &self.0[..rank]
    }

    pub fn extent(&self, axis: usize) -> usize {
        self.0.get(axis).copied().unwrap_or(1)
    }

    /// Extent 0
    pub fn rows(&self) -> usize {
        self.0[0]
    }

    /// Extent 1
    pub fn cols(&self) -> usize {
        self.0[1]
    }

    pub fn elem_count(&self) -> usize {
        self.0.iter().product()
    }

    /// Contiguous row-major strides, in elements
    pub fn contiguous_strides(&self) -> [usize; MAX_DIMS] {
        let mut strides = [1usize; MAX_DIMS];
        for axis in (0..MAX_DIMS - 1).rev() {
            strides[axis] = strides[axis + 1] * self.0[axis + 1];
        }
        strides
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.significant_dims().iter().map(|d| d.to_string()).collect();
        write!(f, "[{}]", dims.join("×"))
    }
}
