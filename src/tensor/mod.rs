//! # Dense Tensors
//!
//! Row-major `f32` arrays of up to four dimensions whose storage comes from a
//! [`BlockPool`]. A tensor owns its buffer outright: it is move-only, and
//! dropping it releases the buffer through the pool exactly once.
//!
//! Strides are carried for future non-contiguous layouts but are always the
//! contiguous row-major strides of the extents. Kernels index by extents only.
//!
//! ## Interop
//!
//! [`Tensor::to_candle`] and [`Tensor::from_candle`] copy values across the
//! boundary to `candle_core` so encoded graph snapshots can be handed to
//! downstream array code.

mod shape;

pub use shape::{Shape, MAX_DIMS};

use crate::memory::{AlignedBuffer, BlockPool, BufferOrigin};
use crate::{CognitiveError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;

/// Element type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 32-bit IEEE float, the only kind the kernels operate on
    #[default]
    F32,
}

impl DType {
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Self::F32 => mem::size_of::<f32>(),
        }
    }
}

/// Dense, contiguous, pool-backed tensor
pub struct Tensor {
    shape: Shape,
    strides: [usize; MAX_DIMS],
    dtype: DType,
    buffer: AlignedBuffer,
}

impl Tensor {
    /// Zero-filled tensor with the given extents
    pub fn zeros(pool: &BlockPool, dims: &[usize]) -> Result<Self> {
        Self::zeros_with_shape(pool, Shape::new(dims)?)
    }

    pub fn zeros_with_shape(pool: &BlockPool, shape: Shape) -> Result<Self> {
        let dtype = DType::F32;
        let bytes = shape
            .elem_count()
            .checked_mul(dtype.size_in_bytes())
            .ok_or_else(|| CognitiveError::InvalidArgument(format!("shape {} is too large", shape)))?;
        let buffer = pool.acquire(bytes)?;

        Ok(Self {
            shape,
            strides: shape.contiguous_strides(),
            dtype,
            buffer,
        })
    }

    /// Two-dimensional zero tensor
    pub fn zeros_2d(pool: &BlockPool, rows: usize, cols: usize) -> Result<Self> {
        Self::zeros(pool, &[rows, cols])
    }

    /// Tensor filled with `value`
    pub fn full(pool: &BlockPool, dims: &[usize], value: f32) -> Result<Self> {
        let mut tensor = Self::zeros(pool, dims)?;
        tensor.as_mut_slice().fill(value);
        Ok(tensor)
    }

    /// Tensor initialized from row-major `data`
    pub fn from_vec(pool: &BlockPool, dims: &[usize], data: Vec<f32>) -> Result<Self> {
        Self::from_slice(pool, dims, &data)
    }

    pub fn from_slice(pool: &BlockPool, dims: &[usize], data: &[f32]) -> Result<Self> {
        let shape = Shape::new(dims)?;
        if data.len() != shape.elem_count() {
            return Err(CognitiveError::InvalidArgument(format!(
                "shape {} needs {} elements, got {}",
                shape,
                shape.elem_count(),
                data.len()
            )));
        }
        let mut tensor = Self::zeros_with_shape(pool, shape)?;
        tensor.as_mut_slice().copy_from_slice(data);
        Ok(tensor)
    }

    /// Deep copy into a fresh buffer from `pool`
    pub fn try_clone(&self, pool: &BlockPool) -> Result<Self> {
        let mut copy = Self::zeros_with_shape(pool, self.shape)?;
        copy.as_mut_slice().copy_from_slice(self.as_slice());
        Ok(copy)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// All four extents
    pub fn dims(&self) -> [usize; MAX_DIMS] {
        self.shape.dims()
    }

    /// Row-major strides in elements (informational only)
    pub fn strides(&self) -> [usize; MAX_DIMS] {
        self.strides
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn elem_count(&self) -> usize {
        self.shape.elem_count()
    }

    /// Extent 0
    pub fn rows(&self) -> usize {
        self.shape.rows()
    }

    /// Extent 1
    pub fn cols(&self) -> usize {
        self.shape.cols()
    }

    /// Whether the storage came from a pooled block or a fallback allocation
    pub fn origin(&self) -> BufferOrigin {
        self.buffer.origin()
    }

    pub fn as_slice(&self) -> &[f32] {
        self.buffer.as_f32()
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.buffer.as_f32_mut()
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.as_slice().to_vec()
    }

    /// Value at `(row, col)` of the 2-D view
    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        let idx = self.index_2d(row, col)?;
        Ok(self.as_slice()[idx])
    }

    /// Store `value` at `(row, col)` of the 2-D view
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<()> {
        let idx = self.index_2d(row, col)?;
        self.as_mut_slice()[idx] = value;
        Ok(())
    }

    fn index_2d(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows() || col >= self.cols() {
            return Err(CognitiveError::InvalidArgument(format!(
                "index ({}, {}) out of bounds for shape {}",
                row, col, self.shape
            )));
        }
        Ok(row * self.cols() + col)
    }

    /// Require identical extents in all four dimensions
    pub fn ensure_same_shape(&self, other: &Tensor) -> Result<()> {
        if self.dims() != other.dims() {
            return Err(CognitiveError::ShapeMismatch {
                left: self.dims(),
                right: other.dims(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // candle interop
    // ========================================================================

    /// Copy into a `candle_core::Tensor` on `device`
    ///
    /// Trailing unit extents are dropped, so a `[4, 4, 1, 1]` tensor becomes
    /// a rank-2 candle tensor.
    pub fn to_candle(&self, device: &candle_core::Device) -> Result<candle_core::Tensor> {
        Ok(candle_core::Tensor::from_slice(
            self.as_slice(),
            self.shape.significant_dims(),
            device,
        )?)
    }

    /// Copy a candle tensor of rank 0 to 4 into pool-backed storage
    pub fn from_candle(pool: &BlockPool, tensor: &candle_core::Tensor) -> Result<Self> {
        let dims: Vec<usize> = match tensor.dims() {
            [] => vec![1],
            dims => dims.to_vec(),
        };
        let values = tensor
            .to_dtype(candle_core::DType::F32)?
            .flatten_all()?
            .to_vec1::<f32>()?;
        Self::from_vec(pool, &dims, values)
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("dtype", &self.dtype)
            .field("origin", &self.buffer.origin())
            .finish()
    }
}
