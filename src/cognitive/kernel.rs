//! Cognitive kernels
//!
//! A kernel is the unit other subsystems manipulate: one exclusively owned
//! tensor field, the attention weight applied to it, and a meta level.

use super::attention::{attention_matrix, meta_transform};
use crate::memory::BlockPool;
use crate::tensor::Tensor;
use crate::{CognitiveError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static NEXT_KERNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique kernel identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KernelId(u64);

impl KernelId {
    fn next() -> Self {
        Self(NEXT_KERNEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kernel-{}", self.0)
    }
}

/// Tensor field plus attention weight and meta level
#[derive(Debug)]
pub struct CognitiveKernel {
    id: KernelId,
    tensor_field: Tensor,
    attention_weight: f32,
    meta_level: i32,
}

impl CognitiveKernel {
    /// Allocate a zeroed tensor field of `shape`
    ///
    /// The attention weight is stored as given; the `[0, 1]` range is only
    /// enforced by [`update_attention`](Self::update_attention).
    pub fn create(pool: &BlockPool, shape: &[usize], attention_weight: f32) -> Result<Self> {
        let tensor_field = Tensor::zeros(pool, shape)?;
        let id = KernelId::next();
        debug!(%id, shape = %tensor_field.shape(), attention_weight, "Created cognitive kernel");

        Ok(Self {
            id,
            tensor_field,
            attention_weight,
            meta_level: 0,
        })
    }

    pub fn id(&self) -> KernelId {
        self.id
    }

    pub fn attention_weight(&self) -> f32 {
        self.attention_weight
    }

    pub fn meta_level(&self) -> i32 {
        self.meta_level
    }

    pub fn tensor_field(&self) -> &Tensor {
        &self.tensor_field
    }

    pub fn tensor_field_mut(&mut self) -> &mut Tensor {
        &mut self.tensor_field
    }

    /// Replace the attention weight
    ///
    /// # Errors
    /// `InvalidArgument` unless `0.0 <= weight <= 1.0`; the kernel is left
    /// untouched.
    pub fn update_attention(&mut self, weight: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(CognitiveError::InvalidArgument(format!(
                "attention weight must be in [0, 1], got {}",
                weight
            )));
        }
        self.attention_weight = weight;
        Ok(())
    }

    pub fn set_meta_level(&mut self, level: i32) {
        self.meta_level = level;
    }

    /// Replace the field with its attention-weighted version
    pub fn apply_attention(&mut self, pool: &BlockPool) -> Result<()> {
        self.tensor_field = attention_matrix(pool, &self.tensor_field, self.attention_weight)?;
        Ok(())
    }

    /// Replace the field with its meta-transformed version at the current level
    pub fn apply_meta_transform(&mut self, pool: &BlockPool) -> Result<()> {
        self.tensor_field = meta_transform(pool, &self.tensor_field, self.meta_level)?;
        Ok(())
    }

    /// Release the tensor field, then the kernel itself
    pub fn destroy(self) {
        debug!(id = %self.id, "Destroying cognitive kernel");
        let Self { tensor_field, .. } = self;
        drop(tensor_field);
    }

    /// [`destroy`](Self::destroy) that accepts an absent kernel
    pub fn destroy_opt(kernel: Option<Self>) {
        if let Some(kernel) = kernel {
            kernel.destroy();
        }
    }
}
