//! # Elementwise and Correlation Kernels
//!
//! | Function | Result | Notes |
//! |---|---|---|
//! | [`combine`] | `a ⊙ b` or `a + b` | extents must match in all 4 dims |
//! | [`mul`] / [`add`] | shorthands for [`combine`] | |
//! | [`correlate`] | clipped 2-D correlation | result has `data`'s extents |
//! | [`hyperedge_activation`] | `tanh(0.5 · (nodes + links))` | |
//!
//! Every kernel allocates its output from the pool it is given and never
//! mutates its inputs.

mod correlate;
pub mod simd;

pub use correlate::{correlate, correlate_bounded};

use crate::memory::BlockPool;
use crate::tensor::Tensor;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Binary elementwise operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementwiseOp {
    /// Hadamard product
    Mul,
    /// Elementwise sum
    Add,
}

/// Combine two tensors of identical extents
///
/// # Errors
/// [`CognitiveError::ShapeMismatch`](crate::CognitiveError::ShapeMismatch) if any of the four
/// extents differ; allocation errors from the pool.
pub fn combine(pool: &BlockPool, a: &Tensor, b: &Tensor, op: ElementwiseOp) -> Result<Tensor> {
    a.ensure_same_shape(b)?;

    let mut out = Tensor::zeros_with_shape(pool, a.shape())?;
    simd::apply(op, a.as_slice(), b.as_slice(), out.as_mut_slice());

    trace!(?op, shape = %a.shape(), "elementwise kernel");
    Ok(out)
}

/// Elementwise product
pub fn mul(pool: &BlockPool, a: &Tensor, b: &Tensor) -> Result<Tensor> {
    combine(pool, a, b, ElementwiseOp::Mul)
}

/// Elementwise sum
pub fn add(pool: &BlockPool, a: &Tensor, b: &Tensor) -> Result<Tensor> {
    combine(pool, a, b, ElementwiseOp::Add)
}

/// Squash node and link activations into one hyperedge activation
///
/// `out[i] = tanh(0.5 · (nodes[i] + links[i]))`, bounded to (-1, 1).
pub fn hyperedge_activation(pool: &BlockPool, nodes: &Tensor, links: &Tensor) -> Result<Tensor> {
    let mut out = add(pool, nodes, links)?;
    for v in out.as_mut_slice() {
        *v = (*v * 0.5).tanh();
    }
    Ok(out)
}
