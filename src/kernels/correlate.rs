//! Clipped 2-D pattern correlation
//!
//! ```text
//! out[i, j] = Σ  pattern[pi, pj] · data[i + pi, j + pj]
//!           (pi, pj) with i + pi < rows(data), j + pj < cols(data)
//! ```
//!
//! Offsets that leave `data` contribute nothing (zero padding, no wraparound).
//! Cost is `rows·cols·prows·pcols` multiply-adds, so patterns must stay small.
//! Both inputs must be matrices: extents past the second must be 1.

use crate::memory::BlockPool;
use crate::tensor::Tensor;
use crate::{CognitiveError, Result};
use tracing::trace;

fn ensure_matrix(name: &str, tensor: &Tensor) -> Result<()> {
    let dims = tensor.dims();
    if dims[2] != 1 || dims[3] != 1 {
        return Err(CognitiveError::InvalidArgument(format!(
            "{} {} must be 2-D for correlation",
            name,
            tensor.shape()
        )));
    }
    Ok(())
}

/// Correlate `pattern` against every position of `data`
///
/// # Errors
/// `InvalidArgument` if either input has an extent other than 1 past its
/// second dimension.
pub fn correlate(pool: &BlockPool, pattern: &Tensor, data: &Tensor) -> Result<Tensor> {
    ensure_matrix("pattern", pattern)?;
    ensure_matrix("data", data)?;
    let (rows, cols) = (data.rows(), data.cols());
    let (prows, pcols) = (pattern.rows(), pattern.cols());

    let mut out = Tensor::zeros_with_shape(pool, data.shape())?;
    let p = pattern.as_slice();
    let d = data.as_slice();
    let o = out.as_mut_slice();

    for i in 0..rows {
        let row_span = prows.min(rows - i);
        for j in 0..cols {
            let col_span = pcols.min(cols - j);
            let mut acc = 0.0f32;
            for pi in 0..row_span {
                let p_row = &p[pi * pcols..pi * pcols + col_span];
                let d_row = &d[(i + pi) * cols + j..(i + pi) * cols + j + col_span];
                for (pv, dv) in p_row.iter().zip(d_row) {
                    acc += pv * dv;
                }
            }
            o[i * cols + j] = acc;
        }
    }

    trace!(pattern = %pattern.shape(), data = %data.shape(), "correlation kernel");
    Ok(out)
}

/// [`correlate`] with an upper bound on the pattern's element count
pub fn correlate_bounded(
    pool: &BlockPool,
    pattern: &Tensor,
    data: &Tensor,
    max_pattern_elems: usize,
) -> Result<Tensor> {
    let pattern_elems = pattern.rows() * pattern.cols();
    if pattern_elems > max_pattern_elems {
        return Err(CognitiveError::InvalidArgument(format!(
            "pattern {} has {} cells, limit is {}",
            pattern.shape(),
            pattern_elems,
            max_pattern_elems
        )));
    }
    correlate(pool, pattern, data)
}
