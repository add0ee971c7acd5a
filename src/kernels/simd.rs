//! Vectorized elementwise loops
//!
//! Elements are processed in groups of [`LANES`] and the tail is finished by
//! the scalar loop. Every path computes each output element with one IEEE
//! multiply or add, so all paths agree bit for bit with strict sequential
//! evaluation.
//!
//! Path selection happens once per process:
//! - AVX on x86_64 when the CPU reports it
//! - a portable fixed-width lane loop elsewhere
//! - plain scalar when `COGNITIVE_FORCE_SCALAR` is set

use super::ElementwiseOp;
use std::sync::OnceLock;
use tracing::debug;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// Group width of the vectorized path (one 256-bit register of f32)
pub const LANES: usize = 8;

/// Implementation chosen for the grouped part of a loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorPath {
    /// 256-bit AVX intrinsics
    Avx,
    /// Fixed-width chunks the compiler is free to vectorize
    Portable,
    /// One element at a time
    Scalar,
}

static VECTOR_PATH: OnceLock<VectorPath> = OnceLock::new();

/// Path used by [`apply`], detected on first use
pub fn vector_path() -> VectorPath {
    *VECTOR_PATH.get_or_init(|| {
        let path = if crate::config::scalar_forced() {
            VectorPath::Scalar
        } else {
            detect()
        };
        debug!(?path, "Selected elementwise kernel path");
        path
    })
}

#[cfg(target_arch = "x86_64")]
fn detect() -> VectorPath {
    if is_x86_feature_detected!("avx") {
        VectorPath::Avx
    } else {
        VectorPath::Portable
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn detect() -> VectorPath {
    VectorPath::Portable
}

/// `out[i] = op(a[i], b[i])` for every index of `out`
///
/// # Panics
/// If the three slices differ in length. Callers check shapes first.
pub fn apply(op: ElementwiseOp, a: &[f32], b: &[f32], out: &mut [f32]) {
    assert!(
        a.len() == out.len() && b.len() == out.len(),
        "elementwise operands must have equal length"
    );

    let n = out.len();
    let grouped = n - n % LANES;

    if grouped > 0 {
        let (ga, gb, gout) = (&a[..grouped], &b[..grouped], &mut out[..grouped]);
        match vector_path() {
            #[cfg(target_arch = "x86_64")]
            VectorPath::Avx => {
                // SAFETY: AVX support was confirmed by `detect`.
                unsafe { apply_avx(op, ga, gb, gout) }
            }
            VectorPath::Scalar => apply_scalar(op, ga, gb, gout),
            _ => apply_lanes(op, ga, gb, gout),
        }
    }

    apply_scalar(op, &a[grouped..], &b[grouped..], &mut out[grouped..]);
}

#[inline]
fn combine_one(op: ElementwiseOp, x: f32, y: f32) -> f32 {
    match op {
        ElementwiseOp::Mul => x * y,
        ElementwiseOp::Add => x + y,
    }
}

pub(crate) fn apply_scalar(op: ElementwiseOp, a: &[f32], b: &[f32], out: &mut [f32]) {
    for i in 0..out.len() {
        out[i] = combine_one(op, a[i], b[i]);
    }
}

pub(crate) fn apply_lanes(op: ElementwiseOp, a: &[f32], b: &[f32], out: &mut [f32]) {
    let chunks = out
        .chunks_exact_mut(LANES)
        .zip(a.chunks_exact(LANES).zip(b.chunks_exact(LANES)));
    for (o, (x, y)) in chunks {
        for lane in 0..LANES {
            o[lane] = combine_one(op, x[lane], y[lane]);
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx")]
unsafe fn apply_avx(op: ElementwiseOp, a: &[f32], b: &[f32], out: &mut [f32]) {
    let n = out.len();
    let (pa, pb, po) = (a.as_ptr(), b.as_ptr(), out.as_mut_ptr());

    let mut i = 0;
    while i + LANES <= n {
        let va = _mm256_loadu_ps(pa.add(i));
        let vb = _mm256_loadu_ps(pb.add(i));
        let vr = match op {
            ElementwiseOp::Mul => _mm256_mul_ps(va, vb),
            ElementwiseOp::Add => _mm256_add_ps(va, vb),
        };
        _mm256_storeu_ps(po.add(i), vr);
        i += LANES;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(n: usize) -> (Vec<f32>, Vec<f32>) {
        let a = (0..n).map(|i| (i as f32 * 0.37).sin() * 3.0 + 0.01).collect();
        let b = (0..n).map(|i| (i as f32 * 1.13).cos() - 0.5).collect();
        (a, b)
    }

    fn reference(op: ElementwiseOp, a: &[f32], b: &[f32]) -> Vec<f32> {
        a.iter().zip(b).map(|(&x, &y)| combine_one(op, x, y)).collect()
    }

    #[test]
    fn test_dispatch_matches_sequential_for_all_remainders() {
        for op in [ElementwiseOp::Mul, ElementwiseOp::Add] {
            for n in 0..=37 {
                let (a, b) = inputs(n);
                let mut out = vec![0.0f32; n];
                apply(op, &a, &b, &mut out);
                let expected = reference(op, &a, &b);
                for i in 0..n {
                    assert_eq!(out[i].to_bits(), expected[i].to_bits(), "op {:?} n {} i {}", op, n, i);
                }
            }
        }
    }

    #[test]
    fn test_lane_loop_matches_scalar() {
        let (a, b) = inputs(64);
        let mut lanes = vec![0.0f32; 64];
        let mut scalar = vec![0.0f32; 64];
        apply_lanes(ElementwiseOp::Mul, &a, &b, &mut lanes);
        apply_scalar(ElementwiseOp::Mul, &a, &b, &mut scalar);
        assert_eq!(lanes, scalar);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_avx_matches_scalar_when_available() {
        if !is_x86_feature_detected!("avx") {
            return;
        }
        let (a, b) = inputs(48);
        let mut avx = vec![0.0f32; 48];
        let mut scalar = vec![0.0f32; 48];
        unsafe { apply_avx(ElementwiseOp::Add, &a, &b, &mut avx) };
        apply_scalar(ElementwiseOp::Add, &a, &b, &mut scalar);
        assert_eq!(avx, scalar);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn test_length_mismatch_panics() {
        let mut out = vec![0.0f32; 3];
        apply(ElementwiseOp::Add, &[1.0, 2.0, 3.0], &[1.0], &mut out);
    }
}
