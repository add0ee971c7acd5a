//! Attention weighting and meta-level transforms
//!
//! Both transforms are pure functions of their inputs. The constants below
//! are fixed by the encoding; changing any of them changes every stored
//! snapshot.
//!
//! | Transform | Element `i` of the result |
//! |---|---|
//! | [`attention_matrix`] | `input[i] · w · (1 + 0.1·sin(0.1·i))` |
//! | [`meta_transform`] | `input[i] · (1 + 0.2·level) · (1 + 0.1·sin(0.01·level·i))` |

use crate::kernels;
use crate::memory::BlockPool;
use crate::tensor::Tensor;
use crate::Result;

/// Amplitude of the attention modulation
pub const ATTENTION_MODULATION: f32 = 0.1;

/// Angular step per element of the attention modulation
pub const ATTENTION_FREQUENCY: f32 = 0.1;

/// Gain added per meta level
pub const META_LEVEL_GAIN: f32 = 0.2;

/// Amplitude of the meta-level oscillation
pub const META_OSCILLATION: f32 = 0.1;

/// Angular step per element and level of the meta oscillation
pub const META_FREQUENCY: f32 = 0.01;

/// Attention coefficient for linear index `i`
#[inline]
pub fn attention_coefficient(weight: f32, i: usize) -> f32 {
    weight * (1.0 + ATTENTION_MODULATION * (i as f32 * ATTENTION_FREQUENCY).sin())
}

#[inline]
fn meta_gain(level: i32) -> f32 {
    1.0 + level as f32 * META_LEVEL_GAIN
}

#[inline]
fn meta_oscillation(level: i32, i: usize) -> f32 {
    let phase = (i as i64 * level as i64) as f32 * META_FREQUENCY;
    1.0 + META_OSCILLATION * phase.sin()
}

/// Meta-transform coefficient for linear index `i`
#[inline]
pub fn meta_coefficient(level: i32, i: usize) -> f32 {
    meta_gain(level) * meta_oscillation(level, i)
}

/// Weight `input` by a smooth index-dependent modulation of `weight`
///
/// Builds the attention tensor with `input`'s extents and multiplies it in
/// through the elementwise kernel.
pub fn attention_matrix(pool: &BlockPool, input: &Tensor, weight: f32) -> Result<Tensor> {
    let mut attention = Tensor::zeros_with_shape(pool, input.shape())?;
    for (i, a) in attention.as_mut_slice().iter_mut().enumerate() {
        *a = attention_coefficient(weight, i);
    }
    kernels::mul(pool, input, &attention)
}

/// Scale and oscillate `input` according to a meta level
///
/// Level 0 reproduces `input` exactly.
pub fn meta_transform(pool: &BlockPool, input: &Tensor, level: i32) -> Result<Tensor> {
    let gain = meta_gain(level);
    let mut out = Tensor::zeros_with_shape(pool, input.shape())?;
    for (i, (o, x)) in out.as_mut_slice().iter_mut().zip(input.as_slice()).enumerate() {
        *o = x * gain * meta_oscillation(level, i);
    }
    Ok(out)
}
