//! # Cognitive Transforms
//!
//! Attention weighting, meta-level transforms, and the [`CognitiveKernel`]
//! that carries a tensor field through them.
//!
//! ## Example
//!
//! ```rust
//! use cognitive_tensors::memory::BlockPool;
//! use cognitive_tensors::cognitive::CognitiveKernel;
//!
//! let pool = BlockPool::with_defaults().unwrap();
//! let mut kernel = CognitiveKernel::create(&pool, &[8, 8], 0.8).unwrap();
//! kernel.tensor_field_mut().as_mut_slice().fill(1.0);
//!
//! kernel.apply_attention(&pool).unwrap();
//! kernel.set_meta_level(2);
//! kernel.apply_meta_transform(&pool).unwrap();
//!
//! kernel.update_attention(0.5).unwrap();
//! assert!(kernel.update_attention(1.5).is_err());
//! kernel.destroy();
//! ```

pub mod attention;
pub mod kernel;

pub use attention::{attention_coefficient, attention_matrix, meta_coefficient, meta_transform};
pub use kernel::{CognitiveKernel, KernelId};
