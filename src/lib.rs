//! # cognitive-tensors
//!
//! Bridge between symbolic graph knowledge and dense numeric tensors.
//!
//! ## Overview
//!
//! Symbolic knowledge (weighted nodes, typed links, confidence-weighted atoms)
//! is converted into pool-backed `f32` tensors, transformed by attention and
//! meta-level kernels, and decoded back into graph form.
//!
//! Core capabilities:
//!
//! - **Memory**: fixed-capacity, 32-byte aligned block pool with direct fallback
//! - **Tensor**: move-only dense tensors of up to four dimensions
//! - **Kernels**: vectorized elementwise ops and clipped 2-D correlation
//! - **Cognitive**: attention weighting, meta transforms, cognitive kernels
//! - **Hypergraph**: flat weighted graph with a lossy tensor codec
//! - **Bridge**: atom stores ↔ tensors, similarity graphs, pattern matching
//!
//! ```text
//!   KnowledgeStore ──▶ Hypergraph ──encode──▶ Tensor ──▶ CognitiveKernel
//!        ▲                  ▲                                 │
//!        │                  └──────────decode─────────────────┤
//!        └─────────────decode_cognitive_state─────────────────┘
//!
//!   every Tensor draws its storage from one BlockPool
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use cognitive_tensors::prelude::*;
//!
//! # fn main() -> cognitive_tensors::Result<()> {
//! let engine = Engine::new(EngineConfig::default())?;
//! let pool = engine.pool();
//!
//! let mut store = AtomSpace::new();
//! store.push(Atom::concept("agent-zero", 0.9, 0.8));
//! store.push(Atom::concept("intelligence", 0.8, 0.85));
//!
//! // Similar atoms become connected nodes
//! let graph = hypergraph_from_store(&store)?;
//! let encoded = encode(pool, &graph)?;
//!
//! let mut restored = Hypergraph::new(graph.node_count(), graph.link_count());
//! decode(&encoded, &mut restored)?;
//! assert_eq!(restored.adjacency(), graph.adjacency());
//!
//! // Attention over the store, applied through a kernel
//! let mut kernel = engine.create_kernel(&[2, 2])?;
//! materialize_to_tensor(&store, kernel.tensor_field_mut());
//! kernel.apply_attention(pool)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment
//!
//! - `COGNITIVE_FORCE_SCALAR=1`: run elementwise kernels on the scalar path
//! - `COGNITIVE_POOL_CAPACITY`, `COGNITIVE_POOL_BLOCK_SIZE`: pool overrides
//!   read by [`config::EngineConfig::from_env`]

pub mod memory;
pub mod tensor;
pub mod kernels;
pub mod cognitive;
pub mod hypergraph;
pub mod bridge;
pub mod config;

/// Error types for cognitive tensor operations
#[derive(Debug, thiserror::Error)]
pub enum CognitiveError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Allocation of {requested} bytes failed")]
    AllocationFailure { requested: usize },

    #[error("Shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: [usize; tensor::MAX_DIMS],
        right: [usize; tensor::MAX_DIMS],
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),
}

/// Result type alias for cognitive tensor operations
pub type Result<T> = std::result::Result<T, CognitiveError>;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{CognitiveError, Result};

    // Memory and tensors
    pub use crate::memory::{BlockPool, BufferOrigin, PoolConfig, PoolStats};
    pub use crate::tensor::{DType, Shape, Tensor};

    // Kernels
    pub use crate::kernels::{add, combine, correlate, hyperedge_activation, mul, ElementwiseOp};

    // Cognitive
    pub use crate::cognitive::{attention_matrix, meta_transform, CognitiveKernel, KernelId};

    // Hypergraph
    pub use crate::hypergraph::{decode, encode, Hypergraph};

    // Bridge
    pub use crate::bridge::{
        attention_from_store, decode_cognitive_state, encode_cognitive_state, hypergraph_from_store,
        hypergraph_tensor_from_store, materialize_from_tensor, materialize_to_tensor, pattern_match_store,
        Atom, AtomSpace, AtomType, KnowledgeStore, TruthValue,
    };

    // Configuration
    pub use crate::config::{scalar_forced, Engine, EngineConfig};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let pool = BlockPool::new(PoolConfig::default().with_capacity(4)).unwrap();
        let a = Tensor::full(&pool, &[3, 3], 2.0).unwrap();
        let b = Tensor::full(&pool, &[3, 3], 0.5).unwrap();
        let c = mul(&pool, &a, &b).unwrap();
        assert!(c.as_slice().iter().all(|&v| v == 1.0));
        assert!(pool.stats().is_consistent());
    }

    #[test]
    fn test_error_display() {
        let err = crate::CognitiveError::ShapeMismatch {
            left: [2, 2, 1, 1],
            right: [3, 1, 1, 1],
        };
        assert_eq!(err.to_string(), "Shape mismatch: [2, 2, 1, 1] vs [3, 1, 1, 1]");

        let err = crate::CognitiveError::AllocationFailure { requested: 64 };
        assert!(err.to_string().contains("64"));
    }
}
