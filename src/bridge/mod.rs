//! # Symbolic Store Bridge
//!
//! Moves knowledge between an ordered atom store and dense tensors.
//!
//! ```text
//!   KnowledgeStore ──materialize_to_tensor──▶ Tensor (slot i = atom i)
//!        ▲                                      │
//!        └────────materialize_from_tensor───────┘  (concept_{i} per active cell)
//!
//!   KnowledgeStore ──hypergraph_from_store──▶ Hypergraph ──encode──▶ Tensor
//! ```
//!
//! Any type implementing [`KnowledgeStore`] can be bridged; [`AtomSpace`] is
//! the bundled in-memory store.
//!
//! ## Example
//!
//! ```rust
//! use cognitive_tensors::bridge::{materialize_to_tensor, Atom, AtomSpace, KnowledgeStore};
//! use cognitive_tensors::memory::BlockPool;
//! use cognitive_tensors::tensor::Tensor;
//!
//! let pool = BlockPool::with_defaults().unwrap();
//! let mut store = AtomSpace::new();
//! store.push(Atom::concept("intelligence", 0.8, 0.85));
//!
//! let mut tensor = Tensor::zeros(&pool, &[2, 2]).unwrap();
//! materialize_to_tensor(&store, &mut tensor);
//! assert!((tensor.as_slice()[0] - 0.8).abs() < 1e-6);
//! assert!((tensor.as_slice()[1] - 0.1).abs() < 1e-6);
//! ```

pub mod atoms;
pub mod ops;

pub use atoms::{Atom, AtomSpace, AtomType, KnowledgeStore, TruthValue, DEFAULT_STORE_CAPACITY};
pub use ops::{
    attention_from_store, decode_cognitive_state, encode_cognitive_state, hypergraph_from_store,
    hypergraph_tensor_from_store, materialize_from_tensor, materialize_to_tensor, pattern_match_store,
};
