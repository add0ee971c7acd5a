//! Store ↔ tensor conversions
//!
//! Slot `i` of a tensor always corresponds to atom `i` of the store, in
//! insertion order, over the tensor's full element count.

use super::atoms::{Atom, AtomType, KnowledgeStore, TruthValue};
use crate::cognitive::CognitiveKernel;
use crate::hypergraph::{self, Hypergraph};
use crate::memory::BlockPool;
use crate::tensor::Tensor;
use crate::{CognitiveError, Result};
use tracing::debug;

/// Activation written to slots past the last atom
pub const DEFAULT_ACTIVATION: f32 = 0.1;

/// Cell values must exceed this to become atoms
pub const ACTIVATION_THRESHOLD: f32 = 0.01;

/// Confidence given to atoms recreated from a tensor
pub const MATERIALIZED_CONFIDENCE: f64 = 0.8;

/// Attention matrix extent used when the store is empty
pub const EMPTY_STORE_ATTENTION_SIZE: usize = 64;

/// Mean difference below which two atoms are linked
pub const SIMILARITY_LINK_THRESHOLD: f32 = 0.3;

/// Per-level gain of the cognitive state encoding
pub const STATE_META_GAIN: f32 = 0.1;

/// Guards the inverse attention against a zero weight
pub const ATTENTION_EPSILON: f32 = 1e-6;

#[inline]
fn state_gain(kernel: &CognitiveKernel) -> f32 {
    1.0 + kernel.meta_level() as f32 * STATE_META_GAIN
}

#[inline]
fn slot_mean(atom: &Atom) -> f32 {
    atom.mean().map_or(0.0, |m| m as f32)
}

/// Write atom means into `tensor`, one slot per atom
///
/// Atoms without a truth value contribute 0.0. Slots past the last atom get
/// [`DEFAULT_ACTIVATION`]. Atoms beyond the tensor's size are ignored.
pub fn materialize_to_tensor<S: KnowledgeStore + ?Sized>(store: &S, tensor: &mut Tensor) {
    let atoms = store.atoms();
    let slots = tensor.as_mut_slice();
    let filled = atoms.len().min(slots.len());

    for (slot, atom) in slots.iter_mut().zip(atoms) {
        *slot = slot_mean(atom);
    }
    slots[filled..].fill(DEFAULT_ACTIVATION);
}

fn materialize_from_values<S: KnowledgeStore + ?Sized>(values: &[f32], store: &mut S) {
    store.clear();
    let limit = values.len().min(store.capacity());

    for (i, &v) in values[..limit].iter().enumerate() {
        if v > ACTIVATION_THRESHOLD {
            let atom = Atom::new(AtomType::Concept)
                .with_name(format!("concept_{}", i))
                .with_truth(TruthValue::new(v as f64, MATERIALIZED_CONFIDENCE));
            store.push(atom);
        }
    }
    debug!(atoms = store.len(), cells = values.len(), "Materialized store from tensor");
}

/// Replace the store's contents with one concept per active cell
///
/// Cell `i` with a value above [`ACTIVATION_THRESHOLD`] becomes a concept
/// named `concept_{i}` whose mean is the cell value and whose confidence is
/// [`MATERIALIZED_CONFIDENCE`]. Only the first `capacity` cells are scanned.
pub fn materialize_from_tensor<S: KnowledgeStore + ?Sized>(tensor: &Tensor, store: &mut S) {
    materialize_from_values(tensor.as_slice(), store);
}

/// Square attention matrix over the store's atoms
///
/// `N` is the atom count, or [`EMPTY_STORE_ATTENTION_SIZE`] for an empty
/// store. The diagonal carries `weight`. Between two atoms that both have
/// truth values the cell is `(1 - |mean_i - mean_j|) · weight · 0.5`; pairs
/// missing a truth value get `0.1 · weight`.
pub fn attention_from_store<S: KnowledgeStore + ?Sized>(
    pool: &BlockPool,
    store: &S,
    weight: f32,
) -> Result<Tensor> {
    let atoms = store.atoms();
    let count = atoms.len();
    let n = if count == 0 { EMPTY_STORE_ATTENTION_SIZE } else { count };

    let mut tensor = Tensor::zeros_2d(pool, n, n)?;
    let cells = tensor.as_mut_slice();

    for i in 0..n {
        for j in 0..n {
            cells[i * n + j] = if i == j {
                weight
            } else if i < count && j < count {
                match (atoms[i].truth, atoms[j].truth) {
                    (Some(a), Some(b)) => {
                        let similarity = 1.0 - (a.mean as f32 - b.mean as f32).abs();
                        similarity * weight * 0.5
                    }
                    _ => 0.1 * weight,
                }
            } else {
                0.0
            };
        }
    }

    debug!(atoms = count, size = n, weight, "Built attention tensor from store");
    Ok(tensor)
}

/// Materialize `store` into `out`, scaled by the kernel's attention and level
///
/// `out[i] = slot[i] · w · (1 + 0.1 · meta_level)`
pub fn encode_cognitive_state<S: KnowledgeStore + ?Sized>(
    store: &S,
    kernel: &CognitiveKernel,
    out: &mut Tensor,
) {
    materialize_to_tensor(store, out);
    let scale_gain = state_gain(kernel);
    let weight = kernel.attention_weight();
    for v in out.as_mut_slice() {
        *v = *v * weight * scale_gain;
    }
    debug!(kernel = %kernel.id(), atoms = store.len(), "Encoded cognitive state");
}

/// Undo the kernel scaling of `input` and rebuild `store` from the result
///
/// The inverse attention is `1 / (w + 1e-6)`, so a zero weight yields large
/// but finite slots rather than infinities.
pub fn decode_cognitive_state<S: KnowledgeStore + ?Sized>(
    input: &Tensor,
    kernel: &CognitiveKernel,
    store: &mut S,
) {
    let inverse_attention = 1.0 / (kernel.attention_weight() + ATTENTION_EPSILON);
    let inverse_meta = 1.0 / state_gain(kernel);

    let decoded: Vec<f32> = input
        .as_slice()
        .iter()
        .map(|&v| v * inverse_attention * inverse_meta)
        .collect();

    materialize_from_values(&decoded, store);
    debug!(kernel = %kernel.id(), atoms = store.len(), "Decoded cognitive state");
}

/// Similarity graph over the store's atoms
///
/// One node per atom weighted by its mean (0.0 without a truth value) and
/// `2N` unused links. Atoms `i < j` that both carry truth values are connected
/// in both directions when their means differ by less than
/// [`SIMILARITY_LINK_THRESHOLD`].
///
/// # Errors
/// `InvalidArgument` if the atom count is too large for an `N × N` adjacency.
pub fn hypergraph_from_store<S: KnowledgeStore + ?Sized>(store: &S) -> Result<Hypergraph> {
    let atoms = store.atoms();
    let n = atoms.len();
    let link_count = n.checked_mul(2).ok_or_else(|| {
        CognitiveError::InvalidArgument(format!("{} atoms overflow the link count", n))
    })?;
    let mut hg = Hypergraph::try_new(n, link_count)?;

    for i in 0..n {
        let Some(truth) = atoms[i].truth else {
            continue;
        };
        let wi = truth.mean as f32;
        hg.node_weights_mut()[i] = wi;

        for j in (i + 1)..n {
            if let Some(other) = atoms[j].truth {
                if (wi - other.mean as f32).abs() < SIMILARITY_LINK_THRESHOLD {
                    let adjacency = hg.adjacency_mut();
                    adjacency[i * n + j] = 1;
                    adjacency[j * n + i] = 1;
                }
            }
        }
    }
    Ok(hg)
}

/// Encode [`hypergraph_from_store`] as an `N × N` tensor
///
/// # Errors
/// `InvalidArgument` for an empty store.
pub fn hypergraph_tensor_from_store<S: KnowledgeStore + ?Sized>(pool: &BlockPool, store: &S) -> Result<Tensor> {
    if store.is_empty() {
        return Err(CognitiveError::InvalidArgument(
            "cannot build a hypergraph tensor from an empty store".into(),
        ));
    }
    hypergraph::encode(pool, &hypergraph_from_store(store)?)
}

/// Mark atoms whose name contains `pattern`
///
/// `out` is zeroed, then slot `i` receives atom `i`'s mean when its name
/// contains `pattern`. Matching atoms without a truth value leave 0.0.
/// Unnamed atoms never match, and an empty pattern matches every named atom.
/// Returns the number of matching slots.
pub fn pattern_match_store<S: KnowledgeStore + ?Sized>(store: &S, pattern: &str, out: &mut Tensor) -> usize {
    let slots = out.as_mut_slice();
    slots.fill(0.0);

    let mut matches = 0;
    for (slot, atom) in slots.iter_mut().zip(store.atoms()) {
        if atom.name.as_deref().is_some_and(|name| name.contains(pattern)) {
            *slot = slot_mean(atom);
            matches += 1;
        }
    }
    debug!(pattern, matches, "Pattern matched store");
    matches
}
