//! # Hypergraph
//!
//! Weighted nodes, auxiliary link weights, and a dense `N × N` adjacency
//! matrix of `{0, 1}` addressed as `adjacency[i * N + j]`. Nodes are plain
//! integer indices into flat arrays; there is no pointer graph.
//!
//! The [`codec`] module converts a hypergraph to an `N × N` tensor and back.
//! The round trip is lossy by construction: only edges whose encoded value
//! exceeds 0.5 survive decoding, and node weights are smoothed toward the
//! decoded cell values.
//!
//! ## Example
//!
//! ```rust
//! use cognitive_tensors::hypergraph::{Hypergraph, encode, decode};
//! use cognitive_tensors::memory::BlockPool;
//!
//! let pool = BlockPool::with_defaults().unwrap();
//! let mut hg = Hypergraph::new(3, 2);
//! hg.connect(0, 1).unwrap();
//! hg.set_node_weight(0, 0.9).unwrap();
//! hg.set_node_weight(1, 0.7).unwrap();
//!
//! let tensor = encode(&pool, &hg).unwrap();
//! assert!((tensor.get(0, 1).unwrap() - 0.8).abs() < 1e-6);
//!
//! let mut restored = Hypergraph::new(3, 2);
//! decode(&tensor, &mut restored).unwrap();
//! assert!(restored.has_edge(0, 1).unwrap());
//! ```

pub mod codec;

pub use codec::{decode, decode_opt, encode};

use crate::{CognitiveError, Result};
use serde::{Deserialize, Serialize};

/// Dense weighted graph snapshot
///
/// Deserialization checks that every array matches the declared counts, so a
/// loaded snapshot upholds the same invariants as one built in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HypergraphSnapshot")]
pub struct Hypergraph {
    node_count: usize,
    link_count: usize,
    node_weights: Vec<f32>,
    link_weights: Vec<f32>,
    adjacency: Vec<u8>,
}

/// Unchecked wire form of [`Hypergraph`]
#[derive(Deserialize)]
struct HypergraphSnapshot {
    node_count: usize,
    link_count: usize,
    node_weights: Vec<f32>,
    link_weights: Vec<f32>,
    adjacency: Vec<u8>,
}

fn adjacency_len(node_count: usize) -> Result<usize> {
    node_count.checked_mul(node_count).ok_or_else(|| {
        CognitiveError::InvalidArgument(format!("{} nodes overflow the adjacency matrix", node_count))
    })
}

impl TryFrom<HypergraphSnapshot> for Hypergraph {
    type Error = CognitiveError;

    fn try_from(snapshot: HypergraphSnapshot) -> Result<Self> {
        let HypergraphSnapshot {
            node_count,
            link_count,
            node_weights,
            link_weights,
            adjacency,
        } = snapshot;

        let expected_adjacency = adjacency_len(node_count)?;
        if node_weights.len() != node_count
            || link_weights.len() != link_count
            || adjacency.len() != expected_adjacency
        {
            return Err(CognitiveError::InvalidArgument(format!(
                "snapshot declares {} nodes and {} links but carries {} node weights, {} link weights, {} adjacency entries",
                node_count,
                link_count,
                node_weights.len(),
                link_weights.len(),
                adjacency.len()
            )));
        }

        Ok(Self {
            node_count,
            link_count,
            node_weights,
            link_weights,
            adjacency,
        })
    }
}

impl Hypergraph {
    /// All weights and adjacency entries start at zero
    ///
    /// # Panics
    /// If `node_count²` overflows `usize`. Use [`try_new`](Self::try_new) for
    /// untrusted counts.
    pub fn new(node_count: usize, link_count: usize) -> Self {
        match Self::try_new(node_count, link_count) {
            Ok(hg) => hg,
            Err(e) => panic!("{}", e),
        }
    }

    /// [`new`](Self::new) that reports an overflowing node count
    pub fn try_new(node_count: usize, link_count: usize) -> Result<Self> {
        let cells = adjacency_len(node_count)?;
        Ok(Self {
            node_count,
            link_count,
            node_weights: vec![0.0; node_count],
            link_weights: vec![0.0; link_count],
            adjacency: vec![0; cells],
        })
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn link_count(&self) -> usize {
        self.link_count
    }

    pub fn node_weights(&self) -> &[f32] {
        &self.node_weights
    }

    pub fn node_weights_mut(&mut self) -> &mut [f32] {
        &mut self.node_weights
    }

    pub fn link_weights(&self) -> &[f32] {
        &self.link_weights
    }

    pub fn link_weights_mut(&mut self) -> &mut [f32] {
        &mut self.link_weights
    }

    /// Row-major `N × N` adjacency entries
    pub fn adjacency(&self) -> &[u8] {
        &self.adjacency
    }

    fn check_node(&self, node: usize) -> Result<()> {
        if node >= self.node_count {
            return Err(CognitiveError::InvalidArgument(format!(
                "node {} out of range for {} nodes",
                node, self.node_count
            )));
        }
        Ok(())
    }

    pub fn node_weight(&self, node: usize) -> Result<f32> {
        self.check_node(node)?;
        Ok(self.node_weights[node])
    }

    pub fn set_node_weight(&mut self, node: usize, weight: f32) -> Result<()> {
        self.check_node(node)?;
        self.node_weights[node] = weight;
        Ok(())
    }

    pub fn set_link_weight(&mut self, link: usize, weight: f32) -> Result<()> {
        if link >= self.link_count {
            return Err(CognitiveError::InvalidArgument(format!(
                "link {} out of range for {} links",
                link, self.link_count
            )));
        }
        self.link_weights[link] = weight;
        Ok(())
    }

    /// Set or clear the directed entry `(from, to)`
    pub fn set_edge(&mut self, from: usize, to: usize, connected: bool) -> Result<()> {
        self.check_node(from)?;
        self.check_node(to)?;
        self.adjacency[from * self.node_count + to] = connected as u8;
        Ok(())
    }

    /// Connect `a` and `b` in both directions
    pub fn connect(&mut self, a: usize, b: usize) -> Result<()> {
        self.set_edge(a, b, true)?;
        self.set_edge(b, a, true)
    }

    pub fn has_edge(&self, from: usize, to: usize) -> Result<bool> {
        self.check_node(from)?;
        self.check_node(to)?;
        Ok(self.adjacency[from * self.node_count + to] != 0)
    }

    /// Outgoing entries set in row `node`
    pub fn degree(&self, node: usize) -> Result<usize> {
        self.check_node(node)?;
        let row = &self.adjacency[node * self.node_count..(node + 1) * self.node_count];
        Ok(row.iter().filter(|&&a| a != 0).count())
    }

    /// Number of set adjacency entries (a symmetric edge counts twice)
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().filter(|&&a| a != 0).count()
    }

    pub(crate) fn adjacency_mut(&mut self) -> &mut [u8] {
        &mut self.adjacency
    }
}
