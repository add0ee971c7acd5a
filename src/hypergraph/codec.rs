//! Hypergraph ↔ tensor codec
//!
//! ```text
//! encode:  T[i, j] = adj[i, j] · (w_i + w_j) / 2            (N × N)
//! decode:  adj[i, j] = T[i, j] > 0.5
//!          T[i, j] > 0  =>  w_i = (w_i + T[i, j]) / 2, then w_j likewise
//! ```
//!
//! Decode walks cells in row-major order and updates weights in place, so a
//! weight is averaged once per visited cell that touches it. The result
//! depends on visit order; that order is part of the format.

use super::Hypergraph;
use crate::memory::BlockPool;
use crate::tensor::Tensor;
use crate::{CognitiveError, Result};
use tracing::debug;

/// Cell values strictly above this decode as an edge
pub const EDGE_THRESHOLD: f32 = 0.5;

/// Encode `hg` as an `N × N` tensor
///
/// # Errors
/// `InvalidArgument` when the hypergraph has no nodes.
pub fn encode(pool: &BlockPool, hg: &Hypergraph) -> Result<Tensor> {
    let n = hg.node_count();
    if n == 0 {
        return Err(CognitiveError::InvalidArgument(
            "cannot encode a hypergraph with no nodes".into(),
        ));
    }

    let mut tensor = Tensor::zeros_2d(pool, n, n)?;
    let weights = hg.node_weights();
    let adjacency = hg.adjacency();
    let cells = tensor.as_mut_slice();

    for i in 0..n {
        for j in 0..n {
            let idx = i * n + j;
            cells[idx] = adjacency[idx] as f32 * (weights[i] + weights[j]) * 0.5;
        }
    }

    debug!(nodes = n, edges = hg.edge_count(), "Encoded hypergraph");
    Ok(tensor)
}

/// Decode `tensor` into `hg`, overwriting adjacency and smoothing weights
///
/// Only the leading `min(N, rows, cols)` square is visited. Entries of `hg`
/// outside that square keep their previous values, and any excess tensor
/// cells are ignored.
pub fn decode(tensor: &Tensor, hg: &mut Hypergraph) -> Result<()> {
    let n = hg.node_count();
    let cols = tensor.cols();
    let size = n.min(tensor.rows()).min(cols);
    let cells = tensor.as_slice();

    for i in 0..size {
        for j in 0..size {
            let v = cells[i * cols + j];
            hg.adjacency_mut()[i * n + j] = (v > EDGE_THRESHOLD) as u8;

            if v > 0.0 {
                let weights = hg.node_weights_mut();
                weights[i] = (weights[i] + v) * 0.5;
                weights[j] = (weights[j] + v) * 0.5;
            }
        }
    }

    if size < n || size < tensor.rows() || size < cols {
        debug!(nodes = n, tensor = %tensor.shape(), visited = size, "Truncated hypergraph decode");
    } else {
        debug!(nodes = n, "Decoded hypergraph");
    }
    Ok(())
}

/// [`decode`] for callers holding optional handles
///
/// # Errors
/// `InvalidArgument` if either side is missing; nothing is modified.
pub fn decode_opt(tensor: Option<&Tensor>, hg: Option<&mut Hypergraph>) -> Result<()> {
    match (tensor, hg) {
        (Some(tensor), Some(hg)) => decode(tensor, hg),
        (None, _) => Err(CognitiveError::InvalidArgument("decode requires a tensor".into())),
        (_, None) => Err(CognitiveError::InvalidArgument("decode requires a hypergraph".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::PoolConfig;

    fn pool() -> BlockPool {
        BlockPool::new(PoolConfig::default().with_capacity(8)).unwrap()
    }

    fn weighted(n: usize, weight: f32) -> Hypergraph {
        let mut hg = Hypergraph::new(n, 2 * n);
        for i in 0..n {
            hg.set_node_weight(i, weight).unwrap();
        }
        hg
    }

    #[test]
    fn test_encode_cells() {
        let pool = pool();
        let mut hg = Hypergraph::new(3, 0);
        hg.set_node_weight(0, 0.2).unwrap();
        hg.set_node_weight(1, 0.6).unwrap();
        hg.set_node_weight(2, 1.0).unwrap();
        hg.connect(0, 2).unwrap();
        hg.set_edge(1, 1, true).unwrap();

        let t = encode(&pool, &hg).unwrap();
        assert_eq!(t.dims(), [3, 3, 1, 1]);
        assert!((t.get(0, 2).unwrap() - 0.6).abs() < 1e-6);
        assert!((t.get(2, 0).unwrap() - 0.6).abs() < 1e-6);
        assert!((t.get(1, 1).unwrap() - 0.6).abs() < 1e-6);
        // Disconnected pairs encode to exactly zero
        assert_eq!(t.get(0, 1).unwrap(), 0.0);
        assert_eq!(t.get(2, 2).unwrap(), 0.0);
    }

    #[test]
    fn test_encode_empty_rejected() {
        let pool = pool();
        let hg = Hypergraph::new(0, 0);
        assert!(matches!(encode(&pool, &hg), Err(CognitiveError::InvalidArgument(_))));
    }

    #[test]
    fn test_roundtrip_heavy_weights_keeps_adjacency() {
        let pool = pool();
        let mut hg = weighted(5, 0.9);
        hg.connect(0, 1).unwrap();
        hg.connect(2, 4).unwrap();
        hg.set_edge(3, 3, true).unwrap();

        let t = encode(&pool, &hg).unwrap();
        let mut restored = Hypergraph::new(5, 10);
        decode(&t, &mut restored).unwrap();
        assert_eq!(restored.adjacency(), hg.adjacency());
    }

    #[test]
    fn test_roundtrip_light_weights_drops_edges() {
        let pool = pool();
        let mut hg = weighted(4, 0.5);
        hg.connect(0, 1).unwrap();
        hg.connect(1, 2).unwrap();
        hg.connect(2, 3).unwrap();

        let t = encode(&pool, &hg).unwrap();
        let mut restored = Hypergraph::new(4, 8);
        decode(&t, &mut restored).unwrap();
        assert_eq!(restored.edge_count(), 0);
        // Positive cells still pull weights upward
        assert!(restored.node_weight(1).unwrap() > 0.0);
    }

    #[test]
    fn test_decode_double_averaging() {
        let pool = pool();
        let t = Tensor::from_vec(&pool, &[2, 2], vec![0.0, 0.8, 0.0, 0.0]).unwrap();
        let mut hg = Hypergraph::new(2, 0);
        hg.set_node_weight(0, 0.4).unwrap();
        hg.set_node_weight(1, 0.2).unwrap();

        decode(&t, &mut hg).unwrap();
        // Only cell (0, 1) is positive: w0 = (0.4 + 0.8) / 2, w1 = (0.2 + 0.8) / 2
        assert!((hg.node_weight(0).unwrap() - 0.6).abs() < 1e-6);
        assert!((hg.node_weight(1).unwrap() - 0.5).abs() < 1e-6);
        assert!(hg.has_edge(0, 1).unwrap());
        assert!(!hg.has_edge(1, 0).unwrap());
    }

    #[test]
    fn test_decode_diagonal_averages_twice() {
        let pool = pool();
        let t = Tensor::from_vec(&pool, &[1, 1], vec![1.0]).unwrap();
        let mut hg = Hypergraph::new(1, 0);
        decode(&t, &mut hg).unwrap();
        // (0 + 1) / 2 = 0.5, then (0.5 + 1) / 2 = 0.75
        assert!((hg.node_weight(0).unwrap() - 0.75).abs() < 1e-6);
        assert!(hg.has_edge(0, 0).unwrap());
    }

    #[test]
    fn test_decode_symmetric_cells_visit_both() {
        let pool = pool();
        let t = Tensor::from_vec(&pool, &[2, 2], vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        let mut hg = Hypergraph::new(2, 0);
        decode(&t, &mut hg).unwrap();
        // (0, 1): w0 = 0.5, w1 = 0.5; (1, 0): w1 = 0.75, w0 = 0.75
        assert!((hg.node_weight(0).unwrap() - 0.75).abs() < 1e-6);
        assert!((hg.node_weight(1).unwrap() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_decode_truncates_to_smaller_side() {
        let pool = pool();
        let t = Tensor::full(&pool, &[4, 4], 0.9).unwrap();
        let mut small = Hypergraph::new(2, 0);
        decode(&t, &mut small).unwrap();
        assert_eq!(small.edge_count(), 4);

        let t = Tensor::full(&pool, &[2, 2], 0.9).unwrap();
        let mut large = Hypergraph::new(3, 0);
        decode(&t, &mut large).unwrap();
        assert_eq!(large.edge_count(), 4);
        assert!(!large.has_edge(2, 2).unwrap());
        assert!(!large.has_edge(0, 2).unwrap());
        assert_eq!(large.node_weight(2).unwrap(), 0.0);
    }

    #[test]
    fn test_decode_non_square_stays_in_bounds() {
        let pool = pool();
        let t = Tensor::full(&pool, &[5, 2], 0.9).unwrap();
        let mut hg = Hypergraph::new(4, 0);
        decode(&t, &mut hg).unwrap();
        assert_eq!(hg.edge_count(), 4);
        assert!(!hg.has_edge(0, 2).unwrap());
    }

    #[test]
    fn test_decode_overwrites_visited_adjacency() {
        let pool = pool();
        let mut hg = Hypergraph::new(2, 0);
        hg.connect(0, 1).unwrap();
        let t = Tensor::zeros(&pool, &[2, 2]).unwrap();
        decode(&t, &mut hg).unwrap();
        assert_eq!(hg.edge_count(), 0);
        assert_eq!(hg.node_weights(), &[0.0, 0.0]);
    }

    #[test]
    fn test_decode_opt_requires_both() {
        let pool = pool();
        let t = Tensor::full(&pool, &[2, 2], 0.9).unwrap();
        let mut hg = Hypergraph::new(2, 0);

        assert!(matches!(decode_opt(None, Some(&mut hg)), Err(CognitiveError::InvalidArgument(_))));
        assert!(matches!(decode_opt(Some(&t), None), Err(CognitiveError::InvalidArgument(_))));
        assert_eq!(hg.edge_count(), 0);

        decode_opt(Some(&t), Some(&mut hg)).unwrap();
        assert_eq!(hg.edge_count(), 4);
    }
}
