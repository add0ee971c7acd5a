//! Store → tensor → kernel → store round trip
//!
//! Demonstrates: materialize → attention → encode state → decode state,
//! plus the similarity hypergraph of the same store.
//!
//! Run with:
//! ```bash
//! cargo run --example bridge_roundtrip
//! ```

use cognitive_tensors::prelude::*;

fn main() -> Result<()> {
    // 1. Build a small store
    let mut store = AtomSpace::new();
    store.push(Atom::concept("agent-zero", 0.9, 0.8));
    store.push(Atom::concept("cognitive-function", 0.7, 0.9));
    store.push(Atom::concept("intelligence", 0.8, 0.85));
    println!("Store holds {} atoms", store.len());

    // 2. Engine and kernel
    let engine = Engine::new(EngineConfig::default())?;
    let pool = engine.pool();
    let mut kernel = engine.create_kernel(&[64, 64])?;
    println!("Created {} with attention {}", kernel.id(), kernel.attention_weight());

    // 3. Materialize the store into the kernel field and weight it
    materialize_to_tensor(&store, kernel.tensor_field_mut());
    let attention = attention_from_store(pool, &store, kernel.attention_weight())?;
    println!("Attention tensor {}:", attention.shape());
    for i in 0..attention.rows() {
        let row: Vec<String> = (0..attention.cols())
            .map(|j| attention.get(i, j).map(|v| format!("{:.3}", v)))
            .collect::<Result<_>>()?;
        println!("  [{}]", row.join(", "));
    }

    let weighted = attention_matrix(pool, kernel.tensor_field(), kernel.attention_weight())?;
    println!("First weighted slots: {:?}", &weighted.as_slice()[..4]);

    // 4. Encode the cognitive state at meta level 1 and decode it again
    kernel.set_meta_level(1);
    let mut state = Tensor::zeros(pool, &[2, 4])?;
    encode_cognitive_state(&store, &kernel, &mut state);
    println!("\n--- Encoded state ---");
    println!("{:?}", state.as_slice());

    let mut restored = AtomSpace::new();
    decode_cognitive_state(&state, &kernel, &mut restored);
    println!("\n--- Decoded store ---");
    for atom in restored.atoms().iter().take(4) {
        println!(
            "  {:<12} mean={:.3}",
            atom.name.as_deref().unwrap_or("<unnamed>"),
            atom.mean().unwrap_or(0.0)
        );
    }

    // 5. Similarity graph and its tensor form
    let graph = hypergraph_from_store(&store)?;
    println!("\nHypergraph: {} nodes, {} adjacency entries", graph.node_count(), graph.edge_count());
    let encoded = hypergraph_tensor_from_store(pool, &store)?;
    let mut decoded = Hypergraph::new(graph.node_count(), graph.link_count());
    decode(&encoded, &mut decoded)?;
    println!("Adjacency survives round trip: {}", decoded.adjacency() == graph.adjacency());

    // 6. Pattern match
    let mut matches = Tensor::zeros(pool, &[4])?;
    let count = pattern_match_store(&store, "intel", &mut matches);
    println!("Pattern 'intel' matched {} atom(s): {:?}", count, matches.as_slice());

    kernel.destroy();
    println!("\nPool: {}", serde_json::to_string(&engine.stats()).unwrap_or_default());
    Ok(())
}
