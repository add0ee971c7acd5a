//! Pool accounting under pressure
//!
//! Demonstrates: pooled vs fallback buffers, exhaustion, and release by
//! origin keeping the free and allocated counts balanced.
//!
//! Run with:
//! ```bash
//! COGNITIVE_POOL_CAPACITY=4 cargo run --example pool_pressure
//! ```

use cognitive_tensors::prelude::*;

fn report(label: &str, stats: &PoolStats) {
    println!(
        "{:<22} free={:<4} allocated={:<4} fallback_live={:<3} peak={}B consistent={}",
        label,
        stats.free,
        stats.allocated,
        stats.live_fallback,
        stats.peak_bytes,
        stats.is_consistent()
    );
}

fn main() -> Result<()> {
    let mut config = EngineConfig::from_env()?;
    config.pool.capacity = config.pool.capacity.min(16);
    let capacity = config.pool.capacity;
    let engine = Engine::new(config)?;
    let pool = engine.pool();
    println!("Vectorized path disabled: {}", scalar_forced());

    // 1. Fill every block with 64×64 tensors (exactly one block each)
    let mut held = Vec::new();
    for _ in 0..capacity {
        held.push(Tensor::zeros(pool, &[64, 64])?);
    }
    report("pool full", &pool.stats());

    // 2. Two more requests fall back to direct allocation
    let overflow_a = Tensor::zeros(pool, &[64, 64])?;
    let overflow_b = Tensor::zeros(pool, &[65, 64])?;
    println!("Overflow origins: {:?}, {:?}", overflow_a.origin(), overflow_b.origin());
    report("with fallbacks", &pool.stats());

    // 3. Release fallbacks first, then half of the pooled tensors
    drop(overflow_a);
    drop(overflow_b);
    report("fallbacks released", &pool.stats());

    held.truncate(capacity / 2);
    report("half released", &pool.stats());

    // 4. Work through the kernels with the freed blocks
    let ones = Tensor::full(pool, &[64, 64], 1.0)?;
    let halves = Tensor::full(pool, &[64, 64], 0.5)?;
    let product = mul(pool, &ones, &halves)?;
    let pattern = Tensor::full(pool, &[3, 3], 1.0)?;
    let smoothed = engine.correlate(&pattern, &product)?;
    println!("Correlation corner {:.2}, centre {:.2}", smoothed.get(63, 63)?, smoothed.get(10, 10)?);
    report("after kernels", &pool.stats());

    drop((ones, halves, product, pattern, smoothed));
    held.clear();
    report("all released", &pool.stats());
    Ok(())
}
