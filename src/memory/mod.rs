//! # Aligned Block Memory
//!
//! Fixed-capacity pool of pre-allocated, SIMD-aligned blocks with a direct
//! aligned-allocation fallback.
//!
//! ## Ownership Model
//!
//! ```text
//! BlockPool (cloneable handle) ──► PoolShared { config, Mutex<PoolState> }
//!                                        ▲
//! AlignedBuffer { origin, ptr } ─────────┘  (keeps the pool alive)
//! ```
//!
//! Every buffer is tagged with its [`BufferOrigin`]. Dropping a buffer routes
//! the release to the matching reclaim path: pooled blocks go back on the free
//! list, fallback allocations are deallocated directly. Block memory is only
//! returned to the allocator when the last pool handle and the last
//! outstanding buffer are gone.
//!
//! There is no process-wide pool. Create one with [`BlockPool::new`] and pass
//! it to every allocating call. The bookkeeping sits behind a mutex, so a
//! handle can be shared between threads, or each worker can own its own pool.
//!
//! ## Example
//!
//! ```rust
//! use cognitive_tensors::memory::{BlockPool, PoolConfig, BufferOrigin};
//!
//! let pool = BlockPool::new(PoolConfig::default()).unwrap();
//! let buf = pool.acquire(4096).unwrap();
//! assert!(matches!(buf.origin(), BufferOrigin::Pooled(_)));
//! assert_eq!(pool.stats().allocated, 1);
//! drop(buf);
//! assert_eq!(pool.stats().allocated, 0);
//! ```

pub mod buffer;
pub mod pool;

pub use buffer::{AlignedBuffer, BufferOrigin};
pub use pool::{
    BlockPool, PoolConfig, PoolStats, DEFAULT_BLOCK_SIZE, DEFAULT_POOL_CAPACITY, MIN_ALIGNMENT,
};
