//! Fixed-capacity aligned block pool
//!
//! Blocks are allocated in one sweep on the first acquisition and reused
//! until the pool is torn down. Requests larger than a block, or arriving while
//! every block is handed out, are served by a direct aligned allocation. If the
//! initial sweep fails the pool stays empty and every request takes the direct
//! path.

use crate::memory::buffer::{AlignedBuffer, BufferOrigin};
use crate::{CognitiveError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::mem;
use std::ptr::{self, NonNull};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of blocks in a default pool
pub const DEFAULT_POOL_CAPACITY: usize = 1024;

/// Default block size in bytes (16 KiB, 4096 f32 elements)
pub const DEFAULT_BLOCK_SIZE: usize = 16 * 1024;

/// Minimum alignment accepted by the pool (one AVX register)
pub const MIN_ALIGNMENT: usize = 32;

// ============================================================================
// Configuration
// ============================================================================

/// Pool geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of blocks (C)
    pub capacity: usize,

    /// Size of each block in bytes (B)
    pub block_size: usize,

    /// Alignment of every buffer handed out, pooled or fallback
    pub alignment: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_CAPACITY,
            block_size: DEFAULT_BLOCK_SIZE,
            alignment: MIN_ALIGNMENT,
        }
    }
}

impl PoolConfig {
    /// Builder: set block count
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder: set block size in bytes
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Builder: set alignment in bytes
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Check the geometry before any memory is touched
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CognitiveError::Config("pool capacity must be positive".into()));
        }
        if !self.alignment.is_power_of_two() || self.alignment < MIN_ALIGNMENT {
            return Err(CognitiveError::Config(format!(
                "alignment must be a power of two >= {}, got {}",
                MIN_ALIGNMENT, self.alignment
            )));
        }
        if self.block_size == 0 || self.block_size % self.alignment != 0 {
            return Err(CognitiveError::Config(format!(
                "block size {} must be a positive multiple of the alignment {}",
                self.block_size, self.alignment
            )));
        }
        self.block_layout()?;
        self.total_bytes().map(|_| ())
    }

    /// Bytes held by the blocks once allocated
    pub fn total_bytes(&self) -> Result<usize> {
        self.capacity
            .checked_mul(self.block_size)
            .filter(|&total| total <= isize::MAX as usize)
            .ok_or_else(|| {
                CognitiveError::Config(format!(
                    "{} blocks of {} bytes exceed the addressable size",
                    self.capacity, self.block_size
                ))
            })
    }

    fn block_layout(&self) -> Result<Layout> {
        Layout::from_size_align(self.block_size, self.alignment)
            .map_err(|e| CognitiveError::Config(format!("invalid block layout: {}", e)))
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Snapshot of pool accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolStats {
    /// Configured block count
    pub capacity: usize,
    /// Configured block size in bytes
    pub block_size: usize,
    /// Alignment of every buffer in bytes
    pub alignment: usize,
    /// Whether the blocks have been allocated yet
    pub initialized: bool,
    /// Whether allocating the blocks failed, leaving only direct allocation
    pub init_failed: bool,
    /// Blocks on the free list
    pub free: usize,
    /// Blocks currently handed out
    pub allocated: usize,
    /// Bytes requested by live pooled buffers
    pub bytes_in_use: usize,
    /// Bytes served from the pool over its lifetime
    pub cumulative_bytes: u64,
    /// High-water mark of `bytes_in_use`
    pub peak_bytes: usize,
    /// Acquisitions served by a pooled block
    pub pooled_acquisitions: u64,
    /// Acquisitions served by direct allocation
    pub fallback_acquisitions: u64,
    /// Fallback buffers not yet released
    pub live_fallback: usize,
}

impl PoolStats {
    /// `free + allocated == capacity` once the blocks exist
    pub fn is_consistent(&self) -> bool {
        !self.initialized || self.free + self.allocated == self.capacity
    }
}

// ============================================================================
// Shared State
// ============================================================================

struct PoolState {
    blocks: Vec<NonNull<u8>>,
    free: Vec<usize>,
    in_use: Vec<bool>,
    allocated_count: usize,
    bytes_in_use: usize,
    cumulative_bytes: u64,
    peak_bytes: usize,
    pooled_acquisitions: u64,
    fallback_acquisitions: u64,
    live_fallback: usize,
    init_failed: bool,
}

// SAFETY: the block pointers are owned exclusively by the state and only
// dereferenced by the buffer that currently holds the block.
unsafe impl Send for PoolState {}

impl PoolState {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            free: Vec::new(),
            in_use: Vec::new(),
            allocated_count: 0,
            bytes_in_use: 0,
            cumulative_bytes: 0,
            peak_bytes: 0,
            pooled_acquisitions: 0,
            fallback_acquisitions: 0,
            live_fallback: 0,
            init_failed: false,
        }
    }

    fn is_initialized(&self) -> bool {
        !self.blocks.is_empty()
    }

    fn initialize(&mut self, config: &PoolConfig) -> Result<()> {
        let layout = config.block_layout()?;
        let capacity = config.capacity;
        let bookkeeping_failure = || CognitiveError::AllocationFailure {
            requested: capacity.saturating_mul(mem::size_of::<NonNull<u8>>() + mem::size_of::<usize>() + 1),
        };

        let mut blocks: Vec<NonNull<u8>> = Vec::new();
        let mut free: Vec<usize> = Vec::new();
        let mut in_use: Vec<bool> = Vec::new();
        blocks.try_reserve_exact(capacity).map_err(|_| bookkeeping_failure())?;
        free.try_reserve_exact(capacity).map_err(|_| bookkeeping_failure())?;
        in_use.try_reserve_exact(capacity).map_err(|_| bookkeeping_failure())?;

        for _ in 0..config.capacity {
            // SAFETY: layout has a non-zero size, checked by `validate`.
            let raw = unsafe { alloc_zeroed(layout) };
            match NonNull::new(raw) {
                Some(block) => blocks.push(block),
                None => {
                    for block in blocks {
                        // SAFETY: allocated above with the same layout.
                        unsafe { dealloc(block.as_ptr(), layout) };
                    }
                    return Err(CognitiveError::AllocationFailure {
                        requested: capacity.saturating_mul(config.block_size),
                    });
                }
            }
        }

        free.extend(0..capacity);
        in_use.resize(capacity, false);
        self.blocks = blocks;
        self.free = free;
        self.in_use = in_use;

        info!(
            capacity = config.capacity,
            block_size = config.block_size,
            alignment = config.alignment,
            "Block pool initialized"
        );
        Ok(())
    }
}

pub(crate) struct PoolShared {
    config: PoolConfig,
    state: Mutex<PoolState>,
}

impl PoolShared {
    pub(crate) fn alignment(&self) -> usize {
        self.config.alignment
    }

    /// Return a buffer's memory along the path its origin dictates
    pub(crate) fn release(&self, ptr: NonNull<u8>, len: usize, origin: BufferOrigin) {
        match origin {
            BufferOrigin::Pooled(index) => {
                let mut state = self.state.lock();
                if !state.in_use.get(index).copied().unwrap_or(false) {
                    warn!(index, "Ignoring release of a block that is not allocated");
                    return;
                }
                state.in_use[index] = false;
                state.free.push(index);
                state.allocated_count -= 1;
                state.bytes_in_use = state.bytes_in_use.saturating_sub(len);
            }
            BufferOrigin::Fallback => {
                if let Ok(layout) = Layout::from_size_align(len, self.config.alignment) {
                    // SAFETY: the buffer was created by `acquire_fallback` with this layout.
                    unsafe { dealloc(ptr.as_ptr(), layout) };
                }
                let mut state = self.state.lock();
                state.live_fallback = state.live_fallback.saturating_sub(1);
            }
        }
    }
}

impl Drop for PoolShared {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if let Ok(layout) = self.config.block_layout() {
            for block in state.blocks.drain(..) {
                // SAFETY: every outstanding buffer holds an Arc to us, so no
                // block is referenced anymore.
                unsafe { dealloc(block.as_ptr(), layout) };
            }
        }
        debug!("Block pool torn down");
    }
}

// ============================================================================
// Pool Handle
// ============================================================================

/// Cloneable handle to an aligned block pool
///
/// Clones share the same blocks and counters. Pass the handle to every
/// allocating operation; nothing in this crate allocates tensor storage
/// behind the caller's back.
#[derive(Clone)]
pub struct BlockPool {
    shared: Arc<PoolShared>,
}

impl BlockPool {
    /// Create a pool. Blocks are allocated lazily on the first acquisition.
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(PoolShared {
                config,
                state: Mutex::new(PoolState::new()),
            }),
        })
    }

    /// Pool with the default geometry (1024 × 16 KiB, 32-byte aligned)
    pub fn with_defaults() -> Result<Self> {
        Self::new(PoolConfig::default())
    }

    /// Geometry this pool was created with
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Acquire a zero-filled buffer of at least `size` bytes
    ///
    /// Served from the pool when `size` fits in a block and a block is free,
    /// otherwise by a direct aligned allocation. A failed block sweep is logged
    /// once and not retried. Fails only when the direct allocation fails too.
    pub fn acquire(&self, size: usize) -> Result<AlignedBuffer> {
        if size == 0 {
            return Err(CognitiveError::InvalidArgument(
                "cannot acquire a zero-byte buffer".into(),
            ));
        }

        let config = &self.shared.config;
        if size <= config.block_size {
            let mut state = self.shared.state.lock();
            if !state.is_initialized() && !state.init_failed {
                if let Err(e) = state.initialize(config) {
                    state.init_failed = true;
                    warn!(
                        error = %e,
                        capacity = config.capacity,
                        block_size = config.block_size,
                        "Block pool initialization failed, using direct allocation"
                    );
                }
            }

            if let Some(index) = state.free.pop() {
                let block = state.blocks[index];
                state.in_use[index] = true;
                state.allocated_count += 1;
                state.bytes_in_use += size;
                state.cumulative_bytes += size as u64;
                state.peak_bytes = state.peak_bytes.max(state.bytes_in_use);
                state.pooled_acquisitions += 1;
                drop(state);

                // SAFETY: the block spans `block_size >= size` bytes and was
                // just removed from the free list, so nobody else touches it.
                unsafe { ptr::write_bytes(block.as_ptr(), 0, size) };
                return Ok(AlignedBuffer::new(
                    block,
                    size,
                    BufferOrigin::Pooled(index),
                    Arc::clone(&self.shared),
                ));
            }

            if !state.init_failed {
                warn!(size, capacity = config.capacity, "Block pool exhausted, falling back to direct allocation");
            }
        } else {
            debug!(size, block_size = config.block_size, "Request exceeds block size, using direct allocation");
        }

        self.acquire_fallback(size)
    }

    fn acquire_fallback(&self, size: usize) -> Result<AlignedBuffer> {
        let layout = Layout::from_size_align(size, self.shared.config.alignment)
            .map_err(|_| CognitiveError::AllocationFailure { requested: size })?;

        // SAFETY: size is non-zero.
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(CognitiveError::AllocationFailure { requested: size })?;

        {
            let mut state = self.shared.state.lock();
            state.fallback_acquisitions += 1;
            state.live_fallback += 1;
        }

        Ok(AlignedBuffer::new(
            ptr,
            size,
            BufferOrigin::Fallback,
            Arc::clone(&self.shared),
        ))
    }

    /// Snapshot of the accounting counters
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.state.lock();
        PoolStats {
            capacity: self.shared.config.capacity,
            block_size: self.shared.config.block_size,
            alignment: self.shared.config.alignment,
            initialized: state.is_initialized(),
            init_failed: state.init_failed,
            free: state.free.len(),
            allocated: state.allocated_count,
            bytes_in_use: state.bytes_in_use,
            cumulative_bytes: state.cumulative_bytes,
            peak_bytes: state.peak_bytes,
            pooled_acquisitions: state.pooled_acquisitions,
            fallback_acquisitions: state.fallback_acquisitions,
            live_fallback: state.live_fallback,
        }
    }

    /// Whether two handles refer to the same pool
    pub fn same_pool(&self, other: &BlockPool) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl fmt::Debug for BlockPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPool")
            .field("config", &self.shared.config)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_pool(capacity: usize) -> BlockPool {
        BlockPool::new(PoolConfig::default().with_capacity(capacity).with_block_size(256)).unwrap()
    }

    #[test]
    fn test_pool_is_lazy() {
        let pool = small_pool(4);
        let stats = pool.stats();
        assert!(!stats.initialized);
        assert_eq!(stats.free, 0);

        let _buf = pool.acquire(64).unwrap();
        let stats = pool.stats();
        assert!(stats.initialized);
        assert_eq!(stats.free, 3);
        assert_eq!(stats.allocated, 1);
    }

    #[test]
    fn test_pooled_acquire_is_aligned_and_zeroed() {
        let pool = small_pool(2);
        let buf = pool.acquire(128).unwrap();
        assert_eq!(buf.as_ptr() as usize % MIN_ALIGNMENT, 0);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(buf.len(), 128);
    }

    #[test]
    fn test_reused_block_is_zeroed_again() {
        let pool = small_pool(1);
        let mut buf = pool.acquire(64).unwrap();
        buf.as_bytes_mut().fill(0xAB);
        drop(buf);

        let buf = pool.acquire(64).unwrap();
        assert!(matches!(buf.origin(), BufferOrigin::Pooled(0)));
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_exhaustion_falls_back_without_corrupting_accounting() {
        let capacity = 4;
        let pool = small_pool(capacity);

        let held: Vec<_> = (0..capacity).map(|_| pool.acquire(200).unwrap()).collect();
        assert!(held.iter().all(|b| matches!(b.origin(), BufferOrigin::Pooled(_))));

        let extra = pool.acquire(200).unwrap();
        assert_eq!(extra.origin(), BufferOrigin::Fallback);
        assert_eq!(extra.as_ptr() as usize % MIN_ALIGNMENT, 0);

        let stats = pool.stats();
        assert_eq!(stats.free, 0);
        assert_eq!(stats.allocated, capacity);
        assert_eq!(stats.fallback_acquisitions, 1);
        assert_eq!(stats.live_fallback, 1);
        assert!(stats.is_consistent());

        drop(extra);
        let stats = pool.stats();
        assert_eq!(stats.live_fallback, 0);
        assert_eq!(stats.allocated, capacity);

        drop(held);
        let stats = pool.stats();
        assert_eq!(stats.free, capacity);
        assert_eq!(stats.allocated, 0);
        assert_eq!(stats.bytes_in_use, 0);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_oversized_request_uses_fallback() {
        let pool = small_pool(2);
        let buf = pool.acquire(1024).unwrap();
        assert_eq!(buf.origin(), BufferOrigin::Fallback);
        assert_eq!(buf.len(), 1024);
        // Fallback does not force block allocation
        assert!(!pool.stats().initialized);
    }

    #[test]
    fn test_peak_and_cumulative_counters() {
        let pool = small_pool(4);
        let a = pool.acquire(100).unwrap();
        let b = pool.acquire(50).unwrap();
        drop(a);
        let _c = pool.acquire(10).unwrap();
        drop(b);

        let stats = pool.stats();
        assert_eq!(stats.cumulative_bytes, 160);
        assert_eq!(stats.peak_bytes, 150);
        assert_eq!(stats.bytes_in_use, 10);
        assert_eq!(stats.pooled_acquisitions, 3);
    }

    #[test]
    fn test_zero_size_rejected() {
        let pool = small_pool(1);
        assert!(matches!(pool.acquire(0), Err(CognitiveError::InvalidArgument(_))));
    }

    #[test]
    fn test_config_validation() {
        assert!(PoolConfig::default().validate().is_ok());
        assert!(PoolConfig::default().with_capacity(0).validate().is_err());
        assert!(PoolConfig::default().with_alignment(16).validate().is_err());
        assert!(PoolConfig::default().with_alignment(48).validate().is_err());
        assert!(PoolConfig::default().with_block_size(100).validate().is_err());
        assert!(PoolConfig::default().with_alignment(64).with_block_size(128).validate().is_ok());
        assert!(matches!(
            BlockPool::new(PoolConfig::default().with_capacity(0)),
            Err(CognitiveError::Config(_))
        ));
    }

    #[test]
    fn test_config_rejects_unaddressable_total() {
        let config = PoolConfig::default().with_capacity(usize::MAX / 2);
        assert!(matches!(config.validate(), Err(CognitiveError::Config(_))));
        assert!(matches!(config.total_bytes(), Err(CognitiveError::Config(_))));

        let config = PoolConfig::default().with_capacity(4).with_block_size(256);
        assert_eq!(config.total_bytes().unwrap(), 1024);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_failed_initialization_falls_back() {
        // Passes validation, but the block table alone needs 2^60 bytes
        let pool = BlockPool::new(PoolConfig::default().with_capacity(1 << 57).with_block_size(32)).unwrap();

        let buf = pool.acquire(16).unwrap();
        assert_eq!(buf.origin(), BufferOrigin::Fallback);
        assert_eq!(buf.as_ptr() as usize % MIN_ALIGNMENT, 0);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));

        let again = pool.acquire(32).unwrap();
        assert_eq!(again.origin(), BufferOrigin::Fallback);

        let stats = pool.stats();
        assert!(stats.init_failed);
        assert!(!stats.initialized);
        assert_eq!(stats.fallback_acquisitions, 2);
        assert_eq!(stats.pooled_acquisitions, 0);
        assert!(stats.is_consistent());

        drop(buf);
        drop(again);
        assert_eq!(pool.stats().live_fallback, 0);
    }

    #[test]
    fn test_buffer_outlives_pool_handle() {
        let pool = small_pool(2);
        let buf = pool.acquire(32).unwrap();
        drop(pool);
        assert_eq!(buf.len(), 32);
        drop(buf);
    }

    #[test]
    fn test_clones_share_state() {
        let pool = small_pool(2);
        let other = pool.clone();
        let _buf = other.acquire(16).unwrap();
        assert!(pool.same_pool(&other));
        assert_eq!(pool.stats().allocated, 1);
    }

    #[test]
    fn test_pool_shared_across_threads() {
        let pool = small_pool(8);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let buf = pool.acquire(64).unwrap();
                        assert_eq!(buf.len(), 64);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let stats = pool.stats();
        assert_eq!(stats.allocated, 0);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_stats_serialization() {
        let pool = small_pool(2);
        let _buf = pool.acquire(8).unwrap();
        let stats = pool.stats();
        let json = serde_json::to_string(&stats).unwrap();
        let parsed: PoolStats = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, parsed);
    }
}
