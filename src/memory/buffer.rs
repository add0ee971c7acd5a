//! Origin-tagged aligned buffers

use crate::memory::pool::PoolShared;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::mem;
use std::ptr::NonNull;
use std::slice;
use std::sync::Arc;

/// Where a buffer's memory came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferOrigin {
    /// Block `index` of the owning pool
    Pooled(usize),
    /// Direct aligned allocation outside the pool
    Fallback,
}

/// Zero-initialized, aligned byte buffer with single ownership
///
/// Dropping the buffer hands its memory back through the path that matches
/// its [`BufferOrigin`], exactly once.
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    len: usize,
    origin: BufferOrigin,
    pool: Arc<PoolShared>,
}

// SAFETY: the buffer has exclusive access to its memory region; the pool
// bookkeeping it points back to is behind a mutex.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    pub(crate) fn new(ptr: NonNull<u8>, len: usize, origin: BufferOrigin, pool: Arc<PoolShared>) -> Self {
        Self { ptr, len, origin, pool }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false for buffers handed out by a pool
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pooled block or fallback allocation
    pub fn origin(&self) -> BufferOrigin {
        self.origin
    }

    /// Alignment guaranteed for [`as_ptr`](Self::as_ptr)
    pub fn alignment(&self) -> usize {
        self.pool.alignment()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: ptr is valid for `len` initialized bytes for our lifetime.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// View as `f32` elements (trailing bytes that do not fill an element are ignored)
    pub fn as_f32(&self) -> &[f32] {
        // SAFETY: alignment >= 32 satisfies f32 alignment, memory is
        // initialized and every bit pattern is a valid f32.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr() as *const f32, self.len / mem::size_of::<f32>()) }
    }

    pub fn as_f32_mut(&mut self) -> &mut [f32] {
        // SAFETY: see `as_f32`; `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr() as *mut f32, self.len / mem::size_of::<f32>()) }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        self.pool.release(self.ptr, self.len, self.origin);
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("origin", &self.origin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{BlockPool, PoolConfig};

    #[test]
    fn test_f32_view_covers_whole_elements() {
        let pool = BlockPool::new(PoolConfig::default().with_capacity(1)).unwrap();
        let mut buf = pool.acquire(10 * mem::size_of::<f32>()).unwrap();
        assert_eq!(buf.as_f32().len(), 10);

        buf.as_f32_mut()[3] = 2.5;
        assert_eq!(buf.as_f32()[3], 2.5);
        assert_eq!(buf.as_ptr() as usize % buf.alignment(), 0);
    }

    #[test]
    fn test_drop_returns_block_once() {
        let pool = BlockPool::new(PoolConfig::default().with_capacity(2)).unwrap();
        let buf = pool.acquire(64).unwrap();
        assert_eq!(pool.stats().free, 1);
        drop(buf);
        let stats = pool.stats();
        assert_eq!(stats.free, 2);
        assert_eq!(stats.allocated, 0);
    }

    #[test]
    fn test_origin_serialization() {
        let json = serde_json::to_string(&BufferOrigin::Pooled(3)).unwrap();
        let parsed: BufferOrigin = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, BufferOrigin::Pooled(3));
    }
}
