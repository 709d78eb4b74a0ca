//! Mutex wrapper for shared use.

use core::ptr::NonNull;

use parking_lot::Mutex;

use crate::allocator::MultiPoolAllocator;
use crate::bulk::{BulkBackend, MmapBulk};
use crate::error::AllocResult;
use crate::growth::{GrowthPrimitive, MmapGrowth};
use crate::stats::AllocatorStats;

/// A [`MultiPoolAllocator`] behind a single mutex.
///
/// The pooled core is single-threaded by design; this wrapper serializes
/// every operation through one `parking_lot::Mutex`, which is the whole of
/// its thread-safety story. Hosts that allocate heavily from many threads
/// should prefer one allocator instance per thread over one shared
/// wrapper.
pub struct LockedAllocator<G = MmapGrowth, B = MmapBulk>
where
    G: GrowthPrimitive,
    B: BulkBackend,
{
    inner: Mutex<MultiPoolAllocator<G, B>>,
}

impl LockedAllocator {
    /// Wraps a default-configured allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::from_allocator(MultiPoolAllocator::new())
    }
}

impl Default for LockedAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GrowthPrimitive, B: BulkBackend> LockedAllocator<G, B> {
    /// Wraps an existing context object.
    pub fn from_allocator(inner: MultiPoolAllocator<G, B>) -> Self {
        Self { inner: Mutex::new(inner) }
    }

    /// See [`MultiPoolAllocator::allocate`].
    pub fn allocate(&self, size: usize) -> AllocResult<Option<NonNull<u8>>> {
        self.inner.lock().allocate(size)
    }

    /// See [`MultiPoolAllocator::allocate_zeroed`].
    pub fn allocate_zeroed(&self, count: usize, size: usize) -> AllocResult<Option<NonNull<u8>>> {
        self.inner.lock().allocate_zeroed(count, size)
    }

    /// See [`MultiPoolAllocator::reallocate`].
    ///
    /// # Safety
    /// Same contract: `ptr`, when `Some`, must be a live payload pointer
    /// from this allocator.
    pub unsafe fn reallocate(
        &self,
        ptr: Option<NonNull<u8>>,
        size: usize,
    ) -> AllocResult<Option<NonNull<u8>>> {
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.lock().reallocate(ptr, size) }
    }

    /// See [`MultiPoolAllocator::release`].
    ///
    /// # Safety
    /// Same contract: `ptr`, when `Some`, must be a live payload pointer
    /// from this allocator, released at most once.
    pub unsafe fn release(&self, ptr: Option<NonNull<u8>>) {
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.lock().release(ptr) };
    }

    /// See [`MultiPoolAllocator::usable_size`].
    ///
    /// # Safety
    /// `ptr` must be a live payload pointer from this allocator.
    pub unsafe fn usable_size(&self, ptr: NonNull<u8>) -> usize {
        // SAFETY: forwarded caller contract.
        unsafe { self.inner.lock().usable_size(ptr) }
    }

    /// See [`MultiPoolAllocator::prewarm`].
    pub fn prewarm(&self) -> AllocResult<()> {
        self.inner.lock().prewarm()
    }

    /// See [`MultiPoolAllocator::stats`].
    #[must_use]
    pub fn stats(&self) -> AllocatorStats {
        self.inner.lock().stats()
    }
}
