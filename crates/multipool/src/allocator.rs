//! The allocation engine: pooled/bulk dispatch over the four operations.
//!
//! A request of `size` bytes is routed by one rule: if `size + HEADER_SIZE`
//! fits in a chunk it is pooled — classified onto a size class and served
//! from that class's free list, refilling one chunk on a miss — otherwise
//! it goes 1:1 through the bulk backend. The header written in front of
//! every payload records which way the request went, so release needs
//! nothing but the pointer.
//!
//! The only failure mode is backend exhaustion; a failed request leaves
//! every existing allocation and free list exactly as it found them.

use core::ptr::{self, NonNull};

use crate::block::Block;
use crate::bulk::{BulkBackend, MmapBulk};
use crate::config::AllocatorConfig;
use crate::error::{AllocError, AllocResult};
use crate::growth::{GrowthPrimitive, MmapGrowth};
use crate::registry::Registry;
use crate::size_class::{CHUNK_SIZE, HEADER_SIZE, SizeClass, classify};
use crate::stats::AllocatorStats;

/// Segregated free-list allocator with a bulk fallback.
///
/// One instance is one fully independent heap: the free-list registry, the
/// growth primitive and the bulk backend all live inside the context
/// object, so tests and multi-heap hosts can run any number of instances
/// side by side.
///
/// # Contract
///
/// - Payload pointers stay valid until passed to [`release`](Self::release)
///   or moved by [`reallocate`](Self::reallocate); they are aligned to the
///   machine word.
/// - Only pointers returned by this instance, and not yet released, may be
///   passed back in. Anything else is undefined behavior, caught by debug
///   assertions on a best-effort basis.
/// - Single-threaded by design: every operation takes `&mut self`. Wrap
///   the instance in [`LockedAllocator`](crate::LockedAllocator) for shared
///   use.
///
/// Memory acquired from the growth primitive is never returned; bulk
/// regions are returned 1:1 on release.
pub struct MultiPoolAllocator<G = MmapGrowth, B = MmapBulk>
where
    G: GrowthPrimitive,
    B: BulkBackend,
{
    registry: Registry<G>,
    bulk: B,
    config: AllocatorConfig,
    stats: AllocatorStats,
    prewarmed: bool,
}

impl MultiPoolAllocator {
    /// Creates an allocator backed by the production mmap growth primitive
    /// and bulk backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AllocatorConfig::default())
    }

    /// Same as [`new`](Self::new) with explicit configuration.
    #[must_use]
    pub fn with_config(config: AllocatorConfig) -> Self {
        Self::with_backends(MmapGrowth, MmapBulk, config)
    }
}

impl Default for MultiPoolAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GrowthPrimitive, B: BulkBackend> MultiPoolAllocator<G, B> {
    /// Creates an allocator over caller-supplied backends — the seam for
    /// deterministic tests and custom deployments.
    ///
    /// Construction acquires nothing; the first chunk is pulled on the
    /// first pooled request (or by [`prewarm`](Self::prewarm)).
    pub fn with_backends(growth: G, bulk: B, config: AllocatorConfig) -> Self {
        Self {
            registry: Registry::new(growth),
            bulk,
            config,
            stats: AllocatorStats::default(),
            prewarmed: false,
        }
    }

    /// Allocates `size` bytes and returns the payload pointer.
    ///
    /// `Ok(None)` is the defined outcome for `size == 0`: no memory is
    /// reserved, and the sentinel is accepted by
    /// [`reallocate`](Self::reallocate) and [`release`](Self::release).
    /// Requests up to [`MAX_POOLED_PAYLOAD`](crate::MAX_POOLED_PAYLOAD)
    /// bytes come from the size-class pools; larger ones from the bulk
    /// backend.
    ///
    /// # Errors
    /// [`AllocError::GrowthExhausted`] or [`AllocError::BulkExhausted`]
    /// when the respective backend cannot supply memory.
    pub fn allocate(&mut self, size: usize) -> AllocResult<Option<NonNull<u8>>> {
        if size == 0 {
            return Ok(None);
        }
        match self.allocate_block(size) {
            Ok(block) => {
                if let Some(pattern) = self.config.alloc_pattern {
                    // SAFETY: the payload holds at least `size` writable
                    // bytes and now belongs to the caller.
                    unsafe { ptr::write_bytes(block.payload().as_ptr(), pattern, size) };
                }
                Ok(Some(block.payload()))
            }
            Err(err) => {
                if self.config.track_stats {
                    self.stats.failed_allocs += 1;
                }
                Err(err)
            }
        }
    }

    /// Allocates a zero-filled region for `count` elements of `size` bytes
    /// each.
    ///
    /// The multiplication is overflow-checked before any memory moves; an
    /// overflowing request fails cleanly without allocating.
    ///
    /// # Errors
    /// [`AllocError::SizeOverflow`] when `count * size` exceeds `usize`,
    /// plus everything [`allocate`](Self::allocate) can return.
    pub fn allocate_zeroed(&mut self, count: usize, size: usize) -> AllocResult<Option<NonNull<u8>>> {
        let Some(total) = count.checked_mul(size) else {
            if self.config.track_stats {
                self.stats.failed_allocs += 1;
            }
            return Err(AllocError::size_overflow(count, size));
        };
        let payload = self.allocate(total)?;
        if let Some(ptr) = payload {
            // SAFETY: allocate returned a live payload of at least `total`
            // bytes.
            unsafe { ptr::write_bytes(ptr.as_ptr(), 0, total) };
        }
        Ok(payload)
    }

    /// Resizes an allocation, preserving the payload prefix.
    ///
    /// The no-allocation sentinel behaves as a plain
    /// [`allocate`](Self::allocate). When the new size still fits the
    /// block's current capacity the same pointer is returned unchanged —
    /// including on shrink, which deliberately keeps the block's class and
    /// header untouched (space traded for simplicity). Only when the new
    /// size needs a bigger block is a new region allocated,
    /// `min(old usable size, size)` bytes copied, and the old block
    /// released.
    ///
    /// # Errors
    /// Same failure modes as [`allocate`](Self::allocate); on error the old
    /// block is untouched and still valid.
    ///
    /// # Safety
    /// `ptr`, when `Some`, must be a live payload pointer from this
    /// instance.
    pub unsafe fn reallocate(
        &mut self,
        ptr: Option<NonNull<u8>>,
        size: usize,
    ) -> AllocResult<Option<NonNull<u8>>> {
        let Some(payload) = ptr else {
            return self.allocate(size);
        };
        // SAFETY: the caller passes a live payload pointer from this
        // instance.
        let block = unsafe { Block::from_payload(payload) };
        // SAFETY: the block is live, so its header is valid.
        let tag = unsafe { block.tag() };
        let usable = tag - HEADER_SIZE;

        let needed = match classify(size) {
            Some(class) => class.block_size(),
            None => size
                .checked_add(HEADER_SIZE)
                .ok_or(AllocError::size_overflow(1, size))?,
        };
        if needed <= tag {
            if self.config.track_stats {
                self.stats.realloc_in_place += 1;
            }
            return Ok(Some(payload));
        }

        // `needed > tag >= MIN_BLOCK_SIZE` rules out `size == 0` here, so
        // the fresh allocation cannot be the sentinel.
        let new_ptr = self
            .allocate(size)?
            .expect("a grown reallocation has a non-zero size");
        let copy_len = usable.min(size);
        // SAFETY: source and destination are distinct live payloads and
        // `copy_len` does not exceed either region.
        unsafe { ptr::copy_nonoverlapping(payload.as_ptr(), new_ptr.as_ptr(), copy_len) };
        // SAFETY: the old payload came from this instance and its contents
        // have been copied out.
        unsafe { self.release(Some(payload)) };
        if self.config.track_stats {
            self.stats.realloc_moves += 1;
        }
        Ok(Some(new_ptr))
    }

    /// Releases an allocation. The no-allocation sentinel is a no-op.
    ///
    /// The header routes the pointer: a tag larger than a chunk is a bulk
    /// total handed back to the backend byte-identically; otherwise the tag
    /// is the class block size and the block goes back onto that class's
    /// free-list head, immediately eligible for the next allocation of the
    /// same class. Pooled memory is never returned to the growth primitive
    /// and adjacent blocks are never coalesced.
    ///
    /// # Safety
    /// `ptr`, when `Some`, must be a live payload pointer from this
    /// instance. Releasing twice, or releasing a pointer from elsewhere, is
    /// undefined behavior.
    pub unsafe fn release(&mut self, ptr: Option<NonNull<u8>>) {
        let Some(payload) = ptr else { return };
        // SAFETY: the caller passes a live payload pointer from this
        // instance.
        let block = unsafe { Block::from_payload(payload) };
        // SAFETY: the block is live, so its header is valid.
        let tag = unsafe { block.tag() };

        if tag > CHUNK_SIZE {
            #[cfg(feature = "logging")]
            tracing::trace!(total = tag, "bulk region released");
            if self.config.track_stats {
                self.stats.bulk_releases += 1;
            }
            // SAFETY: the tag is the exact total recorded at request time
            // and `block.as_ptr()` is the region the backend returned.
            unsafe { self.bulk.release_region(block.as_ptr(), tag) };
            return;
        }

        let class = SizeClass::from_block_size(tag);
        if let Some(pattern) = self.config.release_pattern {
            // SAFETY: the payload is back under allocator ownership.
            unsafe { ptr::write_bytes(payload.as_ptr(), pattern, class.payload_size()) };
        }
        if self.config.track_stats {
            self.stats.pooled_releases += 1;
        }
        // SAFETY: the header says the block is exactly `class`-sized, and
        // ownership has returned to the allocator.
        unsafe { self.registry.push(class, block) };
    }

    /// Payload capacity of a live allocation in bytes — at least the size
    /// requested, possibly more from class rounding.
    ///
    /// # Safety
    /// `ptr` must be a live payload pointer from this instance.
    #[must_use]
    pub unsafe fn usable_size(&self, ptr: NonNull<u8>) -> usize {
        // SAFETY: the caller passes a live payload pointer, so the header
        // in front of it is valid.
        let tag = unsafe { Block::from_payload(ptr).tag() };
        tag - HEADER_SIZE
    }

    /// Pre-populates every empty size class with one chunk.
    ///
    /// The eager variant of the otherwise lazy per-class refill: pays all
    /// chunk acquisitions up front so no first-touch latency is left in
    /// the steady state. Idempotent; also triggered by
    /// [`AllocatorConfig::prewarm`] on the first allocation.
    ///
    /// # Errors
    /// Stops at the first growth failure; classes already filled stay
    /// filled.
    pub fn prewarm(&mut self) -> AllocResult<()> {
        for class in SizeClass::all() {
            if self.registry.is_empty(class) {
                self.registry.refill(class)?;
            }
        }
        self.prewarmed = true;
        Ok(())
    }

    /// Snapshot of the operation counters.
    #[must_use]
    pub fn stats(&self) -> AllocatorStats {
        AllocatorStats {
            chunks_acquired: self.registry.chunks_acquired(),
            bytes_from_os: self.registry.chunks_acquired() * CHUNK_SIZE as u64,
            ..self.stats
        }
    }

    /// The configuration this instance was built with.
    #[must_use]
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    fn allocate_block(&mut self, size: usize) -> AllocResult<Block> {
        if self.config.prewarm && !self.prewarmed {
            self.prewarm()?;
        }
        match classify(size) {
            Some(class) => self.pooled_block(class),
            None => self.bulk_block(size),
        }
    }

    /// Pops a block of `class`, refilling the class from one fresh chunk on
    /// a miss. The second pop cannot miss: a refill installs at least one
    /// block.
    fn pooled_block(&mut self, class: SizeClass) -> AllocResult<Block> {
        let block = match self.registry.pop(class) {
            Some(block) => block,
            None => {
                self.registry.refill(class)?;
                self.registry
                    .pop(class)
                    .expect("a freshly refilled class has at least one free block")
            }
        };
        if self.config.track_stats {
            self.stats.pooled_allocs += 1;
        }
        Ok(block)
    }

    /// Requests `size + HEADER_SIZE` bytes from the bulk backend and
    /// records the exact total in the header so release can hand back the
    /// identical size.
    fn bulk_block(&mut self, size: usize) -> AllocResult<Block> {
        let total = size
            .checked_add(HEADER_SIZE)
            .ok_or(AllocError::size_overflow(1, size))?;
        let region = self.bulk.request_region(total)?;
        #[cfg(feature = "logging")]
        tracing::trace!(total, "bulk region requested");
        // SAFETY: the backend just mapped at least `total` writable bytes
        // at `region`.
        let block = unsafe { Block::from_raw(region) };
        // SAFETY: the region is exclusively ours; `total > CHUNK_SIZE`, so
        // the tag reads back as bulk.
        unsafe { block.set_tag(total) };
        if self.config.track_stats {
            self.stats.bulk_allocs += 1;
        }
        Ok(block)
    }
}

// SAFETY: the allocator exclusively owns every region it has mapped; the
// raw pointers inside it are not shared by the type itself, so moving the
// whole context to another thread is sound as long as the outstanding
// payload pointers move with it.
unsafe impl<G, B> Send for MultiPoolAllocator<G, B>
where
    G: GrowthPrimitive + Send,
    B: BulkBackend + Send,
{
}
