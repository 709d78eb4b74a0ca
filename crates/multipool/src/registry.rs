//! Per-class free lists and chunk refill.
//!
//! One singly linked LIFO list per size class. `pop` and `push` are O(1)
//! head operations; `refill` slices one fresh chunk into equal blocks,
//! stamps every header with the class block size, and installs the threaded
//! chain as the new list. A refill replaces the head rather than merging —
//! it only ever runs against an empty list.
//!
//! # Safety
//!
//! The free lists are intrusive: a free block's payload word is the link to
//! the next free block (see [`crate::block`]). The invariants are:
//!
//! - every block on class `i`'s list is exactly class `i`'s block size, and
//!   its header says so;
//! - a list head is either `None` or a block the registry exclusively owns;
//! - blocks never change class, split or merge after the chunk is sliced.

use core::ptr::NonNull;

use crate::block::Block;
use crate::chunk::ChunkSource;
use crate::error::AllocResult;
use crate::growth::GrowthPrimitive;
use crate::size_class::{CHUNK_SIZE, CLASS_COUNT, SizeClass};
use crate::utils::is_aligned;

/// Head of one class's free list.
#[derive(Debug)]
struct FreeList {
    head: Option<Block>,
}

impl FreeList {
    const EMPTY: FreeList = FreeList { head: None };
}

/// The free-list table: one list per size class, plus the chunk source
/// feeding them.
#[derive(Debug)]
pub(crate) struct Registry<G> {
    lists: [FreeList; CLASS_COUNT],
    source: ChunkSource<G>,
}

impl<G: GrowthPrimitive> Registry<G> {
    pub(crate) fn new(growth: G) -> Self {
        Self {
            lists: [FreeList::EMPTY; CLASS_COUNT],
            source: ChunkSource::new(growth),
        }
    }

    /// Detaches and returns the head block of `class`'s list, if any. Does
    /// not refill on a miss.
    pub(crate) fn pop(&mut self, class: SizeClass) -> Option<Block> {
        let list = &mut self.lists[class.index()];
        let block = list.head?;
        // SAFETY: every block on a free list is in the free state, so its
        // payload word is a link written by push or refill.
        list.head = unsafe { block.next_free() };
        Some(block)
    }

    /// Pushes a released block back onto `class`'s list head.
    ///
    /// # Safety
    /// `block` must be a block of exactly `class`'s size that this
    /// allocator handed out and the caller no longer uses.
    pub(crate) unsafe fn push(&mut self, class: SizeClass, block: Block) {
        let list = &mut self.lists[class.index()];
        // SAFETY: ownership of the payload just returned to the allocator;
        // writing the link switches the block into the free state.
        unsafe { block.set_next_free(list.head) };
        list.head = Some(block);
    }

    /// Whether `class`'s list currently has no free blocks.
    pub(crate) fn is_empty(&self, class: SizeClass) -> bool {
        self.lists[class.index()].head.is_none()
    }

    /// Acquires one chunk, slices it into `class`-sized blocks and installs
    /// them as the new list. Leaves the registry untouched on failure.
    pub(crate) fn refill(&mut self, class: SizeClass) -> AllocResult<()> {
        debug_assert!(self.is_empty(class), "refill of a non-empty class");

        let chunk = self.source.acquire()?;
        debug_assert!(is_aligned(chunk.as_ptr() as usize, CHUNK_SIZE));

        let block_size = class.block_size();
        let count = class.blocks_per_chunk();

        // Thread the chain back to front so the head lands on the chunk
        // start and the last block terminates the list.
        let mut next: Option<Block> = None;
        for i in (0..count).rev() {
            // SAFETY: `i * block_size` stays inside the freshly acquired
            // chunk, and every block start is word-aligned within it.
            let block = unsafe {
                Block::from_raw(NonNull::new_unchecked(chunk.as_ptr().add(i * block_size)))
            };
            // SAFETY: the chunk is exclusively ours and writable.
            unsafe {
                block.set_tag(block_size);
                block.set_next_free(next);
            }
            next = Some(block);
        }
        self.lists[class.index()].head = next;

        #[cfg(feature = "logging")]
        tracing::trace!(
            class = class.index(),
            block_size,
            blocks = count,
            "refilled free list from a fresh chunk"
        );

        Ok(())
    }

    /// Chunks acquired from the growth primitive so far.
    pub(crate) fn chunks_acquired(&self) -> u64 {
        self.source.chunks_acquired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AllocError;
    use crate::size_class::classify;
    use std::alloc::{Layout, alloc};

    /// Chunk-aligned leaky growth; regions are never reclaimed, matching
    /// the trait contract.
    struct LeakyGrowth;

    impl GrowthPrimitive for LeakyGrowth {
        fn grow(&mut self, len: usize) -> AllocResult<NonNull<u8>> {
            let layout = Layout::from_size_align(len, CHUNK_SIZE).unwrap();
            // SAFETY: layout has non-zero size.
            let raw = unsafe { alloc(layout) };
            NonNull::new(raw).ok_or(AllocError::growth_exhausted(len))
        }
    }

    #[test]
    fn refill_installs_every_block_of_the_chunk() {
        let mut registry = Registry::new(LeakyGrowth);
        let class = classify(100).unwrap();
        registry.refill(class).unwrap();

        let mut blocks = Vec::new();
        while let Some(block) = registry.pop(class) {
            assert_eq!(unsafe { block.tag() }, class.block_size());
            blocks.push(block);
        }
        assert_eq!(blocks.len(), class.blocks_per_chunk());
        assert_eq!(registry.chunks_acquired(), 1);

        // All blocks are distinct and block_size apart within one chunk.
        let mut addrs: Vec<usize> = blocks.iter().map(|b| b.payload().as_ptr() as usize).collect();
        addrs.sort_unstable();
        addrs.dedup();
        assert_eq!(addrs.len(), blocks.len());
        assert_eq!(addrs.last().unwrap() - addrs.first().unwrap(), CHUNK_SIZE - class.block_size());
    }

    #[test]
    fn push_pop_is_lifo() {
        let mut registry = Registry::new(LeakyGrowth);
        let class = classify(10).unwrap();
        registry.refill(class).unwrap();

        let first = registry.pop(class).unwrap();
        let second = registry.pop(class).unwrap();
        unsafe {
            registry.push(class, first);
            registry.push(class, second);
        }
        assert_eq!(registry.pop(class), Some(second));
        assert_eq!(registry.pop(class), Some(first));
    }
}
