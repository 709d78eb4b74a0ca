//! Block metadata encoding.
//!
//! Every region handed out carries a one-word header immediately before the
//! payload. The word holds the block's full size in bytes: a pooled class
//! size while the block belongs to a size class, or the exact total passed
//! to the bulk backend for oversized requests. Release reads this word back
//! to route the pointer, with no external bookkeeping table.
//!
//! A pooled block is a two-state record:
//!
//! - **Allocated** — the header word is valid and the payload belongs to
//!   the caller.
//! - **Free** — the header word still holds the class size, and the first
//!   word of the payload is reinterpreted as the link to the next free
//!   block of the same class. The link is only ever valid in this state.
//!
//! All reads and writes of either word go through [`Block`]; nothing else
//! in the crate touches raw header bytes.

use core::ptr::NonNull;

use crate::size_class::{CHUNK_SIZE, HEADER_SIZE, MIN_BLOCK_SIZE};

/// Handle to one block, pooled or bulk. Points at the header word, not the
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Block {
    ptr: NonNull<u8>,
}

impl Block {
    /// Wraps a pointer to the start (header word) of a block.
    ///
    /// # Safety
    /// `ptr` must point at a word-aligned region large enough for the
    /// header and the payload it will front.
    pub(crate) unsafe fn from_raw(ptr: NonNull<u8>) -> Self {
        Block { ptr }
    }

    /// Recovers the block from a payload pointer previously produced by
    /// [`Block::payload`].
    ///
    /// # Safety
    /// `payload` must be a live payload pointer handed out by this crate.
    pub(crate) unsafe fn from_payload(payload: NonNull<u8>) -> Self {
        // SAFETY: the header word sits immediately before the payload by
        // construction; the caller guarantees `payload` came from us.
        let ptr = unsafe { NonNull::new_unchecked(payload.as_ptr().sub(HEADER_SIZE)) };
        Block { ptr }
    }

    /// Pointer to the caller-visible payload region.
    #[inline]
    pub(crate) fn payload(self) -> NonNull<u8> {
        // SAFETY: every block is at least HEADER_SIZE + one word long, so
        // the payload start is in bounds.
        unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(HEADER_SIZE)) }
    }

    /// Pointer to the block start — what the bulk backend mapped.
    #[inline]
    pub(crate) fn as_ptr(self) -> NonNull<u8> {
        self.ptr
    }

    /// Reads the header tag: a pooled class block size, or a bulk total.
    ///
    /// # Safety
    /// The block must be live: stamped by a refill or a bulk request and
    /// not handed back to the bulk backend since.
    pub(crate) unsafe fn tag(self) -> usize {
        // SAFETY: the caller guarantees the header word is initialized; the
        // block start is word-aligned in both the pooled and bulk layouts.
        let tag = unsafe { self.ptr.as_ptr().cast::<usize>().read() };
        debug_assert!(
            Self::plausible_tag(tag),
            "header tag {tag:#x} does not belong to this allocator"
        );
        tag
    }

    /// Stamps the header tag.
    ///
    /// # Safety
    /// `self` must point at least `HEADER_SIZE` exclusively owned, writable
    /// bytes.
    pub(crate) unsafe fn set_tag(self, tag: usize) {
        debug_assert!(Self::plausible_tag(tag));
        // SAFETY: caller guarantees exclusive ownership of the header word.
        unsafe { self.ptr.as_ptr().cast::<usize>().write(tag) };
    }

    /// Reads the next-free link. Free state only.
    ///
    /// # Safety
    /// The block must currently be on a free list, so its payload word is a
    /// link written by [`Block::set_next_free`].
    pub(crate) unsafe fn next_free(self) -> Option<Block> {
        // SAFETY: in the free state the payload's first word is the link.
        let raw = unsafe { self.payload().as_ptr().cast::<*mut u8>().read() };
        NonNull::new(raw).map(|ptr| Block { ptr })
    }

    /// Writes the next-free link, switching the payload word into the free
    /// state.
    ///
    /// # Safety
    /// The payload must have returned to allocator ownership; no caller may
    /// still hold it.
    pub(crate) unsafe fn set_next_free(self, next: Option<Block>) {
        let raw = next.map_or(core::ptr::null_mut(), |block| block.ptr.as_ptr());
        // SAFETY: the allocator owns the payload again and the first word
        // is word-aligned.
        unsafe { self.payload().as_ptr().cast::<*mut u8>().write(raw) };
    }

    /// `true` for values the header word can legally hold: one of the
    /// pooled class sizes, or a bulk total (always larger than a chunk).
    fn plausible_tag(tag: usize) -> bool {
        tag > CHUNK_SIZE || (tag.is_power_of_two() && tag >= MIN_BLOCK_SIZE)
    }
}
