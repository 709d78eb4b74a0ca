//! Page-grained chunk acquisition.

use core::ptr::NonNull;

use crate::error::AllocResult;
use crate::growth::GrowthPrimitive;
use crate::size_class::CHUNK_SIZE;

/// Pulls fixed-size chunks from the growth primitive and counts them.
///
/// Chunks are the only currency between the pooled path and the OS: every
/// refill costs exactly one chunk, and chunks are never given back.
#[derive(Debug)]
pub(crate) struct ChunkSource<G> {
    growth: G,
    chunks_acquired: u64,
}

impl<G: GrowthPrimitive> ChunkSource<G> {
    pub(crate) fn new(growth: G) -> Self {
        Self { growth, chunks_acquired: 0 }
    }

    /// Acquires one fresh chunk of [`CHUNK_SIZE`] bytes.
    pub(crate) fn acquire(&mut self) -> AllocResult<NonNull<u8>> {
        let chunk = self.growth.grow(CHUNK_SIZE)?;
        self.chunks_acquired += 1;
        Ok(chunk)
    }

    /// Chunks acquired over the lifetime of this source.
    pub(crate) fn chunks_acquired(&self) -> u64 {
        self.chunks_acquired
    }
}
