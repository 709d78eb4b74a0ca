//! Operation counters.

/// Snapshot of allocator activity since construction.
///
/// Chunk counters are always exact; the remaining counters are only
/// maintained when [`AllocatorConfig::track_stats`](crate::AllocatorConfig)
/// is set. The single-threaded core keeps them as plain integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Pooled blocks handed out.
    pub pooled_allocs: u64,
    /// Pooled blocks returned to a free list.
    pub pooled_releases: u64,
    /// Chunks acquired from the growth primitive.
    pub chunks_acquired: u64,
    /// Bytes acquired from the growth primitive.
    pub bytes_from_os: u64,
    /// Regions taken from the bulk backend.
    pub bulk_allocs: u64,
    /// Regions handed back to the bulk backend.
    pub bulk_releases: u64,
    /// Reallocations satisfied in place by the existing block.
    pub realloc_in_place: u64,
    /// Reallocations that moved the payload to a new block.
    pub realloc_moves: u64,
    /// Requests that failed with an error.
    pub failed_allocs: u64,
}
