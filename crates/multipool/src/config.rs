//! Allocator configuration.

/// Tunables for [`MultiPoolAllocator`](crate::MultiPoolAllocator).
///
/// The defaults are the production choice: lazy per-class refill, no
/// counters, no fill patterns.
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// Pre-populate every size class with one chunk on first use instead of
    /// refilling each class on its first miss. Trades startup latency and a
    /// fixed footprint of one chunk per class for a steadier first-touch
    /// profile. Off by default.
    pub prewarm: bool,

    /// Maintain the counters reported by
    /// [`MultiPoolAllocator::stats`](crate::MultiPoolAllocator::stats).
    pub track_stats: bool,

    /// Fill freshly allocated payloads with this byte. Debug aid.
    pub alloc_pattern: Option<u8>,

    /// Fill released pooled payloads with this byte, making use-after-
    /// release visible. The payload's first word is overwritten by the free
    /// link regardless.
    pub release_pattern: Option<u8>,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            prewarm: false,
            track_stats: false,
            alloc_pattern: None,
            release_pattern: None,
        }
    }
}

impl AllocatorConfig {
    /// Configuration for debugging: counters on, recognizable fill
    /// patterns.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            prewarm: false,
            track_stats: true,
            alloc_pattern: Some(0xAB),
            release_pattern: Some(0xDE),
        }
    }
}
