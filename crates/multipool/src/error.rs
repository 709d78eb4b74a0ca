//! Error types for allocation operations.

use thiserror::Error;

/// Result type for allocation operations.
pub type AllocResult<T> = Result<T, AllocError>;

/// The one recoverable failure mode: a backend could not supply memory, or
/// a requested size does not fit the machine.
///
/// Misuse — double release, foreign pointers, mismatched bulk sizes — is
/// undefined behavior by contract and is guarded by debug assertions rather
/// than reported errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The OS growth primitive could not extend the address space.
    #[error("out of memory: growth primitive failed to provide {requested} bytes")]
    GrowthExhausted {
        /// Bytes asked of the growth primitive.
        requested: usize,
    },

    /// The bulk backend could not map a region.
    #[error("out of memory: bulk backend failed to provide {requested} bytes")]
    BulkExhausted {
        /// Bytes asked of the bulk backend, header included.
        requested: usize,
    },

    /// A size computation overflowed `usize` before any memory moved.
    #[error("allocation size overflow: {count} * {size} bytes")]
    SizeOverflow {
        /// Element count of the request.
        count: usize,
        /// Element size of the request.
        size: usize,
    },
}

impl AllocError {
    /// Growth-primitive exhaustion for a request of `requested` bytes.
    #[must_use]
    pub fn growth_exhausted(requested: usize) -> Self {
        Self::GrowthExhausted { requested }
    }

    /// Bulk-backend exhaustion for a request of `requested` bytes.
    #[must_use]
    pub fn bulk_exhausted(requested: usize) -> Self {
        Self::BulkExhausted { requested }
    }

    /// Overflow of `count * size`.
    #[must_use]
    pub fn size_overflow(count: usize, size: usize) -> Self {
        Self::SizeOverflow { count, size }
    }
}
