//! The OS address-space growth primitive.

use core::ptr::NonNull;

use crate::error::{AllocError, AllocResult};

/// Source of fresh address space for the pooled path.
///
/// The contract is monotonic: regions handed out are never reclaimed for
/// the lifetime of the allocator, so implementations need no bookkeeping.
/// A call either returns a region of exactly `len` writable bytes or fails;
/// there are no partial results, retries or timeouts.
pub trait GrowthPrimitive {
    /// Extends the address space by `len` bytes and returns the new region.
    ///
    /// The region must be writable, exclusively owned by the caller, and
    /// aligned at least to the machine word.
    ///
    /// # Errors
    /// [`AllocError::GrowthExhausted`] when the OS cannot supply the region.
    fn grow(&mut self, len: usize) -> AllocResult<NonNull<u8>>;
}

/// Production growth primitive: one anonymous private `mmap` per call.
///
/// Mappings are never unmapped — address space only grows, matching the
/// trait contract. The kernel hands back page-aligned memory, which suits
/// the page-sized chunks the pooled path requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct MmapGrowth;

impl GrowthPrimitive for MmapGrowth {
    fn grow(&mut self, len: usize) -> AllocResult<NonNull<u8>> {
        // SAFETY: FFI into mmap with a null hint, an anonymous private
        // mapping and no file descriptor; the OS validates the arguments
        // and reports failure as MAP_FAILED.
        let raw = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if raw == libc::MAP_FAILED {
            #[cfg(feature = "logging")]
            tracing::warn!(requested = len, "growth primitive exhausted");
            return Err(AllocError::growth_exhausted(len));
        }
        NonNull::new(raw.cast::<u8>()).ok_or(AllocError::growth_exhausted(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size_class::CHUNK_SIZE;
    use crate::utils::is_aligned;

    #[test]
    fn grown_regions_are_writable_and_page_aligned() {
        let mut growth = MmapGrowth;
        let region = growth.grow(CHUNK_SIZE).expect("mmap of one page");
        assert!(is_aligned(region.as_ptr() as usize, CHUNK_SIZE));
        unsafe {
            core::ptr::write_bytes(region.as_ptr(), 0x7F, CHUNK_SIZE);
            assert_eq!(*region.as_ptr().add(CHUNK_SIZE - 1), 0x7F);
        }
    }
}
