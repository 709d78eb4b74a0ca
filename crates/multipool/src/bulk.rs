//! The bulk path: oversized requests bypass the pools entirely.

use core::ptr::NonNull;

use crate::error::{AllocError, AllocResult};

/// Large-object backend for requests the pooled path cannot hold.
///
/// Regions are created and destroyed strictly 1:1 — nothing is cached or
/// pooled. The `size` passed to [`release_region`](Self::release_region)
/// must be byte-identical to the size passed to the matching
/// [`request_region`](Self::request_region); the allocator guarantees this
/// by re-reading the recorded total from the block header.
pub trait BulkBackend {
    /// Maps a fresh region of at least `size` writable bytes, aligned at
    /// least to the machine word.
    ///
    /// # Errors
    /// [`AllocError::BulkExhausted`] when the region cannot be provided.
    fn request_region(&mut self, size: usize) -> AllocResult<NonNull<u8>>;

    /// Releases a region previously returned by `request_region`.
    ///
    /// # Safety
    /// `ptr` must come from `request_region` on this same backend and not
    /// have been released before, and `size` must equal the originally
    /// requested size exactly.
    unsafe fn release_region(&mut self, ptr: NonNull<u8>, size: usize);
}

/// Production bulk backend: anonymous private `mmap`, unmapped on release.
#[derive(Debug, Default, Clone, Copy)]
pub struct MmapBulk;

impl BulkBackend for MmapBulk {
    fn request_region(&mut self, size: usize) -> AllocResult<NonNull<u8>> {
        // SAFETY: FFI into mmap with a null hint, an anonymous private
        // mapping and no file descriptor; the OS validates the arguments
        // and reports failure as MAP_FAILED.
        let raw = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if raw == libc::MAP_FAILED {
            #[cfg(feature = "logging")]
            tracing::warn!(requested = size, "bulk backend exhausted");
            return Err(AllocError::bulk_exhausted(size));
        }
        NonNull::new(raw.cast::<u8>()).ok_or(AllocError::bulk_exhausted(size))
    }

    unsafe fn release_region(&mut self, ptr: NonNull<u8>, size: usize) {
        // SAFETY: the caller passes the pointer and byte-identical length
        // of a live mapping created by request_region.
        let _rc = unsafe { libc::munmap(ptr.as_ptr().cast(), size) };
        debug_assert_eq!(_rc, 0, "munmap of a region this backend mapped cannot fail");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_release_round_trip() {
        let mut bulk = MmapBulk;
        let size = 5 * 4096 + 123;
        let region = bulk.request_region(size).expect("mmap bulk region");
        unsafe {
            core::ptr::write_bytes(region.as_ptr(), 0x3C, size);
            assert_eq!(*region.as_ptr().add(size - 1), 0x3C);
            bulk.release_region(region, size);
        }
    }
}
