//! C allocator surface.
//!
//! Exports `malloc`, `free`, `calloc`, `realloc` and `malloc_usable_size`
//! over one process-wide [`LockedAllocator`], created lazily on the first
//! call and never torn down. Null is the no-allocation sentinel in both
//! directions. Built as a `cdylib`, the surface is preloadable as the
//! process heap manager.
//!
//! Two deployment caveats:
//!
//! - Payloads are word-aligned (8 bytes on 64-bit targets), not
//!   `max_align_t`-aligned; hosts that feed `malloc` results to 16-byte
//!   vector types must not preload this build.
//! - Build without the `logging` feature when preloading: a tracing
//!   subscriber that allocates inside `malloc` would re-enter it.

use core::ptr::{self, NonNull};
use std::sync::OnceLock;

use crate::locked::LockedAllocator;

static GLOBAL: OnceLock<LockedAllocator> = OnceLock::new();

fn global() -> &'static LockedAllocator {
    GLOBAL.get_or_init(LockedAllocator::new)
}

/// C `malloc`: null for a zero size or on exhaustion.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn malloc(size: usize) -> *mut u8 {
    match global().allocate(size) {
        Ok(Some(payload)) => payload.as_ptr(),
        Ok(None) | Err(_) => ptr::null_mut(),
    }
}

/// C `free`: accepts null.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by this allocator's
/// `malloc`, `calloc` or `realloc`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn free(ptr: *mut u8) {
    // SAFETY: the caller upholds the C free contract.
    unsafe { global().release(NonNull::new(ptr)) };
}

/// C `calloc`: an overflowing `count * size` fails with null rather than a
/// short allocation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn calloc(count: usize, size: usize) -> *mut u8 {
    match global().allocate_zeroed(count, size) {
        Ok(Some(payload)) => payload.as_ptr(),
        Ok(None) | Err(_) => ptr::null_mut(),
    }
}

/// C `realloc`: null behaves as `malloc`; on failure null is returned and
/// the old pointer stays valid.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by this allocator.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn realloc(ptr: *mut u8, size: usize) -> *mut u8 {
    // SAFETY: the caller upholds the C realloc contract.
    match unsafe { global().reallocate(NonNull::new(ptr), size) } {
        Ok(Some(payload)) => payload.as_ptr(),
        Ok(None) | Err(_) => ptr::null_mut(),
    }
}

/// glibc `malloc_usable_size`: 0 for null.
///
/// # Safety
/// `ptr` must be null or a live pointer returned by this allocator.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn malloc_usable_size(ptr: *mut u8) -> usize {
    match NonNull::new(ptr) {
        // SAFETY: the caller passes a live allocation from this allocator.
        Some(payload) => unsafe { global().usable_size(payload) },
        None => 0,
    }
}
