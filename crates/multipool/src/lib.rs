//! Segregated free-list memory allocator with page-grained growth and a
//! bulk fallback for oversized requests.
//!
//! The engine serves requests up to [`MAX_POOLED_PAYLOAD`] bytes from
//! power-of-two size classes (32 to 4096 bytes). Each class is a LIFO free
//! list refilled one page-sized chunk at a time from a pluggable
//! [`GrowthPrimitive`]; larger requests go 1:1 through a pluggable
//! [`BulkBackend`]. Every region carries a one-word header that encodes
//! everything release needs, so there is no external bookkeeping.
//!
//! The context object [`MultiPoolAllocator`] is single-threaded by design.
//! [`LockedAllocator`] is the one-mutex shared variant, and the optional
//! `c-api` feature exports the classic C symbol surface over a global
//! instance.
//!
//! # Example
//!
//! ```
//! use multipool::MultiPoolAllocator;
//!
//! let mut heap = MultiPoolAllocator::new();
//! let ptr = heap.allocate(100)?.expect("non-zero size");
//! unsafe {
//!     ptr.as_ptr().write(42);
//!     assert_eq!(ptr.as_ptr().read(), 42);
//!     heap.release(Some(ptr));
//! }
//! # Ok::<(), multipool::AllocError>(())
//! ```
//!
//! # Features
//!
//! - `logging` (default): `tracing` events on refill, bulk traffic and
//!   exhaustion.
//! - `c-api`: export `malloc`/`free`/`calloc`/`realloc` symbols; see the
//!   [`c_api`] module docs before preloading.

pub mod allocator;
mod block;
pub mod bulk;
#[cfg(feature = "c-api")]
pub mod c_api;
mod chunk;
pub mod config;
pub mod error;
pub mod growth;
pub mod locked;
mod registry;
pub mod size_class;
pub mod stats;
pub mod utils;

pub use allocator::MultiPoolAllocator;
pub use bulk::{BulkBackend, MmapBulk};
pub use config::AllocatorConfig;
pub use error::{AllocError, AllocResult};
pub use growth::{GrowthPrimitive, MmapGrowth};
pub use locked::LockedAllocator;
pub use size_class::{CHUNK_SIZE, HEADER_SIZE, MAX_POOLED_PAYLOAD, SizeClass, classify};
pub use stats::AllocatorStats;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
