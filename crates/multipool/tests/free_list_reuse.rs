//! LIFO reuse of released blocks and the pooled/bulk end-to-end scenario.

use multipool::{AllocatorConfig, CHUNK_SIZE, MultiPoolAllocator};

#[test]
fn test_release_then_allocate_reuses_head() {
    let mut heap = MultiPoolAllocator::new();

    let ptr1 = heap.allocate(100).expect("allocation failed").unwrap();
    unsafe { heap.release(Some(ptr1)) };
    let ptr2 = heap.allocate(100).expect("allocation failed").unwrap();

    assert_eq!(ptr1, ptr2, "free list should hand back the released head");
    unsafe { heap.release(Some(ptr2)) };
}

#[test]
fn test_same_class_different_size_reuses_block() {
    let mut heap = MultiPoolAllocator::new();

    // 10 and 20 bytes both land in the smallest class.
    let ptr1 = heap.allocate(10).expect("allocation failed").unwrap();
    unsafe { heap.release(Some(ptr1)) };
    let ptr2 = heap.allocate(20).expect("allocation failed").unwrap();

    assert_eq!(ptr1, ptr2);
    unsafe { heap.release(Some(ptr2)) };
}

#[test]
fn test_end_to_end_pooled_and_bulk() {
    let mut heap = MultiPoolAllocator::with_config(AllocatorConfig {
        track_stats: true,
        ..AllocatorConfig::default()
    });

    let p1 = heap.allocate(10).expect("allocation failed").unwrap();
    unsafe { heap.release(Some(p1)) };
    let p2 = heap.allocate(20).expect("allocation failed").unwrap();
    assert_eq!(p1, p2);

    // Past the pooled boundary: served independently of any free list.
    let bulk = heap.allocate(5000).expect("allocation failed").unwrap();
    assert_ne!(bulk, p2);
    unsafe {
        std::ptr::write_bytes(bulk.as_ptr(), 0x77, 5000);
        assert_eq!(*bulk.as_ptr().add(4999), 0x77);
    }

    let stats = heap.stats();
    assert_eq!(stats.bulk_allocs, 1);
    assert_eq!(stats.chunks_acquired, 1, "bulk traffic must not consume chunks");

    unsafe {
        heap.release(Some(bulk));
        heap.release(Some(p2));
    }
}

#[test]
fn test_released_blocks_stack_in_lifo_order() {
    let mut heap = MultiPoolAllocator::new();

    let a = heap.allocate(40).expect("allocation failed").unwrap();
    let b = heap.allocate(40).expect("allocation failed").unwrap();
    let c = heap.allocate(40).expect("allocation failed").unwrap();

    unsafe {
        heap.release(Some(a));
        heap.release(Some(b));
        heap.release(Some(c));
    }

    // Most recently released comes back first.
    assert_eq!(heap.allocate(40).unwrap().unwrap(), c);
    assert_eq!(heap.allocate(40).unwrap().unwrap(), b);
    assert_eq!(heap.allocate(40).unwrap().unwrap(), a);
}

#[test]
fn test_class_exhaustion_pulls_fresh_chunks() {
    let mut heap = MultiPoolAllocator::with_config(AllocatorConfig {
        track_stats: true,
        ..AllocatorConfig::default()
    });

    // The largest class holds exactly one block per chunk.
    let max_payload = CHUNK_SIZE - std::mem::size_of::<usize>();
    let a = heap.allocate(max_payload).expect("allocation failed").unwrap();
    let b = heap.allocate(max_payload).expect("allocation failed").unwrap();
    let c = heap.allocate(max_payload).expect("allocation failed").unwrap();

    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_eq!(heap.stats().chunks_acquired, 3);

    unsafe {
        heap.release(Some(a));
        heap.release(Some(b));
        heap.release(Some(c));
    }
    // No new chunk needed once the list is populated again.
    let reused = heap.allocate(max_payload).expect("allocation failed").unwrap();
    assert_eq!(reused, c);
    assert_eq!(heap.stats().chunks_acquired, 3);
    unsafe { heap.release(Some(reused)) };
}

#[test]
fn test_classes_do_not_share_free_lists() {
    let mut heap = MultiPoolAllocator::new();

    let small = heap.allocate(10).expect("allocation failed").unwrap();
    unsafe { heap.release(Some(small)) };

    // A different class must not pick up the released small block.
    let medium = heap.allocate(100).expect("allocation failed").unwrap();
    assert_ne!(small, medium);

    // The small class still has its block at the head.
    let small_again = heap.allocate(10).expect("allocation failed").unwrap();
    assert_eq!(small, small_again);

    unsafe {
        heap.release(Some(medium));
        heap.release(Some(small_again));
    }
}
