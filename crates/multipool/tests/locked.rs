//! The mutex-wrapped allocator shared across threads.

use std::sync::Arc;
use std::thread;

use multipool::LockedAllocator;

#[test]
fn test_locked_allocator_basic() {
    let heap = LockedAllocator::new();

    let ptr = heap.allocate(128).expect("allocation failed").unwrap();
    unsafe {
        std::ptr::write_bytes(ptr.as_ptr(), 0x42, 128);
        assert_eq!(*ptr.as_ptr().add(127), 0x42);
        heap.release(Some(ptr));
    }
}

#[test]
fn test_locked_allocator_concurrent_allocations() {
    let heap = Arc::new(LockedAllocator::new());
    let mut handles = vec![];

    // Ten threads churn allocations of mixed classes through one lock.
    for i in 0..10u8 {
        let heap = Arc::clone(&heap);
        let handle = thread::spawn(move || {
            for round in 0..50usize {
                let size = 16 + (round % 7) * 100;
                let ptr = heap.allocate(size).expect("allocation failed").unwrap();
                unsafe {
                    std::ptr::write_bytes(ptr.as_ptr(), i, size);
                    assert_eq!(*ptr.as_ptr(), i);
                    assert_eq!(*ptr.as_ptr().add(size - 1), i);
                    heap.release(Some(ptr));
                }
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_locked_allocator_realloc_round_trip() {
    let heap = LockedAllocator::new();

    let ptr = heap.allocate(24).expect("allocation failed").unwrap();
    unsafe {
        for i in 0..24 {
            *ptr.as_ptr().add(i) = i as u8;
        }
        let grown = heap.reallocate(Some(ptr), 2000).expect("reallocation failed").unwrap();
        for i in 0..24 {
            assert_eq!(*grown.as_ptr().add(i), i as u8);
        }
        heap.release(Some(grown));
    }
}
