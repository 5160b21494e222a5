//! The memtest scenarios, run back to back against one allocator so each
//! starts from whatever the previous one left behind.

use std::ptr;

use heapalloc::{AllocError, Allocator, AllocatorConfig, SearchMode};

const MIB: usize = 1024 * 1024;

fn run_all(allocator: &mut Allocator) {
  unsafe {
    // Basic allocation.
    let ptr = allocator.allocate(16).unwrap();
    allocator.release(ptr.as_ptr()).unwrap();

    // Multiple allocations.
    let ptr1 = allocator.allocate(16).unwrap();
    let ptr2 = allocator.allocate(32).unwrap();
    let ptr3 = allocator.allocate(64).unwrap();
    assert!(ptr2 > ptr1 && ptr3 > ptr2);
    allocator.release(ptr1.as_ptr()).unwrap();
    allocator.release(ptr2.as_ptr()).unwrap();
    allocator.release(ptr3.as_ptr()).unwrap();

    // Free and reallocate.
    let ptr = allocator.allocate(16).unwrap();
    allocator.release(ptr.as_ptr()).unwrap();
    assert_eq!(allocator.allocate(16).unwrap(), ptr);
    allocator.release(ptr.as_ptr()).unwrap();

    // Alloc / free / alloc.
    let ptr1 = allocator.allocate(16).unwrap();
    let ptr2 = allocator.allocate(32).unwrap();
    allocator.release(ptr1.as_ptr()).unwrap();
    let ptr3 = allocator.allocate(16).unwrap();
    assert_eq!(ptr3, ptr1);
    allocator.release(ptr2.as_ptr()).unwrap();
    allocator.release(ptr3.as_ptr()).unwrap();

    // Reallocation.
    let ptr = allocator.allocate(16).unwrap();
    ptr::copy_nonoverlapping(b"Hello\0".as_ptr(), ptr.as_ptr(), 6);
    let new_ptr = allocator.reallocate(ptr.as_ptr(), 32).unwrap();
    assert_eq!(std::slice::from_raw_parts(new_ptr.as_ptr(), 6), b"Hello\0");
    allocator.release(new_ptr.as_ptr()).unwrap();

    // Exceed heap capacity.
    assert_eq!(
      allocator.allocate(2 * MIB),
      Err(AllocError::OutOfMemory { requested: 2 * MIB })
    );
  }
}

#[test]
fn test_scenarios_retain() {
  let mut allocator = Allocator::default();
  run_all(&mut allocator);

  // Nothing was lost to the oversized request.
  assert!(allocator.allocate(MIB / 2).is_ok());
}

#[test]
fn test_scenarios_discard_on_miss() {
  let config = AllocatorConfig::default().with_search_mode(SearchMode::DiscardOnMiss);
  let mut allocator = Allocator::new(config);
  run_all(&mut allocator);

  // The oversized request emptied the index.
  assert_eq!(allocator.free_block_count(), 0);
  assert!(allocator.allocate(16).is_err());
}

#[test]
fn test_independent_allocators() {
  let mut first = Allocator::default();
  let mut second = Allocator::new(AllocatorConfig::new(64 * 1024));

  let a = first.allocate(16).unwrap();
  let b = second.allocate(16).unwrap();

  let first_range = first.arena_range().unwrap();
  let second_range = second.arena_range().unwrap();

  assert!(first_range.contains(&(a.as_ptr() as *const u8)));
  assert!(second_range.contains(&(b.as_ptr() as *const u8)));
  assert!(!first_range.contains(&(b.as_ptr() as *const u8)));
  assert!(second.allocate(MIB).is_err());
  assert!(first.allocate(MIB / 2).is_ok());
}
