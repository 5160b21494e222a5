//! Runs the allocator scenarios by hand.
//!
//! ```text
//! cargo run --example memtest            # all scenarios
//! cargo run --example memtest -- -t 4    # only scenario 4
//! cargo run --example memtest --features system-alloc
//! ```

use std::{env, ptr};

#[cfg(not(feature = "system-alloc"))]
struct Heap(heapalloc::Allocator);

#[cfg(not(feature = "system-alloc"))]
impl Heap {
  fn new() -> Self {
    Self(heapalloc::Allocator::default())
  }

  fn malloc(
    &mut self,
    size: usize,
  ) -> *mut u8 {
    match self.0.allocate(size) {
      Ok(ptr) => ptr.as_ptr(),
      Err(err) => {
        eprintln!("{err}");
        ptr::null_mut()
      }
    }
  }

  unsafe fn free(
    &mut self,
    ptr: *mut u8,
  ) {
    if let Err(err) = unsafe { self.0.release(ptr) } {
      eprintln!("{err}");
    }
  }

  unsafe fn realloc(
    &mut self,
    ptr: *mut u8,
    size: usize,
  ) -> *mut u8 {
    match unsafe { self.0.reallocate(ptr, size) } {
      Ok(ptr) => ptr.as_ptr(),
      Err(err) => {
        eprintln!("{err}");
        ptr::null_mut()
      }
    }
  }
}

#[cfg(feature = "system-alloc")]
struct Heap;

#[cfg(feature = "system-alloc")]
impl Heap {
  fn new() -> Self {
    Self
  }

  fn malloc(
    &mut self,
    size: usize,
  ) -> *mut u8 {
    unsafe { libc::malloc(size) as *mut u8 }
  }

  unsafe fn free(
    &mut self,
    ptr: *mut u8,
  ) {
    unsafe { libc::free(ptr as *mut libc::c_void) }
  }

  unsafe fn realloc(
    &mut self,
    ptr: *mut u8,
    size: usize,
  ) -> *mut u8 {
    unsafe { libc::realloc(ptr as *mut libc::c_void, size) as *mut u8 }
  }
}

fn basic_allocation(heap: &mut Heap) -> bool {
  let ptr = heap.malloc(16);
  let ok = !ptr.is_null();
  unsafe { heap.free(ptr) };
  ok
}

fn multiple_allocations(heap: &mut Heap) -> bool {
  let ptr1 = heap.malloc(16);
  let ptr2 = heap.malloc(32);
  let ptr3 = heap.malloc(64);

  let ok = !ptr1.is_null() && !ptr2.is_null() && !ptr3.is_null() && ptr2 > ptr1 && ptr3 > ptr2;

  unsafe {
    heap.free(ptr1);
    heap.free(ptr2);
    heap.free(ptr3);
  }
  ok
}

fn free_and_reallocate(heap: &mut Heap) -> bool {
  let ptr = heap.malloc(16);
  unsafe { heap.free(ptr) };
  let new_ptr = heap.malloc(16);

  let ok = new_ptr == ptr;
  unsafe { heap.free(new_ptr) };
  ok
}

fn alloc_free_alloc(heap: &mut Heap) -> bool {
  let ptr1 = heap.malloc(16);
  let ptr2 = heap.malloc(32);
  unsafe { heap.free(ptr1) };
  let ptr3 = heap.malloc(16);

  let ok = ptr3 == ptr1;
  unsafe {
    heap.free(ptr2);
    heap.free(ptr3);
  }
  ok
}

fn reallocation(heap: &mut Heap) -> bool {
  let ptr = heap.malloc(16);
  if ptr.is_null() {
    return false;
  }

  unsafe {
    ptr::copy_nonoverlapping(b"Hello\0".as_ptr(), ptr, 6);
    let new_ptr = heap.realloc(ptr, 32);

    let ok = !new_ptr.is_null() && std::slice::from_raw_parts(new_ptr, 6) == b"Hello\0";
    heap.free(new_ptr);
    ok
  }
}

fn exceed_heap_capacity(heap: &mut Heap) -> bool {
  heap.malloc(2 * 1024 * 1024).is_null()
}

static SCENARIOS: [(&str, fn(&mut Heap) -> bool); 6] = [
  ("Basic Allocation Test", basic_allocation),
  ("Multiple Allocations Test", multiple_allocations),
  ("Free and Reallocate Test", free_and_reallocate),
  ("Alloc/Free/Alloc Test", alloc_free_alloc),
  ("Reallocation Test", reallocation),
  ("Exceed Heap Capacity Test", exceed_heap_capacity),
];

fn run(
  heap: &mut Heap,
  name: &str,
  scenario: fn(&mut Heap) -> bool,
) {
  let verdict = if scenario(heap) { "PASS" } else { "FAIL" };
  println!("{name}: {verdict}");
}

fn main() {
  let args: Vec<String> = env::args().skip(1).collect();
  let mut heap = Heap::new();

  match args.as_slice() {
    [flag, number] if flag == "-t" => {
      let selected = number.parse::<usize>().ok().and_then(|n| SCENARIOS.get(n));

      match selected {
        Some(&(name, scenario)) => run(&mut heap, name, scenario),
        None => println!("Invalid test number."),
      }
    }
    _ => {
      for (name, scenario) in SCENARIOS {
        println!("Running {name}...");
        run(&mut heap, name, scenario);
      }
    }
  }
}
