//! # heapalloc - A Fixed-Arena Heap Allocator
//!
//! This crate provides a user-space allocator that carves every allocation
//! out of **one fixed-size arena** obtained from the OS on first use, and
//! keeps track of free blocks in a **binary min-heap ordered by size**.
//!
//! ## Overview
//!
//! ```text
//!   Arena after a few allocations and one release:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                              ARENA (1 MiB)                           │
//!   │                                                                      │
//!   │   ┌───┬────┬───┬────────┬───┬────┬───┬────────────────────────────┐  │
//!   │   │ H │ 16 │ H │   32   │ H │ 64 │ H │          free tail         │  │
//!   │   └───┴────┴───┴────────┴───┴────┴───┴────────────────────────────┘  │
//!   │      free      allocated    allocated            free                │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Free-block index (min-heap by size):
//!
//!                 [16]
//!                 /
//!          [tail: 1 MiB - ...]
//! ```
//!
//! Allocation pops the smallest free block. A block that is too small is
//! either put back ([`SearchMode::Retain`], the default) or dropped for good
//! ([`SearchMode::DiscardOnMiss`]). A block that is larger than needed is
//! split: the head is returned, the tail goes back into the index.
//!
//! ## Crate Structure
//!
//! ```text
//!   heapalloc
//!   ├── align      - Word alignment (align!, checked_align)
//!   ├── allocator  - Allocator: allocate / release / reallocate
//!   ├── arena      - ArenaSource trait, MmapSource, SbrkSource
//!   ├── block      - Block header (internal)
//!   ├── config     - AllocatorConfig, SearchMode
//!   ├── error      - AllocError
//!   └── heap       - FreeIndex min-heap (internal)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use heapalloc::{Allocator, AllocatorConfig};
//!
//! let mut allocator = Allocator::new(AllocatorConfig::default());
//!
//! let ptr = allocator.allocate(16).unwrap();
//!
//! unsafe {
//!     ptr.cast::<u64>().write(42);
//!     assert_eq!(ptr.cast::<u64>().read(), 42);
//!
//!     let grown = allocator.reallocate(ptr.as_ptr(), 64).unwrap();
//!     assert_eq!(grown.cast::<u64>().read(), 42);
//!
//!     allocator.release(grown.as_ptr()).unwrap();
//! }
//! ```
//!
//! ## Block Layout
//!
//! ```text
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ is_free: bool   │  │  │  N bytes, N % 8 == 0     │  │
//!   │  └─────────────────┘  │  └──────────────────────────┘  │
//!   │      16 bytes         │                                │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: every operation takes `&mut self`
//! - **Fixed capacity**: the arena never grows
//! - **No coalescing**: adjacent free blocks are never merged
//! - **Bounded index**: at most `max_free_blocks` free blocks are tracked
//! - **Unix-only**: arenas come from `mmap` or `sbrk` through `libc`
//!
//! ## Safety
//!
//! Releasing or resizing takes raw pointers. Passing a pointer that did not
//! come from the same allocator, releasing twice, or using a pointer after
//! release is undefined behavior and is not detected.

pub mod align;
mod allocator;
pub mod arena;
mod block;
mod config;
mod error;
mod heap;

pub use allocator::Allocator;
pub use arena::{ArenaSource, MmapSource, SbrkSource};
pub use block::HEADER_SIZE;
pub use config::{AllocatorConfig, SearchMode};
pub use error::AllocError;
