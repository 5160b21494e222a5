use std::{
  cmp, fmt,
  ops::Range,
  ptr::{self, NonNull},
};

use crate::{
  align::{ALIGNMENT, checked_align},
  arena::{ArenaSource, MmapSource},
  block::{Block, HEADER_SIZE},
  config::{AllocatorConfig, SearchMode},
  error::AllocError,
  heap::{FreeEntry, FreeIndex},
};

/// The region handed out by the arena source.
struct Arena {
  base: NonNull<u8>,
  size: usize,
  start: NonNull<u8>,
}

/// Fixed-arena allocator that picks blocks out of a size-ordered min-heap.
///
/// The arena is requested from `S` on the first allocation and never grown.
/// Freed blocks go back into the index as they are: neighbours are not
/// merged.
pub struct Allocator<S: ArenaSource = MmapSource> {
  config: AllocatorConfig,
  source: S,
  arena: Option<Arena>,
  index: FreeIndex,
}

impl Allocator<MmapSource> {
  /// Creates an allocator whose arena is an anonymous mapping. Nothing is
  /// mapped until the first allocation.
  pub fn new(config: AllocatorConfig) -> Self {
    Self::with_source(config, MmapSource)
  }
}

impl Default for Allocator<MmapSource> {
  fn default() -> Self {
    Self::new(AllocatorConfig::default())
  }
}

impl<S: ArenaSource> Allocator<S> {
  /// Creates an allocator that takes its arena from `source`.
  pub fn with_source(
    config: AllocatorConfig,
    source: S,
  ) -> Self {
    let index = FreeIndex::new(config.max_free_blocks);

    Self {
      config,
      source,
      arena: None,
      index,
    }
  }

  /// Configuration the allocator was built with.
  pub fn config(&self) -> &AllocatorConfig {
    &self.config
  }

  /// Whether the arena has been acquired.
  pub fn is_initialized(&self) -> bool {
    self.arena.is_some()
  }

  /// Number of blocks currently reachable through the free-block index.
  pub fn free_block_count(&self) -> usize {
    self.index.len()
  }

  /// Address range blocks are carved from, once the arena exists.
  pub fn arena_range(&self) -> Option<Range<*const u8>> {
    self.arena.as_ref().map(|arena| {
      let end = unsafe { arena.base.as_ptr().add(arena.size) };
      arena.start.as_ptr() as *const u8..end as *const u8
    })
  }

  /// Acquires the arena and lays a single free block over it. Does nothing
  /// once the arena exists.
  pub fn ensure_arena_initialized(&mut self) -> Result<(), AllocError> {
    if self.arena.is_some() {
      return Ok(());
    }

    let size = self.config.arena_size;
    let too_small = AllocError::ArenaTooSmall {
      size,
      header: HEADER_SIZE,
    };

    if size < HEADER_SIZE {
      return Err(too_small);
    }

    let base = unsafe { self.source.acquire(size) }
      .ok_or(AllocError::ArenaAcquisitionFailed { size })?;

    let padding = base.as_ptr().align_offset(ALIGNMENT);
    let usable = size.saturating_sub(padding);

    if padding == usize::MAX || usable < HEADER_SIZE {
      unsafe { self.source.release(base, size) };
      return Err(too_small);
    }

    let payload = (usable - HEADER_SIZE) & !(ALIGNMENT - 1);

    unsafe {
      let start = base.add(padding);
      let block = Block::write(start.as_ptr(), payload, true);

      if let Err(err) = self.index.insert(block, payload) {
        self.source.release(base, size);
        return Err(err);
      }

      self.arena = Some(Arena { base, size, start });
    }

    log::debug!(
      "arena initialized: {} bytes at {:?}, initial block of {} bytes",
      size,
      base,
      payload
    );

    Ok(())
  }

  /// Pops blocks off the index until one holds `size` bytes.
  fn find_free_block(
    &mut self,
    size: usize,
  ) -> Result<Option<FreeEntry>, AllocError> {
    let mut rejected = Vec::new();
    let mut found = None;

    while let Some(entry) = self.index.extract_min() {
      if entry.size >= size {
        found = Some(entry);
        break;
      }

      match self.config.search_mode {
        SearchMode::Retain => rejected.push(entry),
        SearchMode::DiscardOnMiss => {
          log::trace!("dropping {} byte block {:?} from the index", entry.size, entry.block);
        }
      }
    }

    // Every rejected entry was extracted above, so there is room for it.
    for entry in rejected {
      self.index.insert(entry.block, entry.size)?;
    }

    Ok(found)
  }

  /// Returns a pointer to at least `size` bytes, rounded up to a multiple of
  /// eight, aligned to eight bytes.
  ///
  /// Fails with [`AllocError::OutOfMemory`] when no free block is large
  /// enough; the allocator stays usable. The first call acquires the arena
  /// and may report its fatal errors.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let out_of_memory = AllocError::OutOfMemory { requested: size };
    let size = checked_align(size).ok_or_else(|| out_of_memory.clone())?;

    self.ensure_arena_initialized()?;

    let Some(entry) = self.find_free_block(size)? else {
      log::warn!("no block found for size {}", size);
      return Err(out_of_memory);
    };

    let block = entry.block;

    unsafe {
      if entry.size > size.saturating_add(HEADER_SIZE) {
        let tail_size = entry.size - size - HEADER_SIZE;
        let tail = Block::write(Block::payload(block).as_ptr().add(size), tail_size, true);

        // Extraction above freed a slot, so the tail always fits.
        self.index.insert(tail, tail_size)?;
        (*block.as_ptr()).size = size;
        log::trace!(
          "split {} byte block {:?}: head {}, tail {} at {:?}",
          entry.size,
          block,
          size,
          tail_size,
          tail
        );
      }

      (*block.as_ptr()).is_free = false;

      Ok(Block::payload(block))
    }
  }

  /// Hands a block back to the free-block index. Null is ignored.
  ///
  /// If the index is full the block stays allocated and
  /// [`AllocError::FreeIndexCapacityExceeded`] is returned.
  ///
  /// # Safety
  ///
  /// `address` must be null or a pointer returned by this allocator that has
  /// not been released yet. It must not be used after a successful release.
  pub unsafe fn release(
    &mut self,
    address: *mut u8,
  ) -> Result<(), AllocError> {
    let Some(payload) = NonNull::new(address) else {
      return Ok(());
    };

    unsafe {
      let block = Block::from_payload(payload);
      let size = (*block.as_ptr()).size;

      if let Err(err) = self.index.insert(block, size) {
        log::warn!("cannot release {:?}: {}", payload, err);
        return Err(err);
      }

      (*block.as_ptr()).is_free = true;
      log::trace!("released {} byte block at {:?}", size, payload);
    }

    Ok(())
  }

  /// Resizes an allocation.
  ///
  /// A null `address` behaves like [`Allocator::allocate`]. If the block
  /// already holds `size` bytes the same pointer comes back and the block
  /// keeps its full size. Otherwise the contents move to a new block and the
  /// old one is released; when that fails, the new block is returned anyway
  /// and the old one stays allocated.
  ///
  /// # Safety
  ///
  /// Same contract as [`Allocator::release`]. On success the old pointer
  /// must not be used unless it was returned again.
  pub unsafe fn reallocate(
    &mut self,
    address: *mut u8,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let Some(payload) = NonNull::new(address) else {
      return self.allocate(size);
    };

    unsafe {
      let old_size = self.payload_size(payload);

      if old_size >= size {
        return Ok(payload);
      }

      let new_payload = self.allocate(size)?;
      ptr::copy_nonoverlapping(
        payload.as_ptr(),
        new_payload.as_ptr(),
        cmp::min(old_size, size),
      );

      if let Err(err) = self.release(payload.as_ptr()) {
        log::warn!("leaking {:?} after reallocation: {}", payload, err);
      }

      Ok(new_payload)
    }
  }

  /// Usable size of an allocation, after rounding and including any slack
  /// that was too small to split off.
  ///
  /// # Safety
  ///
  /// `payload` must be a live pointer returned by this allocator.
  pub unsafe fn payload_size(
    &self,
    payload: NonNull<u8>,
  ) -> usize {
    unsafe { (*Block::from_payload(payload).as_ptr()).size }
  }
}

impl<S: ArenaSource> Drop for Allocator<S> {
  fn drop(&mut self) {
    if let Some(arena) = self.arena.take() {
      unsafe { self.source.release(arena.base, arena.size) };
    }
  }
}

impl<S: ArenaSource> fmt::Debug for Allocator<S> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Allocator")
      .field("config", &self.config)
      .field("arena", &self.arena_range())
      .field("free_blocks", &self.index.len())
      .field("index_capacity", &self.index.capacity())
      .finish()
  }
}
