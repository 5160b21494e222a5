//! Allocator configuration parameters.

/// How [`Allocator::allocate`](crate::Allocator::allocate) treats free blocks
/// that turn out to be too small while searching the index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchMode {
  /// Rejected blocks go back into the index before the request is served or
  /// refused.
  #[default]
  Retain,
  /// Rejected blocks are dropped from the index and never considered again.
  /// They stay marked free but are unreachable, as in a classic heap-ordered
  /// allocator that pops until something fits.
  DiscardOnMiss,
}

/// Configuration for an [`Allocator`](crate::Allocator).
///
/// All values are fixed once the arena has been acquired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocatorConfig {
  /// Size in bytes of the region requested from the OS, headers included.
  ///
  /// Default: 1 MiB.
  pub arena_size: usize,

  /// Maximum number of free blocks the index tracks at once.
  ///
  /// Default: 1024.
  pub max_free_blocks: usize,

  /// Search policy for undersized blocks.
  pub search_mode: SearchMode,
}

impl AllocatorConfig {
  /// Default arena size: 1 MiB.
  pub const DEFAULT_ARENA_SIZE: usize = 1024 * 1024;

  /// Default free-block index capacity.
  pub const DEFAULT_MAX_FREE_BLOCKS: usize = 1024;

  pub fn new(arena_size: usize) -> Self {
    Self {
      arena_size,
      max_free_blocks: Self::DEFAULT_MAX_FREE_BLOCKS,
      search_mode: SearchMode::default(),
    }
  }

  pub fn with_max_free_blocks(
    mut self,
    max_free_blocks: usize,
  ) -> Self {
    self.max_free_blocks = max_free_blocks;
    self
  }

  pub fn with_search_mode(
    mut self,
    search_mode: SearchMode,
  ) -> Self {
    self.search_mode = search_mode;
    self
  }
}

impl Default for AllocatorConfig {
  fn default() -> Self {
    Self::new(Self::DEFAULT_ARENA_SIZE)
  }
}
