//! Free-block index: an array-backed binary min-heap keyed by block size.
//!
//! ```text
//!   index:   0     1     2     3     4
//!          ┌─────┬─────┬─────┬─────┬─────┐
//!          │  16 │  32 │  24 │  64 │  48 │   parent(i) = (i - 1) / 2
//!          └─────┴─────┴─────┴─────┴─────┘   children(i) = 2i + 1, 2i + 2
//! ```
//!
//! Entries are non-owning pointers into the arena. The size is cached next to
//! the pointer: a block's size never changes while it sits in the index, so
//! sifting never has to touch arena memory.

use std::ptr::NonNull;

use crate::{block::Block, error::AllocError};

/// One indexed free block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeEntry {
  pub size: usize,
  pub block: NonNull<Block>,
}

pub struct FreeIndex {
  entries: Vec<FreeEntry>,
  capacity: usize,
}

impl FreeIndex {
  /// Creates an empty index that refuses to hold more than `capacity`
  /// entries. The backing array is reserved up front.
  pub fn new(capacity: usize) -> Self {
    Self {
      entries: Vec::with_capacity(capacity),
      capacity,
    }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Adds a free block of payload `size` to the index.
  ///
  /// Fails with [`AllocError::FreeIndexCapacityExceeded`] when the index is
  /// full, leaving it unchanged.
  pub fn insert(
    &mut self,
    block: NonNull<Block>,
    size: usize,
  ) -> Result<(), AllocError> {
    if self.entries.len() >= self.capacity {
      return Err(AllocError::FreeIndexCapacityExceeded {
        capacity: self.capacity,
      });
    }

    self.entries.push(FreeEntry { size, block });
    self.sift_up(self.entries.len() - 1);

    Ok(())
  }

  /// Removes and returns the smallest block, or `None` if the index is empty.
  pub fn extract_min(&mut self) -> Option<FreeEntry> {
    if self.entries.is_empty() {
      return None;
    }

    let min = self.entries.swap_remove(0);
    self.sift_down(0);

    Some(min)
  }

  fn sift_up(
    &mut self,
    mut index: usize,
  ) {
    while index > 0 {
      let parent = (index - 1) / 2;

      if self.entries[index].size >= self.entries[parent].size {
        break;
      }

      self.entries.swap(index, parent);
      index = parent;
    }
  }

  fn sift_down(
    &mut self,
    mut index: usize,
  ) {
    let len = self.entries.len();

    loop {
      let left = 2 * index + 1;
      let right = 2 * index + 2;
      let mut smallest = index;

      if left < len && self.entries[left].size < self.entries[smallest].size {
        smallest = left;
      }

      if right < len && self.entries[right].size < self.entries[smallest].size {
        smallest = right;
      }

      if smallest == index {
        break;
      }

      self.entries.swap(index, smallest);
      index = smallest;
    }
  }

  #[cfg(test)]
  fn is_heap(&self) -> bool {
    (1..self.entries.len()).all(|i| self.entries[(i - 1) / 2].size <= self.entries[i].size)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn blocks(sizes: &[usize]) -> Vec<Block> {
    sizes.iter().map(|&size| Block::new(size, true)).collect()
  }

  fn fill(
    index: &mut FreeIndex,
    storage: &mut [Block],
  ) {
    for block in storage.iter_mut() {
      let size = block.size;
      index.insert(NonNull::from(block), size).unwrap();
    }
  }

  #[test]
  fn test_extract_in_size_order() {
    let mut storage = blocks(&[64, 16, 48, 8, 32, 24]);
    let mut index = FreeIndex::new(16);
    fill(&mut index, &mut storage);

    assert_eq!(index.len(), 6);

    let mut sizes = Vec::new();
    while let Some(entry) = index.extract_min() {
      assert_eq!(unsafe { entry.block.as_ref() }.size, entry.size);
      sizes.push(entry.size);
    }

    assert_eq!(sizes, vec![8, 16, 24, 32, 48, 64]);
    assert_eq!(index.len(), 0);
  }

  #[test]
  fn test_extract_from_empty() {
    let mut index = FreeIndex::new(4);
    assert_eq!(index.extract_min(), None);
    assert_eq!(index.len(), 0);
  }

  #[test]
  fn test_capacity_exceeded() {
    let mut storage = blocks(&[8, 16, 24]);
    let mut index = FreeIndex::new(2);

    let [a, b, c] = &mut storage[..] else {
      unreachable!()
    };
    index.insert(NonNull::from(a), 8).unwrap();
    index.insert(NonNull::from(b), 16).unwrap();

    assert_eq!(
      index.insert(NonNull::from(c), 24),
      Err(AllocError::FreeIndexCapacityExceeded { capacity: 2 })
    );
    assert_eq!(index.len(), 2);
    assert_eq!(index.capacity(), 2);
  }

  #[test]
  fn test_equal_sizes_all_come_back() {
    let mut storage = blocks(&[16, 16, 16, 16]);
    let mut index = FreeIndex::new(4);
    fill(&mut index, &mut storage);

    let mut seen = Vec::new();
    while let Some(entry) = index.extract_min() {
      seen.push(entry.block);
    }
    seen.sort();
    seen.dedup();

    assert_eq!(seen.len(), 4);
  }

  #[cfg(not(miri))]
  mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
      #[test]
      fn heap_property_survives_interleaving(
        ops in proptest::collection::vec(proptest::option::of(0usize..512), 1..200),
      ) {
        let mut storage: Vec<Block> = ops
          .iter()
          .map(|op| Block::new(op.unwrap_or(0) * 8, true))
          .collect();
        let mut index = FreeIndex::new(storage.len());
        let mut model: Vec<usize> = Vec::new();

        for (op, block) in ops.iter().zip(storage.iter_mut()) {
          match op {
            Some(_) => {
              let size = block.size;
              index.insert(NonNull::from(block), size).unwrap();
              model.push(size);
            }
            None => {
              let expected = model.iter().copied().min();
              let got = index.extract_min().map(|entry| entry.size);
              prop_assert_eq!(got, expected);
              if let Some(min) = expected {
                let at = model.iter().position(|&size| size == min).unwrap();
                model.swap_remove(at);
              }
            }
          }
          prop_assert!(index.is_heap());
          prop_assert_eq!(index.len(), model.len());
        }
      }
    }
  }
}
