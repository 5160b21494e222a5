use std::{mem, ptr::NonNull};

/// Header written in front of every payload in the arena.
///
/// `size` counts payload bytes only and is always a multiple of
/// [`ALIGNMENT`](crate::align::ALIGNMENT).
#[repr(C, align(8))]
pub struct Block {
  pub size: usize,
  pub is_free: bool,
}

/// Bytes taken by a [`Block`] header. Payloads start right after it.
pub const HEADER_SIZE: usize = mem::size_of::<Block>();

const _: () = assert!(HEADER_SIZE % crate::align::ALIGNMENT == 0);

impl Block {
  pub fn new(
    size: usize,
    is_free: bool,
  ) -> Self {
    Self { size, is_free }
  }

  /// Writes a fresh header at `address` and returns a handle to it.
  ///
  /// # Safety
  ///
  /// `address` must be non-null, 8-byte aligned and valid for writes of
  /// `HEADER_SIZE + size` bytes.
  pub unsafe fn write(
    address: *mut u8,
    size: usize,
    is_free: bool,
  ) -> NonNull<Block> {
    unsafe {
      let block = address as *mut Block;
      block.write(Block::new(size, is_free));
      NonNull::new_unchecked(block)
    }
  }

  /// Recovers the header that precedes a payload handed out by the allocator.
  ///
  /// # Safety
  ///
  /// `payload` must have been produced by [`Block::payload`].
  pub unsafe fn from_payload(payload: NonNull<u8>) -> NonNull<Block> {
    unsafe { payload.sub(HEADER_SIZE).cast() }
  }

  /// Address of the first payload byte of `block`.
  ///
  /// # Safety
  ///
  /// `block` must point at a header followed by its payload.
  pub unsafe fn payload(block: NonNull<Block>) -> NonNull<u8> {
    unsafe { block.cast::<u8>().add(HEADER_SIZE) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_header_layout() {
    assert_eq!(HEADER_SIZE % 8, 0);
    assert!(HEADER_SIZE >= mem::size_of::<usize>() + 1);
  }

  #[test]
  fn test_payload_round_trip() {
    let mut storage = [0u64; 8];
    let base = storage.as_mut_ptr() as *mut u8;

    unsafe {
      let block = Block::write(base, 32, true);
      let payload = Block::payload(block);

      assert_eq!(payload.as_ptr() as usize - base as usize, HEADER_SIZE);
      assert_eq!(Block::from_payload(payload), block);
      assert_eq!((*block.as_ptr()).size, 32);
      assert!((*block.as_ptr()).is_free);
    }
  }
}
