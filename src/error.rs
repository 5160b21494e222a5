//! Allocator error types.

use std::error::Error;
use std::fmt;

/// Errors reported by [`Allocator`](crate::Allocator) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
  /// The arena source could not provide the backing region.
  ArenaAcquisitionFailed {
    /// Number of bytes requested from the source.
    size: usize,
  },
  /// The configured arena cannot even hold a single block header.
  ArenaTooSmall {
    /// Configured arena size in bytes.
    size: usize,
    /// Bytes taken by one header.
    header: usize,
  },
  /// The free-block index is full and cannot track another free block.
  FreeIndexCapacityExceeded {
    /// Maximum number of entries the index holds.
    capacity: usize,
  },
  /// No free block is large enough for the request.
  OutOfMemory {
    /// Requested payload size in bytes, before rounding.
    requested: usize,
  },
}

impl AllocError {
  /// Whether the error leaves the allocator unable to serve any request of
  /// this kind again. Only [`AllocError::OutOfMemory`] is worth retrying
  /// after releasing memory.
  pub fn is_fatal(&self) -> bool {
    !matches!(self, Self::OutOfMemory { .. })
  }
}

impl fmt::Display for AllocError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      Self::ArenaAcquisitionFailed { size } => {
        write!(f, "failed to acquire a {size} byte arena")
      }
      Self::ArenaTooSmall { size, header } => {
        write!(
          f,
          "arena of {size} bytes cannot hold a {header} byte block header"
        )
      }
      Self::FreeIndexCapacityExceeded { capacity } => {
        write!(f, "free-block index overflow: capacity {capacity} entries")
      }
      Self::OutOfMemory { requested } => {
        write!(f, "no free block found for {requested} bytes")
      }
    }
  }
}

impl Error for AllocError {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_only_out_of_memory_is_recoverable() {
    assert!(!AllocError::OutOfMemory { requested: 1 }.is_fatal());
    assert!(AllocError::ArenaAcquisitionFailed { size: 1 }.is_fatal());
    assert!(AllocError::ArenaTooSmall { size: 1, header: 16 }.is_fatal());
    assert!(AllocError::FreeIndexCapacityExceeded { capacity: 4 }.is_fatal());
  }

  #[test]
  fn test_display() {
    assert_eq!(
      AllocError::OutOfMemory { requested: 2048 }.to_string(),
      "no free block found for 2048 bytes"
    );
    assert_eq!(
      AllocError::FreeIndexCapacityExceeded { capacity: 1024 }.to_string(),
      "free-block index overflow: capacity 1024 entries"
    );
  }
}
