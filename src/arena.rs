//! Arena sources: where the single backing region comes from.

use std::ptr::{self, NonNull};

use libc::{c_void, intptr_t, sbrk};

/// Provides the one contiguous region an [`Allocator`](crate::Allocator)
/// carves blocks from.
pub trait ArenaSource {
  /// Requests `size` bytes. Returns `None` if the OS refuses.
  ///
  /// # Safety
  ///
  /// Called at most once per allocator; the returned region must stay valid
  /// until [`ArenaSource::release`] is called for it.
  unsafe fn acquire(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>>;

  /// Gives a region obtained from [`ArenaSource::acquire`] back.
  ///
  /// # Safety
  ///
  /// `base` and `size` must be exactly what `acquire` returned and was
  /// asked for, and no pointer into the region may be used afterwards.
  unsafe fn release(
    &mut self,
    base: NonNull<u8>,
    size: usize,
  );
}

/// Anonymous private mapping per arena. Safe to use from many allocators at
/// once, which is why it is the default.
#[derive(Clone, Copy, Debug, Default)]
pub struct MmapSource;

impl ArenaSource for MmapSource {
  unsafe fn acquire(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let address = unsafe {
      libc::mmap(
        ptr::null_mut(),
        size,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if address == libc::MAP_FAILED {
      return None;
    }

    NonNull::new(address as *mut u8)
  }

  unsafe fn release(
    &mut self,
    base: NonNull<u8>,
    size: usize,
  ) {
    if unsafe { libc::munmap(base.as_ptr() as *mut c_void, size) } != 0 {
      log::warn!("munmap of arena at {:?} ({} bytes) failed", base, size);
    }
  }
}

/// Moves the program break once with `sbrk(2)`.
///
/// The break is process-wide and not synchronized with the system
/// allocator, so only use this from a single thread. Released arenas are
/// kept: the break cannot be lowered past regions other code may own.
#[derive(Clone, Copy, Debug, Default)]
pub struct SbrkSource;

impl ArenaSource for SbrkSource {
  unsafe fn acquire(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let increment = intptr_t::try_from(size).ok()?;
    let address = unsafe { sbrk(increment) };

    if address == usize::MAX as *mut c_void {
      return None;
    }

    NonNull::new(address as *mut u8)
  }

  unsafe fn release(
    &mut self,
    base: NonNull<u8>,
    size: usize,
  ) {
    log::debug!("keeping {} byte sbrk arena at {:?}", size, base);
  }
}
