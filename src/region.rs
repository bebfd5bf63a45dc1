//! The backing memory provider: a one-shot acquisition of a contiguous
//! writable byte region, and a symmetric release. Explicitly out of scope
//! for the pool's own correctness, the core treats whatever this hands
//! back as an opaque `(base, length)` pair.

use std::ffi::c_void;
use std::ptr;

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, mmap, munmap};

/// Requests an anonymous, private, writable region of exactly `len` bytes
/// from the OS.
///
/// Returns `None` on failure (e.g. the OS refuses to map `len` bytes).
pub fn acquire(len: usize) -> Option<*mut u8> {
  // SAFETY: all arguments are well-formed for an anonymous mapping; the
  // returned pointer is checked against MAP_FAILED before use.
  let addr = unsafe {
    mmap(
      ptr::null_mut(),
      len,
      PROT_READ | PROT_WRITE,
      MAP_PRIVATE | MAP_ANONYMOUS,
      -1,
      0,
    )
  };

  if addr == MAP_FAILED {
    return None;
  }

  Some(addr as *mut u8)
}

/// Releases a region previously returned by [`acquire`] with the same
/// `len`.
///
/// # Safety
///
/// `base` must be a pointer returned by `acquire(len)` and not already
/// released.
pub unsafe fn release(base: *mut u8, len: usize) {
  unsafe {
    munmap(base as *mut c_void, len);
  }
}
