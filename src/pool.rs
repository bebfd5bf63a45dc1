//! The pool manager: placement, reclamation, and resize.
//!
//! [`Pool`] holds the mutable state for one pool instance (base address,
//! bump frontier, free-list head) and implements the placement/reclamation/
//! resize algorithms against it. The crate keeps exactly one `Pool` alive
//! for the life of the process, behind a `Mutex` taken once per public
//! call, including [`reallocate`], which drives `Pool`'s methods directly
//! instead of re-entering the other public functions (see the design notes
//! on the non-recursive rewrite this implies versus a recursive mutex).

use std::ptr;
use std::sync::{Mutex, MutexGuard, Once, OnceLock};

use crate::config::POOL_BYTES;
use crate::error::AllocError;
use crate::header::Header;
use crate::list::{self, HEADER_SIZE};
use crate::region;

/// One pool's worth of mutable state: its base address, the bump
/// frontier, and the free-list head.
///
/// Exists as its own type so it can be exercised directly in tests
/// against a private, freshly mapped region, independent of the
/// process-wide singleton the public API uses.
pub(crate) struct Pool {
  base: *mut u8,
  offset: usize,
  head: *mut Header,
}

// SAFETY: every field is only ever touched while the owning `Mutex` (for
// the singleton) or a unique `&mut Pool` (in tests) is held.
unsafe impl Send for Pool {}

impl Pool {
  pub const fn new() -> Self {
    Self {
      base: ptr::null_mut(),
      offset: 0,
      head: ptr::null_mut(),
    }
  }

  fn payload_of(&self, block: *mut Header) -> *mut u8 {
    unsafe { (block as *mut u8).add(HEADER_SIZE) }
  }

  fn header_of(&self, payload: *mut u8) -> *mut Header {
    unsafe { payload.sub(HEADER_SIZE) as *mut Header }
  }

  fn block_end(&self, block: *mut Header) -> *mut u8 {
    unsafe { (block as *mut u8).add(HEADER_SIZE + (*block).size) }
  }

  /// Idempotent: acquires the backing region on first call, and
  /// registers the process-exit teardown hook for the first pool in the
  /// process to do so. A no-op on every later call once `base` is set.
  fn ensure_region(&mut self) -> Result<(), AllocError> {
    if !self.base.is_null() {
      return Ok(());
    }

    match region::acquire(POOL_BYTES) {
      Some(base) => {
        log::debug!("pool acquired ({POOL_BYTES} bytes)");
        self.base = base;
        self.offset = 0;
        self.head = ptr::null_mut();
        register_teardown();
        Ok(())
      }
      None => {
        log::warn!("failed to acquire pool region from the OS");
        Err(AllocError::PoolExhausted)
      }
    }
  }

  /// Best-fit search: the smallest free block whose size is at least
  /// `n`, first-encountered on ties, with an early exit on an exact
  /// match.
  fn find_best_fit(&self, n: usize) -> *mut Header {
    unsafe {
      let mut current = self.head;
      let mut best: *mut Header = ptr::null_mut();

      while !current.is_null() {
        let size = (*current).size;
        if size >= n && (best.is_null() || size < (*best).size) {
          best = current;
          if size == n {
            return best;
          }
        }
        current = (*current).next;
      }

      best
    }
  }

  /// Splits `block` (precondition: `block.size >= n`) into an `n`-byte
  /// allocated portion and, if the remainder can hold a header plus at
  /// least one payload byte, a residual free block linked back into the
  /// free list. Otherwise `block` is left at its original, oversized
  /// size.
  fn split(&mut self, block: *mut Header, n: usize) {
    unsafe {
      let remainder = (*block).size - n;
      if remainder < HEADER_SIZE + 1 {
        return;
      }

      let remainder_size = remainder - HEADER_SIZE;
      let new_block = self.payload_of(block).add(n) as *mut Header;
      (*block).size = n;

      list::init_header(new_block, remainder_size);
      log::trace!("split block: kept {n}, residual {remainder_size}");
      list::link_front(&mut self.head, new_block);
    }
  }

  pub fn alloc(&mut self, n: usize) -> Result<*mut u8, AllocError> {
    self.ensure_region()?;

    if n == 0 {
      return Err(AllocError::InvalidRequest);
    }

    let total = n.checked_add(HEADER_SIZE).ok_or(AllocError::InvalidRequest)?;

    let best = self.find_best_fit(n);
    if !best.is_null() {
      unsafe {
        list::unlink(&mut self.head, best);
      }
      self.split(best, n);
      log::trace!("allocated {n} bytes from free list (best fit)");
      return Ok(self.payload_of(best));
    }

    let new_offset = self
      .offset
      .checked_add(total)
      .filter(|&o| o <= POOL_BYTES)
      .ok_or(AllocError::PoolExhausted)?;

    unsafe {
      let block = self.base.add(self.offset) as *mut Header;
      list::init_header(block, n);
      (*block).is_free = false;
      self.offset = new_offset;
      log::trace!("allocated {n} bytes from bump tail, offset now {}", self.offset);
      Ok(self.payload_of(block))
    }
  }

  pub fn free(&mut self, p: *mut u8) {
    if p.is_null() {
      return;
    }

    let block = self.header_of(p);
    unsafe {
      list::link_front(&mut self.head, block);
    }
  }

  pub fn calloc(&mut self, count: usize, elem_size: usize) -> Result<*mut u8, AllocError> {
    if count == 0 {
      return Err(AllocError::InvalidRequest);
    }

    let total = count.checked_mul(elem_size).ok_or(AllocError::InvalidRequest)?;
    let ptr = self.alloc(total)?;

    unsafe {
      ptr::write_bytes(ptr, 0, total);
    }

    Ok(ptr)
  }

  /// `p == null` behaves like [`Pool::alloc`]; `n == 0` behaves like
  /// [`Pool::free`] and returns `Ok` of a null pointer. Otherwise shrinks
  /// in place, grows in place (either into virgin bump-tail space or by
  /// consuming a tail-adjacent free neighbor), or relocates via alloc +
  /// copy + free.
  pub fn realloc(&mut self, p: *mut u8, n: usize) -> Result<*mut u8, AllocError> {
    if p.is_null() {
      return self.alloc(n);
    }

    if n == 0 {
      self.free(p);
      return Ok(ptr::null_mut());
    }

    let block = self.header_of(p);
    let old_size = unsafe { (*block).size };

    if n <= old_size {
      return Ok(p);
    }

    let needed = n - old_size;
    let tail = self.block_end(block);

    // If this block sits at the bump frontier, grow directly into the
    // virgin space after it rather than relocating.
    if tail == unsafe { self.base.add(self.offset) } {
      if let Some(new_offset) = self.offset.checked_add(needed).filter(|&o| o <= POOL_BYTES) {
        self.offset = new_offset;
        unsafe {
          (*block).size = n;
        }
        log::trace!("grew block into bump tail: {old_size} -> {n}");
        return Ok(p);
      }
    }

    let mut current = self.head;
    while !current.is_null() {
      let next = unsafe { (*current).next };
      if current as *mut u8 == tail && unsafe { (*current).size } >= needed {
        unsafe {
          list::unlink(&mut self.head, current);
          (*block).size += HEADER_SIZE + (*current).size;
        }
        log::trace!("grew block in place: {old_size} -> {n}");
        if unsafe { (*block).size } > n + HEADER_SIZE + 1 {
          self.split(block, n);
        }
        return Ok(p);
      }
      current = next;
    }

    let new_ptr = self.alloc(n)?;
    unsafe {
      ptr::copy_nonoverlapping(p, new_ptr, old_size);
    }
    self.free(p);
    log::trace!("relocated block: {old_size} -> {n}");
    Ok(new_ptr)
  }

  /// Prints the current free list and usage summary to stdout.
  pub fn dump(&self) {
    unsafe {
      crate::dump::free_list(self.head, self.offset, POOL_BYTES);
    }
  }
}

static SINGLETON: OnceLock<Mutex<Pool>> = OnceLock::new();
static TEARDOWN_REGISTERED: Once = Once::new();

fn singleton() -> &'static Mutex<Pool> {
  SINGLETON.get_or_init(|| Mutex::new(Pool::new()))
}

fn lock_singleton() -> MutexGuard<'static, Pool> {
  singleton().lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn register_teardown() {
  TEARDOWN_REGISTERED.call_once(|| unsafe {
    libc::atexit(teardown);
  });
}

/// Releases the singleton's pool region, if one was ever acquired.
/// Registered with `libc::atexit` the first time the singleton's pool is
/// acquired; never called directly.
extern "C" fn teardown() {
  if let Some(mutex) = SINGLETON.get() {
    let mut pool = mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if !pool.base.is_null() {
      log::debug!("releasing pool region at process exit");
      unsafe {
        region::release(pool.base, POOL_BYTES);
      }
      pool.base = ptr::null_mut();
      pool.offset = 0;
      pool.head = ptr::null_mut();
    }
  }
}

/// Allocates `n` bytes from the pool, returning the payload address or
/// null on failure (invalid request, or pool exhaustion).
///
/// # Safety
///
/// Purely additive to process state; safe to call from any thread.
/// Marked `unsafe` to match the rest of this crate's raw-pointer API.
pub unsafe fn allocate(n: usize) -> *mut u8 {
  let mut pool = lock_singleton();
  pool.alloc(n).unwrap_or(ptr::null_mut())
}

/// Frees a block previously returned by [`allocate`], [`callocate`], or
/// [`reallocate`]. A no-op on a null pointer.
///
/// # Safety
///
/// `p` must be null or a pointer previously returned by this crate's
/// allocation functions, not freed since. Double-free and foreign
/// pointers are caller contract violations with unspecified behavior.
pub unsafe fn free(p: *mut u8) {
  if p.is_null() {
    return;
  }
  let mut pool = lock_singleton();
  pool.free(p);
}

/// Allocates space for `count` elements of `elem_size` bytes each,
/// zero-initialized. Null on a zero count, on multiplicative overflow, or
/// on exhaustion.
///
/// # Safety
///
/// See [`allocate`].
pub unsafe fn callocate(count: usize, elem_size: usize) -> *mut u8 {
  let mut pool = lock_singleton();
  pool.calloc(count, elem_size).unwrap_or(ptr::null_mut())
}

/// Resizes the block at `p` to `n` bytes, preserving `min(old_size, n)`
/// leading bytes. `p == null` behaves like [`allocate`]; `n == 0`
/// behaves like [`free`] and returns null.
///
/// # Safety
///
/// `p` must be null or a pointer previously returned by this crate's
/// allocation functions, not freed since.
pub unsafe fn reallocate(p: *mut u8, n: usize) -> *mut u8 {
  let mut pool = lock_singleton();
  pool.realloc(p, n).unwrap_or(ptr::null_mut())
}

/// Prints the singleton pool's free list and usage summary to stdout.
pub fn dump() {
  lock_singleton().dump();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reuse_after_free() {
    let mut pool = Pool::new();
    unsafe {
      let p1 = pool.alloc(4).unwrap();
      pool.free(p1);
      let p2 = pool.alloc(4).unwrap();
      assert_eq!(p1, p2);
    }
  }

  #[test]
  fn split_on_free_then_small_alloc() {
    let mut pool = Pool::new();
    let p = pool.alloc(1000).unwrap();
    pool.free(p);
    let q = pool.alloc(16).unwrap();
    assert_eq!(p, q);

    assert!(!pool.head.is_null());
    unsafe {
      assert_eq!((*pool.head).size, 1000 - 16 - HEADER_SIZE);
      assert!((*pool.head).next.is_null());
    }
  }

  #[test]
  fn middle_free_coalesces_with_both_neighbors() {
    let mut pool = Pool::new();
    let p1 = pool.alloc(100).unwrap();
    let p2 = pool.alloc(100).unwrap();
    let p3 = pool.alloc(100).unwrap();

    pool.free(p2);
    unsafe {
      assert_eq!((*pool.head).size, 100);
      assert!((*pool.head).next.is_null());
    }

    pool.free(p1);
    unsafe {
      assert_eq!((*pool.head).size, 100 + HEADER_SIZE + 100);
      assert!((*pool.head).next.is_null());
    }

    pool.free(p3);
    unsafe {
      assert_eq!((*pool.head).size, 300 + 2 * HEADER_SIZE);
      assert!((*pool.head).next.is_null());
    }
  }

  #[test]
  fn callocate_zeroes_and_rejects_zero_count() {
    let mut pool = Pool::new();
    unsafe {
      let a = pool.calloc(5, 4).unwrap() as *mut u32;
      for i in 0..5 {
        assert_eq!(a.add(i).read(), 0);
      }
      pool.free(a as *mut u8);
    }

    assert_eq!(pool.calloc(0, 4), Err(AllocError::InvalidRequest));
  }

  #[test]
  fn callocate_rejects_multiplicative_overflow() {
    let mut pool = Pool::new();
    assert_eq!(pool.calloc(usize::MAX, 2), Err(AllocError::InvalidRequest));
  }

  #[test]
  fn reallocate_grows_in_place_without_intervening_allocations() {
    let mut pool = Pool::new();
    let p = pool.alloc(8).unwrap();
    unsafe {
      ptr::write(p, 1u8);
      ptr::write(p.add(1), 2u8);

      let q = pool.realloc(p, 20).unwrap();
      assert_eq!(p, q);
      assert_eq!(ptr::read(q), 1);
      assert_eq!(ptr::read(q.add(1)), 2);
    }
  }

  #[test]
  fn reallocate_shrink_is_a_noop_pointer_wise() {
    let mut pool = Pool::new();
    let p = pool.alloc(40).unwrap();
    unsafe {
      ptr::write(p, 0u8);
      ptr::write(p.add(1), 10u8);
      ptr::write(p.add(2), 20u8);
      ptr::write(p.add(3), 30u8);

      let q = pool.realloc(p, 12).unwrap();
      assert_eq!(p, q);
      assert_eq!(ptr::read(q), 0);
      assert_eq!(ptr::read(q.add(1)), 10);
      assert_eq!(ptr::read(q.add(2)), 20);
      assert_eq!(ptr::read(q.add(3)), 30);
    }
  }

  #[test]
  fn reallocate_null_pointer_behaves_like_allocate() {
    let mut pool = Pool::new();
    let p = pool.realloc(ptr::null_mut(), 16).unwrap();
    assert!(!p.is_null());
  }

  #[test]
  fn reallocate_zero_size_behaves_like_free() {
    let mut pool = Pool::new();
    let p = pool.alloc(16).unwrap();
    let q = pool.realloc(p, 0).unwrap();
    assert!(q.is_null());
    unsafe {
      assert!(!pool.head.is_null());
      assert_eq!((*pool.head).size, 16);
    }
  }

  #[test]
  fn free_null_is_a_noop() {
    let mut pool = Pool::new();
    pool.free(ptr::null_mut());
    assert!(pool.head.is_null());
  }

  #[test]
  fn allocate_zero_is_rejected() {
    let mut pool = Pool::new();
    assert_eq!(pool.alloc(0), Err(AllocError::InvalidRequest));
  }

  #[test]
  fn out_of_memory_then_recovers_after_free() {
    let mut pool = Pool::new();
    assert_eq!(pool.alloc(POOL_BYTES), Err(AllocError::PoolExhausted));

    let big = pool.alloc(POOL_BYTES - HEADER_SIZE).unwrap();
    assert!(!big.is_null());
    assert_eq!(pool.alloc(1), Err(AllocError::PoolExhausted));

    pool.free(big);
    let again = pool.alloc(1).unwrap();
    assert!(!again.is_null());
  }

  #[test]
  fn singleton_survives_round_trip() {
    unsafe {
      let p = allocate(32);
      assert!(!p.is_null());
      let q = reallocate(p, 64);
      assert!(!q.is_null());
      free(q);
      free(ptr::null_mut());
    }
  }
}
