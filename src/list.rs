//! Free-list primitives: the only code in the crate allowed to touch a
//! [`Header`]'s `prev`/`next` fields or a pool's `head`.
//!
//! All four functions assume the caller already holds the pool mutex.

use std::mem;
use std::ptr;

use crate::header::Header;

pub const HEADER_SIZE: usize = mem::size_of::<Header>();

/// Writes a fresh, unlinked, free header of the given payload `size` at
/// `block`.
pub unsafe fn init_header(block: *mut Header, size: usize) {
  unsafe {
    ptr::write(block, Header::new(size));
  }
}

/// Splices `block` out of the free list anchored at `*head`, if it is on
/// it, and marks it allocated.
///
/// No-op if `block` is null or not found on the list (list membership is
/// confirmed by linear scan, matching the original's `remove_from_free_
/// mem_list`). Leaves the list well-formed.
pub unsafe fn unlink(head: &mut *mut Header, block: *mut Header) {
  if block.is_null() || head.is_null() {
    return;
  }

  unsafe {
    let mut current = *head;
    while !current.is_null() {
      if current == block {
        let prev = (*current).prev;
        let next = (*current).next;

        if !prev.is_null() {
          (*prev).next = next;
        } else {
          *head = next;
        }

        if !next.is_null() {
          (*next).prev = prev;
        }

        (*block).prev = ptr::null_mut();
        (*block).next = ptr::null_mut();
        (*block).is_free = false;
        return;
      }
      current = (*current).next;
    }
  }
}

/// Inserts `block` at the front of the free list (LIFO) and coalesces it
/// with any physically adjacent free neighbor.
///
/// Precondition: `block` is not currently on the list.
pub unsafe fn link_front(head: &mut *mut Header, block: *mut Header) {
  unsafe {
    (*block).is_free = true;
    (*block).prev = ptr::null_mut();
    (*block).next = *head;

    if !head.is_null() {
      (**head).prev = block;
    }

    *head = block;

    coalesce(head, block);
  }
}

/// Physical end address of the block (one past its payload).
unsafe fn block_end(block: *mut Header) -> *mut u8 {
  unsafe { (block as *mut u8).add(HEADER_SIZE + (*block).size) }
}

/// Merges `block` with any free neighbor that is physically adjacent to
/// it, in either direction. At most one neighbor exists on each side
/// (invariant: no two adjacent blocks are both free). Either merge can
/// expose a further merge on the block's other side (the surviving block
/// takes on new boundaries), so the scan restarts from `head` after each
/// merge, with the surviving block as the new `block`, until no neighbor
/// on either side matches.
pub unsafe fn coalesce(head: &mut *mut Header, block: *mut Header) {
  unsafe {
    let mut block = block;
    let mut current = *head;

    while !current.is_null() {
      let next_iter = (*current).next;

      if current == block {
        current = next_iter;
        continue;
      }

      if block_end(block) == current as *mut u8 {
        // `current` immediately follows `block`; absorb it into `block`.
        (*block).size += HEADER_SIZE + (*current).size;
        unlink(head, current);
        // `block` itself is still linked; re-scan from the (possibly
        // new) head since unlinking `current` may have changed it.
        current = *head;
        continue;
      }

      if block_end(current) == block as *mut u8 {
        // `block` immediately follows `current`; absorb `block` into
        // `current` and drop `block` from the list. `current` is now
        // the surviving block and may itself have a free neighbor on
        // its far side, so keep going with `current` in `block`'s
        // place instead of stopping here.
        (*current).size += HEADER_SIZE + (*block).size;
        unlink(head, block);
        block = current;
        current = *head;
        continue;
      }

      current = next_iter;
    }
  }
}
