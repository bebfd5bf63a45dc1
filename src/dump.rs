//! Debug pretty-printer for the free list. Not on the allocation hot path;
//! exists for interactive inspection (see `demos/pool_demo.rs`) the same
//! way the original's `ma_print_free_list` did.

use crate::header::Header;
use crate::list::HEADER_SIZE;

/// Prints every block currently on the free list, in traversal order, plus
/// a heap-usage summary.
///
/// # Safety
///
/// `head` must be null or a valid free-list head: every reachable `next`
/// pointer is either null or points at a live `Header`.
pub unsafe fn free_list(head: *mut Header, offset: usize, capacity: usize) {
  println!("Free list:");

  let mut current = head;
  let mut count = 0usize;

  while !current.is_null() {
    count += 1;
    unsafe {
      println!(
        "  #{count} | block at {current:p} | size {} | is_free {} | prev {:p} | next {:p}",
        (*current).size,
        (*current).is_free,
        (*current).prev,
        (*current).next,
      );
      current = (*current).next;
    }
  }

  if count == 0 {
    println!("  (empty)");
  }

  println!(
    "Pool usage: {offset} / {capacity} bytes ({:.2}%), header size {HEADER_SIZE} bytes",
    offset as f64 / capacity as f64 * 100.0
  );
}
