use std::io::Read;

use poolalloc::{allocate, callocate, dump_free_list, free, reallocate};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`,
/// `htop`, or `gdb` between steps.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn main() {
  unsafe {
    // ------------------------------------------------------------------
    // 1) Allocate three 100-byte blocks in a row. With nothing freed yet
    //    these come straight off the bump frontier, back to back.
    // ------------------------------------------------------------------
    let first = allocate(100);
    let second = allocate(100);
    let third = allocate(100);
    println!("[1] Allocated three 100-byte blocks");
    println!("    first = {first:?}, second = {second:?}, third = {third:?}");
    dump_free_list();
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 2) Free the middle block. The free list now holds exactly one
    //    100-byte block, with no coalescing possible yet (both
    //    neighbors are still allocated).
    // ------------------------------------------------------------------
    free(second);
    println!("\n[2] Freed the middle block");
    dump_free_list();
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 3) Free the first block too. It is physically adjacent to the
    //    (now free) middle block, so the two coalesce into one entry.
    // ------------------------------------------------------------------
    free(first);
    println!("\n[3] Freed the first block (coalesces with the middle one)");
    dump_free_list();
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 4) Allocate 16 bytes. Best fit picks the coalesced free block
    //    (far larger than the tiny leftover fragments elsewhere) and
    //    splits off the residual back onto the free list.
    // ------------------------------------------------------------------
    let small = allocate(16);
    println!("\n[4] Allocated 16 bytes (reuses and splits the coalesced block)");
    println!(
      "    small == first? {}",
      if small == first { "yes, reused" } else { "no" }
    );
    dump_free_list();
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 5) Zero-initialized allocation via callocate.
    // ------------------------------------------------------------------
    let zeroed = callocate(8, 4) as *mut u32;
    println!("\n[5] callocate(8, 4) -> {:?}", zeroed);
    for i in 0..8 {
      assert_eq!(zeroed.add(i).read(), 0);
    }
    println!("    all 8 u32 elements confirmed zero");
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 6) Grow the still-outstanding third block. Nothing has been
    //    bump-allocated past it, so this extends in place for free
    //    rather than copying anywhere.
    // ------------------------------------------------------------------
    let grown = reallocate(third, 4096);
    println!("\n[6] Grew the third block to 4096 bytes");
    println!(
      "    grown == third? {}",
      if grown == third { "yes, grew in place" } else { "no, relocated" }
    );
    dump_free_list();

    // ------------------------------------------------------------------
    // 7) End of demo. The process-exit hook releases the pool region
    //    when this process exits.
    // ------------------------------------------------------------------
    println!("\n[7] End of example. The pool will be released at process exit.");
  }
}
