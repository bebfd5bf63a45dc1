//! # poolalloc - A Fixed-Size Pool Allocator
//!
//! This crate provides a **pool allocator**: a single anonymous memory
//! region, acquired once from the OS, carved up on demand with a best-fit
//! free list and a bump-pointer fallback for space that has never been
//! touched.
//!
//! ## Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         POOL REGION (fixed size)                    │
//!   │                                                                      │
//!   │   ┌─────┬──────┬─────┬──────────────┬───────────────────────────┐   │
//!   │   │ A1  │ free │ A2  │    free      │      untouched (bump)      │   │
//!   │   └─────┴──────┴─────┴──────────────┴───────────────────────────┘   │
//!   │                                     ▲                         ▲     │
//!   │                                 bump frontier              pool end │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   A request first checks the free list for a best fit. Only when no
//!   free block is large enough does it fall back to the bump frontier,
//!   which never moves backward.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   poolalloc
//!   ├── align    - Alignment macro (align!), kept from the original design
//!   ├── config   - Compile-time pool size
//!   ├── error    - AllocError, internal to the Result-returning primitives
//!   ├── header   - In-band block metadata (size, is_free, prev, next)
//!   ├── list     - Free-list splice/coalesce primitives
//!   ├── region   - The backing-memory provider (mmap/munmap)
//!   ├── pool     - Placement, reclamation, resize, and the process singleton
//!   └── dump     - Free-list pretty-printer, for interactive inspection
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use poolalloc::{allocate, free, reallocate};
//!
//! fn main() {
//!     unsafe {
//!         let p = allocate(64) as *mut u64;
//!         assert!(!p.is_null());
//!         *p = 42;
//!
//!         let p = reallocate(p as *mut u8, 256);
//!         free(p);
//!     }
//! }
//! ```
//!
//! ## How It Works
//!
//! Each block carries an in-band header immediately before its payload:
//!
//! ```text
//!   Single block:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         Payload                │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ is_free: bool   │  │  │                          │  │
//!   │  │ prev: ptr       │  │  │     N bytes usable       │  │
//!   │  │ next: ptr       │  │  │                          │  │
//!   │  └─────────────────┘  │  └──────────────────────────┘  │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to the caller
//! ```
//!
//! `free` links a block back onto the free list and immediately coalesces
//! it with any physically adjacent free neighbor, in either direction.
//! `allocate` prefers the smallest free block that still fits (best fit,
//! splitting off a residual when the remainder can hold another header),
//! falling back to the bump frontier only when the free list has nothing
//! usable. `reallocate` shrinks in place, grows in place (either by
//! extending into virgin bump-tail space, or by absorbing a tail-adjacent
//! free neighbor), or relocates via allocate + copy + free.
//!
//! ## Features
//!
//! - **Best-fit reuse**: freed blocks are not just appended to a list, they
//!   are considered for the next allocation of a matching size.
//! - **Coalescing**: adjacent free blocks are merged eagerly, not lazily.
//! - **In-place resize**: growing the most recent allocation, or one with
//!   free space directly behind it, avoids a copy.
//! - **Process-wide singleton**: one pool per process, synchronized by a
//!   single, non-reentrant mutex.
//!
//! ## Limitations
//!
//! - **Fixed capacity**: the pool is sized once at first use (see
//!   [`POOL_BYTES`]) and never grows.
//! - **No double-free detection**: freeing a pointer twice, or a pointer
//!   this crate did not hand out, is a caller contract violation.
//! - **Unix-only**: requires `libc` for `mmap`/`munmap`/`atexit`.
//!
//! ## Safety
//!
//! This crate manages raw memory directly; every entry point that accepts
//! or returns a pointer is `unsafe`, and upholding its contract (pointers
//! only ever come from this crate's own allocation functions, and are
//! never used again after being freed) is the caller's responsibility.

pub mod align;
mod config;
mod dump;
mod error;
mod header;
mod list;
mod pool;
mod region;

pub use config::POOL_BYTES;
pub use error::AllocError;
pub use pool::{allocate, callocate, dump as dump_free_list, free, reallocate};
