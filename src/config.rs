//! Compile-time configuration.
//!
//! The pool has exactly one knob: its total size. There is no environment
//! variable, CLI flag, or on-disk state, the pool size is fixed at build
//! time, matching the one-shot, fixed-capacity design of the allocator.

/// Total size, in bytes, of the pool acquired from the OS on first use.
///
/// Reference figure: 1 MiB. Allocation requests (plus their header) that
/// cannot fit within this many bytes always fail with `PoolExhausted`,
/// regardless of fragmentation.
pub const POOL_BYTES: usize = 1024 * 1024;
