use thiserror::Error;

/// Failure reasons for the internal, `Result`-returning primitives.
///
/// None of these ever escape the crate: every public entry point
/// ([`crate::allocate`], [`crate::free`], [`crate::callocate`],
/// [`crate::reallocate`]) collapses this to a null pointer, per the
/// caller-facing contract of a C-shaped allocator interface.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  /// A request that is malformed independent of pool state: a zero-sized
  /// request, or a size/count whose arithmetic overflows `usize`.
  #[error("invalid allocation request")]
  InvalidRequest,

  /// The pool could not be acquired from the OS, or no free block and no
  /// remaining bump-tail space could satisfy the request.
  #[error("pool exhausted")]
  PoolExhausted,
}
