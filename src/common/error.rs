//! Error types for the page cache.

use std::time::Duration;

use thiserror::Error;

use super::BlockId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the buffer pool and its collaborators.
///
/// None of these are fatal to the pool itself: an error aborts the single
/// operation that produced it and leaves pool state as it was.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the block store.
    ///
    /// This wraps `std::io::Error` from file read/write operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested block lies past the end of its file.
    #[error("{0} not found")]
    BlockNotFound(BlockId),

    /// Every slot is pinned, so no victim can be chosen.
    ///
    /// Nothing was mutated. The caller may back off and retry, or abort.
    #[error("buffer pool exhausted: every buffer is pinned")]
    PoolExhausted,

    /// Unpin on a buffer with no outstanding pins.
    ///
    /// This indicates a bug - every pin must be released exactly once.
    #[error("unpin of {0} which has no outstanding pins")]
    InvalidUnpin(BlockId),

    /// Page access through a handle whose buffer is not pinned.
    #[error("buffer holding {0} is not pinned")]
    BufferNotPinned(BlockId),

    /// `BufferManager` gave up waiting for an unpinned buffer.
    #[error("no buffer became available within {0:?}")]
    WaitTimeout(Duration),

    /// Typed page access outside the page bounds.
    #[error("access of {len} bytes at offset {offset} overflows the page")]
    PageOverflow { offset: usize, len: usize },
}
