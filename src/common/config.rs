//! Configuration for the page cache.

use std::time::Duration;

/// Size of a block/page in bytes (4KB).
///
/// Every block in every file has exactly this size, and every buffer slot
/// holds exactly one page of this size.
///
/// # Alignment
/// Pages are aligned to 4096 bytes for efficient Direct I/O (O_DIRECT).
pub const PAGE_SIZE: usize = 4096;

/// Number of buffer slots used when no size is given.
pub const DEFAULT_POOL_SIZE: usize = 8;

/// How long [`BufferManager`](crate::buffer::BufferManager) waits for a
/// buffer to become unpinned before giving up.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(10);

/// Tunables for a buffer pool.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use pagecache::BufferPoolConfig;
///
/// let config = BufferPoolConfig::default()
///     .pool_size(64)
///     .max_wait(Duration::from_millis(250));
/// assert_eq!(config.pool_size, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of slots, fixed for the life of the pool.
    pub pool_size: usize,
    /// Upper bound on the wait-and-retry loop in `BufferManager`.
    pub max_wait: Duration,
}

impl BufferPoolConfig {
    /// Set the number of slots.
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Set the maximum wait for a free buffer.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}
