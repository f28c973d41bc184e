//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache layer between the transaction
//! layer and the block store. It manages a fixed pool of slots, each holding
//! one page.
//!
//! # Components
//! - [`BufferPool`] - The page cache: pin, pin_new, unpin, flush
//! - [`BufferManager`] - Bounded wait-and-retry around a `BufferPool`
//! - [`Buffer`] - Metadata of one slot (block, pins, dirty, LSN)
//! - [`BufferHandle`] - A pin lease
//! - [`PageReadGuard`] / [`PageWriteGuard`] - Latch guards for page access
//! - [`BufferPoolStats`] - Performance statistics
//! - [`replacer`] - Victim selection policies

#[allow(clippy::module_inception)]
mod buffer;
mod buffer_manager;
mod buffer_pool;
mod handle;
mod page_guard;
pub mod replacer;
mod stats;

pub use buffer::Buffer;
pub use buffer_manager::BufferManager;
pub use buffer_pool::BufferPool;
pub use handle::BufferHandle;
pub use page_guard::{PageReadGuard, PageWriteGuard};
pub use stats::{BufferPoolStats, StatsSnapshot};
