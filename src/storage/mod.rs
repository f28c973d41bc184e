//! Storage layer - the block store and page formats.
//!
//! This module handles persistent storage:
//! - [`BlockStore`] - The contract the buffer pool reads, writes and appends through
//! - [`FileBlockStore`] - One file per name inside a database directory
//! - [`MemoryBlockStore`] - In-memory store with I/O counters
//! - [`PageFormatter`] - Initializes newly appended blocks
//! - [`page`] - The page type

mod block_store;
mod file_store;
mod formatter;
mod memory_store;
pub mod page;

pub use block_store::BlockStore;
pub use file_store::FileBlockStore;
pub use formatter::{PageFormatter, ZeroFormatter};
pub use memory_store::MemoryBlockStore;
