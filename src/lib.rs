//! pagecache - a fixed-capacity buffer pool for a transactional storage engine.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Transaction layer (caller)                     │
//! │        pin / pin_new / unpin / flush_all(txn) / page access     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Buffer Pool (buffer/)                                          │
//! │   BufferManager (bounded wait) → BufferPool                     │
//! │   Buffer slots + BlockId→SlotId index + available counter       │
//! │   ReplacementPolicy: free slot, else lowest LSN among unpinned  │
//! └─────────────────────────────────────────────────────────────────┘
//!            ↓ read / write / append              ↓ flush(lsn)
//! ┌──────────────────────────────────┐  ┌──────────────────────────┐
//! │  Storage (storage/)              │  │  Recovery (recovery/)    │
//! │  BlockStore: File | Memory       │  │  LogService (WAL hook)   │
//! │  Page + PageFormatter            │  │                          │
//! └──────────────────────────────────┘  └──────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, SlotId, Lsn, TxnId, Error, config)
//! - [`buffer`] - Buffer pool management and replacement policy
//! - [`storage`] - Block stores, pages and page formatters
//! - [`recovery`] - Log durability hook
//!
//! # Quick Start
//! ```no_run
//! use pagecache::{BlockId, BufferPool, FileBlockStore, TxnId, ZeroFormatter};
//!
//! let store = FileBlockStore::open("my_database").unwrap();
//! let pool = BufferPool::new(16, store);
//!
//! let handle = pool.pin_new("students.tbl", &ZeroFormatter, TxnId(1)).unwrap();
//! pool.unpin(&handle).unwrap();
//! pool.flush_all(TxnId(1)).unwrap();
//!
//! let handle = pool.pin(&BlockId::new("students.tbl", 0)).unwrap();
//! pool.unpin(&handle).unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod recovery;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{BlockId, BufferPoolConfig, Error, Lsn, Result, SlotId, TxnId};

pub use buffer::{
    BufferHandle, BufferManager, BufferPool, BufferPoolStats, PageReadGuard, PageWriteGuard,
    StatsSnapshot,
};
pub use recovery::{LogService, NoopLogService};
pub use storage::page::Page;
pub use storage::{BlockStore, FileBlockStore, MemoryBlockStore, PageFormatter, ZeroFormatter};
