//! Common types and utilities shared across the page cache.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`BufferPoolConfig`]
//! - Error types
//! - Identifiers (BlockId, SlotId, Lsn, TxnId)

pub mod config;
pub mod error;
mod block_id;
mod lsn;
mod slot_id;

pub use block_id::BlockId;
pub use config::BufferPoolConfig;
pub use error::{Error, Result};
pub use lsn::{Lsn, TxnId};
pub use slot_id::SlotId;
