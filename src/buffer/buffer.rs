//! Buffer - the metadata of one slot in the buffer pool.
//!
//! A [`Buffer`] records what a slot currently holds:
//! - Which block is assigned (if any)
//! - Pin count for lease accounting
//! - Dirty flag, last modifier and LSN for write-back and replacement
//!
//! The page contents of slot `i` live next to it in the pool's page arena.

use crate::buffer::replacer::SlotState;
use crate::common::{BlockId, Lsn, TxnId};

/// Metadata of a buffer slot.
///
/// Buffers are only ever touched while the pool's state lock is held, so no
/// field needs interior mutability.
///
/// # States
/// ```text
/// Free ──assign──▶ Assigned(unpinned) ◀──pin/unpin──▶ Assigned(pinned)
///                          │
///                          └──assign (eviction)──▶ Assigned(other block)
/// ```
#[derive(Debug, Default)]
pub struct Buffer {
    /// Which block is currently loaded, or None if the slot was never used.
    block: Option<BlockId>,

    /// Number of outstanding leases.
    pin_count: u32,

    /// Whether the contents differ from the last durable write.
    dirty: bool,

    /// Transaction behind the most recent write.
    modified_by: Option<TxnId>,

    /// Largest LSN recorded by a write to the current block.
    lsn: Option<Lsn>,

    /// Number of deferred flushes still waiting to write this slot back.
    io_pins: u32,
}

impl Buffer {
    /// Create a new free buffer.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Assignment
    // ========================================================================

    /// Assign the slot to `block` with freshly loaded, clean contents.
    ///
    /// The caller must have written back any dirty contents first.
    pub fn assign(&mut self, block: BlockId) {
        debug_assert_eq!(self.pin_count, 0, "reassigning a pinned buffer");
        self.block = Some(block);
        self.dirty = false;
        self.modified_by = None;
        self.lsn = None;
    }

    /// Mark freshly formatted contents as not yet on disk.
    pub fn mark_new(&mut self, txn: TxnId) {
        self.dirty = true;
        self.modified_by = Some(txn);
    }

    #[inline]
    pub fn block(&self) -> Option<&BlockId> {
        self.block.as_ref()
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.block.is_none()
    }

    // ========================================================================
    // Pin count operations
    // ========================================================================

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.pin_count
    }

    /// Decrement the pin count. Returns the new pin count, or `None` if
    /// there was no pin to release (the count stays at 0).
    #[inline]
    pub fn unpin(&mut self) -> Option<u32> {
        self.pin_count = self.pin_count.checked_sub(1)?;
        Some(self.pin_count)
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    // ========================================================================
    // Modification tracking
    // ========================================================================

    /// Record a write by `txn`, raising the LSN to `max(current, lsn)`.
    pub fn record_write(&mut self, txn: TxnId, lsn: Option<Lsn>) {
        self.dirty = true;
        self.modified_by = Some(txn);
        self.lsn = self.lsn.max(lsn);
    }

    /// Contents are durable again. The LSN is kept for replacement ordering.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
        self.modified_by = None;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether `txn` has changes in this buffer that are not on disk yet.
    #[inline]
    pub fn is_modified_by(&self, txn: TxnId) -> bool {
        self.dirty && self.modified_by == Some(txn)
    }

    #[inline]
    pub fn modified_by(&self) -> Option<TxnId> {
        self.modified_by
    }

    #[inline]
    pub fn lsn(&self) -> Option<Lsn> {
        self.lsn
    }

    // ========================================================================
    // Flush bookkeeping
    // ========================================================================

    pub fn begin_io(&mut self) {
        self.io_pins += 1;
    }

    pub fn end_io(&mut self) {
        self.io_pins = self.io_pins.saturating_sub(1);
    }

    /// View of this slot as seen by the replacement policy.
    pub fn state(&self) -> SlotState {
        match self.block {
            None => SlotState::Free,
            Some(_) => SlotState::Assigned {
                pin_count: self.pin_count,
                lsn: self.lsn,
                io_in_flight: self.io_pins > 0,
            },
        }
    }
}
