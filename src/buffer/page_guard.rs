//! Latch guards for page access.
//!
//! These guards give access to the contents of a pinned buffer:
//! - [`PageReadGuard`] - Shared read access (multiple allowed)
//! - [`PageWriteGuard`] - Exclusive write access
//!
//! A guard holds the slot's latch, not its pin. Drop every guard before
//! unpinning the handle it came from; a guard that outlives its pin can
//! stall an eviction of that slot.

use std::ops::{Deref, DerefMut};

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::common::{BlockId, SlotId};
use crate::storage::page::Page;

/// Guard for read-only page access.
///
/// # Example
/// ```ignore
/// let guard = pool.page(&handle)?;
/// let value = guard.get_int(0)?;  // Deref to &Page
/// // guard drops here, latch released; the pin is still held
/// ```
pub struct PageReadGuard<'a> {
    /// Slot holding this page.
    slot: SlotId,
    /// Block the page belongs to.
    block: BlockId,
    lock: RwLockReadGuard<'a, Page>,
}

impl<'a> PageReadGuard<'a> {
    /// Called by `BufferPool::page()`.
    pub(crate) fn new(slot: SlotId, block: BlockId, lock: RwLockReadGuard<'a, Page>) -> Self {
        Self { slot, block, lock }
    }

    #[inline]
    pub fn block(&self) -> &BlockId {
        &self.block
    }

    #[inline]
    pub fn slot(&self) -> SlotId {
        self.slot
    }
}

impl Deref for PageReadGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

/// Guard for exclusive write access to a page.
///
/// The write was recorded against the buffer (dirty flag, modifier, LSN)
/// when the guard was handed out.
///
/// # Example
/// ```ignore
/// let mut guard = pool.page_mut(&handle, txn, Some(lsn))?;
/// guard.set_int(0, 42)?;  // DerefMut to &mut Page
/// ```
pub struct PageWriteGuard<'a> {
    slot: SlotId,
    block: BlockId,
    lock: RwLockWriteGuard<'a, Page>,
}

impl<'a> PageWriteGuard<'a> {
    /// Called by `BufferPool::page_mut()`.
    pub(crate) fn new(slot: SlotId, block: BlockId, lock: RwLockWriteGuard<'a, Page>) -> Self {
        Self { slot, block, lock }
    }

    #[inline]
    pub fn block(&self) -> &BlockId {
        &self.block
    }

    #[inline]
    pub fn slot(&self) -> SlotId {
        self.slot
    }
}

impl Deref for PageWriteGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl DerefMut for PageWriteGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.lock
    }
}
