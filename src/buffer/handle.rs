//! Pin leases handed out by the buffer pool.

use std::fmt;

use crate::common::{BlockId, SlotId};

/// A lease on a buffer slot, returned by `pin` and `pin_new`.
///
/// Every handle must be passed to `unpin` exactly once. Handles are plain
/// values: releasing one twice is reported as
/// [`Error::InvalidUnpin`](crate::Error::InvalidUnpin) rather than prevented.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    slot: SlotId,
    block: BlockId,
}

impl BufferHandle {
    pub(crate) fn new(slot: SlotId, block: BlockId) -> Self {
        Self { slot, block }
    }

    /// Slot the block is cached in.
    #[inline]
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Block this lease pins.
    #[inline]
    pub fn block(&self) -> &BlockId {
        &self.block
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.block, self.slot)
    }
}
