//! Buffer slot identifier type.

use std::fmt;

/// Identifies a slot in the buffer pool.
///
/// The pool is an arena of slots created once at construction; the index
/// maps blocks to `SlotId`s rather than owning the slots themselves.
///
/// # Example
/// ```
/// use pagecache::SlotId;
///
/// let slot = SlotId::new(5);
/// // Can use directly as index: buffers[slot.0]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

impl SlotId {
    /// Create a new SlotId.
    #[inline]
    pub fn new(id: usize) -> Self {
        SlotId(id)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}
