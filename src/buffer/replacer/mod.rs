//! Replacement policies - choosing which slot to reuse on a cache miss.
//!
//! A policy is a pure selection function over a snapshot of every slot; it
//! keeps no state of its own and never mutates the pool.
//!
//! Currently implements:
//! - [`LowestLsnPolicy`] - free slots first, then the unpinned slot with the smallest LSN

mod lowest_lsn;

pub use lowest_lsn::LowestLsnPolicy;

use crate::common::{Lsn, SlotId};

/// A slot as seen by a replacement policy. Index in the slice is the slot id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Never assigned to a block.
    Free,
    /// Holds a block.
    Assigned {
        pin_count: u32,
        lsn: Option<Lsn>,
        /// A write-back of this slot is pending or its latch is held; it
        /// must not be reused yet.
        io_in_flight: bool,
    },
}

impl SlotState {
    /// Whether the slot may be reassigned to another block right now.
    #[inline]
    pub fn is_evictable(&self) -> bool {
        matches!(
            self,
            SlotState::Assigned {
                pin_count: 0,
                io_in_flight: false,
                ..
            }
        )
    }

    /// Unpinned, but held up by a write-back or a page latch. The pool waits
    /// for such slots instead of reporting exhaustion.
    #[inline]
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SlotState::Assigned {
                pin_count: 0,
                io_in_flight: true,
                ..
            }
        )
    }

    /// The same slot, reported as busy.
    pub(crate) fn into_busy(self) -> Self {
        match self {
            SlotState::Free => SlotState::Assigned {
                pin_count: 0,
                lsn: None,
                io_in_flight: true,
            },
            SlotState::Assigned { pin_count, lsn, .. } => SlotState::Assigned {
                pin_count,
                lsn,
                io_in_flight: true,
            },
        }
    }
}

/// Picks the slot to (re)use for a block that is not resident.
pub trait ReplacementPolicy: Send + Sync {
    /// Returns a `Free` or evictable slot, or `None` if there is none.
    ///
    /// Must never return a slot with a non-zero pin count. A `None` while
    /// some slot is busy makes the pool wait and ask again; otherwise the
    /// miss fails with `PoolExhausted`.
    fn choose_victim(&self, slots: &[SlotState]) -> Option<SlotId>;
}
