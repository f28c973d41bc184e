//! Lowest-LSN replacement policy.
//!
//! Approximates "least recently written": the unpinned page whose latest
//! change is oldest is the most likely to already be durable in the log,
//! so it is the cheapest to discard.

use crate::common::SlotId;

use super::{ReplacementPolicy, SlotState};

/// Free slots first (lowest id), then the evictable slot with the smallest
/// LSN (absent LSN first, lowest id on ties).
#[derive(Debug, Default, Clone, Copy)]
pub struct LowestLsnPolicy;

impl LowestLsnPolicy {
    /// Create a new policy.
    pub fn new() -> Self {
        Self
    }
}

impl ReplacementPolicy for LowestLsnPolicy {
    fn choose_victim(&self, slots: &[SlotState]) -> Option<SlotId> {
        if let Some(free) = slots.iter().position(|s| *s == SlotState::Free) {
            return Some(SlotId::new(free));
        }

        slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                SlotState::Assigned { lsn, .. } if slot.is_evictable() => Some((*lsn, i)),
                _ => None,
            })
            .min()
            .map(|(_, i)| SlotId::new(i))
    }
}
