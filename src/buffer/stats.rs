//! Buffer pool counters.
//!
//! Counters complement the `tracing` events the pool emits: events describe
//! individual hits, misses and evictions, counters summarize them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running totals kept by a [`BufferPool`](crate::BufferPool).
///
/// Counters are bumped with `Relaxed` atomics from inside and outside the
/// pool lock; they are independent of each other, so a snapshot taken under
/// load may be off by the operations still in progress.
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    evictions: AtomicU64,
    blocks_read: AtomicU64,
    blocks_written: AtomicU64,
    exhaustions: AtomicU64,
}

impl BufferPoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read(&self) {
        self.blocks_read.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write(&self) {
        self.blocks_written.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_exhaustion(&self) {
        self.exhaustions.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current totals.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            blocks_read: self.blocks_read.load(Ordering::Relaxed),
            blocks_written: self.blocks_written.load(Ordering::Relaxed),
            exhaustions: self.exhaustions.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for counter in [
            &self.cache_hits,
            &self.cache_misses,
            &self.evictions,
            &self.blocks_read,
            &self.blocks_written,
            &self.exhaustions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Plain copy of [`BufferPoolStats`] at one point in time.
///
/// # Example
/// ```
/// use pagecache::{BlockId, BufferPool, MemoryBlockStore, TxnId, ZeroFormatter};
///
/// let pool = BufferPool::new(2, MemoryBlockStore::new());
/// let before = pool.stats().snapshot();
///
/// let handle = pool.pin_new("t.tbl", &ZeroFormatter, TxnId(1))?;
/// pool.unpin(&handle)?;
/// pool.unpin(&pool.pin(handle.block())?)?;
///
/// let delta = pool.stats().snapshot().since(&before);
/// assert_eq!(delta.cache_hits, 1);
/// println!("{delta}");
/// # Ok::<(), pagecache::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Pins satisfied by a resident block.
    pub cache_hits: u64,
    /// Pins that needed a slot for a non-resident block.
    pub cache_misses: u64,
    /// Slots reassigned away from a previously cached block.
    pub evictions: u64,
    pub blocks_read: u64,
    /// Write-backs, from eviction and from flushes.
    pub blocks_written: u64,
    /// Pin requests rejected because every slot was pinned.
    pub exhaustions: u64,
}

impl StatsSnapshot {
    /// Hits over all `pin` lookups, 0.0 when there were none.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }

    /// What happened between `earlier` and this snapshot.
    pub fn since(&self, earlier: &StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.saturating_sub(earlier.cache_hits),
            cache_misses: self.cache_misses.saturating_sub(earlier.cache_misses),
            evictions: self.evictions.saturating_sub(earlier.evictions),
            blocks_read: self.blocks_read.saturating_sub(earlier.blocks_read),
            blocks_written: self.blocks_written.saturating_sub(earlier.blocks_written),
            exhaustions: self.exhaustions.saturating_sub(earlier.exhaustions),
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} ({:.1}% hit) evictions={} reads={} writes={} exhausted={}",
            self.cache_hits,
            self.cache_misses,
            self.hit_rate() * 100.0,
            self.evictions,
            self.blocks_read,
            self.blocks_written,
            self.exhaustions
        )
    }
}
