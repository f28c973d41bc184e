//! Buffer Pool - the core page caching layer.
//!
//! The [`BufferPool`] provides:
//! - At most one in-memory copy of every block
//! - Pin leases tracked by an `available` counter
//! - Lowest-LSN victim selection with write-back of dirty victims
//! - Per-transaction flush that never evicts

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard, RwLock, RwLockWriteGuard};
use tracing::{debug, warn};

use crate::buffer::replacer::{LowestLsnPolicy, ReplacementPolicy, SlotState};
use crate::buffer::{Buffer, BufferHandle, BufferPoolStats, PageReadGuard, PageWriteGuard};
use crate::common::{BlockId, BufferPoolConfig, Error, Lsn, Result, SlotId, TxnId};
use crate::recovery::{LogService, NoopLogService};
use crate::storage::page::Page;
use crate::storage::{BlockStore, PageFormatter};

/// How long a miss or a deferred flush waits on a busy slot before looking again.
const BUSY_RETRY: Duration = Duration::from_millis(1);

/// A fixed pool of buffer slots caching blocks of a [`BlockStore`].
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                         BufferPool                          │
/// │  state: Mutex<PoolState>                                    │
/// │  ┌──────────────┐  ┌───────────────────────────────────┐   │
/// │  │    index     │  │        buffers: Vec<Buffer>       │   │
/// │  │BlockId → Sid │─▶│  [Slot0] [Slot1] [Slot2] ...      │   │
/// │  └──────────────┘  └───────────────────────────────────┘   │
/// │  available: usize                                           │
/// │                                                             │
/// │  pages: Vec<RwLock<Page>>   (contents of slot i at i)       │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐      │
/// │  │    policy    │  │    store     │  │     log      │      │
/// │  └──────────────┘  └──────────────┘  └──────────────┘      │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `state`: one `Mutex` for index, slot metadata and `available`. Every
///   pin, pin_new, unpin and flush runs inside it, including the victim
///   write-back and the block load, so two misses can never pick the same
///   victim.
/// - `pages`: one `RwLock` latch per slot. While holding `state` the pool
///   only ever *tries* a latch; blocking latch acquisition happens with
///   `state` released. A slot is reassigned only by whoever holds its write
///   latch.
/// - `io_done`: signalled whenever a busy slot may have become reusable.
///   A miss that finds every unpinned slot busy waits on it rather than
///   failing; `PoolExhausted` means every slot is pinned.
/// - `stats`: atomic counters.
///
/// # Usage
/// ```
/// use pagecache::{BlockId, BufferPool, MemoryBlockStore, TxnId, ZeroFormatter, Lsn};
///
/// let pool = BufferPool::new(4, MemoryBlockStore::new());
///
/// let handle = pool.pin_new("t.tbl", &ZeroFormatter, TxnId(1))?;
/// pool.page_mut(&handle, TxnId(1), Some(Lsn(1)))?.set_int(0, 42)?;
/// pool.unpin(&handle)?;
///
/// let handle = pool.pin(&BlockId::new("t.tbl", 0))?;
/// assert_eq!(pool.page(&handle)?.get_int(0)?, 42);
/// pool.unpin(&handle)?;
///
/// pool.flush_all(TxnId(1))?;
/// # Ok::<(), pagecache::Error>(())
/// ```
pub struct BufferPool<S: BlockStore> {
    /// Page contents, one latch per slot.
    pages: Vec<RwLock<Page>>,

    /// Everything the pool-wide mutual exclusion covers.
    state: Mutex<PoolState>,

    io_done: Condvar,

    store: S,

    /// WAL hook, flushed through a buffer's LSN before its write-back.
    log: Box<dyn LogService>,

    policy: Box<dyn ReplacementPolicy>,

    stats: BufferPoolStats,

    /// Number of slots in the pool (immutable after construction).
    pool_size: usize,
}

struct PoolState {
    buffers: Vec<Buffer>,
    index: HashMap<BlockId, SlotId>,
    /// Slots with `pin_count == 0`.
    available: usize,
}

impl PoolState {
    fn slot_states(&self) -> Vec<SlotState> {
        self.buffers.iter().map(Buffer::state).collect()
    }

    /// Whether `handle` is an outstanding lease on the block its slot holds.
    fn leases(&self, handle: &BufferHandle) -> bool {
        matches!(
            self.buffers.get(handle.slot().0),
            Some(buffer) if buffer.block() == Some(handle.block()) && buffer.is_pinned()
        )
    }

    /// Pin `slot`, taking it out of `available` on its 0→1 transition.
    fn pin(&mut self, slot: SlotId) {
        if self.buffers[slot.0].pin() == 1 {
            self.available -= 1;
        }
    }
}

impl<S: BlockStore> BufferPool<S> {
    /// Create a new buffer pool with `pool_size` free slots.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, store: S) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        // Allocate all slots upfront
        let pages = (0..pool_size).map(|_| RwLock::new(Page::new())).collect();
        let buffers = (0..pool_size).map(|_| Buffer::new()).collect();

        Self {
            pages,
            state: Mutex::new(PoolState {
                buffers,
                index: HashMap::new(),
                available: pool_size,
            }),
            io_done: Condvar::new(),
            store,
            log: Box::new(NoopLogService),
            policy: Box::new(LowestLsnPolicy::new()),
            stats: BufferPoolStats::new(),
            pool_size,
        }
    }

    /// Create a pool sized by `config`.
    pub fn with_config(config: &BufferPoolConfig, store: S) -> Self {
        Self::new(config.pool_size, store)
    }

    /// Flush `log` through a buffer's LSN before each write-back.
    pub fn with_log_service(mut self, log: impl LogService + 'static) -> Self {
        self.log = Box::new(log);
        self
    }

    /// Replace the default [`LowestLsnPolicy`].
    pub fn with_policy(mut self, policy: impl ReplacementPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin `block`, loading it into a slot if it is not resident.
    ///
    /// If every unpinned slot is busy with a write-back, waits for one to
    /// finish instead of failing.
    ///
    /// # Errors
    /// - `Error::PoolExhausted` if every slot is pinned (nothing changes)
    /// - `Error::Io` / `Error::BlockNotFound` from the store; the victim
    ///   slot and the index are left as they were
    pub fn pin(&self, block: &BlockId) -> Result<BufferHandle> {
        let mut state = self.state.lock();

        let (slot, mut latch) = loop {
            if let Some(&slot) = state.index.get(block) {
                // Cache hit!
                state.pin(slot);
                self.stats.record_hit();
                debug!(%block, %slot, "cache hit");
                return Ok(BufferHandle::new(slot, block.clone()));
            }

            // Waiting releases `state`, so look the block up again after it
            if let Some(victim) = self.claim_victim(&mut state)? {
                break victim;
            }
        };
        self.stats.record_miss();

        // Read into a scratch page first so a failed read leaves the victim alone
        let page = self.store.read(block)?;
        self.stats.record_read();

        self.write_back_victim(&mut state, slot, &latch)?;
        self.install(&mut state, slot, block, &page, &mut latch);
        debug!(%block, %slot, "cache miss");

        Ok(BufferHandle::new(slot, block.clone()))
    }

    /// Append a new block to `file_name`, format it and pin it.
    ///
    /// The new page is dirty and owned by `txn` until it is written back.
    ///
    /// # Errors
    /// - `Error::PoolExhausted` if every slot is pinned; the file is not
    ///   extended
    /// - `Error::Io` from the victim write-back or the append
    pub fn pin_new(
        &self,
        file_name: &str,
        formatter: &dyn PageFormatter,
        txn: TxnId,
    ) -> Result<BufferHandle> {
        let mut state = self.state.lock();

        let (slot, mut latch) = loop {
            if let Some(victim) = self.claim_victim(&mut state)? {
                break victim;
            }
        };
        self.write_back_victim(&mut state, slot, &latch)?;

        let block = self.store.append(file_name)?;
        let mut page = Page::new();
        formatter.format(&mut page);

        self.install(&mut state, slot, &block, &page, &mut latch);
        state.buffers[slot.0].mark_new(txn);
        debug!(%block, %slot, %txn, "pinned new block");

        Ok(BufferHandle::new(slot, block))
    }

    /// Release one pin. At zero the block stays cached but becomes evictable.
    ///
    /// # Errors
    /// `Error::InvalidUnpin` if the handle has no outstanding pin (double
    /// release, or the slot no longer holds the handle's block). Nothing
    /// changes.
    pub fn unpin(&self, handle: &BufferHandle) -> Result<()> {
        let mut state = self.state.lock();

        let released = match state.buffers.get_mut(handle.slot().0) {
            Some(buffer) if buffer.block() == Some(handle.block()) => buffer.unpin(),
            _ => None,
        };

        match released {
            Some(0) => {
                state.available += 1;
                Ok(())
            }
            Some(_) => Ok(()),
            None => {
                warn!(block = %handle.block(), slot = %handle.slot(), "unpin without an outstanding pin");
                Err(Error::InvalidUnpin(handle.block().clone()))
            }
        }
    }

    // ========================================================================
    // Public API: Page access
    // ========================================================================

    /// Shared access to the contents of a pinned buffer.
    ///
    /// # Errors
    /// `Error::BufferNotPinned` if the handle's pin was already released.
    pub fn page(&self, handle: &BufferHandle) -> Result<PageReadGuard<'_>> {
        let lock = self.latch(handle)?.read();

        // Reassignment needs this latch, so once the lease checks out the
        // slot keeps holding the handle's block for as long as the guard lives
        if !self.state.lock().leases(handle) {
            return Err(self.reject_stale(lock, handle));
        }

        Ok(PageReadGuard::new(handle.slot(), handle.block().clone(), lock))
    }

    /// Exclusive access to the contents of a pinned buffer.
    ///
    /// Records the write first: the buffer becomes dirty, `txn` its last
    /// modifier and its LSN is raised to `lsn` (pass `None` for changes
    /// that produced no log record).
    ///
    /// # Errors
    /// `Error::BufferNotPinned` if the handle's pin was already released.
    pub fn page_mut(
        &self,
        handle: &BufferHandle,
        txn: TxnId,
        lsn: Option<Lsn>,
    ) -> Result<PageWriteGuard<'_>> {
        let lock = self.latch(handle)?.write();
        {
            let mut state = self.state.lock();
            if !state.leases(handle) {
                drop(state);
                return Err(self.reject_stale(lock, handle));
            }
            // Recorded under the latch: a flush sees the whole write or none of it
            state.buffers[handle.slot().0].record_write(txn, lsn);
        }

        Ok(PageWriteGuard::new(handle.slot(), handle.block().clone(), lock))
    }

    // ========================================================================
    // Public API: Flush
    // ========================================================================

    /// Write back every buffer `txn` dirtied and mark it clean.
    ///
    /// Never evicts: index entries, pin counts and assignments are unchanged.
    /// Drop any page guard held by the calling thread before calling this.
    ///
    /// # Errors
    /// The first store or log error; buffers not yet written stay dirty.
    pub fn flush_all(&self, txn: TxnId) -> Result<()> {
        self.flush_where(|buffer| buffer.is_modified_by(txn))
    }

    /// Write back every dirty buffer, whoever modified it.
    pub fn flush_dirty(&self) -> Result<()> {
        self.flush_where(Buffer::is_dirty)
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Number of slots with no outstanding pins.
    pub fn available(&self) -> usize {
        self.state.lock().available
    }

    /// Snapshot of the block → slot index.
    pub fn statistics(&self) -> HashMap<BlockId, SlotId> {
        self.state.lock().index.clone()
    }

    /// Pin count of `block`, or `None` if it is not resident.
    pub fn pin_count(&self, block: &BlockId) -> Option<u32> {
        let state = self.state.lock();
        state
            .index
            .get(block)
            .map(|slot| state.buffers[slot.0].pin_count())
    }

    /// Get buffer pool statistics.
    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// Get the pool size.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// The block store behind this pool.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // Internal: Victim selection and replacement
    // ========================================================================

    /// Choose a victim and take its write latch.
    ///
    /// Slots whose latch is held, or whose deferred write-back is pending,
    /// are passed over as busy. If that leaves nothing while some slot is
    /// unpinned, waits on `io_done` with `state` released and returns
    /// `Ok(None)`; the caller starts over.
    fn claim_victim<'a>(
        &'a self,
        state: &mut MutexGuard<'_, PoolState>,
    ) -> Result<Option<(SlotId, RwLockWriteGuard<'a, Page>)>> {
        let mut slots = state.slot_states();

        while let Some(slot) = self.policy.choose_victim(&slots) {
            // A policy may only hand back free or evictable slots
            match slots.get(slot.0) {
                Some(SlotState::Free) => {}
                Some(candidate) if candidate.is_evictable() => {}
                _ => break,
            }

            match self.pages[slot.0].try_write() {
                Some(latch) => return Ok(Some((slot, latch))),
                None => slots[slot.0] = slots[slot.0].into_busy(),
            }
        }

        if !slots.iter().any(SlotState::is_busy) {
            self.stats.record_exhaustion();
            warn!(pool_size = self.pool_size, "buffer pool exhausted");
            return Err(Error::PoolExhausted);
        }

        debug!(available = state.available, "waiting for a busy slot");
        // Page guards are not tracked, so a latch released by one never
        // signals; the timeout covers that case.
        self.io_done.wait_for(state, BUSY_RETRY);
        Ok(None)
    }

    /// Write the victim's contents back if they are dirty.
    fn write_back_victim(&self, state: &mut PoolState, slot: SlotId, page: &Page) -> Result<()> {
        let buffer = &mut state.buffers[slot.0];
        if !buffer.is_dirty() {
            return Ok(());
        }

        if let Some(block) = buffer.block() {
            self.write_page(block, buffer.lsn(), page)?;
        }
        buffer.mark_clean();
        Ok(())
    }

    /// Reassign `slot` to `block` with `page` as its contents, pinned once.
    fn install(
        &self,
        state: &mut PoolState,
        slot: SlotId,
        block: &BlockId,
        page: &Page,
        latch: &mut Page,
    ) {
        if let Some(old) = state.buffers[slot.0].block().cloned() {
            state.index.remove(&old);
            self.stats.record_eviction();
            debug!(block = %old, %slot, "evicted");
        }

        latch.copy_from(page);
        state.buffers[slot.0].assign(block.clone());
        state.index.insert(block.clone(), slot);
        state.pin(slot);
    }

    // ========================================================================
    // Internal: Write-back
    // ========================================================================

    /// Honour WAL ordering, then write `page` to `block`.
    fn write_page(&self, block: &BlockId, lsn: Option<Lsn>, page: &Page) -> Result<()> {
        if let Some(lsn) = lsn {
            self.log.flush(lsn)?;
        }
        self.store.write(block, page)?;

        self.stats.record_write();
        debug!(%block, ?lsn, "wrote back");
        Ok(())
    }

    /// Write back every buffer matching `wanted`.
    ///
    /// Runs under `state`, so pins and unpins are ordered around it. A target
    /// whose latch is held by a page guard is marked in flight instead and
    /// written once the guard is gone, with `state` released.
    fn flush_where(&self, wanted: impl Fn(&Buffer) -> bool) -> Result<()> {
        let mut deferred = Vec::new();
        let mut result = Ok(());
        {
            let mut state = self.state.lock();
            for i in 0..self.pool_size {
                let buffer = &state.buffers[i];
                let block = match buffer.block() {
                    Some(block) if wanted(buffer) => block.clone(),
                    _ => continue,
                };
                let lsn = buffer.lsn();

                match self.pages[i].try_read() {
                    Some(page) => {
                        if let Err(e) = self.write_page(&block, lsn, &page) {
                            result = Err(e);
                            break;
                        }
                        state.buffers[i].mark_clean();
                    }
                    None => {
                        state.buffers[i].begin_io();
                        deferred.push((SlotId::new(i), block));
                    }
                }
            }
        }

        self.flush_deferred(deferred, result)
    }

    /// Write back in-flight slots as their latches free up.
    ///
    /// Never blocks on one latch for long, so a guard holder waiting on
    /// another in-flight slot cannot stall the rest.
    fn flush_deferred(
        &self,
        mut pending: Vec<(SlotId, BlockId)>,
        mut result: Result<()>,
    ) -> Result<()> {
        while result.is_ok() && !pending.is_empty() {
            pending.retain(|(slot, block)| {
                if result.is_err() {
                    return true;
                }
                match self.pages[slot.0].try_read_for(BUSY_RETRY) {
                    Some(page) => {
                        if let Err(e) = self.flush_slot(*slot, block, &page) {
                            result = Err(e);
                        }
                        false
                    }
                    None => true,
                }
            });
        }

        // Left over after an error: give them back, still dirty
        if !pending.is_empty() {
            let mut state = self.state.lock();
            for (slot, _) in &pending {
                state.buffers[slot.0].end_io();
            }
        }
        self.io_done.notify_all();
        result
    }

    /// Write one in-flight slot back while holding its latch, then end its I/O.
    fn flush_slot(&self, slot: SlotId, block: &BlockId, page: &Page) -> Result<()> {
        // No write can be recorded while we hold the latch
        let lsn = self.state.lock().buffers[slot.0].lsn();
        let written = self.write_page(block, lsn, page);

        {
            let mut state = self.state.lock();
            let buffer = &mut state.buffers[slot.0];
            buffer.end_io();
            if written.is_ok() {
                buffer.mark_clean();
            }
        }
        self.io_done.notify_all();
        written
    }

    /// The latch of `handle`'s slot.
    fn latch(&self, handle: &BufferHandle) -> Result<&RwLock<Page>> {
        self.pages
            .get(handle.slot().0)
            .ok_or_else(|| Error::BufferNotPinned(handle.block().clone()))
    }

    /// Give up a latch taken for a lease that turned out to be released.
    ///
    /// A miss may have passed the slot over while we held it.
    fn reject_stale<G>(&self, latch: G, handle: &BufferHandle) -> Error {
        drop(latch);
        self.io_done.notify_all();
        Error::BufferNotPinned(handle.block().clone())
    }

    /// Check index/slot/counter consistency. Only meaningful when quiescent.
    #[cfg(test)]
    fn assert_invariants(&self) {
        let state = self.state.lock();

        let pinned = state.buffers.iter().filter(|b| b.is_pinned()).count();
        assert_eq!(state.available, self.pool_size - pinned);

        for (block, slot) in &state.index {
            assert_eq!(state.buffers[slot.0].block(), Some(block));
        }
        let assigned = state.buffers.iter().filter(|b| !b.is_free()).count();
        assert_eq!(state.index.len(), assigned);

        for buffer in &state.buffers {
            if buffer.is_dirty() {
                assert!(buffer.modified_by().is_some());
            }
        }
    }
}
