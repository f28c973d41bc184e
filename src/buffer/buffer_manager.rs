//! Buffer Manager - bounded waiting on top of the buffer pool.
//!
//! [`BufferPool`] fails fast with `PoolExhausted`. Transactions usually want
//! to wait a little for another transaction to unpin something instead, so
//! the [`BufferManager`] retries for at most `max_wait`, waking up whenever a
//! pin is released.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::buffer::{BufferHandle, BufferPool};
use crate::common::{BlockId, BufferPoolConfig, Error, Result, TxnId};
use crate::storage::{BlockStore, PageFormatter};

/// A [`BufferPool`] whose pin operations wait, bounded by `max_wait`, for a
/// buffer to become available.
///
/// Waiting never holds the pool lock, and it always ends: either a slot frees
/// up or the caller gets `Error::WaitTimeout` and should abort its
/// transaction (it may be holding pins another waiter needs).
pub struct BufferManager<S: BlockStore> {
    pool: BufferPool<S>,
    max_wait: Duration,
    /// Serializes waiters against `unpinned` notifications.
    waiters: Mutex<()>,
    unpinned: Condvar,
}

impl<S: BlockStore> BufferManager<S> {
    /// Wrap `pool`, waiting at most `max_wait` per pin.
    pub fn new(pool: BufferPool<S>, max_wait: Duration) -> Self {
        Self {
            pool,
            max_wait,
            waiters: Mutex::new(()),
            unpinned: Condvar::new(),
        }
    }

    /// Build the pool and the manager from one config.
    pub fn with_config(config: &BufferPoolConfig, store: S) -> Self {
        Self::new(BufferPool::with_config(config, store), config.max_wait)
    }

    /// Like [`BufferPool::pin`], but waits for a free slot.
    ///
    /// # Errors
    /// `Error::WaitTimeout` if every slot stayed pinned for `max_wait`;
    /// store errors as in [`BufferPool::pin`].
    pub fn pin(&self, block: &BlockId) -> Result<BufferHandle> {
        self.wait_for(|| self.pool.pin(block))
    }

    /// Like [`BufferPool::pin_new`], but waits for a free slot.
    pub fn pin_new(
        &self,
        file_name: &str,
        formatter: &dyn PageFormatter,
        txn: TxnId,
    ) -> Result<BufferHandle> {
        self.wait_for(|| self.pool.pin_new(file_name, formatter, txn))
    }

    /// Release a pin and wake any waiters.
    pub fn unpin(&self, handle: &BufferHandle) -> Result<()> {
        self.pool.unpin(handle)?;
        self.notify();
        Ok(())
    }

    /// See [`BufferPool::flush_all`]. Wakes waiters afterwards, since slots
    /// being flushed cannot be evicted until it finishes.
    pub fn flush_all(&self, txn: TxnId) -> Result<()> {
        let result = self.pool.flush_all(txn);
        self.notify();
        result
    }

    /// See [`BufferPool::flush_dirty`]. Wakes waiters afterwards.
    pub fn flush_dirty(&self) -> Result<()> {
        let result = self.pool.flush_dirty();
        self.notify();
        result
    }

    /// Number of unpinned buffers.
    pub fn available(&self) -> usize {
        self.pool.available()
    }

    /// The wrapped pool, for page access and diagnostics.
    ///
    /// Release pins and flush through the manager: `unpin` or `flush_*`
    /// called on the pool directly do not wake waiting pins, which then
    /// sleep until `max_wait` runs out.
    pub fn pool(&self) -> &BufferPool<S> {
        &self.pool
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    fn notify(&self) {
        let _waiters = self.waiters.lock();
        self.unpinned.notify_all();
    }

    fn wait_for<T>(&self, mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
        match attempt() {
            Err(Error::PoolExhausted) => {}
            other => return other,
        }

        let deadline = Instant::now() + self.max_wait;
        let mut waiters = self.waiters.lock();
        loop {
            // Retry under `waiters` so an unpin cannot slip in between the
            // failed attempt and the wait.
            match attempt() {
                Err(Error::PoolExhausted) => {}
                other => return other,
            }

            debug!(max_wait = ?self.max_wait, "waiting for an unpinned buffer");
            if self.unpinned.wait_until(&mut waiters, deadline).timed_out() {
                return Err(Error::WaitTimeout(self.max_wait));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlockStore;
    use std::sync::Arc;
    use std::thread;

    fn create_manager(pool_size: usize, blocks: u32, max_wait: Duration) -> BufferManager<MemoryBlockStore> {
        let store = MemoryBlockStore::new();
        for _ in 0..blocks {
            store.append("f").unwrap();
        }
        BufferManager::new(BufferPool::new(pool_size, store), max_wait)
    }

    #[test]
    fn test_pin_without_contention() {
        let bm = create_manager(2, 1, Duration::from_millis(10));
        let h = bm.pin(&BlockId::new("f", 0)).unwrap();
        assert_eq!(bm.available(), 1);
        bm.unpin(&h).unwrap();
        assert_eq!(bm.available(), 2);
    }

    #[test]
    fn test_pin_times_out() {
        let bm = create_manager(1, 2, Duration::from_millis(20));
        let _h = bm.pin(&BlockId::new("f", 0)).unwrap();

        let start = Instant::now();
        let result = bm.pin(&BlockId::new("f", 1));

        assert!(matches!(result, Err(Error::WaitTimeout(_))));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_pin_new_times_out_without_appending() {
        let bm = create_manager(1, 1, Duration::from_millis(5));
        let _h = bm.pin(&BlockId::new("f", 0)).unwrap();

        let result = bm.pin_new("f", &crate::storage::ZeroFormatter, TxnId(1));
        assert!(matches!(result, Err(Error::WaitTimeout(_))));
        assert_eq!(bm.pool().store().appends(), 1);
    }

    #[test]
    fn test_waiter_wakes_on_unpin() {
        let bm = Arc::new(create_manager(1, 2, Duration::from_secs(5)));
        let h0 = bm.pin(&BlockId::new("f", 0)).unwrap();

        let waiter = {
            let bm = Arc::clone(&bm);
            thread::spawn(move || bm.pin(&BlockId::new("f", 1)))
        };

        thread::sleep(Duration::from_millis(20));
        bm.unpin(&h0).unwrap();

        let h1 = waiter.join().unwrap().unwrap();
        assert_eq!(h1.block(), &BlockId::new("f", 1));
        assert_eq!(bm.available(), 0);
    }

    #[test]
    fn test_flush_dirty_through_manager() {
        let bm = create_manager(2, 2, Duration::from_millis(10));
        let h0 = bm.pin(&BlockId::new("f", 0)).unwrap();
        let h1 = bm.pin(&BlockId::new("f", 1)).unwrap();
        drop(bm.pool().page_mut(&h0, TxnId(1), None).unwrap());
        drop(bm.pool().page_mut(&h1, TxnId(2), None).unwrap());
        bm.unpin(&h0).unwrap();

        bm.flush_dirty().unwrap();

        assert_eq!(bm.pool().store().writes(), 2);
        assert_eq!(bm.available(), 1);
    }

    #[test]
    fn test_waiter_wakes_on_flush_dirty() {
        let bm = Arc::new(create_manager(1, 2, Duration::from_secs(5)));
        let h0 = bm.pin(&BlockId::new("f", 0)).unwrap();

        let waiter = {
            let bm = Arc::clone(&bm);
            thread::spawn(move || bm.pin(&BlockId::new("f", 1)))
        };

        // Released behind the manager's back: only the flush wakes the waiter
        thread::sleep(Duration::from_millis(20));
        bm.pool().unpin(&h0).unwrap();
        let start = Instant::now();
        bm.flush_dirty().unwrap();

        assert!(waiter.join().unwrap().is_ok());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let bm = create_manager(1, 0, Duration::from_secs(5));

        let start = Instant::now();
        let result = bm.pin(&BlockId::new("f", 9));
        assert!(matches!(result, Err(Error::BlockNotFound(_))));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_with_config() {
        let config = BufferPoolConfig::default()
            .pool_size(3)
            .max_wait(Duration::from_millis(1));
        let bm = BufferManager::with_config(&config, MemoryBlockStore::new());
        assert_eq!(bm.pool().pool_size(), 3);
        assert_eq!(bm.max_wait(), Duration::from_millis(1));
    }
}
