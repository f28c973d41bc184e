//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use pagecache::{BlockId, BlockStore, Error, LogService, Lsn, MemoryBlockStore, Page, Result};

/// Ordered record of store writes and log flushes.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// An in-memory store whose reads, writes and appends can be made to fail.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryBlockStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_appends: AtomicBool,
    pub journal: Journal,
}

impl FaultyStore {
    /// A store holding `blocks` zeroed blocks of file "f".
    pub fn with_blocks(blocks: u32) -> Self {
        let store = Self::default();
        for _ in 0..blocks {
            store.inner.append("f").unwrap();
        }
        store
    }

    fn injected(what: &str) -> Error {
        Error::Io(io::Error::other(format!("injected {what} failure")))
    }
}

impl BlockStore for FaultyStore {
    fn read(&self, block: &BlockId) -> Result<Page> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("read"));
        }
        self.inner.read(block)
    }

    fn write(&self, block: &BlockId, page: &Page) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::injected("write"));
        }
        self.journal.lock().push(format!("write {}", block));
        self.inner.write(block, page)
    }

    fn append(&self, file_name: &str) -> Result<BlockId> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(Self::injected("append"));
        }
        self.inner.append(file_name)
    }

    fn block_count(&self, file_name: &str) -> Result<u32> {
        self.inner.block_count(file_name)
    }
}

/// A log service that journals every flush and can be made to fail.
#[derive(Default, Clone)]
pub struct JournalLog {
    pub journal: Journal,
    pub fail: Arc<AtomicBool>,
}

impl LogService for JournalLog {
    fn flush(&self, lsn: Lsn) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Io(io::Error::other("injected log failure")));
        }
        self.journal.lock().push(format!("flush {}", lsn.0));
        Ok(())
    }
}

/// A log service whose first flush meets `entered` and then stalls.
pub struct StallingLog {
    entered: Arc<Barrier>,
    stall: Duration,
    calls: AtomicUsize,
}

impl StallingLog {
    pub fn new(entered: Arc<Barrier>, stall: Duration) -> Self {
        Self {
            entered,
            stall,
            calls: AtomicUsize::new(0),
        }
    }
}

impl LogService for StallingLog {
    fn flush(&self, _lsn: Lsn) -> Result<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.entered.wait();
            thread::sleep(self.stall);
        }
        Ok(())
    }
}

pub fn blk(n: u32) -> BlockId {
    BlockId::new("f", n)
}

/// A memory store holding `blocks` blocks of "f", block i starting with the int i.
pub fn numbered_store(blocks: u32) -> Arc<MemoryBlockStore> {
    let store = Arc::new(MemoryBlockStore::new());
    for i in 0..blocks {
        let block = store.append("f").unwrap();
        let mut page = Page::new();
        page.set_int(0, i as i32).unwrap();
        store.write(&block, &page).unwrap();
    }
    store
}
