//! File-backed block store.
//!
//! The [`FileBlockStore`] handles all direct file operations:
//! - Reading and writing blocks
//! - Appending new blocks
//! - Opening each named file lazily inside one database directory

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::common::config::PAGE_SIZE;
use crate::common::{BlockId, Error, Result};
use crate::storage::page::Page;

use super::BlockStore;

/// Stores every named file of a database under one directory.
///
/// # File Layout
/// Each file holds its blocks sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Block 0 │ Block 1 │ Block 2 │  ...    │ Block N │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Block N is located at file offset `N × PAGE_SIZE`.
///
/// # Durability
/// All writes and appends are followed by `fsync()`.
pub struct FileBlockStore {
    dir: PathBuf,
    files: Mutex<HashMap<String, File>>,
}

impl FileBlockStore {
    /// Open a database directory, creating it if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            files: Mutex::new(HashMap::new()),
        })
    }

    /// Directory holding the database files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Run `f` on the open handle for `file_name`, opening it on first use.
    fn with_file<T>(&self, file_name: &str, f: impl FnOnce(&mut File) -> Result<T>) -> Result<T> {
        let mut files = self.files.lock();
        let file = match files.entry(file_name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(
                OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(self.dir.join(file_name))?,
            ),
        };
        f(file)
    }

    fn blocks_in(file: &File) -> Result<u32> {
        Ok((file.metadata()?.len() / PAGE_SIZE as u64) as u32)
    }

    #[inline]
    fn offset(block: &BlockId) -> u64 {
        (block.number() as u64) * (PAGE_SIZE as u64)
    }
}

impl BlockStore for FileBlockStore {
    fn read(&self, block: &BlockId) -> Result<Page> {
        self.with_file(block.file_name(), |file| {
            if block.number() >= Self::blocks_in(file)? {
                return Err(Error::BlockNotFound(block.clone()));
            }

            file.seek(SeekFrom::Start(Self::offset(block)))?;
            let mut page = Page::new();
            file.read_exact(page.as_mut_slice())?;
            Ok(page)
        })
    }

    fn write(&self, block: &BlockId, page: &Page) -> Result<()> {
        self.with_file(block.file_name(), |file| {
            if block.number() >= Self::blocks_in(file)? {
                return Err(Error::BlockNotFound(block.clone()));
            }

            file.seek(SeekFrom::Start(Self::offset(block)))?;
            file.write_all(page.as_slice())?;
            file.sync_all()?; // fsync for durability
            Ok(())
        })
    }

    fn append(&self, file_name: &str) -> Result<BlockId> {
        self.with_file(file_name, |file| {
            let block = BlockId::new(file_name, Self::blocks_in(file)?);

            // Extend file with a zeroed block
            file.seek(SeekFrom::Start(Self::offset(&block)))?;
            let zeros = [0u8; PAGE_SIZE];
            file.write_all(&zeros)?;
            file.sync_all()?;

            Ok(block)
        })
    }

    fn block_count(&self, file_name: &str) -> Result<u32> {
        // Counting must not create the file
        let known = self.files.lock().contains_key(file_name);
        if !known && !self.dir.join(file_name).try_exists()? {
            return Ok(0);
        }
        self.with_file(file_name, |file| Self::blocks_in(file))
    }
}
