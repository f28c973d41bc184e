//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a raw 4KB byte array that serves as the unit of I/O
//! between the block store and memory. Each buffer slot holds one page.

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, Result};

/// A page of data (4KB, 4KB-aligned).
///
/// This is the fundamental unit of I/O between disk and memory.
/// The buffer pool keeps one of these per slot.
///
/// # Memory Layout
/// - Size: 4096 bytes (4KB)
/// - Alignment: 4096 bytes (for efficient Direct I/O with O_DIRECT)
///
/// # Typed access
/// Integers are stored as big-endian `i32`. Strings are stored as a
/// big-endian `u32` byte length followed by the UTF-8 bytes.
///
/// # Clone Implementation
/// `Page` does NOT implement `Clone` in production code (copying 4KB is
/// expensive and should be explicit, see [`Page::copy_from`]).
/// A `#[cfg(test)]` Clone is provided for tests.
///
/// # Example
/// ```
/// use pagecache::Page;
///
/// let mut page = Page::new();
/// page.set_int(0, 42).unwrap();
/// page.set_string(4, "hello").unwrap();
/// assert_eq!(page.get_int(0).unwrap(), 42);
/// assert_eq!(page.get_string(4).unwrap(), "hello");
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Overwrite this page with the contents of `other`.
    #[inline]
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// Get the size of a page.
    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }

    /// Bytes needed to store `s` with [`Page::set_string`].
    pub fn max_string_len(s: &str) -> usize {
        4 + s.len()
    }

    /// Read a big-endian `i32` at `offset`.
    pub fn get_int(&self, offset: usize) -> Result<i32> {
        let bytes = self.range(offset, 4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Write a big-endian `i32` at `offset`.
    pub fn set_int(&mut self, offset: usize, value: i32) -> Result<()> {
        self.range_mut(offset, 4)?
            .copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Read a length-prefixed string at `offset`.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn get_string(&self, offset: usize) -> Result<String> {
        let len = self.get_int(offset)? as u32 as usize;
        let bytes = self.range(offset + 4, len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Write a length-prefixed string at `offset`.
    pub fn set_string(&mut self, offset: usize, value: &str) -> Result<()> {
        // Check the whole span first so a failed write leaves the page untouched.
        self.range(offset, Self::max_string_len(value))?;
        self.set_int(offset, value.len() as i32)?;
        self.range_mut(offset + 4, value.len())?
            .copy_from_slice(value.as_bytes());
        Ok(())
    }

    fn range(&self, offset: usize, len: usize) -> Result<&[u8]> {
        match offset.checked_add(len) {
            Some(end) if end <= PAGE_SIZE => Ok(&self.data[offset..end]),
            _ => Err(Error::PageOverflow { offset, len }),
        }
    }

    fn range_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
        match offset.checked_add(len) {
            Some(end) if end <= PAGE_SIZE => Ok(&mut self.data[offset..end]),
            _ => Err(Error::PageOverflow { offset, len }),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.copy_from(self);
        new_page
    }
}

// ============================================================================
// TESTS
// ============================================================================
