//! Block identifier type.

use std::fmt;

/// Identifies one fixed-size block of a named file.
///
/// Two `BlockId`s with equal fields name the same block, and while that block
/// is resident they always map to the same buffer slot.
///
/// # Example
/// ```
/// use pagecache::BlockId;
///
/// let blk = BlockId::new("students.tbl", 3);
/// assert_eq!(blk.file_name(), "students.tbl");
/// assert_eq!(blk.number(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId {
    file_name: String,
    number: u32,
}

impl BlockId {
    /// Create a new BlockId.
    pub fn new(file_name: impl Into<String>, number: u32) -> Self {
        Self {
            file_name: file_name.into(),
            number,
        }
    }

    /// Name of the file holding this block.
    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Index of the block within its file.
    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[file {}, block {}]", self.file_name, self.number)
    }
}
