//! Log durability hook.

use crate::common::{Lsn, Result};

/// Makes the log durable up to a given LSN.
///
/// Called by the buffer pool before every write-back of a buffer whose LSN
/// is present. An error aborts the write-back, so the buffer stays dirty.
pub trait LogService: Send + Sync {
    fn flush(&self, lsn: Lsn) -> Result<()>;
}

/// A log service for engines without a log. Every flush succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogService;

impl LogService for NoopLogService {
    fn flush(&self, _lsn: Lsn) -> Result<()> {
        Ok(())
    }
}
