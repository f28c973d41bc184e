//! Recovery hooks.
//!
//! The buffer pool does not implement write-ahead logging itself. It only
//! honours the WAL ordering rule through [`LogService`]: before a dirty
//! buffer is written back, the log is made durable through that buffer's LSN.

mod log_service;

pub use log_service::{LogService, NoopLogService};
