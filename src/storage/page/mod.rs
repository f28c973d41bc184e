//! Page type and layout.
//!
//! This module contains:
//! - [`Page`] - The raw 4KB data container held by every buffer slot

#[allow(clippy::module_inception)]
mod page;

pub use page::Page;
