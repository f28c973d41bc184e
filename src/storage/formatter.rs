//! Page formatters - initialize the contents of a freshly appended block.

use super::page::Page;

/// Initializes a new page.
///
/// Invoked exactly once per [`BufferPool::pin_new`](crate::BufferPool::pin_new),
/// on a zeroed page. It must not touch anything but the page it is given.
///
/// Any `Fn(&mut Page)` closure is a formatter:
/// ```
/// use pagecache::{Page, PageFormatter};
///
/// let header = |page: &mut Page| page.set_int(0, -1).unwrap();
/// let mut page = Page::new();
/// header.format(&mut page);
/// assert_eq!(page.get_int(0).unwrap(), -1);
/// ```
pub trait PageFormatter {
    fn format(&self, page: &mut Page);
}

impl<F> PageFormatter for F
where
    F: Fn(&mut Page),
{
    fn format(&self, page: &mut Page) {
        self(page)
    }
}

/// Leaves the page zeroed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroFormatter;

impl PageFormatter for ZeroFormatter {
    fn format(&self, page: &mut Page) {
        page.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_formatter() {
        let mut page = Page::new();
        page.as_mut_slice()[9] = 1;
        ZeroFormatter.format(&mut page);
        assert_eq!(page.as_slice()[9], 0);
    }

    #[test]
    fn test_closure_formatter() {
        let fmt = |page: &mut Page| page.as_mut_slice()[0] = 0xEE;
        let mut page = Page::new();
        fmt.format(&mut page);
        assert_eq!(page.as_slice()[0], 0xEE);
    }
}
