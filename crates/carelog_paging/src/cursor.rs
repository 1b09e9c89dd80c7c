//! Pagination cursors.

use crate::error::{PageError, PageResult};
use serde::{Deserialize, Serialize};

/// A position in a paginated read.
///
/// `page_index` starts at 0 and increments by exactly 1 per forward
/// page; `page_size` is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageCursor {
    /// Zero-based page index.
    pub page_index: u64,
    /// Number of items per page, always positive.
    pub page_size: usize,
}

impl PageCursor {
    /// Creates a cursor, rejecting a zero page size.
    pub fn new(page_index: u64, page_size: usize) -> PageResult<Self> {
        if page_size == 0 {
            return Err(PageError::InvalidPageSize);
        }
        Ok(Self {
            page_index,
            page_size,
        })
    }

    /// Creates a cursor for the first page.
    pub fn first(page_size: usize) -> PageResult<Self> {
        Self::new(0, page_size)
    }

    /// The item offset this cursor addresses.
    pub fn offset(&self) -> u64 {
        self.page_index * self.page_size as u64
    }

    /// The cursor one page forward.
    pub fn next(&self) -> PageCursor {
        PageCursor {
            page_index: self.page_index + 1,
            page_size: self.page_size,
        }
    }

    /// The cursor one page back, absent on the first page.
    pub fn prev(&self) -> Option<PageCursor> {
        self.page_index.checked_sub(1).map(|page_index| PageCursor {
            page_index,
            page_size: self.page_size,
        })
    }
}
