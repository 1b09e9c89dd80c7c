//! Loaded pages and refresh anchors.

use crate::cursor::PageCursor;

/// One loaded page of items.
///
/// `next_key` is absent exactly when the fetch returned strictly fewer
/// items than requested (end of data); `prev_key` is absent exactly on
/// the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in provider order.
    pub items: Vec<T>,
    /// Cursor for the previous page, absent on the first page.
    pub prev_key: Option<PageCursor>,
    /// Cursor for the next page, absent at end of data.
    pub next_key: Option<PageCursor>,
    /// Items preceding this page in the full result set.
    pub items_before: u64,
    /// Items following this page; `None` when unknown.
    pub items_after: Option<u64>,
}

impl<T> Page<T> {
    /// Returns true if this is the last page of the result set.
    pub fn is_last(&self) -> bool {
        self.next_key.is_none()
    }

    /// The anchor a consumer should remember for later refresh.
    pub fn anchor(&self) -> RefreshAnchor {
        RefreshAnchor {
            prev_key: self.prev_key,
            next_key: self.next_key,
        }
    }
}

/// The keys of the page a consumer was last viewing.
///
/// Input to [`PagingEngine::refresh_key`](crate::PagingEngine::refresh_key):
/// it lets a refresh land on the same window even after the underlying
/// data changed (for example after a sync pass).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshAnchor {
    /// The viewed page's previous-page cursor.
    pub prev_key: Option<PageCursor>,
    /// The viewed page's next-page cursor.
    pub next_key: Option<PageCursor>,
}
