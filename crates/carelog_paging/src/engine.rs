//! The paging engine.

use crate::cursor::PageCursor;
use crate::error::{PageError, PageResult};
use crate::page::{Page, RefreshAnchor};
use crate::provider::{DataProvider, ProviderError};
use std::sync::Arc;

/// Drives a [`DataProvider`] page by page.
///
/// The engine owns no data across calls: `load` is a pure function of
/// (cursor, requested size, filter, provider state). Transient provider
/// failures are returned as recoverable errors so the caller can retry
/// the same cursor.
pub struct PagingEngine<P: DataProvider> {
    provider: Arc<P>,
}

impl<P: DataProvider> PagingEngine<P> {
    /// Creates an engine over a provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// Creates an engine over a shared provider.
    pub fn from_arc(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Loads one page.
    ///
    /// An absent cursor means page index 0. An `Exhausted` signal on the
    /// first page is an empty result set, not an error; on any later
    /// page it is a recoverable failure, since the consumer evidently
    /// paged past data that existed moments ago.
    pub async fn load(
        &self,
        cursor: Option<PageCursor>,
        requested_size: usize,
        filter: Option<&str>,
    ) -> PageResult<Page<P::Item>> {
        if requested_size == 0 {
            return Err(PageError::InvalidPageSize);
        }

        let page_index = cursor.map(|c| c.page_index).unwrap_or(0);
        let offset = page_index * requested_size as u64;

        let items = match self.provider.fetch(offset, requested_size, filter).await {
            Ok(items) => items,
            Err(ProviderError::Exhausted) if page_index == 0 => Vec::new(),
            Err(e) => {
                tracing::debug!(page_index, requested_size, error = %e, "page load failed");
                return Err(PageError::Provider(e));
            }
        };

        let prev_key = if page_index > 0 {
            Some(PageCursor {
                page_index: page_index - 1,
                page_size: requested_size,
            })
        } else {
            None
        };

        // End of data is signalled by a short page.
        let next_key = if items.len() < requested_size {
            None
        } else {
            Some(PageCursor {
                page_index: page_index + 1,
                page_size: requested_size,
            })
        };

        let items_after = if items.len() < requested_size {
            Some(0)
        } else {
            None
        };

        Ok(Page {
            items,
            prev_key,
            next_key,
            items_before: offset,
            items_after,
        })
    }

    /// Computes the cursor to refresh with, given the last anchor a
    /// consumer was viewing.
    ///
    /// Prefers one page past the anchor's `prev_key`, falling back to
    /// one page before its `next_key`; this keeps the visible window
    /// stable across underlying data mutation. Idempotent for a fixed
    /// anchor.
    pub fn refresh_key(&self, anchor: &RefreshAnchor) -> Option<PageCursor> {
        if let Some(prev) = anchor.prev_key {
            return Some(prev.next());
        }
        anchor.next_key.map(|next| PageCursor {
            page_index: next.page_index.saturating_sub(1),
            page_size: next.page_size,
        })
    }
}
