//! Data provider abstraction.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;

/// Errors a provider can raise while fetching a page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The underlying medium is unreachable.
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    /// The fetch timed out.
    #[error("provider timed out")]
    Timeout,

    /// The provider signalled that no more data exists.
    #[error("no more data")]
    Exhausted,
}

impl ProviderError {
    /// Returns true for transient I/O conditions worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Unreachable(_) | ProviderError::Timeout)
    }
}

/// Fetches one page of items from a local store or a remote API.
///
/// Implementations return at most `limit` items starting at `offset`,
/// in a stable order, optionally narrowed by a search filter.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// The item type this provider serves.
    type Item: Send;

    /// Fetches up to `limit` items starting at `offset`.
    async fn fetch(
        &self,
        offset: u64,
        limit: usize,
        filter: Option<&str>,
    ) -> Result<Vec<Self::Item>, ProviderError>;
}

/// An in-memory provider for tests and previews.
pub struct MemoryProvider<T> {
    items: RwLock<Vec<T>>,
    matcher: Option<fn(&T, &str) -> bool>,
    offline: AtomicBool,
    fail_next: Mutex<Option<ProviderError>>,
    fetch_calls: AtomicU64,
}

impl<T: Clone + Send + Sync> MemoryProvider<T> {
    /// Creates a provider over a fixed item set.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            matcher: None,
            offline: AtomicBool::new(false),
            fail_next: Mutex::new(None),
            fetch_calls: AtomicU64::new(0),
        }
    }

    /// Attaches a filter matcher applied when a fetch carries a filter.
    pub fn with_matcher(mut self, matcher: fn(&T, &str) -> bool) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Replaces the item set.
    pub fn set_items(&self, items: Vec<T>) {
        *self.items.write() = items;
    }

    /// Switches the provider between reachable and unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Scripts an error for the next fetch only; later fetches succeed.
    pub fn fail_next_fetch(&self, error: ProviderError) {
        *self.fail_next.lock() = Some(error);
    }

    /// Number of fetches attempted against this provider.
    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> DataProvider for MemoryProvider<T> {
    type Item = T;

    async fn fetch(
        &self,
        offset: u64,
        limit: usize,
        filter: Option<&str>,
    ) -> Result<Vec<T>, ProviderError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }

        if self.offline.load(Ordering::SeqCst) {
            return Err(ProviderError::Unreachable("memory provider offline".into()));
        }

        let items = self.items.read();
        let filtered: Vec<T> = match (filter, self.matcher) {
            (Some(query), Some(matcher)) => items
                .iter()
                .filter(|item| matcher(item, query))
                .cloned()
                .collect(),
            _ => items.clone(),
        };

        Ok(filtered
            .into_iter()
            .skip(offset as usize)
            .take(limit)
            .collect())
    }
}
