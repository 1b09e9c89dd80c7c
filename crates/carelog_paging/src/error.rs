//! Error types for page loading.

use crate::provider::ProviderError;
use thiserror::Error;

/// Result type for paging operations.
pub type PageResult<T> = Result<T, PageError>;

/// Errors that can occur while loading a page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The requested page size was zero.
    #[error("page size must be positive")]
    InvalidPageSize,

    /// The provider failed; recoverable failures may be retried with
    /// the same cursor.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl PageError {
    /// Returns true if the same cursor can be retried.
    ///
    /// Transient I/O failures and a premature end-of-data signal are
    /// recoverable; a malformed request is not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PageError::InvalidPageSize => false,
            PageError::Provider(e) => e.is_transient() || matches!(e, ProviderError::Exhausted),
        }
    }
}
