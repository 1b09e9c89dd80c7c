//! Error types for the sync engine.

use crate::backend::BackendError;
use crate::store::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncOpResult<T> = Result<T, SyncError>;

/// Errors surfaced by the sync engine.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A pass is already running; the trigger was rejected, not queued.
    ///
    /// Distinct from a failed [`SyncResult`](carelog_model::SyncResult)
    /// so the UI can tell "busy" from "failed".
    #[error("sync already in progress")]
    AlreadyRunning,

    /// The remote backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The local store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Returns true if this error aborts the remaining entity loop.
    ///
    /// Store failures and authentication rejection are fatal; transient
    /// backend failures are counted per record and retried next pass.
    pub fn is_fatal(&self) -> bool {
        match self {
            SyncError::AlreadyRunning => false,
            SyncError::Backend(e) => e.is_fatal(),
            SyncError::Store(_) => true,
        }
    }
}
