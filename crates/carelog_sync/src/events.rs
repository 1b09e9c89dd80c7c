//! Engine events observed by the UI.

use carelog_model::{SyncResult, SyncStatus};

/// An update published by the sync engine.
///
/// Events travel over a single-producer `watch` channel: the last value
/// is retained, so a late subscriber immediately sees the most recent
/// event instead of waiting for the next pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// No pass has run yet.
    Idle,
    /// A pass is in flight.
    Running,
    /// A status snapshot was recomputed on demand.
    Status(SyncStatus),
    /// A pass finished with this result.
    Completed(SyncResult),
}

impl SyncEvent {
    /// Returns the completed result, if this event carries one.
    pub fn as_completed(&self) -> Option<&SyncResult> {
        match self {
            SyncEvent::Completed(result) => Some(result),
            _ => None,
        }
    }
}
