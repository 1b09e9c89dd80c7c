//! Sync status and result types.

use crate::entity::EntityType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connectivity and backlog snapshot, recomputed on demand.
///
/// Never persisted; always derived from current local-store and
/// connectivity state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Whether the remote backend answered a reachability probe.
    pub is_connected: bool,
    /// Number of locally modified records not yet acknowledged.
    pub unsynced_count: u64,
    /// When this snapshot was taken.
    pub last_checked_at: DateTime<Utc>,
}

impl SyncStatus {
    /// Creates a status snapshot stamped now.
    pub fn now(is_connected: bool, unsynced_count: u64) -> Self {
        Self {
            is_connected,
            unsynced_count,
            last_checked_at: Utc::now(),
        }
    }
}

/// Per-record outcome of a push, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushReceipt {
    /// Id of the pushed record.
    pub id: Uuid,
    /// Whether the backend accepted the record.
    pub success: bool,
    /// Backend-provided reason when rejected.
    pub error_message: Option<String>,
}

impl PushReceipt {
    /// Creates an accepted receipt.
    pub fn accepted(id: Uuid) -> Self {
        Self {
            id,
            success: true,
            error_message: None,
        }
    }

    /// Creates a rejected receipt.
    pub fn rejected(id: Uuid, message: impl Into<String>) -> Self {
        Self {
            id,
            success: false,
            error_message: Some(message.into()),
        }
    }
}

/// Upload/download/error counters for one entity type in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityResult {
    /// The entity type these counters describe.
    pub entity_type: EntityType,
    /// Records accepted by the backend and marked synced locally.
    pub uploaded: u64,
    /// Records received from the backend and applied locally.
    pub downloaded: u64,
    /// Per-record failures, retried on the next pass.
    pub errors: u64,
}

impl EntityResult {
    /// Creates an all-zero result for an entity type.
    pub fn empty(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            uploaded: 0,
            downloaded: 0,
            errors: 0,
        }
    }
}

/// The outcome of one sync pass.
///
/// Created once per pass, immutable afterwards, observed by the UI and
/// discarded. `success == true` implies `error == None`; a failed pass
/// may still carry the entity results completed before the failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Whether every entity completed with zero errors.
    pub success: bool,
    /// Human-readable description of the first failure, if any.
    pub error: Option<String>,
    /// Per-entity counters, in processing order.
    pub entity_results: Vec<EntityResult>,
}

impl SyncResult {
    /// Creates a successful result.
    pub fn succeeded(entity_results: Vec<EntityResult>) -> Self {
        Self {
            success: true,
            error: None,
            entity_results,
        }
    }

    /// Creates a failed result, preserving any partial entity results.
    pub fn failed(error: impl Into<String>, entity_results: Vec<EntityResult>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            entity_results,
        }
    }

    /// The result returned when the backend is unreachable: no network
    /// or store activity happened, all counters are zero.
    pub fn not_connected() -> Self {
        Self::failed(
            "not connected",
            EntityType::SYNC_ORDER
                .iter()
                .map(|entity| EntityResult::empty(*entity))
                .collect(),
        )
    }

    /// Total records uploaded across all entities.
    pub fn total_uploaded(&self) -> u64 {
        self.entity_results.iter().map(|r| r.uploaded).sum()
    }

    /// Total records downloaded across all entities.
    pub fn total_downloaded(&self) -> u64 {
        self.entity_results.iter().map(|r| r.downloaded).sum()
    }

    /// Total per-record errors across all entities.
    pub fn total_errors(&self) -> u64 {
        self.entity_results.iter().map(|r| r.errors).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_carries_no_error() {
        let result = SyncResult::succeeded(vec![EntityResult::empty(EntityType::Patient)]);
        assert!(result.success);
        assert!(result.error.is_none());
    }

    #[test]
    fn not_connected_is_all_zero() {
        let result = SyncResult::not_connected();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("not connected"));
        assert_eq!(result.entity_results.len(), EntityType::SYNC_ORDER.len());
        assert_eq!(result.total_uploaded(), 0);
        assert_eq!(result.total_downloaded(), 0);
        assert_eq!(result.total_errors(), 0);
    }

    #[test]
    fn totals_sum_across_entities() {
        let mut patients = EntityResult::empty(EntityType::Patient);
        patients.uploaded = 2;
        patients.downloaded = 3;
        let mut users = EntityResult::empty(EntityType::User);
        users.errors = 1;

        let result = SyncResult::failed("push rejected", vec![users, patients]);
        assert_eq!(result.total_uploaded(), 2);
        assert_eq!(result.total_downloaded(), 3);
        assert_eq!(result.total_errors(), 1);
    }

    #[test]
    fn receipt_constructors() {
        let id = Uuid::new_v4();
        assert!(PushReceipt::accepted(id).success);
        let rejected = PushReceipt::rejected(id, "validation failed");
        assert!(!rejected.success);
        assert_eq!(rejected.error_message.as_deref(), Some("validation failed"));
    }
}
