//! The generic record exchanged between local storage and the backend.

use crate::entity::EntityType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single domain record.
///
/// The body is carried as an opaque JSON value; the sync and paging
/// engines never look inside it. Conflict resolution uses only
/// `updated_at` (last-writer-wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique record id, shared between local storage and the backend.
    pub id: Uuid,
    /// The kind of record.
    pub entity_type: EntityType,
    /// Opaque record body.
    pub payload: serde_json::Value,
    /// Timestamp of the last modification, set by the writer.
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Creates a record with a fresh id, stamped now.
    pub fn new(entity_type: EntityType, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_type,
            payload,
            updated_at: Utc::now(),
        }
    }

    /// Creates a record with explicit id and timestamp.
    pub fn with_parts(
        id: Uuid,
        entity_type: EntityType,
        payload: serde_json::Value,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            entity_type,
            payload,
            updated_at,
        }
    }

    /// Returns true if this record is strictly newer than `other`.
    ///
    /// This is the last-writer-wins comparison: equal timestamps do
    /// not count as newer, so an incumbent record survives a tie.
    pub fn is_newer_than(&self, other: &Record) -> bool {
        self.updated_at > other.updated_at
    }
}
