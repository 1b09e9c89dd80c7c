//! Local store abstraction.

use async_trait::async_trait;
use carelog_model::{EntityType, Record};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;
use uuid::Uuid;

/// Errors the local store can raise.
///
/// Store failures are fatal for a sync pass: the engine aborts the
/// remaining entity loop rather than risk half-applied writes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store cannot be read or written.
    #[error("local store unavailable: {0}")]
    Unavailable(String),

    /// No record exists for the given id.
    #[error("record {0} not found")]
    NotFound(Uuid),
}

/// Outcome of applying a remote record locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The remote record was strictly newer and replaced the local one,
    /// or no local record existed.
    Applied,
    /// The local record was at least as new and was kept.
    IgnoredOlder,
}

/// The local persistent store, as seen by the engines.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Reads all locally-modified records of one type not yet
    /// acknowledged by the backend.
    async fn read_unsynced(&self, entity_type: EntityType) -> Result<Vec<Record>, StoreError>;

    /// Flips a record's synced flag after a backend-acknowledged push.
    async fn mark_synced(&self, id: Uuid) -> Result<(), StoreError>;

    /// Applies a remote record under the last-writer-wins rule: the
    /// remote replaces the local record only when strictly newer.
    async fn upsert_from_remote(&self, record: &Record) -> Result<UpsertOutcome, StoreError>;

    /// Counts unsynced records across all entity types.
    async fn count_unsynced(&self) -> Result<u64, StoreError>;

    /// The last successful pull checkpoint for one entity type.
    async fn checkpoint(&self, entity_type: EntityType)
        -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Advances the pull checkpoint for one entity type.
    async fn set_checkpoint(
        &self,
        entity_type: EntityType,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

struct StoredRecord {
    record: Record,
    synced: bool,
}

/// An in-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, StoredRecord>>,
    checkpoints: RwLock<HashMap<EntityType, DateTime<Utc>>>,
    unavailable: AtomicBool,
    writes: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record as a pending local edit (unsynced).
    pub fn insert_local(&self, record: Record) {
        self.records.write().insert(
            record.id,
            StoredRecord {
                record,
                synced: false,
            },
        );
    }

    /// Inserts a record already acknowledged by the backend.
    pub fn insert_synced(&self, record: Record) {
        self.records.write().insert(
            record.id,
            StoredRecord {
                record,
                synced: true,
            },
        );
    }

    /// Reads a record by id.
    pub fn get(&self, id: Uuid) -> Option<Record> {
        self.records.read().get(&id).map(|s| s.record.clone())
    }

    /// Reads a record's synced flag.
    pub fn is_synced(&self, id: Uuid) -> Option<bool> {
        self.records.read().get(&id).map(|s| s.synced)
    }

    /// All records of one entity type, ordered by (updated_at, id) for
    /// a stable pagination order.
    pub fn records_of(&self, entity_type: EntityType) -> Vec<Record> {
        let mut records: Vec<Record> = self
            .records
            .read()
            .values()
            .filter(|s| s.record.entity_type == entity_type)
            .map(|s| s.record.clone())
            .collect();
        records.sort_by(|a, b| (a.updated_at, a.id).cmp(&(b.updated_at, b.id)));
        records
    }

    /// Switches the store between available and unavailable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of mutations applied to this store.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn read_unsynced(&self, entity_type: EntityType) -> Result<Vec<Record>, StoreError> {
        self.check_available()?;
        let mut records: Vec<Record> = self
            .records
            .read()
            .values()
            .filter(|s| !s.synced && s.record.entity_type == entity_type)
            .map(|s| s.record.clone())
            .collect();
        records.sort_by(|a, b| (a.updated_at, a.id).cmp(&(b.updated_at, b.id)));
        Ok(records)
    }

    async fn mark_synced(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_available()?;
        let mut records = self.records.write();
        let stored = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        stored.synced = true;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert_from_remote(&self, record: &Record) -> Result<UpsertOutcome, StoreError> {
        self.check_available()?;
        let mut records = self.records.write();
        if let Some(existing) = records.get(&record.id) {
            if !record.is_newer_than(&existing.record) {
                return Ok(UpsertOutcome::IgnoredOlder);
            }
        }
        records.insert(
            record.id,
            StoredRecord {
                record: record.clone(),
                synced: true,
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(UpsertOutcome::Applied)
    }

    async fn count_unsynced(&self) -> Result<u64, StoreError> {
        self.check_available()?;
        Ok(self.records.read().values().filter(|s| !s.synced).count() as u64)
    }

    async fn checkpoint(
        &self,
        entity_type: EntityType,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.check_available()?;
        Ok(self.checkpoints.read().get(&entity_type).copied())
    }

    async fn set_checkpoint(
        &self,
        entity_type: EntityType,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        self.checkpoints.write().insert(entity_type, at);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn patient_at(at: DateTime<Utc>) -> Record {
        Record::with_parts(
            Uuid::new_v4(),
            EntityType::Patient,
            serde_json::json!({"name": "p"}),
            at,
        )
    }

    #[tokio::test]
    async fn unsynced_records_are_per_entity() {
        let store = MemoryStore::new();
        store.insert_local(Record::new(EntityType::Patient, serde_json::json!({})));
        store.insert_local(Record::new(EntityType::User, serde_json::json!({})));
        store.insert_synced(Record::new(EntityType::Patient, serde_json::json!({})));

        assert_eq!(
            store.read_unsynced(EntityType::Patient).await.unwrap().len(),
            1
        );
        assert_eq!(store.count_unsynced().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn mark_synced_flips_the_flag() {
        let store = MemoryStore::new();
        let record = Record::new(EntityType::Appointment, serde_json::json!({}));
        let id = record.id;
        store.insert_local(record);

        assert_eq!(store.is_synced(id), Some(false));
        store.mark_synced(id).await.unwrap();
        assert_eq!(store.is_synced(id), Some(true));
        assert_eq!(store.count_unsynced().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_synced_unknown_id_fails() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        assert_eq!(
            store.mark_synced(id).await.unwrap_err(),
            StoreError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn upsert_applies_strictly_newer_remote() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let local = patient_at(now);
        store.insert_local(local.clone());

        let mut newer = local.clone();
        newer.payload = serde_json::json!({"name": "updated"});
        newer.updated_at = now + Duration::seconds(5);

        assert_eq!(
            store.upsert_from_remote(&newer).await.unwrap(),
            UpsertOutcome::Applied
        );
        assert_eq!(store.get(local.id).unwrap(), newer);
        assert_eq!(store.is_synced(local.id), Some(true));
    }

    #[tokio::test]
    async fn upsert_keeps_local_on_tie_or_older() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let local = patient_at(now);
        store.insert_local(local.clone());

        let mut tie = local.clone();
        tie.payload = serde_json::json!({"name": "tie"});
        assert_eq!(
            store.upsert_from_remote(&tie).await.unwrap(),
            UpsertOutcome::IgnoredOlder
        );

        let mut older = local.clone();
        older.updated_at = now - Duration::seconds(5);
        assert_eq!(
            store.upsert_from_remote(&older).await.unwrap(),
            UpsertOutcome::IgnoredOlder
        );

        assert_eq!(store.get(local.id).unwrap(), local);
        // Still a pending local edit.
        assert_eq!(store.is_synced(local.id), Some(false));
    }

    #[tokio::test]
    async fn checkpoints_are_per_entity() {
        let store = MemoryStore::new();
        let at = Utc::now();
        assert_eq!(store.checkpoint(EntityType::Patient).await.unwrap(), None);

        store.set_checkpoint(EntityType::Patient, at).await.unwrap();
        assert_eq!(
            store.checkpoint(EntityType::Patient).await.unwrap(),
            Some(at)
        );
        assert_eq!(store.checkpoint(EntityType::User).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unavailable_store_fails_everything() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.count_unsynced().await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
