//! Integration tests: engine against an in-memory server backend, and
//! the paging layer over a freshly synced store.

use async_trait::async_trait;
use carelog_model::{EntityType, Identity, PushReceipt, Record};
use carelog_paging::{DataProvider, PagingEngine, ProviderError};
use carelog_sync::{
    BackendError, LocalStore, MemoryStore, RemoteBackend, SessionManager, SyncConfig, SyncEngine,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// A backend that behaves like the real server: it keeps one table per
/// entity type and applies last-writer-wins on pushed records.
#[derive(Default)]
struct InMemoryServer {
    tables: RwLock<HashMap<EntityType, HashMap<Uuid, Record>>>,
}

impl InMemoryServer {
    fn new() -> Self {
        Self::default()
    }

    fn seed(&self, record: Record) {
        self.tables
            .write()
            .entry(record.entity_type)
            .or_default()
            .insert(record.id, record);
    }

    fn record_count(&self) -> usize {
        self.tables.read().values().map(|t| t.len()).sum()
    }
}

#[async_trait]
impl RemoteBackend for InMemoryServer {
    async fn push(
        &self,
        entity_type: EntityType,
        records: &[Record],
    ) -> Result<Vec<PushReceipt>, BackendError> {
        let mut tables = self.tables.write();
        let table = tables.entry(entity_type).or_default();
        let receipts = records
            .iter()
            .map(|record| {
                let keep_existing = table
                    .get(&record.id)
                    .map(|existing| existing.updated_at >= record.updated_at)
                    .unwrap_or(false);
                if !keep_existing {
                    table.insert(record.id, record.clone());
                }
                PushReceipt::accepted(record.id)
            })
            .collect();
        Ok(receipts)
    }

    async fn pull(
        &self,
        entity_type: EntityType,
        since: DateTime<Utc>,
    ) -> Result<Vec<Record>, BackendError> {
        Ok(self
            .tables
            .read()
            .get(&entity_type)
            .map(|table| {
                table
                    .values()
                    .filter(|record| record.updated_at > since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn ping(&self) -> bool {
        true
    }
}

/// Pages patient records out of the synced local store.
struct PatientProvider {
    store: Arc<MemoryStore>,
}

#[async_trait]
impl DataProvider for PatientProvider {
    type Item = Record;

    async fn fetch(
        &self,
        offset: u64,
        limit: usize,
        filter: Option<&str>,
    ) -> Result<Vec<Record>, ProviderError> {
        let records = self.store.records_of(EntityType::Patient);
        let filtered: Vec<Record> = match filter {
            Some(query) => records
                .into_iter()
                .filter(|record| {
                    record
                        .payload
                        .get("name")
                        .and_then(|name| name.as_str())
                        .map(|name| name.contains(query))
                        .unwrap_or(false)
                })
                .collect(),
            None => records,
        };
        Ok(filtered
            .into_iter()
            .skip(offset as usize)
            .take(limit)
            .collect())
    }
}

fn engine_over(
    server: InMemoryServer,
    store: MemoryStore,
) -> SyncEngine<InMemoryServer, MemoryStore> {
    let session = Arc::new(SessionManager::with_identity(Identity::new(
        Uuid::new_v4(),
        "dr.okafor",
    )));
    SyncEngine::new(
        SyncConfig::new("memory://", Uuid::new_v4()),
        server,
        store,
        session,
    )
}

fn patient(name: &str) -> Record {
    Record::new(EntityType::Patient, serde_json::json!({ "name": name }))
}

#[tokio::test]
async fn bidirectional_full_sync() {
    let server = InMemoryServer::new();
    server.seed(patient("remote-only"));
    server.seed(Record::new(
        EntityType::Appointment,
        serde_json::json!({"slot": "09:00"}),
    ));

    let store = MemoryStore::new();
    let local = patient("local-only");
    store.insert_local(local.clone());

    let engine = engine_over(server, store);
    let result = engine.sync_now().await.unwrap();

    assert!(result.success);
    assert_eq!(result.total_uploaded(), 1);
    // The pull also echoes the just-pushed record; the tie rule keeps
    // the local copy but it still counts as downloaded.
    assert_eq!(result.total_downloaded(), 3);
    assert_eq!(engine.store().is_synced(local.id), Some(true));
    assert_eq!(engine.backend().record_count(), 3);
    assert_eq!(engine.store().count_unsynced().await.unwrap(), 0);
}

#[tokio::test]
async fn repeated_sync_is_idempotent() {
    let server = InMemoryServer::new();
    server.seed(patient("remote"));

    let store = MemoryStore::new();
    store.insert_local(patient("local"));

    let engine = engine_over(server, store);

    let first = engine.sync_now().await.unwrap();
    assert_eq!(first.total_uploaded(), 1);
    assert_eq!(first.total_downloaded(), 2);

    // The checkpoint advanced past everything already seen.
    let second = engine.sync_now().await.unwrap();
    assert!(second.success);
    assert_eq!(second.total_uploaded(), 0);
    assert_eq!(second.total_downloaded(), 0);
}

#[tokio::test]
async fn newer_remote_record_replaces_local_edit() {
    let server = InMemoryServer::new();
    let store = MemoryStore::new();

    let local = patient("stale name");
    store.insert_local(local.clone());

    let mut remote = local.clone();
    remote.payload = serde_json::json!({"name": "corrected name"});
    remote.updated_at = local.updated_at + ChronoDuration::seconds(30);
    server.seed(remote.clone());

    let engine = engine_over(server, store);
    let result = engine.sync_now().await.unwrap();

    assert!(result.success);
    let patients = result
        .entity_results
        .iter()
        .find(|r| r.entity_type == EntityType::Patient)
        .unwrap();
    assert!(patients.downloaded >= 1);
    assert_eq!(engine.store().get(local.id).unwrap(), remote);
}

#[tokio::test]
async fn synced_store_pages_cleanly() {
    let server = InMemoryServer::new();
    let mut stamp = Utc::now();
    for i in 0..25 {
        stamp += ChronoDuration::seconds(1);
        server.seed(Record::with_parts(
            Uuid::new_v4(),
            EntityType::Patient,
            serde_json::json!({ "name": format!("patient-{i:02}") }),
            stamp,
        ));
    }

    let engine = engine_over(server, MemoryStore::new());
    let result = engine.sync_now().await.unwrap();
    assert_eq!(result.total_downloaded(), 25);

    let paging = PagingEngine::new(PatientProvider {
        store: Arc::clone(engine.store()),
    });

    // 25 records, page size 10: pages of 10, 10, 5.
    let page0 = paging.load(None, 10, None).await.unwrap();
    let page1 = paging.load(page0.next_key, 10, None).await.unwrap();
    let page2 = paging.load(page1.next_key, 10, None).await.unwrap();

    assert_eq!(page0.items.len(), 10);
    assert_eq!(page1.items.len(), 10);
    assert_eq!(page2.items.len(), 5);
    assert!(page2.next_key.is_none());
    assert_eq!(page2.items_after, Some(0));

    // Refreshing from an anchor in page 1 lands back on page 1.
    let key = paging.refresh_key(&page1.anchor()).unwrap();
    assert_eq!(key.page_index, 1);
    assert_eq!(key.page_size, 10);

    // A filter narrows the stream without disturbing pagination math.
    let filtered = paging.load(None, 10, Some("patient-2")).await.unwrap();
    assert_eq!(filtered.items.len(), 5);
    assert!(filtered.next_key.is_none());
}
