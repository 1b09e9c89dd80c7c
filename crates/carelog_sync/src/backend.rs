//! Remote backend abstraction.

use async_trait::async_trait;
use carelog_model::{EntityType, PushReceipt, Record};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors the remote backend can raise.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend is unreachable.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The request timed out.
    #[error("backend request timed out")]
    Timeout,

    /// The backend rejected the session's credentials.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// The backend answered with something the client cannot interpret.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl BackendError {
    /// Returns true if this failure aborts the whole pass.
    ///
    /// Everything except an authentication rejection is treated as
    /// transient: counted per record and retried on the next pass.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BackendError::AuthRejected(_))
    }
}

/// The remote sync endpoint.
///
/// This trait abstracts the transport; implementations may bind it to
/// any RPC or HTTP stack. The engine only relies on the behavioral
/// contract: per-record push receipts, pull-since-timestamp, and a
/// cheap reachability probe.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Uploads records of one entity type, returning one receipt per
    /// record in the same order.
    async fn push(
        &self,
        entity_type: EntityType,
        records: &[Record],
    ) -> Result<Vec<PushReceipt>, BackendError>;

    /// Fetches remote records of one entity type updated strictly after
    /// `since`, each carrying its `updated_at`.
    async fn pull(
        &self,
        entity_type: EntityType,
        since: DateTime<Utc>,
    ) -> Result<Vec<Record>, BackendError>;

    /// Lightweight connectivity probe.
    async fn ping(&self) -> bool;
}

/// A scriptable backend for tests.
#[derive(Default)]
pub struct MockBackend {
    connected: AtomicBool,
    remote: RwLock<HashMap<EntityType, Vec<Record>>>,
    pushed: RwLock<Vec<Record>>,
    rejected_ids: RwLock<HashSet<Uuid>>,
    push_failure: RwLock<HashMap<EntityType, BackendError>>,
    pull_failure: RwLock<HashMap<EntityType, BackendError>>,
    ping_delay: Mutex<Option<Duration>>,
    push_calls: AtomicU64,
    pull_calls: AtomicU64,
    ping_calls: AtomicU64,
}

impl MockBackend {
    /// Creates a connected mock with no remote data.
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            ..Default::default()
        }
    }

    /// Sets the connectivity probe result.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Makes `ping` sleep before answering, to widen race windows in
    /// concurrency tests.
    pub fn set_ping_delay(&self, delay: Duration) {
        *self.ping_delay.lock() = Some(delay);
    }

    /// Adds a record served by subsequent pulls.
    pub fn add_remote(&self, record: Record) {
        self.remote
            .write()
            .entry(record.entity_type)
            .or_default()
            .push(record);
    }

    /// Marks a record id as rejected on push.
    pub fn reject_id(&self, id: Uuid, _reason: &str) {
        self.rejected_ids.write().insert(id);
    }

    /// Scripts a push failure for one entity type.
    pub fn fail_push(&self, entity_type: EntityType, error: BackendError) {
        self.push_failure.write().insert(entity_type, error);
    }

    /// Scripts a pull failure for one entity type.
    pub fn fail_pull(&self, entity_type: EntityType, error: BackendError) {
        self.pull_failure.write().insert(entity_type, error);
    }

    /// Records accepted by this backend, in push order.
    pub fn pushed(&self) -> Vec<Record> {
        self.pushed.read().clone()
    }

    /// Number of push calls made.
    pub fn push_calls(&self) -> u64 {
        self.push_calls.load(Ordering::SeqCst)
    }

    /// Number of pull calls made.
    pub fn pull_calls(&self) -> u64 {
        self.pull_calls.load(Ordering::SeqCst)
    }

    /// Number of ping calls made.
    pub fn ping_calls(&self) -> u64 {
        self.ping_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteBackend for MockBackend {
    async fn push(
        &self,
        entity_type: EntityType,
        records: &[Record],
    ) -> Result<Vec<PushReceipt>, BackendError> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.push_failure.read().get(&entity_type) {
            return Err(error.clone());
        }

        let rejected = self.rejected_ids.read();
        let mut receipts = Vec::with_capacity(records.len());
        for record in records {
            if rejected.contains(&record.id) {
                receipts.push(PushReceipt::rejected(record.id, "rejected by mock"));
            } else {
                self.pushed.write().push(record.clone());
                receipts.push(PushReceipt::accepted(record.id));
            }
        }
        Ok(receipts)
    }

    async fn pull(
        &self,
        entity_type: EntityType,
        since: DateTime<Utc>,
    ) -> Result<Vec<Record>, BackendError> {
        self.pull_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.pull_failure.read().get(&entity_type) {
            return Err(error.clone());
        }

        Ok(self
            .remote
            .read()
            .get(&entity_type)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| record.updated_at > since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn ping(&self) -> bool {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.ping_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.connected.load(Ordering::SeqCst)
    }
}
