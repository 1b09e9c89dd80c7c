//! The sync engine.

use crate::backend::{BackendError, RemoteBackend};
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncOpResult};
use crate::events::SyncEvent;
use crate::session::SessionManager;
use crate::store::LocalStore;
use carelog_model::{EntityResult, EntityType, Record, SyncResult, SyncStatus};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::timeout;

/// Orchestrates bidirectional synchronization between the local store
/// and the remote backend.
///
/// At most one pass runs process-wide: the idle→running transition is a
/// compare-and-swap, and a losing trigger gets
/// [`SyncError::AlreadyRunning`] without touching the store or the
/// network. A pass processes entity types in
/// [`EntityType::SYNC_ORDER`], pushing before pulling within each type.
pub struct SyncEngine<B: RemoteBackend, S: LocalStore> {
    config: SyncConfig,
    backend: Arc<B>,
    store: Arc<S>,
    session: Arc<SessionManager>,
    running: AtomicBool,
    events: watch::Sender<SyncEvent>,
}

/// Releases the running flag on every exit path of a pass.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<B: RemoteBackend, S: LocalStore> SyncEngine<B, S> {
    /// Creates a new engine.
    pub fn new(config: SyncConfig, backend: B, store: S, session: Arc<SessionManager>) -> Self {
        let (events, _) = watch::channel(SyncEvent::Idle);
        Self {
            config,
            backend: Arc::new(backend),
            store: Arc::new(store),
            session,
            running: AtomicBool::new(false),
            events,
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The remote backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// The local store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Subscribes to engine events; the latest event is replayed to the
    /// new subscriber immediately.
    pub fn subscribe(&self) -> watch::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Non-blocking read of the running flag.
    ///
    /// The UI disables edit actions while this is true; the engine does
    /// not enforce that contract with locking.
    pub fn is_sync_in_progress(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Recomputes connectivity and the unsynced backlog.
    ///
    /// Never triggers a sync. The snapshot is also published on the
    /// event feed.
    pub async fn get_sync_status(&self) -> SyncOpResult<SyncStatus> {
        let is_connected = self.probe().await;
        let unsynced_count = self.store.count_unsynced().await?;
        let status = SyncStatus::now(is_connected, unsynced_count);
        let _ = self.events.send(SyncEvent::Status(status.clone()));
        Ok(status)
    }

    /// Runs one sync pass.
    ///
    /// Returns [`SyncError::AlreadyRunning`] if a pass is in flight;
    /// every other outcome, including "not connected" and fatal
    /// mid-pass aborts, is reported through the returned [`SyncResult`]
    /// with any completed entity results preserved.
    pub async fn sync_now(&self) -> SyncOpResult<SyncResult> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SyncError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        let _ = self.events.send(SyncEvent::Running);
        tracing::info!(device_id = %self.config.device_id, "sync pass started");

        let result = self.run_pass().await;

        tracing::info!(
            success = result.success,
            uploaded = result.total_uploaded(),
            downloaded = result.total_downloaded(),
            errors = result.total_errors(),
            "sync pass finished"
        );
        let _ = self.events.send(SyncEvent::Completed(result.clone()));
        Ok(result)
    }

    async fn run_pass(&self) -> SyncResult {
        if !self.probe().await {
            tracing::warn!("sync skipped, backend unreachable");
            return SyncResult::not_connected();
        }

        let Some(identity) = self.session.current_identity() else {
            return SyncResult::failed(
                "no active session",
                EntityType::SYNC_ORDER
                    .iter()
                    .map(|entity| EntityResult::empty(*entity))
                    .collect(),
            );
        };
        tracing::debug!(user = %identity.username, "syncing as");

        let mut entity_results = Vec::with_capacity(EntityType::SYNC_ORDER.len());
        let mut first_error: Option<String> = None;

        for entity in EntityType::SYNC_ORDER {
            let mut counters = EntityResult::empty(entity);
            let outcome = self.sync_entity(entity, &mut counters, &mut first_error).await;
            entity_results.push(counters);

            if let Err(fatal) = outcome {
                tracing::error!(entity = %entity, error = %fatal, "sync pass aborted");
                if first_error.is_none() {
                    first_error = Some(fatal.to_string());
                }
                break;
            }
        }

        match first_error {
            None => SyncResult::succeeded(entity_results),
            Some(error) => SyncResult::failed(error, entity_results),
        }
    }

    /// Push-then-pull for one entity type.
    ///
    /// `Err` is returned only for fatal failures; per-record and
    /// transient failures are counted into `counters` and the first one
    /// is recorded in `first_error`.
    async fn sync_entity(
        &self,
        entity: EntityType,
        counters: &mut EntityResult,
        first_error: &mut Option<String>,
    ) -> SyncOpResult<()> {
        self.push_entity(entity, counters, first_error).await?;
        self.pull_entity(entity, counters, first_error).await?;
        Ok(())
    }

    async fn push_entity(
        &self,
        entity: EntityType,
        counters: &mut EntityResult,
        first_error: &mut Option<String>,
    ) -> SyncOpResult<()> {
        let unsynced = self.store.read_unsynced(entity).await?;
        if unsynced.is_empty() {
            return Ok(());
        }

        match self.bounded_push(entity, &unsynced).await {
            Ok(receipts) => {
                for receipt in receipts {
                    if receipt.success {
                        self.store.mark_synced(receipt.id).await?;
                        counters.uploaded += 1;
                    } else {
                        counters.errors += 1;
                        if first_error.is_none() {
                            *first_error = Some(
                                receipt
                                    .error_message
                                    .unwrap_or_else(|| format!("{entity}: push rejected")),
                            );
                        }
                    }
                }
            }
            Err(e) if e.is_fatal() => return Err(SyncError::Backend(e)),
            Err(e) => {
                // Transient transport failure: every attempted record
                // stays unsynced and is retried on the next pass.
                tracing::warn!(entity = %entity, error = %e, "push failed");
                counters.errors += unsynced.len() as u64;
                if first_error.is_none() {
                    *first_error = Some(format!("{entity}: {e}"));
                }
            }
        }
        Ok(())
    }

    async fn pull_entity(
        &self,
        entity: EntityType,
        counters: &mut EntityResult,
        first_error: &mut Option<String>,
    ) -> SyncOpResult<()> {
        let since = self
            .store
            .checkpoint(entity)
            .await?
            .unwrap_or(DateTime::UNIX_EPOCH);

        match self.bounded_pull(entity, since).await {
            Ok(records) => {
                let mut newest: Option<DateTime<Utc>> = None;
                for record in &records {
                    self.store.upsert_from_remote(record).await?;
                    counters.downloaded += 1;
                    if newest.is_none_or(|at| record.updated_at > at) {
                        newest = Some(record.updated_at);
                    }
                }
                // The checkpoint follows remote timestamps, not local
                // wall time, so server clock skew cannot skip records.
                if let Some(at) = newest {
                    self.store.set_checkpoint(entity, at).await?;
                }
            }
            Err(e) if e.is_fatal() => return Err(SyncError::Backend(e)),
            Err(e) => {
                tracing::warn!(entity = %entity, error = %e, "pull failed");
                counters.errors += 1;
                if first_error.is_none() {
                    *first_error = Some(format!("{entity}: {e}"));
                }
            }
        }
        Ok(())
    }

    async fn probe(&self) -> bool {
        (timeout(self.config.ping_timeout, self.backend.ping()).await).unwrap_or(false)
    }

    async fn bounded_push(
        &self,
        entity: EntityType,
        records: &[Record],
    ) -> Result<Vec<carelog_model::PushReceipt>, BackendError> {
        match timeout(
            self.config.request_timeout,
            self.backend.push(entity, records),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout),
        }
    }

    async fn bounded_pull(
        &self,
        entity: EntityType,
        since: DateTime<Utc>,
    ) -> Result<Vec<Record>, BackendError> {
        match timeout(self.config.request_timeout, self.backend.pull(entity, since)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout),
        }
    }
}
