//! Scheduled sync execution.

use crate::backend::RemoteBackend;
use crate::engine::SyncEngine;
use crate::error::SyncError;
use crate::store::LocalStore;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Registers deferred and periodic sync runs.
///
/// The engine itself holds no timer state; this collaborator owns the
/// scheduled tasks. Registration is idempotent (scheduling again
/// replaces the previous job) and cancellation is effective before the
/// next fire. Each fire runs as a detached task, so cancelling a
/// schedule never aborts an in-flight pass.
pub struct SyncScheduler<B, S>
where
    B: RemoteBackend + 'static,
    S: LocalStore + 'static,
{
    engine: Arc<SyncEngine<B, S>>,
    one_shot: Mutex<Option<JoinHandle<()>>>,
    periodic: Mutex<Option<JoinHandle<()>>>,
}

impl<B, S> SyncScheduler<B, S>
where
    B: RemoteBackend + 'static,
    S: LocalStore + 'static,
{
    /// Creates a scheduler over an engine.
    pub fn new(engine: Arc<SyncEngine<B, S>>) -> Self {
        Self {
            engine,
            one_shot: Mutex::new(None),
            periodic: Mutex::new(None),
        }
    }

    /// The scheduled engine.
    pub fn engine(&self) -> &Arc<SyncEngine<B, S>> {
        &self.engine
    }

    /// Schedules one deferred pass, replacing any pending one-shot.
    pub fn schedule_sync_once(&self, delay: Duration) {
        let engine = Arc::clone(&self.engine);
        let mut slot = self.one_shot.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        tracing::debug!(?delay, "one-shot sync scheduled");
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached, so cancellation after this point cannot abort
            // the pass itself.
            tokio::spawn(run_scheduled(engine));
        }));
    }

    /// Schedules a periodic pass every `every`, replacing any existing
    /// periodic job. The first fire happens one period from now.
    ///
    /// A zero interval is rejected and leaves any existing job in place.
    pub fn schedule_periodic_sync(&self, every: Duration) {
        if every.is_zero() {
            tracing::warn!("periodic sync interval must be positive, schedule ignored");
            return;
        }
        let engine = Arc::clone(&self.engine);
        let mut slot = self.periodic.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        tracing::debug!(?every, "periodic sync scheduled");
        *slot = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            loop {
                ticker.tick().await;
                tokio::spawn(run_scheduled(Arc::clone(&engine)));
            }
        }));
    }

    /// Schedules the periodic pass at the engine's configured interval.
    pub fn schedule_periodic_default(&self) {
        self.schedule_periodic_sync(self.engine.config().sync_interval);
    }

    /// Cancels the periodic job; any in-flight pass completes.
    pub fn cancel_periodic_sync(&self) {
        if let Some(handle) = self.periodic.lock().take() {
            handle.abort();
            tracing::debug!("periodic sync cancelled");
        }
    }

    /// Cancels both the pending one-shot and the periodic job.
    pub fn cancel_all_sync(&self) {
        if let Some(handle) = self.one_shot.lock().take() {
            handle.abort();
        }
        self.cancel_periodic_sync();
        tracing::debug!("all scheduled sync cancelled");
    }

    /// Returns true if a one-shot pass is still pending.
    pub fn has_pending_one_shot(&self) -> bool {
        self.one_shot
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Returns true if a periodic job is registered.
    pub fn has_periodic(&self) -> bool {
        self.periodic
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

/// One scheduled fire. A concurrent manual pass wins: the rejection is
/// logged and dropped, never queued.
async fn run_scheduled<B, S>(engine: Arc<SyncEngine<B, S>>)
where
    B: RemoteBackend + 'static,
    S: LocalStore + 'static,
{
    match engine.sync_now().await {
        Ok(result) => {
            tracing::debug!(success = result.success, "scheduled sync finished");
        }
        Err(SyncError::AlreadyRunning) => {
            tracing::debug!("scheduled sync skipped, a pass is already running");
        }
        Err(e) => {
            tracing::warn!(error = %e, "scheduled sync failed");
        }
    }
}
