//! # Carelog Sync
//!
//! Bidirectional synchronization engine for carelog.
//!
//! This crate provides:
//! - Sync engine with a single-flight pass guard (idle → running → idle)
//! - Remote backend and local store abstractions
//! - Last-writer-wins conflict resolution on pull
//! - One-shot and periodic scheduling
//! - A replay-latest event feed for UI observers
//!
//! ## Architecture
//!
//! A sync pass processes entity types in a fixed dependency order
//! (users, patients, consultations, appointments); within each type,
//! push precedes pull. Per-record failures are counted and retried on
//! the next pass; only authentication rejection or an unavailable local
//! store aborts a pass, and the entity results completed up to that
//! point are preserved in the returned result.
//!
//! ## Key invariants
//!
//! - At most one pass runs process-wide; a concurrent trigger is
//!   rejected, never queued
//! - A record's local synced flag flips only on a backend-acknowledged
//!   push
//! - A remote record replaces a local one only when strictly newer
//! - Cancellation affects future scheduled runs; an in-flight pass
//!   completes

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod engine;
mod error;
mod events;
mod scheduler;
mod session;
mod store;

pub use backend::{BackendError, MockBackend, RemoteBackend};
pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use error::{SyncError, SyncOpResult};
pub use events::SyncEvent;
pub use scheduler::SyncScheduler;
pub use session::SessionManager;
pub use store::{LocalStore, MemoryStore, StoreError, UpsertOutcome};
