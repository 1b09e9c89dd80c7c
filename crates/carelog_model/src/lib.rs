//! # Carelog Model
//!
//! Shared value types for the carelog offline-first core.
//!
//! This crate provides:
//! - Entity kinds and their synchronization order
//! - The generic [`Record`] exchanged between local storage and the backend
//! - The authenticated [`Identity`] held by the session manager
//! - Sync status and result types observed by the UI
//!
//! It carries no I/O and no engine logic; both the paging and sync
//! crates depend on it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod identity;
mod record;
mod status;

pub use entity::EntityType;
pub use identity::Identity;
pub use record::Record;
pub use status::{EntityResult, PushReceipt, SyncResult, SyncStatus};
