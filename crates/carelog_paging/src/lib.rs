//! # Carelog Paging
//!
//! Cursor-based, on-demand page loading for carelog.
//!
//! This crate provides:
//! - [`PageCursor`] encoding pagination position and page size
//! - [`Page`] with prev/next keys and placeholder counts
//! - [`DataProvider`] abstracting "fetch one page" over any medium
//! - [`PagingEngine`] driving the provider page by page
//!
//! ## Architecture
//!
//! The engine is stateless across calls: each `load` is a pure function
//! of its cursor, the requested size, the filter, and provider state.
//! Transient I/O failures come back as typed recoverable errors so the
//! consumer can retry the same cursor without losing place.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cursor;
mod engine;
mod error;
mod page;
mod provider;

pub use cursor::PageCursor;
pub use engine::PagingEngine;
pub use error::{PageError, PageResult};
pub use page::{Page, RefreshAnchor};
pub use provider::{DataProvider, MemoryProvider, ProviderError};
