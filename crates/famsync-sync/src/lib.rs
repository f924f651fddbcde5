// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental synchronization engine for famsync.
//!
//! Pulls per-family collections from the remote and converges them into the
//! document store:
//!
//! - [`paginator`] walks a remote collection page by page until exhaustion
//! - [`mapper`] turns raw records into canonical documents with natural keys
//! - [`reconciler`] links members to their container without duplicating edges
//! - [`SyncEngine`] runs the gazette, contact and photo streams per family
//!
//! All collaborators (remote, store, file ingester) are traits from
//! `famsync-core`, so the engine runs unchanged against the HTTP and SQLite
//! adapters or the in-memory ones from `famsync-test-utils`.

pub mod mapper;
pub mod orchestrator;
pub mod paginator;
pub mod reconciler;
pub mod report;
pub mod streams;

pub use orchestrator::{Collaborators, SyncEngine, SyncOptions};
pub use paginator::{PageSource, Paginator, Termination};
pub use reconciler::ReferenceReconciler;
pub use report::{FamilyReport, RunReport, StreamKind, StreamReport, StreamStatus};
