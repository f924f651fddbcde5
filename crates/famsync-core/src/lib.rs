// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for famsync.
//!
//! This crate provides the error taxonomy, raw remote records, domain types,
//! and the collaborator traits the sync engine is written against. The remote
//! client, the SQLite store, and the test doubles all implement traits
//! defined here.

pub mod error;
pub mod records;
pub mod traits;
pub mod types;

pub use error::FamsyncError;
pub use types::{
    AdapterType, Credentials, Cursor, Document, Family, FileRequest, HealthStatus, Page,
    ReferencePage, Session,
};

pub use traits::{
    DocumentStore, FamilyRemote, FileIngester, PluginAdapter, ReferenceStore, SessionProvider,
};
