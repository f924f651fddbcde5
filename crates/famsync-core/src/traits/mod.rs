// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions consumed by the sync engine.
//!
//! All collaborators extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod auth;
pub mod files;
pub mod remote;
pub mod storage;

pub use adapter::PluginAdapter;
pub use auth::SessionProvider;
pub use files::FileIngester;
pub use remote::FamilyRemote;
pub use storage::{DocumentStore, ReferenceStore};
