// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document store traits: idempotent upsert and the reference relation.

use async_trait::async_trait;

use crate::error::FamsyncError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Document, ReferencePage};

/// Create-or-update access to a document store.
#[async_trait]
pub trait DocumentStore: PluginAdapter {
    /// Persists `documents` of `doctype`, matching existing documents on `match_keys`.
    ///
    /// For each input, an existing document whose values at every match key
    /// (dotted paths) are equal is updated in place, keeping its identifier;
    /// otherwise a new document is created. Repeating the call with the same
    /// input converges and never duplicates. Output order follows input order.
    async fn upsert(
        &self,
        doctype: &str,
        documents: Vec<serde_json::Value>,
        match_keys: &[&str],
    ) -> Result<Vec<Document>, FamsyncError>;
}

/// The many-to-many membership relation between containers and members.
#[async_trait]
pub trait ReferenceStore: PluginAdapter {
    /// Lists one page of the member ids referenced by `container`.
    async fn list_references(
        &self,
        container: &Document,
        page_token: Option<&str>,
    ) -> Result<ReferencePage, FamsyncError>;

    /// Adds `member_ids` as references of `container` in a single batch.
    async fn add_references(
        &self,
        container: &Document,
        member_doctype: &str,
        member_ids: &[String],
    ) -> Result<(), FamsyncError>;
}
