// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory document store for deterministic testing.
//!
//! `MemoryStore` implements `DocumentStore`, `ReferenceStore` and
//! `FileIngester` with the same matching rules as the SQLite store, and
//! counts every call so tests can assert on side effects.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;

use famsync_core::FamsyncError;
use famsync_core::traits::{DocumentStore, FileIngester, PluginAdapter, ReferenceStore};
use famsync_core::types::{
    AdapterType, Document, FileRequest, HealthStatus, ReferencePage, doctypes, lookup_path,
};

/// Default number of member ids per reference listing page.
const DEFAULT_PAGE_SIZE: usize = 2;

#[derive(Default)]
struct State {
    documents: Vec<Document>,
    edges: Vec<(String, String)>,
    next_id: u64,
    upsert_calls: usize,
    list_calls: usize,
    add_calls: usize,
    duplicate_edges: usize,
    stored_files: Vec<FileRequest>,
    fail_list_on_call: Option<usize>,
    fail_add: bool,
    fail_upsert_for: Option<String>,
    fail_files_named: Vec<String>,
}

/// An in-memory store shared by the three storage-side collaborators.
///
/// Reference listings are deliberately paged small (two ids per page by
/// default) so that multi-page relation walks happen in ordinary tests.
pub struct MemoryStore {
    state: Mutex<State>,
    page_size: usize,
}

impl MemoryStore {
    /// Create an empty store with the default listing page size.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create an empty store whose reference listings return `page_size` ids per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: page_size.max(1),
        }
    }

    /// Fail the `n`th (1-based) `list_references` call.
    pub fn fail_listing_on_call(mut self, n: usize) -> Self {
        self.state.get_mut().fail_list_on_call = Some(n);
        self
    }

    /// Fail every `add_references` call.
    pub fn failing_additions(mut self) -> Self {
        self.state.get_mut().fail_add = true;
        self
    }

    /// Fail every upsert of the given doctype.
    pub fn failing_upserts_for(mut self, doctype: &str) -> Self {
        self.state.get_mut().fail_upsert_for = Some(doctype.to_string());
        self
    }

    /// Fail ingestion of files with the given name.
    pub fn failing_file(mut self, filename: &str) -> Self {
        self.state.get_mut().fail_files_named.push(filename.to_string());
        self
    }

    /// All documents of one doctype, in creation order.
    pub async fn documents(&self, doctype: &str) -> Vec<Document> {
        self.state
            .lock()
            .await
            .documents
            .iter()
            .filter(|d| d.doctype == doctype)
            .cloned()
            .collect()
    }

    /// Number of documents of one doctype.
    pub async fn count(&self, doctype: &str) -> usize {
        self.documents(doctype).await.len()
    }

    /// The first document of `doctype` whose `name` field equals `name`.
    pub async fn find_by_name(&self, doctype: &str, name: &str) -> Option<Document> {
        self.documents(doctype)
            .await
            .into_iter()
            .find(|d| d.body.get("name").and_then(Value::as_str) == Some(name))
    }

    /// Member ids linked to a container, in insertion order.
    pub async fn references(&self, container_id: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .edges
            .iter()
            .filter(|(c, _)| c == container_id)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Link a member to a container directly, bypassing call counters.
    pub async fn seed_reference(&self, container_id: &str, member_id: &str) {
        self.state
            .lock()
            .await
            .edges
            .push((container_id.to_string(), member_id.to_string()));
    }

    /// Every file request received, in order.
    pub async fn stored_files(&self) -> Vec<FileRequest> {
        self.state.lock().await.stored_files.clone()
    }

    pub async fn upsert_calls(&self) -> usize {
        self.state.lock().await.upsert_calls
    }

    pub async fn list_calls(&self) -> usize {
        self.state.lock().await.list_calls
    }

    pub async fn add_calls(&self) -> usize {
        self.state.lock().await.add_calls
    }

    /// Edges that were requested although they already existed.
    pub async fn duplicate_edges(&self) -> usize {
        self.state.lock().await.duplicate_edges
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn injected(what: &str) -> FamsyncError {
    FamsyncError::Storage {
        source: format!("injected {what} failure").into(),
    }
}

/// Values of every match key, or a mapping error naming the first missing one.
fn key_values(doctype: &str, body: &Value, match_keys: &[&str]) -> Result<Vec<Value>, FamsyncError> {
    match_keys
        .iter()
        .map(|key| match lookup_path(body, key) {
            Some(Value::Null) | None => Err(FamsyncError::mapping(*key, format!("{doctype} document"))),
            Some(value) => Ok(value.clone()),
        })
        .collect()
}

fn upsert_locked(
    state: &mut State,
    doctype: &str,
    documents: Vec<Value>,
    match_keys: &[&str],
) -> Result<Vec<Document>, FamsyncError> {
    let keyed = documents
        .into_iter()
        .map(|body| key_values(doctype, &body, match_keys).map(|keys| (keys, body)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut persisted = Vec::with_capacity(keyed.len());
    for (keys, body) in keyed {
        let existing = state.documents.iter_mut().find(|doc| {
            doc.doctype == doctype
                && match_keys
                    .iter()
                    .zip(&keys)
                    .all(|(key, value)| lookup_path(&doc.body, key) == Some(value))
        });

        match existing {
            Some(doc) => {
                if let (Value::Object(target), Value::Object(fields)) = (&mut doc.body, body) {
                    for (field, value) in fields {
                        target.insert(field, value);
                    }
                }
                persisted.push(doc.clone());
            }
            None => {
                state.next_id += 1;
                let doc = Document {
                    id: format!("doc-{}", state.next_id),
                    doctype: doctype.to_string(),
                    body,
                };
                state.documents.push(doc.clone());
                persisted.push(doc);
            }
        }
    }
    Ok(persisted)
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, FamsyncError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FamsyncError> {
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn upsert(
        &self,
        doctype: &str,
        documents: Vec<Value>,
        match_keys: &[&str],
    ) -> Result<Vec<Document>, FamsyncError> {
        let mut state = self.state.lock().await;
        state.upsert_calls += 1;
        if state.fail_upsert_for.as_deref() == Some(doctype) {
            return Err(injected("upsert"));
        }
        upsert_locked(&mut state, doctype, documents, match_keys)
    }
}

#[async_trait]
impl ReferenceStore for MemoryStore {
    async fn list_references(
        &self,
        container: &Document,
        page_token: Option<&str>,
    ) -> Result<ReferencePage, FamsyncError> {
        let mut state = self.state.lock().await;
        state.list_calls += 1;
        if state.fail_list_on_call == Some(state.list_calls) {
            return Err(injected("listing"));
        }

        let offset = match page_token {
            Some(token) => token.parse::<usize>().map_err(|e| FamsyncError::Storage {
                source: Box::new(e),
            })?,
            None => 0,
        };
        let members: Vec<String> = state
            .edges
            .iter()
            .filter(|(c, _)| *c == container.id)
            .map(|(_, m)| m.clone())
            .collect();

        let end = (offset + self.page_size).min(members.len());
        let member_ids = members.get(offset..end).map(<[String]>::to_vec).unwrap_or_default();
        let next = (end < members.len()).then(|| end.to_string());
        Ok(ReferencePage { member_ids, next })
    }

    async fn add_references(
        &self,
        container: &Document,
        _member_doctype: &str,
        member_ids: &[String],
    ) -> Result<(), FamsyncError> {
        let mut state = self.state.lock().await;
        state.add_calls += 1;
        if state.fail_add {
            return Err(injected("reference addition"));
        }
        for member in member_ids {
            let edge = (container.id.clone(), member.clone());
            if state.edges.contains(&edge) {
                state.duplicate_edges += 1;
            } else {
                state.edges.push(edge);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FileIngester for MemoryStore {
    async fn store(&self, file: &FileRequest) -> Result<String, FamsyncError> {
        let mut state = self.state.lock().await;
        if state.fail_files_named.contains(&file.filename) {
            return Err(injected("file"));
        }
        state.stored_files.push(file.clone());

        let mut body = Map::new();
        body.insert("name".into(), json!(file.filename));
        body.insert("dir".into(), json!(file.sub_path));
        body.insert("source_url".into(), json!(file.url));
        body.insert("mime".into(), json!(file.content_type));
        body.insert("metadata".into(), file.metadata.clone());
        if let Some(modified) = file.modified_at {
            body.insert("updated_at".into(), json!(modified.to_rfc3339()));
        }

        let mut keys: Vec<&str> = file.id_attributes.iter().map(String::as_str).collect();
        if keys.is_empty() {
            keys.push("name");
        }
        keys.push("dir");

        let docs = upsert_locked(&mut state, doctypes::FILES, vec![Value::Object(body)], &keys)?;
        docs.into_iter()
            .next()
            .map(|doc| doc.id)
            .ok_or_else(|| FamsyncError::Internal("file upsert returned no document".into()))
    }
}
