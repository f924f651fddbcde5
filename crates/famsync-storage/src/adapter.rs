// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage-side collaborator traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use famsync_config::model::StorageConfig;
use famsync_core::{
    AdapterType, Document, DocumentStore, FamsyncError, FileIngester, FileRequest, HealthStatus,
    PluginAdapter, ReferencePage, ReferenceStore,
};

use crate::database::{Database, storage_err};
use crate::queries;

/// SQLite-backed document store, reference store, and file registry.
///
/// The database is opened lazily by [`SqliteStore::initialize`]; every other
/// call fails with a storage error until then.
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a store for `config` without opening the database.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create a store and open its database.
    pub async fn open(config: StorageConfig) -> Result<Self, FamsyncError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    /// Open the database, applying PRAGMAs and migrations.
    pub async fn initialize(&self) -> Result<(), FamsyncError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| FamsyncError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    fn db(&self) -> Result<&Database, FamsyncError> {
        self.db.get().ok_or_else(|| FamsyncError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Number of stored documents of `doctype`.
    pub async fn count(&self, doctype: &str) -> Result<usize, FamsyncError> {
        queries::documents::count(self.db()?, doctype).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Document>, FamsyncError> {
        queries::documents::get(self.db()?, id).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, FamsyncError> {
        let db = match self.db() {
            Ok(db) => db,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(storage_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FamsyncError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn upsert(
        &self,
        doctype: &str,
        documents: Vec<serde_json::Value>,
        match_keys: &[&str],
    ) -> Result<Vec<Document>, FamsyncError> {
        queries::documents::upsert(self.db()?, doctype, documents, match_keys).await
    }
}

#[async_trait]
impl ReferenceStore for SqliteStore {
    async fn list_references(
        &self,
        container: &Document,
        page_token: Option<&str>,
    ) -> Result<ReferencePage, FamsyncError> {
        queries::references::list_page(
            self.db()?,
            container,
            page_token,
            self.config.reference_page_size,
        )
        .await
    }

    async fn add_references(
        &self,
        container: &Document,
        member_doctype: &str,
        member_ids: &[String],
    ) -> Result<(), FamsyncError> {
        let created =
            queries::references::add(self.db()?, container, member_doctype, member_ids).await?;
        debug!(
            container = %container.label(),
            requested = member_ids.len(),
            created,
            "references added"
        );
        Ok(())
    }
}

#[async_trait]
impl FileIngester for SqliteStore {
    async fn store(&self, file: &FileRequest) -> Result<String, FamsyncError> {
        queries::files::register(self.db()?, file).await
    }
}
