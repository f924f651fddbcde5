// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run orchestration.
//!
//! A run authenticates once, fetches the family list, then synchronizes each
//! family's gazettes, contacts and photos concurrently. Families themselves
//! are processed `family_concurrency` at a time.
//!
//! Only authentication and the family listing can fail a run. Everything
//! below that is reported per stream in the [`RunReport`].

use std::sync::Arc;

use chrono::Utc;
use futures::{StreamExt, stream};
use tracing::{error, info, warn};

use famsync_core::{
    Credentials, DocumentStore, FamilyRemote, FamsyncError, Family, FileIngester, ReferenceStore,
    Session, SessionProvider,
};

use crate::mapper::{self, Mapped};
use crate::paginator::DEFAULT_MAX_PAGES;
use crate::reconciler::ReferenceReconciler;
use crate::report::{FamilyReport, RunReport, StreamKind, StreamReport, StreamStatus};

/// Tuning knobs for a run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Families synchronized at the same time.
    pub family_concurrency: usize,
    /// Files handed to the ingester at the same time within one stream.
    pub file_concurrency: usize,
    /// Page cap for a single pagination.
    pub max_pages: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            family_concurrency: 1,
            file_concurrency: 8,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// The external collaborators a run talks to.
pub struct Collaborators {
    pub auth: Arc<dyn SessionProvider>,
    pub remote: Arc<dyn FamilyRemote>,
    pub documents: Arc<dyn DocumentStore>,
    pub references: Arc<dyn ReferenceStore>,
    pub files: Arc<dyn FileIngester>,
}

pub struct SyncEngine {
    pub(crate) auth: Arc<dyn SessionProvider>,
    pub(crate) remote: Arc<dyn FamilyRemote>,
    pub(crate) documents: Arc<dyn DocumentStore>,
    pub(crate) files: Arc<dyn FileIngester>,
    pub(crate) reconciler: ReferenceReconciler,
    pub(crate) options: SyncOptions,
}

impl SyncEngine {
    pub fn new(collaborators: Collaborators, options: SyncOptions) -> Self {
        Self {
            auth: collaborators.auth,
            remote: collaborators.remote,
            documents: collaborators.documents,
            files: collaborators.files,
            reconciler: ReferenceReconciler::new(collaborators.references),
            options,
        }
    }

    /// Run one synchronization.
    ///
    /// Fails only when authentication or the family listing fails.
    pub async fn run(&self, credentials: &Credentials) -> Result<RunReport, FamsyncError> {
        info!(login = %credentials.login, "starting sync run");
        let session = self.auth.authenticate(credentials).await.inspect_err(|e| {
            error!(error = %e, "authentication failed, aborting run");
        })?;
        info!(state = "authenticated", "session established");

        let raw_families = self.remote.families(&session).await?;
        let mut report = RunReport::default();
        let families: Vec<Family> = raw_families
            .iter()
            .filter_map(|raw| match mapper::family(raw) {
                Mapped::Document(family) => Some(family),
                Mapped::Skip(reason) => {
                    warn!(reason, "ignoring family record");
                    report.skipped_families += 1;
                    None
                }
            })
            .collect();
        info!(
            state = "families_fetched",
            families = families.len(),
            "family list fetched"
        );

        if families.is_empty() {
            info!(state = "run_complete", "no families found, nothing to sync");
            return Ok(report);
        }

        report.families = stream::iter(&families)
            .map(|family| self.sync_family(&session, family))
            .buffered(self.options.family_concurrency.max(1))
            .collect()
            .await;

        info!(
            state = "run_complete",
            families = report.families.len(),
            persisted = report.total_persisted(),
            references_added = report.total_references_added(),
            failures = report.has_failures(),
            "sync run complete"
        );
        Ok(report)
    }

    /// Synchronize the three streams of one family concurrently.
    ///
    /// A failing stream is reported and does not stop the other two.
    pub async fn sync_family(&self, session: &Session, family: &Family) -> FamilyReport {
        info!(pad_id = %family.pad_id, pad_name = %family.pad_name, "synchronizing family");
        let imported_at = Utc::now();

        let (gazettes, contacts, photos) = tokio::join!(
            self.sync_gazettes(session, family, imported_at),
            self.sync_contacts(session, family, imported_at),
            self.sync_photos(session, family, imported_at),
        );

        let streams = [
            (StreamKind::Gazettes, gazettes),
            (StreamKind::Contacts, contacts),
            (StreamKind::Photos, photos),
        ]
        .into_iter()
        .map(|(kind, outcome)| {
            let report = match outcome {
                Ok(report) => report,
                Err(e) => {
                    error!(pad_id = %family.pad_id, stream = %kind, error = %e, "stream failed");
                    StreamReport::failed(kind, &e)
                }
            };
            match report.status {
                StreamStatus::Empty => {
                    info!(pad_id = %family.pad_id, stream = %kind, "nothing to synchronize")
                }
                StreamStatus::Failed => {}
                status => info!(
                    pad_id = %family.pad_id,
                    stream = %kind,
                    %status,
                    persisted = report.persisted,
                    skipped = report.skipped,
                    failed = report.failed,
                    references_added = report.references_added,
                    "stream done"
                ),
            }
            report
        })
        .collect();

        FamilyReport {
            pad_id: family.pad_id.clone(),
            pad_name: family.pad_name.clone(),
            streams,
        }
    }
}
