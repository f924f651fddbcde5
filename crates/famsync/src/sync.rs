// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `famsync sync` command implementation.

use std::sync::Arc;

use tracing::{info, warn};

use famsync_config::FamsyncConfig;
use famsync_config::model::SyncConfig;
use famsync_core::{Credentials, FamsyncError, PluginAdapter};
use famsync_famileo::FamileoRemote;
use famsync_storage::SqliteStore;
use famsync_sync::{Collaborators, RunReport, StreamStatus, SyncEngine, SyncOptions};

fn sync_options(config: &SyncConfig) -> SyncOptions {
    SyncOptions {
        family_concurrency: config.family_concurrency,
        file_concurrency: config.file_concurrency,
        max_pages: config.max_pages,
    }
}

/// Wire the Famileo remote and the SQLite store into an engine and run it once.
pub async fn run_sync(
    config: &FamsyncConfig,
    credentials: &Credentials,
    json: bool,
) -> Result<RunReport, FamsyncError> {
    let remote = Arc::new(FamileoRemote::new(&config.remote)?);
    let store = Arc::new(SqliteStore::open(config.storage.clone()).await?);

    let engine = SyncEngine::new(
        Collaborators {
            auth: remote.clone(),
            remote,
            documents: store.clone(),
            references: store.clone(),
            files: store.clone(),
        },
        sync_options(&config.sync),
    );

    let outcome = engine.run(credentials).await;
    if let Err(e) = store.shutdown().await {
        warn!(error = %e, "storage shutdown failed");
    }
    let report = outcome?;

    log_summary(&report);
    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| FamsyncError::Internal(format!("failed to render report: {e}")))?;
        println!("{rendered}");
    }
    Ok(report)
}

fn log_summary(report: &RunReport) {
    for family in &report.families {
        for stream in &family.streams {
            match stream.status {
                StreamStatus::Failed | StreamStatus::PartialFailure => warn!(
                    pad_id = %family.pad_id,
                    stream = %stream.stream,
                    status = %stream.status,
                    persisted = stream.persisted,
                    failed = stream.failed,
                    error = stream.error.as_deref().unwrap_or_default(),
                    "stream incomplete"
                ),
                _ => {}
            }
        }
    }
    info!(
        families = report.families.len(),
        skipped_families = report.skipped_families,
        persisted = report.total_persisted(),
        references_added = report.total_references_added(),
        failures = report.has_failures(),
        "sync summary"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_sync_section() {
        let config = SyncConfig {
            family_concurrency: 3,
            file_concurrency: 4,
            max_pages: 50,
        };
        let options = sync_options(&config);
        assert_eq!(options.family_concurrency, 3);
        assert_eq!(options.file_concurrency, 4);
        assert_eq!(options.max_pages, 50);
    }
}
