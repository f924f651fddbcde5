// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run reports returned by the orchestrator.

use serde::Serialize;
use strum::Display;

use famsync_core::FamsyncError;

/// The independent content streams synchronized per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Gazettes,
    Contacts,
    Photos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum StreamStatus {
    /// The remote had nothing for this stream.
    Empty,
    Success,
    /// Some records or a reconciliation failed; the rest went through.
    PartialFailure,
    /// The stream stopped before persisting anything useful.
    Failed,
}

/// Outcome of one stream for one family.
#[derive(Debug, Clone, Serialize)]
pub struct StreamReport {
    pub stream: StreamKind,
    pub status: StreamStatus,
    /// Raw records received from the remote.
    pub fetched: usize,
    /// Records dropped by the mapper (no media, no name).
    pub skipped: usize,
    /// Records that failed to map or persist.
    pub failed: usize,
    pub persisted: usize,
    pub references_added: usize,
    pub error: Option<String>,
}

impl StreamReport {
    pub fn new(stream: StreamKind) -> Self {
        Self {
            stream,
            status: StreamStatus::Empty,
            fetched: 0,
            skipped: 0,
            failed: 0,
            persisted: 0,
            references_added: 0,
            error: None,
        }
    }

    /// A stream that ended on `err` before completing.
    pub fn failed(stream: StreamKind, err: &FamsyncError) -> Self {
        Self {
            status: StreamStatus::Failed,
            error: Some(err.to_string()),
            ..Self::new(stream)
        }
    }

    /// Record a non-fatal problem; the first message is kept.
    pub fn note_error(&mut self, err: &FamsyncError) {
        if self.error.is_none() {
            self.error = Some(err.to_string());
        }
    }

    /// Derive the status from the counters and any noted error.
    pub fn finish(mut self) -> Self {
        self.status = if self.fetched == 0 && self.error.is_none() {
            StreamStatus::Empty
        } else if self.failed == 0 && self.error.is_none() {
            StreamStatus::Success
        } else if self.persisted > 0 {
            StreamStatus::PartialFailure
        } else {
            StreamStatus::Failed
        };
        self
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            StreamStatus::Failed | StreamStatus::PartialFailure
        )
    }
}

/// Outcome of the three streams for one family.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyReport {
    pub pad_id: String,
    pub pad_name: String,
    pub streams: Vec<StreamReport>,
}

impl FamilyReport {
    pub fn stream(&self, kind: StreamKind) -> Option<&StreamReport> {
        self.streams.iter().find(|s| s.stream == kind)
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub families: Vec<FamilyReport>,
    /// Family records the remote returned but that could not be used.
    pub skipped_families: usize,
}

impl RunReport {
    pub fn family(&self, pad_id: &str) -> Option<&FamilyReport> {
        self.families.iter().find(|f| f.pad_id == pad_id)
    }

    pub fn has_failures(&self) -> bool {
        self.families
            .iter()
            .flat_map(|f| &f.streams)
            .any(StreamReport::is_failure)
    }

    pub fn total_persisted(&self) -> usize {
        self.families
            .iter()
            .flat_map(|f| &f.streams)
            .map(|s| s.persisted)
            .sum()
    }

    pub fn total_references_added(&self) -> usize {
        self.families
            .iter()
            .flat_map(|f| &f.streams)
            .map(|s| s.references_added)
            .sum()
    }
}
