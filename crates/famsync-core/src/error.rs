// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for famsync.

use thiserror::Error;

/// The primary error type used across all famsync collaborators and the sync engine.
#[derive(Debug, Error)]
pub enum FamsyncError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Credentials were rejected by the remote service. Fatal to the whole run.
    #[error("authentication failed: {message}")]
    Auth {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A page or listing request failed (network, HTTP status, undecodable body).
    #[error("fetch failed for {endpoint}: {message}")]
    Fetch {
        endpoint: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A raw record lacks a field required to derive identity or a cursor.
    #[error("mapping failed on {record}: missing or invalid `{field}`")]
    Mapping { field: String, record: String },

    /// Listing or adding references for a container failed.
    #[error("reconciliation failed for {container}: {message}")]
    Reconciliation {
        container: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FamsyncError {
    /// Builds a [`FamsyncError::Fetch`] for `endpoint` without an underlying source.
    pub fn fetch(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            endpoint: endpoint.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Builds a [`FamsyncError::Mapping`] naming the missing field and the record it came from.
    pub fn mapping(field: impl Into<String>, record: impl Into<String>) -> Self {
        Self::Mapping {
            field: field.into(),
            record: record.into(),
        }
    }

    /// Builds a [`FamsyncError::Reconciliation`] for `container`.
    pub fn reconciliation(container: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Reconciliation {
            container: container.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Returns true when this error must end the whole run rather than a single stream.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::Config(_))
    }
}
