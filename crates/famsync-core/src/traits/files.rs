// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File ingestion for gazette PDFs and photos.

use async_trait::async_trait;

use crate::error::FamsyncError;
use crate::traits::adapter::PluginAdapter;
use crate::types::FileRequest;

/// Registers remote files in the local store.
#[async_trait]
pub trait FileIngester: PluginAdapter {
    /// Stores one file and returns the identifier of its file document.
    ///
    /// Called once per accepted media document; the engine does not retry.
    async fn store(&self, file: &FileRequest) -> Result<String, FamsyncError>;
}
