// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session authentication against the remote service.

use async_trait::async_trait;

use crate::error::FamsyncError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Credentials, Session};

/// Establishes an authenticated [`Session`] from account credentials.
#[async_trait]
pub trait SessionProvider: PluginAdapter {
    /// Logs in and returns the session to thread through every remote call.
    ///
    /// Rejected credentials yield [`FamsyncError::Auth`].
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session, FamsyncError>;
}
