// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Page fetchers for the remote family service.

use async_trait::async_trait;

use crate::error::FamsyncError;
use crate::records::{RawFamily, RawGazette, RawMember, RawPost};
use crate::traits::adapter::PluginAdapter;
use crate::types::{Cursor, Family, Page, Session};

/// Read access to the remote family service.
///
/// Every call takes the session explicitly; implementations hold no login state.
#[async_trait]
pub trait FamilyRemote: PluginAdapter {
    /// Lists the families the account belongs to.
    async fn families(&self, session: &Session) -> Result<Vec<RawFamily>, FamsyncError>;

    /// Lists a family's gazettes.
    async fn gazettes(
        &self,
        session: &Session,
        family: &Family,
    ) -> Result<Vec<RawGazette>, FamsyncError>;

    /// Lists a family's members.
    async fn members(
        &self,
        session: &Session,
        family: &Family,
    ) -> Result<Vec<RawMember>, FamsyncError>;

    /// Fetches one page of a family's gallery, continuing from `cursor`.
    ///
    /// `Ok(None)` means the remote returned no usable response at all.
    async fn gallery_page(
        &self,
        session: &Session,
        family: &Family,
        cursor: Option<&Cursor>,
    ) -> Result<Option<Page<RawPost>>, FamsyncError>;
}
