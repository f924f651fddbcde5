// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted remote for deterministic testing.
//!
//! `ScriptedRemote` implements `SessionProvider` and `FamilyRemote`. Gallery
//! pages are replayed in order per family, regardless of the cursor sent, and
//! every call is logged so tests can assert on what was requested.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use famsync_core::FamsyncError;
use famsync_core::records::{RawFamily, RawGazette, RawMember, RawPost};
use famsync_core::traits::{FamilyRemote, PluginAdapter, SessionProvider};
use famsync_core::types::{AdapterType, Credentials, Cursor, Family, HealthStatus, Page, Session};

/// A remote endpoint that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteEndpoint {
    Families,
    Gazettes,
    Members,
    Gallery,
}

/// One logged call against the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Authenticate { login: String },
    Families,
    Gazettes { pad_id: String },
    Members { pad_id: String },
    Gallery { pad_id: String, cursor: Option<Cursor> },
}

#[derive(Default)]
struct Script {
    reject_auth: bool,
    families: Vec<RawFamily>,
    gazettes: HashMap<String, Vec<RawGazette>>,
    members: HashMap<String, Vec<RawMember>>,
    gallery: HashMap<String, VecDeque<Option<Page<RawPost>>>>,
    failures: HashSet<(Option<String>, RemoteEndpoint)>,
    calls: Vec<RemoteCall>,
}

impl Script {
    fn check(&self, pad_id: Option<&str>, endpoint: RemoteEndpoint) -> Result<(), FamsyncError> {
        let scoped = (pad_id.map(str::to_string), endpoint);
        if self.failures.contains(&scoped) || self.failures.contains(&(None, endpoint)) {
            return Err(FamsyncError::fetch(
                format!("{endpoint:?} {}", pad_id.unwrap_or("*")),
                "HTTP 503 Service Unavailable",
            ));
        }
        Ok(())
    }
}

/// A remote that replays a prepared script.
pub struct ScriptedRemote {
    script: Mutex<Script>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script::default()),
        }
    }

    /// Reject every authentication attempt.
    pub fn rejecting_auth(mut self) -> Self {
        self.script.get_mut().reject_auth = true;
        self
    }

    pub fn with_family(mut self, family: RawFamily) -> Self {
        self.script.get_mut().families.push(family);
        self
    }

    pub fn with_gazettes(mut self, pad_id: &str, gazettes: Vec<RawGazette>) -> Self {
        self.script.get_mut().gazettes.insert(pad_id.to_string(), gazettes);
        self
    }

    pub fn with_members(mut self, pad_id: &str, members: Vec<RawMember>) -> Self {
        self.script.get_mut().members.insert(pad_id.to_string(), members);
        self
    }

    /// Queue gallery pages for a family. Once drained, the gallery answers empty pages.
    pub fn with_gallery(mut self, pad_id: &str, pages: Vec<Page<RawPost>>) -> Self {
        self.script
            .get_mut()
            .gallery
            .entry(pad_id.to_string())
            .or_default()
            .extend(pages.into_iter().map(Some));
        self
    }

    /// Queue a gallery call that gets no response body at all.
    pub fn with_gallery_no_response(mut self, pad_id: &str) -> Self {
        self.script
            .get_mut()
            .gallery
            .entry(pad_id.to_string())
            .or_default()
            .push_back(None);
        self
    }

    /// Make one endpoint fail for one family.
    pub fn failing(mut self, pad_id: &str, endpoint: RemoteEndpoint) -> Self {
        self.script
            .get_mut()
            .failures
            .insert((Some(pad_id.to_string()), endpoint));
        self
    }

    /// Make one endpoint fail for every family.
    pub fn failing_everywhere(mut self, endpoint: RemoteEndpoint) -> Self {
        self.script.get_mut().failures.insert((None, endpoint));
        self
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.script.lock().await.calls.clone()
    }

    /// Cursors sent on gallery requests for one family, in order.
    pub async fn gallery_cursors(&self, pad_id: &str) -> Vec<Option<Cursor>> {
        self.script
            .lock()
            .await
            .calls
            .iter()
            .filter_map(|call| match call {
                RemoteCall::Gallery { pad_id: p, cursor } if p == pad_id => Some(cursor.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Default for ScriptedRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for ScriptedRemote {
    fn name(&self) -> &str {
        "scripted-remote"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Remote
    }

    async fn health_check(&self) -> Result<HealthStatus, FamsyncError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FamsyncError> {
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for ScriptedRemote {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session, FamsyncError> {
        let mut script = self.script.lock().await;
        script.calls.push(RemoteCall::Authenticate {
            login: credentials.login.clone(),
        });
        if script.reject_auth {
            return Err(FamsyncError::Auth {
                message: format!("credentials rejected for {}", credentials.login),
                source: None,
            });
        }
        Ok(Session::new("PHPSESSID=scripted"))
    }
}

#[async_trait]
impl FamilyRemote for ScriptedRemote {
    async fn families(&self, _session: &Session) -> Result<Vec<RawFamily>, FamsyncError> {
        let mut script = self.script.lock().await;
        script.calls.push(RemoteCall::Families);
        script.check(None, RemoteEndpoint::Families)?;
        Ok(script.families.clone())
    }

    async fn gazettes(
        &self,
        _session: &Session,
        family: &Family,
    ) -> Result<Vec<RawGazette>, FamsyncError> {
        let mut script = self.script.lock().await;
        script.calls.push(RemoteCall::Gazettes {
            pad_id: family.pad_id.clone(),
        });
        script.check(Some(&family.pad_id), RemoteEndpoint::Gazettes)?;
        Ok(script.gazettes.get(&family.pad_id).cloned().unwrap_or_default())
    }

    async fn members(
        &self,
        _session: &Session,
        family: &Family,
    ) -> Result<Vec<RawMember>, FamsyncError> {
        let mut script = self.script.lock().await;
        script.calls.push(RemoteCall::Members {
            pad_id: family.pad_id.clone(),
        });
        script.check(Some(&family.pad_id), RemoteEndpoint::Members)?;
        Ok(script.members.get(&family.pad_id).cloned().unwrap_or_default())
    }

    async fn gallery_page(
        &self,
        _session: &Session,
        family: &Family,
        cursor: Option<&Cursor>,
    ) -> Result<Option<Page<RawPost>>, FamsyncError> {
        let mut script = self.script.lock().await;
        script.calls.push(RemoteCall::Gallery {
            pad_id: family.pad_id.clone(),
            cursor: cursor.cloned(),
        });
        script.check(Some(&family.pad_id), RemoteEndpoint::Gallery)?;
        let next = script
            .gallery
            .get_mut(&family.pad_id)
            .and_then(VecDeque::pop_front);
        Ok(next.unwrap_or_else(|| Some(Page::new(Vec::new()))))
    }
}
