// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Famileo remote adapter for famsync.
//!
//! Implements [`SessionProvider`] (form login) and [`FamilyRemote`] (pads,
//! gazettes, members, and the timestamp-paginated gallery) over the Famileo
//! JSON API.

pub mod auth;
pub mod client;
pub mod types;

use async_trait::async_trait;
use tracing::{debug, info};

use famsync_config::model::RemoteConfig;
use famsync_core::records::{RawFamily, RawGazette, RawMember, RawPost};
use famsync_core::{
    AdapterType, Credentials, Cursor, FamilyRemote, FamsyncError, Family, HealthStatus, Page,
    PluginAdapter, Session, SessionProvider,
};

pub use crate::client::FamileoClient;

/// The Famileo service as seen by the sync engine.
pub struct FamileoRemote {
    client: FamileoClient,
}

impl FamileoRemote {
    pub fn new(config: &RemoteConfig) -> Result<Self, FamsyncError> {
        let client = FamileoClient::new(config)?;
        info!(base_url = client.base_url(), "Famileo remote initialized");
        Ok(Self { client })
    }

    pub fn client(&self) -> &FamileoClient {
        &self.client
    }
}

#[async_trait]
impl PluginAdapter for FamileoRemote {
    fn name(&self) -> &str {
        "famileo"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Remote
    }

    /// Checks that the login page answers. No credentials are sent.
    async fn health_check(&self) -> Result<HealthStatus, FamsyncError> {
        match self.client.http.get(self.client.url("/login")).send().await {
            Ok(response) if response.status().is_server_error() => Ok(HealthStatus::Degraded(
                format!("login page returned HTTP {}", response.status()),
            )),
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "{} unreachable: {e}",
                self.client.base_url()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), FamsyncError> {
        debug!("Famileo remote shutting down");
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for FamileoRemote {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session, FamsyncError> {
        self.client.login(credentials).await
    }
}

#[async_trait]
impl FamilyRemote for FamileoRemote {
    async fn families(&self, session: &Session) -> Result<Vec<RawFamily>, FamsyncError> {
        self.client.pads(session).await
    }

    async fn gazettes(
        &self,
        session: &Session,
        family: &Family,
    ) -> Result<Vec<RawGazette>, FamsyncError> {
        self.client.gazettes(session, family).await
    }

    async fn members(
        &self,
        session: &Session,
        family: &Family,
    ) -> Result<Vec<RawMember>, FamsyncError> {
        self.client.family_members(session, family).await
    }

    async fn gallery_page(
        &self,
        session: &Session,
        family: &Family,
        cursor: Option<&Cursor>,
    ) -> Result<Option<Page<RawPost>>, FamsyncError> {
        self.client.gallery(session, family, cursor).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn remote(base_url: String) -> FamileoRemote {
        FamileoRemote::new(&RemoteConfig {
            base_url,
            ..RemoteConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn health_check_reports_reachability() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let status = remote(server.uri()).health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_degrades_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let status = remote(server.uri()).health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Degraded(_)));
    }

    #[tokio::test]
    async fn unreachable_remote_is_unhealthy() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let status = remote(uri).health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Unhealthy(_)));
    }
}
