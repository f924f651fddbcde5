// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Famileo JSON API.
//!
//! Every call takes the [`Session`] explicitly and sends its cookie; the
//! client itself holds no login state. Redirects are not followed, so an
//! expired session surfaces as a non-2xx status instead of an HTML login
//! page.

use std::time::Duration;

use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use famsync_config::model::RemoteConfig;
use famsync_core::records::{RawFamily, RawGazette, RawMember, RawPost};
use famsync_core::{Cursor, FamsyncError, Family, Page, Session};

use crate::types::{GalleryResponse, GazettesResponse, MembersResponse, PadsResponse};

#[derive(Debug, Clone)]
pub struct FamileoClient {
    pub(crate) http: reqwest::Client,
    base_url: String,
}

impl FamileoClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, FamsyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                FamsyncError::Config(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    /// GET `endpoint` and decode its JSON body.
    ///
    /// An empty or `null` body yields `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, FamsyncError> {
        let cookie = HeaderValue::from_str(session.cookie_header())
            .map_err(|e| FamsyncError::Fetch {
                endpoint: endpoint.to_string(),
                message: "session cookie is not a valid header value".into(),
                source: Some(Box::new(e)),
            })?;

        let response = self
            .http
            .get(self.url(endpoint))
            .header(COOKIE, cookie)
            .query(query)
            .send()
            .await
            .map_err(|e| FamsyncError::Fetch {
                endpoint: endpoint.to_string(),
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(endpoint, status = %status, "response received");
        if !status.is_success() {
            return Err(FamsyncError::fetch(endpoint, format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| FamsyncError::Fetch {
            endpoint: endpoint.to_string(),
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<T>>(&body).map_err(|e| FamsyncError::Fetch {
            endpoint: endpoint.to_string(),
            message: format!("failed to parse response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// The account's families.
    pub async fn pads(&self, session: &Session) -> Result<Vec<RawFamily>, FamsyncError> {
        let response: Option<PadsResponse> = self.get_json(session, "/api/user/pad", &[]).await?;
        Ok(response.map(|r| r.pads).unwrap_or_default())
    }

    pub async fn gazettes(
        &self,
        session: &Session,
        family: &Family,
    ) -> Result<Vec<RawGazette>, FamsyncError> {
        let endpoint = format!("/api/gazettes/{}", family.pad_id);
        let response: Option<GazettesResponse> = self.get_json(session, &endpoint, &[]).await?;
        Ok(response.map(|r| r.gazettes).unwrap_or_default())
    }

    pub async fn family_members(
        &self,
        session: &Session,
        family: &Family,
    ) -> Result<Vec<RawMember>, FamsyncError> {
        let endpoint = format!("/api/families/{}/members", family.pad_id);
        let response: Option<MembersResponse> = self.get_json(session, &endpoint, &[]).await?;
        Ok(response.map(|r| r.family_members).unwrap_or_default())
    }

    /// One page of a family's gallery, newest posts first.
    ///
    /// `cursor` is the time of the oldest post already seen; the first page
    /// is requested without one.
    pub async fn gallery(
        &self,
        session: &Session,
        family: &Family,
        cursor: Option<&Cursor>,
    ) -> Result<Option<Page<RawPost>>, FamsyncError> {
        let endpoint = format!("/api/galleries/{}", family.pad_id);
        let mut query = vec![("type", "all".to_string())];
        if let Some(cursor) = cursor {
            query.push(("timestamp", cursor.to_query_value()));
        }
        let response: Option<GalleryResponse> = self.get_json(session, &endpoint, &query).await?;
        Ok(response.map(|r| match r.nb_all_image {
            Some(total) => Page::with_total(r.gallery, total),
            None => Page::new(r.gallery),
        }))
    }
}
