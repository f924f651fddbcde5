// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The three per-family content streams.
//!
//! Each stream fetches, maps, persists and links its own records. An `Err`
//! return means the stream could not get started (its first fetch or its main
//! upsert failed); problems after that are counted in the [`StreamReport`].

use std::pin::pin;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use serde_json::Value;
use tracing::{debug, info, warn};

use famsync_core::records::RawPost;
use famsync_core::types::doctypes;
use famsync_core::{
    Cursor, Document, FamilyRemote, FamsyncError, Family, FileRequest, Page, Session,
};

use crate::mapper::{self, MapContext, Mapped};
use crate::orchestrator::SyncEngine;
use crate::paginator::{PageSource, Paginator, Termination, timestamp_cursor};
use crate::report::{StreamKind, StreamReport};

/// The photo gallery of one family, newest first, paged by post time.
///
/// The remote reports the total number of posts, so pagination is
/// count-bounded; each request carries the time of the oldest post received.
pub struct GalleryPages {
    remote: Arc<dyn FamilyRemote>,
    session: Session,
    family: Family,
}

impl GalleryPages {
    pub fn new(remote: Arc<dyn FamilyRemote>, session: Session, family: Family) -> Self {
        Self {
            remote,
            session,
            family,
        }
    }
}

#[async_trait]
impl PageSource for GalleryPages {
    type Item = RawPost;

    fn endpoint(&self) -> String {
        format!("/api/galleries/{}", self.family.pad_id)
    }

    fn termination(&self) -> Termination {
        Termination::CountBounded
    }

    async fn fetch(
        &mut self,
        cursor: Option<&Cursor>,
    ) -> Result<Option<Page<RawPost>>, FamsyncError> {
        self.remote
            .gallery_page(&self.session, &self.family, cursor)
            .await
    }

    fn next_cursor(&self, last: &RawPost, _fetched: usize) -> Result<Cursor, FamsyncError> {
        timestamp_cursor(
            "created_at",
            last.created_at.as_deref().and_then(mapper::parse_remote_time),
            mapper::post_label(last),
        )
    }
}

/// Map every record, counting skips and per-record failures into `report`.
fn map_all<R, T>(
    records: &[R],
    report: &mut StreamReport,
    pad_id: &str,
    map: impl Fn(&R) -> Result<Mapped<T>, FamsyncError>,
) -> Vec<T> {
    let mut mapped = Vec::with_capacity(records.len());
    for record in records {
        match map(record) {
            Ok(Mapped::Document(doc)) => mapped.push(doc),
            Ok(Mapped::Skip(reason)) => {
                debug!(pad_id, stream = %report.stream, reason, "record skipped");
                report.skipped += 1;
            }
            Err(e) => {
                warn!(pad_id, stream = %report.stream, error = %e, "record could not be mapped");
                report.failed += 1;
                report.note_error(&e);
            }
        }
    }
    mapped
}

impl SyncEngine {
    /// Hand files to the ingester, `file_concurrency` at a time, keeping input order.
    async fn ingest(&self, files: &[FileRequest], report: &mut StreamReport) -> Vec<String> {
        let outcomes: Vec<(&FileRequest, Result<String, FamsyncError>)> = stream::iter(files)
            .map(|file| async move { (file, self.files.store(file).await) })
            .buffered(self.options.file_concurrency.max(1))
            .collect()
            .await;

        let mut ids = Vec::with_capacity(outcomes.len());
        for (file, outcome) in outcomes {
            match outcome {
                Ok(id) => ids.push(id),
                Err(e) => {
                    warn!(
                        stream = %report.stream,
                        file = %file.filename,
                        error = %e,
                        "file could not be stored"
                    );
                    report.failed += 1;
                    report.note_error(&e);
                }
            }
        }
        report.persisted = ids.len();
        ids
    }

    /// Reconcile `members` into `container`, recording failures without failing the stream.
    async fn link(
        &self,
        container: &Document,
        member_doctype: &str,
        members: &[String],
        report: &mut StreamReport,
    ) {
        match self
            .reconciler
            .reconcile(container, member_doctype, members)
            .await
        {
            Ok(added) => report.references_added += added,
            Err(e) => {
                warn!(stream = %report.stream, error = %e, "reconciliation aborted");
                report.note_error(&e);
            }
        }
    }

    pub(crate) async fn sync_gazettes(
        &self,
        session: &Session,
        family: &Family,
        imported_at: DateTime<Utc>,
    ) -> Result<StreamReport, FamsyncError> {
        let mut report = StreamReport::new(StreamKind::Gazettes);
        let raw = self.remote.gazettes(session, family).await?;
        report.fetched = raw.len();
        if raw.is_empty() {
            debug!(pad_id = %family.pad_id, "no gazettes found");
            return Ok(report.finish());
        }

        let ctx = MapContext::new(family, imported_at);
        let files = map_all(&raw, &mut report, &family.pad_id, |g| mapper::gazette(g, &ctx));
        self.ingest(&files, &mut report).await;
        Ok(report.finish())
    }

    pub(crate) async fn sync_contacts(
        &self,
        session: &Session,
        family: &Family,
        imported_at: DateTime<Utc>,
    ) -> Result<StreamReport, FamsyncError> {
        let mut report = StreamReport::new(StreamKind::Contacts);
        let raw = self.remote.members(session, family).await?;
        report.fetched = raw.len();
        if raw.is_empty() {
            debug!(pad_id = %family.pad_id, "no contacts found");
            return Ok(report.finish());
        }

        let ctx = MapContext::new(family, imported_at);
        let bodies: Vec<Value> = map_all(&raw, &mut report, &family.pad_id, |m| {
            Ok(mapper::contact(m, &ctx))
        });
        if bodies.is_empty() {
            return Ok(report.finish());
        }

        let contacts = self
            .documents
            .upsert(doctypes::CONTACTS, bodies, mapper::CONTACT_MATCH_KEYS)
            .await?;
        report.persisted = contacts.len();
        let contact_ids: Vec<String> = contacts.into_iter().map(|doc| doc.id).collect();

        match self
            .documents
            .upsert(
                doctypes::CONTACT_GROUPS,
                mapper::contact_groups(&ctx),
                mapper::GROUP_MATCH_KEYS,
            )
            .await
        {
            Ok(groups) => {
                for group in &groups {
                    self.link(group, doctypes::CONTACTS, &contact_ids, &mut report)
                        .await;
                }
            }
            Err(e) => {
                warn!(pad_id = %family.pad_id, error = %e, "contact groups could not be saved");
                report.note_error(&e);
            }
        }
        Ok(report.finish())
    }

    pub(crate) async fn sync_photos(
        &self,
        session: &Session,
        family: &Family,
        imported_at: DateTime<Utc>,
    ) -> Result<StreamReport, FamsyncError> {
        let mut report = StreamReport::new(StreamKind::Photos);
        let source = GalleryPages::new(self.remote.clone(), session.clone(), family.clone());
        let mut pages =
            pin!(Paginator::new(source).with_max_pages(self.options.max_pages).into_stream());

        let mut posts = Vec::new();
        while let Some(page) = pages.next().await {
            match page {
                Ok(items) => posts.extend(items),
                Err(e) if posts.is_empty() => return Err(e),
                Err(e) => {
                    warn!(
                        pad_id = %family.pad_id,
                        received = posts.len(),
                        error = %e,
                        "gallery pagination stopped early"
                    );
                    report.note_error(&e);
                    break;
                }
            }
        }
        report.fetched = posts.len();
        if posts.is_empty() {
            debug!(pad_id = %family.pad_id, "no photos found");
            return Ok(report.finish());
        }
        info!(pad_id = %family.pad_id, posts = posts.len(), "gallery fetched");

        let ctx = MapContext::new(family, imported_at);
        let files = map_all(&posts, &mut report, &family.pad_id, |p| mapper::photo(p, &ctx));
        let file_ids = self.ingest(&files, &mut report).await;
        if file_ids.is_empty() {
            return Ok(report.finish());
        }

        match self
            .documents
            .upsert(
                doctypes::ALBUMS,
                vec![mapper::album(family)],
                mapper::ALBUM_MATCH_KEYS,
            )
            .await
        {
            Ok(albums) => {
                for album in &albums {
                    self.link(album, doctypes::FILES, &file_ids, &mut report).await;
                }
            }
            Err(e) => {
                warn!(pad_id = %family.pad_id, error = %e, "album could not be saved");
                report.note_error(&e);
            }
        }
        Ok(report.finish())
    }
}
