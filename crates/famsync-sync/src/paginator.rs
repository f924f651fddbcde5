// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cursor pagination over a remote collection.
//!
//! A [`PageSource`] knows how to fetch one page for a cursor and how to derive
//! the next cursor from the last item of a page. A [`Paginator`] drives it
//! until the collection is exhausted, yielding pages lazily through
//! [`Paginator::next_page`] or [`Paginator::into_stream`].
//!
//! Pagination stops when:
//! - a fetch returns no response at all,
//! - a page comes back empty,
//! - under [`Termination::CountBounded`], the items received reach the total
//!   the remote reported.
//!
//! It fails when a fetch fails, when the cursor cannot be derived from the
//! last item, when the derived cursor does not advance (see
//! [`Cursor::advances_from`]) or repeats an earlier one, or when the page cap
//! is reached. A page whose last item breaks the cursor is still yielded; the
//! error comes on the following call.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{Stream, TryStreamExt, stream};
use tracing::debug;

use famsync_core::{Cursor, FamsyncError, Page};

/// Default upper bound on pages fetched by one pagination.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// When a pagination is considered exhausted, besides an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stop once the accumulated item count reaches the remote's total hint.
    /// Falls back to [`Termination::EmptyPage`] while no hint was reported.
    CountBounded,
    /// Stop on the first empty page.
    EmptyPage,
}

/// A remote collection that can be fetched page by page.
#[async_trait]
pub trait PageSource: Send {
    type Item: Send;

    /// Endpoint label used in error context.
    fn endpoint(&self) -> String;

    fn termination(&self) -> Termination;

    /// Fetch the page after `cursor` (the first page when `None`).
    ///
    /// `Ok(None)` means the remote sent no response, which ends pagination.
    async fn fetch(
        &mut self,
        cursor: Option<&Cursor>,
    ) -> Result<Option<Page<Self::Item>>, FamsyncError>;

    /// Derive the cursor for the following request from the last item received
    /// and the number of items received so far.
    fn next_cursor(&self, last: &Self::Item, fetched: usize) -> Result<Cursor, FamsyncError>;
}

/// Drives a [`PageSource`] until exhaustion.
pub struct Paginator<S: PageSource> {
    source: S,
    cursor: Option<Cursor>,
    /// Wire values of every cursor sent so far.
    issued: HashSet<String>,
    fetched: usize,
    total: Option<usize>,
    pages: usize,
    max_pages: usize,
    done: bool,
    /// Raised after the page that caused it has been handed out.
    deferred: Option<FamsyncError>,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cursor: None,
            issued: HashSet::new(),
            fetched: 0,
            total: None,
            pages: 0,
            max_pages: DEFAULT_MAX_PAGES,
            done: false,
            deferred: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Fetch the next non-empty page, or `None` once the collection is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<S::Item>>, FamsyncError> {
        if let Some(e) = self.deferred.take() {
            self.done = true;
            return Err(e);
        }
        if self.done {
            return Ok(None);
        }
        if self.pages >= self.max_pages {
            self.done = true;
            return Err(FamsyncError::fetch(
                self.source.endpoint(),
                format!("pagination exceeded {} pages", self.max_pages),
            ));
        }

        let page = match self.source.fetch(self.cursor.as_ref()).await {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };
        self.pages += 1;

        let Some(page) = page else {
            debug!(endpoint = %self.source.endpoint(), "no response, pagination stopped");
            self.done = true;
            return Ok(None);
        };
        if page.items.is_empty() {
            debug!(
                endpoint = %self.source.endpoint(),
                fetched = self.fetched,
                "empty page, pagination complete"
            );
            self.done = true;
            return Ok(None);
        }

        // The first reported total bounds the whole pagination.
        if self.total.is_none() {
            self.total = page.total_hint;
        }
        self.fetched += page.items.len();

        let exhausted = match (self.source.termination(), self.total) {
            (Termination::CountBounded, Some(total)) => self.fetched >= total,
            _ => false,
        };

        if exhausted {
            debug!(
                endpoint = %self.source.endpoint(),
                fetched = self.fetched,
                pages = self.pages,
                "reported total reached, pagination complete"
            );
            self.done = true;
        } else if let Some(last) = page.items.last() {
            match self.source.next_cursor(last, self.fetched) {
                Ok(next) if !self.advances_to(&next) => {
                    self.deferred = Some(FamsyncError::fetch(
                        self.source.endpoint(),
                        format!("cursor did not advance past {next}"),
                    ));
                }
                Ok(next) => {
                    debug!(endpoint = %self.source.endpoint(), cursor = %next, "next page");
                    self.issued.insert(next.to_query_value());
                    self.cursor = Some(next);
                }
                Err(e) => self.deferred = Some(e),
            }
        }

        Ok(Some(page.items))
    }

    fn advances_to(&self, next: &Cursor) -> bool {
        let moved = self
            .cursor
            .as_ref()
            .is_none_or(|previous| next.advances_from(previous));
        moved && !self.issued.contains(&next.to_query_value())
    }

    /// Turn the paginator into a lazy stream of pages.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<S::Item>, FamsyncError>> + Send
    where
        S: 'static,
    {
        stream::try_unfold(self, |mut paginator| async move {
            Ok(paginator.next_page().await?.map(|page| (page, paginator)))
        })
    }

    /// Concatenate every page.
    pub async fn collect_all(self) -> Result<Vec<S::Item>, FamsyncError>
    where
        S: 'static,
    {
        self.into_stream()
            .try_fold(Vec::new(), |mut items, page| async move {
                items.extend(page);
                Ok(items)
            })
            .await
    }
}

/// Timestamp cursor from the last item's time, or a mapping error naming the field.
pub fn timestamp_cursor(
    field: &str,
    value: Option<DateTime<Utc>>,
    record: impl Into<String>,
) -> Result<Cursor, FamsyncError> {
    value
        .map(Cursor::Timestamp)
        .ok_or_else(|| FamsyncError::mapping(field, record))
}

/// Identity cursor from the last item's id, or a mapping error naming the field.
pub fn id_cursor(
    field: &str,
    value: Option<&str>,
    record: impl Into<String>,
) -> Result<Cursor, FamsyncError> {
    match value.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(Cursor::Id(id.to_string())),
        _ => Err(FamsyncError::mapping(field, record)),
    }
}
