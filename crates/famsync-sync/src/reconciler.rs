// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reference reconciliation between a container and its members.
//!
//! The container's existing relation is always listed in full before anything
//! is added. Any failure while listing aborts without adding; a failed run is
//! retried on the next sync instead of risking duplicate edges.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use famsync_core::{Document, FamsyncError, ReferenceStore};

pub struct ReferenceReconciler {
    references: Arc<dyn ReferenceStore>,
}

impl ReferenceReconciler {
    pub fn new(references: Arc<dyn ReferenceStore>) -> Self {
        Self { references }
    }

    /// Every member id currently linked to `container`, across all listing pages.
    pub async fn existing_members(
        &self,
        container: &Document,
    ) -> Result<HashSet<String>, FamsyncError> {
        let mut members = HashSet::new();
        let mut seen_tokens = HashSet::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .references
                .list_references(container, token.as_deref())
                .await
                .map_err(|e| FamsyncError::Reconciliation {
                    container: container.label(),
                    message: format!("listing page {} failed", pages + 1),
                    source: Some(Box::new(e)),
                })?;
            pages += 1;
            members.extend(page.member_ids);

            match page.next {
                None => break,
                Some(next) => {
                    if !seen_tokens.insert(next.clone()) {
                        return Err(FamsyncError::reconciliation(
                            container.label(),
                            format!("listing repeated page token `{next}`"),
                        ));
                    }
                    token = Some(next);
                }
            }
        }

        debug!(
            container = %container.label(),
            pages,
            existing = members.len(),
            "listed existing references"
        );
        Ok(members)
    }

    /// Link every id of `desired` not already linked to `container`.
    ///
    /// Additions go out as one batch. Returns how many references were added.
    pub async fn reconcile(
        &self,
        container: &Document,
        member_doctype: &str,
        desired: &[String],
    ) -> Result<usize, FamsyncError> {
        let existing = self.existing_members(container).await?;

        let mut queued = HashSet::new();
        let additions: Vec<String> = desired
            .iter()
            .filter(|id| !existing.contains(*id) && queued.insert(id.as_str()))
            .cloned()
            .collect();

        if additions.is_empty() {
            debug!(container = %container.label(), "references already up to date");
            return Ok(0);
        }

        self.references
            .add_references(container, member_doctype, &additions)
            .await
            .map_err(|e| FamsyncError::Reconciliation {
                container: container.label(),
                message: format!("adding {} references failed", additions.len()),
                source: Some(Box::new(e)),
            })?;

        info!(
            container = %container.label(),
            added = additions.len(),
            "references added"
        );
        Ok(additions.len())
    }
}
