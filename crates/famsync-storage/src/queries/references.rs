// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Container membership edges.
//!
//! Listings are keyset-paginated on the edge rowid; the page token is the
//! last rowid returned.

use rusqlite::params;

use famsync_core::{Document, FamsyncError, ReferencePage};

use crate::database::{Database, storage_err};

/// One page of the member ids referenced by `container`.
pub async fn list_page(
    db: &Database,
    container: &Document,
    page_token: Option<&str>,
    page_size: usize,
) -> Result<ReferencePage, FamsyncError> {
    let after = match page_token {
        None => 0,
        Some(token) => token.parse::<i64>().map_err(|_| {
            FamsyncError::reconciliation(
                container.label(),
                format!("invalid reference page token `{token}`"),
            )
        })?,
    };
    let container_id = container.id.clone();
    let limit = i64::try_from(page_size.max(1)).unwrap_or(i64::MAX);

    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<(i64, String)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT rowid, member_id FROM doc_references
                 WHERE container_id = ?1 AND rowid > ?2
                 ORDER BY rowid LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![container_id, after, limit.saturating_add(1)], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            rows.collect()
        })
        .await
        .map_err(storage_err)?;

    let has_more = rows.len() > page_size.max(1);
    let page: Vec<_> = rows.into_iter().take(page_size.max(1)).collect();
    let next = if has_more {
        page.last().map(|(rowid, _)| rowid.to_string())
    } else {
        None
    };
    Ok(ReferencePage {
        member_ids: page.into_iter().map(|(_, id)| id).collect(),
        next,
    })
}

/// Add edges from `container` to each of `member_ids`. Existing edges are
/// left alone. Returns the number of edges actually created.
pub async fn add(
    db: &Database,
    container: &Document,
    member_doctype: &str,
    member_ids: &[String],
) -> Result<usize, FamsyncError> {
    if member_ids.is_empty() {
        return Ok(0);
    }
    let container_doctype = container.doctype.clone();
    let container_id = container.id.clone();
    let member_doctype = member_doctype.to_string();
    let member_ids = member_ids.to_vec();

    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let tx = conn.transaction()?;
            let mut created = 0;
            {
                let mut insert = tx.prepare(
                    "INSERT OR IGNORE INTO doc_references
                     (container_doctype, container_id, member_doctype, member_id)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for member_id in &member_ids {
                    created += insert.execute(params![
                        container_doctype,
                        container_id,
                        member_doctype,
                        member_id
                    ])?;
                }
            }
            tx.commit()?;
            Ok(created)
        })
        .await
        .map_err(storage_err)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::queries::documents;

    async fn album(db: &Database) -> Document {
        documents::upsert(db, "io.cozy.photos.albums", vec![json!({"name": "Martin"})], &["name"])
            .await
            .unwrap()
            .remove(0)
    }

    async fn all_members(db: &Database, container: &Document, page_size: usize) -> Vec<String> {
        let mut ids = Vec::new();
        let mut token = None;
        loop {
            let page = list_page(db, container, token.as_deref(), page_size)
                .await
                .unwrap();
            ids.extend(page.member_ids);
            match page.next {
                Some(next) => token = Some(next),
                None => return ids,
            }
        }
    }

    #[tokio::test]
    async fn listing_walks_pages_in_insertion_order() {
        let db = Database::open(":memory:", false).await.unwrap();
        let album = album(&db).await;
        let ids: Vec<String> = (1..=5).map(|i| format!("f{i}")).collect();
        assert_eq!(add(&db, &album, "io.cozy.files", &ids).await.unwrap(), 5);

        let first = list_page(&db, &album, None, 2).await.unwrap();
        assert_eq!(first.member_ids, vec!["f1", "f2"]);
        assert!(first.next.is_some());
        assert_eq!(all_members(&db, &album, 2).await, ids);
    }

    #[tokio::test]
    async fn exact_page_has_no_next_token() {
        let db = Database::open(":memory:", false).await.unwrap();
        let album = album(&db).await;
        add(&db, &album, "io.cozy.files", &["a".into(), "b".into()])
            .await
            .unwrap();
        let page = list_page(&db, &album, None, 2).await.unwrap();
        assert_eq!(page.member_ids.len(), 2);
        assert_eq!(page.next, None);
    }

    #[tokio::test]
    async fn duplicate_edges_are_ignored() {
        let db = Database::open(":memory:", false).await.unwrap();
        let album = album(&db).await;
        add(&db, &album, "io.cozy.files", &["a".into()]).await.unwrap();
        let created = add(&db, &album, "io.cozy.files", &["a".into(), "b".into(), "b".into()])
            .await
            .unwrap();
        assert_eq!(created, 1);
        assert_eq!(all_members(&db, &album, 10).await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn garbage_token_is_a_reconciliation_error() {
        let db = Database::open(":memory:", false).await.unwrap();
        let album = album(&db).await;
        let err = list_page(&db, &album, Some("not-a-rowid"), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, FamsyncError::Reconciliation { .. }));
    }
}
