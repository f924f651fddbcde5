// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idempotent document upserts.
//!
//! A document matches an existing one of the same doctype when every match
//! key resolves to an equal JSON value in both bodies (compared through
//! `json_extract`). Matches are updated with a shallow merge of top-level
//! fields and keep their id; everything else is inserted. One batch is one
//! transaction.

use rusqlite::{OptionalExtension, params, params_from_iter};
use serde_json::Value;

use famsync_core::types::lookup_path;
use famsync_core::{Document, FamsyncError};

use crate::database::{Database, storage_err};

/// A document ready to be written: its body, plus the JSON path and encoded
/// value of every match key.
struct Pending {
    body: Value,
    keys: Vec<(String, String)>,
}

fn json_path(key: &str) -> String {
    format!("$.{key}")
}

fn prepare(doctype: &str, body: Value, match_keys: &[&str]) -> Result<Pending, FamsyncError> {
    let keys = match_keys
        .iter()
        .map(|key| match lookup_path(&body, key) {
            None | Some(Value::Null) => {
                Err(FamsyncError::mapping(*key, format!("{doctype} document")))
            }
            Some(value) => Ok((json_path(key), value.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Pending { body, keys })
}

fn corrupt_body(e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
}

/// Insert or update `documents` of `doctype`, matching on `match_keys`.
///
/// Returns the persisted documents in input order. A document lacking any
/// match key rejects the whole batch before anything is written.
pub async fn upsert(
    db: &Database,
    doctype: &str,
    documents: Vec<Value>,
    match_keys: &[&str],
) -> Result<Vec<Document>, FamsyncError> {
    let pending = documents
        .into_iter()
        .map(|body| prepare(doctype, body, match_keys))
        .collect::<Result<Vec<_>, _>>()?;
    if pending.is_empty() {
        return Ok(Vec::new());
    }

    let doctype = doctype.to_string();
    let mut lookup = String::from("SELECT id, body FROM documents WHERE doctype = ?");
    for _ in match_keys {
        lookup.push_str(" AND json_extract(body, ?) = json_extract(?, '$')");
    }
    lookup.push_str(" ORDER BY created_at, rowid LIMIT 1");

    db.connection()
        .call(move |conn| -> Result<Vec<Document>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let mut persisted = Vec::with_capacity(pending.len());
            {
                let mut find = tx.prepare(&lookup)?;
                for Pending { body, keys } in pending {
                    let mut args = vec![doctype.clone()];
                    for (path, value) in keys {
                        args.push(path);
                        args.push(value);
                    }
                    let existing: Option<(String, String)> = find
                        .query_row(params_from_iter(args), |row| Ok((row.get(0)?, row.get(1)?)))
                        .optional()?;

                    let document = match existing {
                        Some((id, stored)) => {
                            let mut merged: Value =
                                serde_json::from_str(&stored).map_err(corrupt_body)?;
                            if let (Value::Object(target), Value::Object(fields)) =
                                (&mut merged, body)
                            {
                                target.extend(fields);
                            }
                            tx.execute(
                                "UPDATE documents SET body = ?1,
                                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                                 WHERE id = ?2",
                                params![merged.to_string(), id],
                            )?;
                            Document {
                                id,
                                doctype: doctype.clone(),
                                body: merged,
                            }
                        }
                        None => {
                            let id = uuid::Uuid::new_v4().simple().to_string();
                            tx.execute(
                                "INSERT INTO documents (id, doctype, body) VALUES (?1, ?2, ?3)",
                                params![id, doctype, body.to_string()],
                            )?;
                            Document {
                                id,
                                doctype: doctype.clone(),
                                body,
                            }
                        }
                    };
                    persisted.push(document);
                }
            }
            tx.commit()?;
            Ok(persisted)
        })
        .await
        .map_err(storage_err)
}

/// Fetch one document by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<Document>, FamsyncError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Document>, rusqlite::Error> {
            let row: Option<(String, String, String)> = conn
                .query_row(
                    "SELECT id, doctype, body FROM documents WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?;
            row.map(|(id, doctype, body)| {
                Ok(Document {
                    id,
                    doctype,
                    body: serde_json::from_str(&body).map_err(corrupt_body)?,
                })
            })
            .transpose()
        })
        .await
        .map_err(storage_err)
}

/// Number of documents of one doctype.
pub async fn count(db: &Database, doctype: &str) -> Result<usize, FamsyncError> {
    let doctype = doctype.to_string();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM documents WHERE doctype = ?1",
                params![doctype],
                |row| row.get(0),
            )?;
            Ok(usize::try_from(count).unwrap_or_default())
        })
        .await
        .map_err(storage_err)
}
