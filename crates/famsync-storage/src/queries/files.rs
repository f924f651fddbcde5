// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File registration.
//!
//! Files are recorded as `io.cozy.files` documents pointing at their source
//! URL. Content is not fetched.

use serde_json::{Map, Value, json};

use famsync_core::types::doctypes;
use famsync_core::{FamsyncError, FileRequest};

use crate::database::Database;
use crate::queries::documents;

fn file_body(file: &FileRequest) -> Value {
    let mut body = Map::new();
    body.insert("name".into(), json!(file.filename));
    body.insert("dir".into(), json!(file.sub_path));
    body.insert("source_url".into(), json!(file.url));
    body.insert("mime".into(), json!(file.content_type));
    body.insert("metadata".into(), file.metadata.clone());
    if let Some(modified) = file.modified_at {
        body.insert("updated_at".into(), json!(modified.to_rfc3339()));
    }
    Value::Object(body)
}

/// Match keys for a file: its id attributes plus `dir`, or `(name, dir)`.
fn match_keys(file: &FileRequest) -> Vec<&str> {
    let mut keys: Vec<&str> = file.id_attributes.iter().map(String::as_str).collect();
    if keys.is_empty() {
        keys.push("name");
    }
    keys.push("dir");
    keys
}

/// Register `file` and return the id of its document.
pub async fn register(db: &Database, file: &FileRequest) -> Result<String, FamsyncError> {
    let keys = match_keys(file);
    documents::upsert(db, doctypes::FILES, vec![file_body(file)], &keys)
        .await?
        .into_iter()
        .next()
        .map(|doc| doc.id)
        .ok_or_else(|| FamsyncError::Internal("file upsert returned no document".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str) -> FileRequest {
        FileRequest {
            url: format!("https://cdn.famileo.test/images/2023/04/{name}_large.jpg"),
            filename: format!("2023_04_05-Jane_Martin-{name}.jpg"),
            sub_path: "Martin/Photos".into(),
            content_type: Some("image/jpeg".into()),
            id_attributes: Vec::new(),
            metadata: json!({"famileo": {"postId": name}}),
            modified_at: None,
        }
    }

    #[tokio::test]
    async fn same_path_registers_once() {
        let db = Database::open(":memory:", false).await.unwrap();
        let first = register(&db, &photo("p1")).await.unwrap();
        let again = register(&db, &photo("p1")).await.unwrap();
        let other = register(&db, &photo("p2")).await.unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(documents::count(&db, doctypes::FILES).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn id_attributes_survive_a_rename() {
        let db = Database::open(":memory:", false).await.unwrap();
        let mut gazette = FileRequest {
            url: "https://cdn.famileo.test/gazettes/g1.pdf".into(),
            filename: "Gazette du 2023-04-01.pdf".into(),
            sub_path: "Martin/Gazettes".into(),
            content_type: Some("application/pdf".into()),
            id_attributes: vec!["metadata.famileo.gazetteId".into()],
            metadata: json!({"version": 1, "famileo": {"gazetteId": "g1"}}),
            modified_at: None,
        };
        let first = register(&db, &gazette).await.unwrap();
        gazette.filename = "Gazette du 2023-04-02.pdf".into();
        let second = register(&db, &gazette).await.unwrap();

        assert_eq!(first, second);
        let stored = documents::get(&db, &first).await.unwrap().unwrap();
        assert_eq!(stored.body["name"], "Gazette du 2023-04-02.pdf");
    }
}
