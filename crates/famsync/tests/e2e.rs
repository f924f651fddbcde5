// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end runs: the Famileo adapter against a wiremock server, the
//! SQLite store in a temp directory, and the real engine in between.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use famsync_config::model::{RemoteConfig, StorageConfig};
use famsync_core::Credentials;
use famsync_core::types::doctypes;
use famsync_famileo::FamileoRemote;
use famsync_storage::SqliteStore;
use famsync_sync::{Collaborators, StreamKind, StreamStatus, SyncEngine, SyncOptions};

async fn famileo() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "PHPSESSID=pre; path=/")
                .set_body_string(
                    r#"<form><input type="hidden" name="_csrf_token" value="t0k"></form>"#,
                ),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "/")
                .insert_header("set-cookie", "PHPSESSID=live; path=/"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/user/pad"))
        .and(header("cookie", "PHPSESSID=live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pads": [{"pad_id": 42, "pad_name": "Martin", "created_at": "2021-09-01 08:00:00"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/gazettes/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gazettes": [
                {"id": 9, "pdf": "https://cdn.famileo.test/gazettes/9.pdf", "created_at": "2023-03-01 06:00:00"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/families/42/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "family_members": [
                {"id": 1, "firstname": "Paul", "lastname": "Martin", "birthday": "1950-02-03 00:00:00", "email": "paul@example.com"},
                {"id": 2, "firstname": "Jane", "lastname": "Martin"},
                {"id": 3}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/galleries/42"))
        .and(query_param("type", "all"))
        .and(query_param_is_missing("timestamp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gallery": [
                {"post_id": "p3", "image": "https://cdn.famileo.test/images/2023/04/p3_large.jpg",
                 "firstname": "Jane", "lastname": "Martin", "created_at": "2023-04-05 10:00:00"},
                {"post_id": "p2", "firstname": "Jane", "lastname": "Martin",
                 "created_at": "2023-04-04 10:00:00", "text": "no picture today"}
            ],
            "nb_all_image": 3
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/galleries/42"))
        .and(query_param("timestamp", "2023-04-04 10:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "gallery": [
                {"post_id": "p1", "image": "https://cdn.famileo.test/images/2023/04/p1_large.jpg",
                 "firstname": "Paul", "lastname": "Martin", "created_at": "2023-04-03 10:00:00"}
            ],
            "nb_all_image": 3
        })))
        .mount(&server)
        .await;

    server
}

fn engine(remote: Arc<FamileoRemote>, store: Arc<SqliteStore>) -> SyncEngine {
    SyncEngine::new(
        Collaborators {
            auth: remote.clone(),
            remote,
            documents: store.clone(),
            references: store.clone(),
            files: store,
        },
        SyncOptions::default(),
    )
}

#[tokio::test]
async fn full_run_is_idempotent() {
    let server = famileo().await;
    let dir = tempfile::tempdir().unwrap();

    let remote = Arc::new(
        FamileoRemote::new(&RemoteConfig {
            base_url: server.uri(),
            ..RemoteConfig::default()
        })
        .unwrap(),
    );
    let store = Arc::new(
        SqliteStore::open(StorageConfig {
            database_path: dir.path().join("famsync.db").to_string_lossy().into_owned(),
            wal_mode: true,
            reference_page_size: 2,
        })
        .await
        .unwrap(),
    );
    let engine = engine(remote, store.clone());
    let credentials = Credentials::new("jane@example.com", "hunter2");

    let first = engine.run(&credentials).await.unwrap();
    assert!(!first.has_failures(), "{first:?}");
    let family = first.family("42").unwrap();

    let gazettes = family.stream(StreamKind::Gazettes).unwrap();
    assert_eq!(gazettes.status, StreamStatus::Success);
    assert_eq!(gazettes.persisted, 1);

    let contacts = family.stream(StreamKind::Contacts).unwrap();
    assert_eq!(contacts.fetched, 3);
    assert_eq!(contacts.skipped, 1);
    assert_eq!(contacts.persisted, 2);
    assert_eq!(contacts.references_added, 4);

    let photos = family.stream(StreamKind::Photos).unwrap();
    assert_eq!(photos.fetched, 3);
    assert_eq!(photos.skipped, 1);
    assert_eq!(photos.persisted, 2);
    assert_eq!(photos.references_added, 2);

    let second = engine.run(&credentials).await.unwrap();
    assert!(!second.has_failures(), "{second:?}");
    assert_eq!(second.total_references_added(), 0);

    assert_eq!(store.count(doctypes::CONTACTS).await.unwrap(), 2);
    assert_eq!(store.count(doctypes::CONTACT_GROUPS).await.unwrap(), 2);
    assert_eq!(store.count(doctypes::ALBUMS).await.unwrap(), 1);
    assert_eq!(store.count(doctypes::FILES).await.unwrap(), 3);
}

#[tokio::test]
async fn rejected_login_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "PHPSESSID=pre"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/login"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/pad"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let remote = Arc::new(
        FamileoRemote::new(&RemoteConfig {
            base_url: server.uri(),
            ..RemoteConfig::default()
        })
        .unwrap(),
    );
    let store = Arc::new(
        SqliteStore::open(StorageConfig {
            database_path: dir.path().join("famsync.db").to_string_lossy().into_owned(),
            wal_mode: true,
            reference_page_size: 100,
        })
        .await
        .unwrap(),
    );

    let err = engine(remote, store)
        .run(&Credentials::new("jane@example.com", "wrong"))
        .await
        .unwrap_err();
    assert!(err.is_fatal());
}
