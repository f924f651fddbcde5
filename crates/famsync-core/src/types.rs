// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared between the sync engine and its collaborators.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Namespace used for vendor-specific natural keys in document metadata.
pub const VENDOR: &str = "famileo";

/// Document types written to the store.
pub mod doctypes {
    pub const CONTACTS: &str = "io.cozy.contacts";
    pub const CONTACT_GROUPS: &str = "io.cozy.contacts.groups";
    pub const ALBUMS: &str = "io.cozy.photos.albums";
    pub const FILES: &str = "io.cozy.files";
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays for the sync engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Remote,
    Storage,
    Files,
}

/// Account credentials for the remote service.
///
/// The password never appears in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: Arc<SecretString>,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: Arc::new(SecretString::from(password.into())),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// An authenticated session with the remote service.
///
/// Established once at the start of a run and passed by reference into every
/// remote call. Cloning shares the same cookie; nothing mutates it afterwards.
#[derive(Clone)]
pub struct Session {
    cookie: Arc<SecretString>,
    established_at: DateTime<Utc>,
}

impl Session {
    /// Wraps a `Cookie` header value obtained from a successful login.
    pub fn new(cookie: impl Into<String>) -> Self {
        Self {
            cookie: Arc::new(SecretString::from(cookie.into())),
            established_at: Utc::now(),
        }
    }

    /// The value to send in the `Cookie` header.
    pub fn cookie_header(&self) -> &str {
        self.cookie.expose_secret()
    }

    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cookie", &"[REDACTED]")
            .field("established_at", &self.established_at)
            .finish()
    }
}

/// One managed family unit ("pad") on the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    pub pad_id: String,
    pub pad_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A position in a remote collection, sent on the next page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Number of items already retrieved.
    Offset(usize),
    /// Timestamp of the last item retrieved (the remote walks backward in time).
    Timestamp(DateTime<Utc>),
    /// Identifier of the last item retrieved.
    Id(String),
}

impl Cursor {
    /// Canonical wire representation of the cursor.
    ///
    /// Timestamps are rendered in UTC as `YYYY-MM-DD HH:MM:SS`, the format the
    /// remote uses for `created_at`.
    pub fn to_query_value(&self) -> String {
        match self {
            Cursor::Offset(n) => n.to_string(),
            Cursor::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cursor::Id(id) => id.clone(),
        }
    }

    /// Whether this cursor moves a walk forward from `previous`.
    ///
    /// Offsets must grow and timestamps must fall, both compared at the
    /// precision sent on the wire. Any other pair only has to differ.
    pub fn advances_from(&self, previous: &Cursor) -> bool {
        match (self, previous) {
            (Cursor::Offset(next), Cursor::Offset(prev)) => next > prev,
            (Cursor::Timestamp(next), Cursor::Timestamp(prev)) => {
                next.timestamp() < prev.timestamp()
            }
            _ => self.to_query_value() != previous.to_query_value(),
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Offset(n) => write!(f, "offset:{n}"),
            Cursor::Timestamp(ts) => write!(f, "timestamp:{}", ts.to_rfc3339()),
            Cursor::Id(id) => write!(f, "id:{id}"),
        }
    }
}

/// One page of raw items returned by a remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items the remote reports for the whole collection.
    pub total_hint: Option<usize>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total_hint: None,
        }
    }

    pub fn with_total(items: Vec<T>, total: usize) -> Self {
        Self {
            items,
            total_hint: Some(total),
        }
    }
}

/// A persisted document, as returned by the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub doctype: String,
    pub body: serde_json::Value,
}

impl Document {
    /// Looks up a dotted path (`name.familyName`) in the document body.
    pub fn get(&self, path: &str) -> Option<&serde_json::Value> {
        lookup_path(&self.body, path)
    }

    /// Short human-readable identity used in logs and errors.
    pub fn label(&self) -> String {
        match self.body.get("name").and_then(|v| v.as_str()) {
            Some(name) => format!("{} `{}` ({})", self.doctype, name, self.id),
            None => format!("{} {}", self.doctype, self.id),
        }
    }
}

/// Resolves a dotted path against a JSON value.
pub fn lookup_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}

/// One page of a container's reference relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencePage {
    pub member_ids: Vec<String>,
    /// Opaque token for the next page; `None` when the listing is exhausted.
    pub next: Option<String>,
}

/// A media or PDF file to hand to the file ingester.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRequest {
    pub url: String,
    pub filename: String,
    /// Destination folder, relative to the connector's root.
    pub sub_path: String,
    pub content_type: Option<String>,
    /// Dotted body paths identifying the same file across runs. Empty means
    /// the file is identified by its folder and name.
    pub id_attributes: Vec<String>,
    pub metadata: serde_json::Value,
    pub modified_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_cursor_renders_remote_format() {
        let ts = Utc.with_ymd_and_hms(2023, 4, 5, 12, 34, 56).unwrap();
        assert_eq!(
            Cursor::Timestamp(ts).to_query_value(),
            "2023-04-05 12:34:56"
        );
        assert_eq!(Cursor::Offset(40).to_query_value(), "40");
        assert_eq!(Cursor::Id("p-9".into()).to_query_value(), "p-9");
    }

    #[test]
    fn cursors_advance_in_their_own_direction() {
        let at = |s| Utc.with_ymd_and_hms(2023, 4, 5, 10, 0, s).unwrap();
        let ts = Cursor::Timestamp;

        assert!(ts(at(0)).advances_from(&ts(at(1))));
        assert!(!ts(at(1)).advances_from(&ts(at(0))));
        assert!(!ts(at(0)).advances_from(&ts(at(0))));
        // Same second on the wire, so no progress.
        let later = at(0) + chrono::Duration::milliseconds(500);
        assert!(!ts(at(0)).advances_from(&ts(later)));

        assert!(Cursor::Offset(4).advances_from(&Cursor::Offset(2)));
        assert!(!Cursor::Offset(2).advances_from(&Cursor::Offset(4)));
        assert!(Cursor::Id("b".into()).advances_from(&Cursor::Id("a".into())));
        assert!(!Cursor::Id("a".into()).advances_from(&Cursor::Id("a".into())));
    }

    #[test]
    fn session_and_credentials_redact_secrets() {
        let session = Session::new("PHPSESSID=abc123");
        let creds = Credentials::new("jane@example.com", "hunter2");

        assert_eq!(session.cookie_header(), "PHPSESSID=abc123");
        assert_eq!(creds.password(), "hunter2");
        assert!(!format!("{session:?}").contains("abc123"));
        assert!(!format!("{creds:?}").contains("hunter2"));
        assert!(format!("{creds:?}").contains("jane@example.com"));
    }

    #[test]
    fn document_get_follows_dotted_paths() {
        let doc = Document {
            id: "c1".into(),
            doctype: doctypes::CONTACTS.into(),
            body: serde_json::json!({"name": {"familyName": "Martin", "givenName": "Paul"}}),
        };
        assert_eq!(
            doc.get("name.familyName"),
            Some(&serde_json::json!("Martin"))
        );
        assert_eq!(doc.get("name.middleName"), None);
        assert_eq!(doc.get("birthday"), None);
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;
        for variant in [AdapterType::Remote, AdapterType::Storage, AdapterType::Files] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }
}
