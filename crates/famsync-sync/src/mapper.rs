// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw remote records to canonical documents.
//!
//! Every function here is pure: the import time is passed in through
//! [`MapContext`]. Records lacking a mandatory field for a legitimate reason
//! (a post without a photo, a member without a name) map to
//! [`Mapped::Skip`]; records lacking a field needed for identity are a
//! [`FamsyncError::Mapping`].

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_json::{Map, Value, json};

use famsync_core::records::{RawFamily, RawGazette, RawMember, RawPost};
use famsync_core::types::VENDOR;
use famsync_core::{FamsyncError, Family, FileRequest};

/// Version stamped into every document's metadata block.
pub const DOC_VERSION: u32 = 1;

pub const CONTACT_MATCH_KEYS: &[&str] = &["name.familyName", "name.givenName"];
pub const GROUP_MATCH_KEYS: &[&str] = &["name"];
pub const ALBUM_MATCH_KEYS: &[&str] = &["name"];

/// Gazette files are recognized by the vendor's gazette id.
pub const GAZETTE_ID_ATTRIBUTE: &str = "metadata.famileo.gazetteId";

/// Media URLs look like `.../<yyyy>/<mm>/<media-id>_<variant>.<ext>`.
static MEDIA_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d{4}/\d{2}/([^/?#]+)_").expect("media id pattern is valid"));

/// Outcome of mapping one raw record.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapped<T> {
    Document(T),
    /// The record is a legitimate variant with nothing to import.
    Skip(&'static str),
}

impl<T> Mapped<T> {
    pub fn into_document(self) -> Option<T> {
        match self {
            Mapped::Document(doc) => Some(doc),
            Mapped::Skip(_) => None,
        }
    }
}

/// Per-run inputs shared by the mappers of one family.
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'a> {
    pub family: &'a Family,
    pub imported_at: DateTime<Utc>,
}

impl<'a> MapContext<'a> {
    pub fn new(family: &'a Family, imported_at: DateTime<Utc>) -> Self {
        Self {
            family,
            imported_at,
        }
    }

    fn metadata(&self, vendor: Value) -> Value {
        let mut metadata = Map::new();
        metadata.insert("version".into(), json!(DOC_VERSION));
        metadata.insert("importDate".into(), json!(self.imported_at.to_rfc3339()));
        if !vendor.is_null() {
            metadata.insert(VENDOR.into(), vendor);
        }
        Value::Object(metadata)
    }

    fn sub_path(&self, folder: &str) -> String {
        format!("{}/{folder}", self.family.pad_name)
    }
}

/// Parse a remote timestamp. Values without a zone designator are UTC.
pub fn parse_remote_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let normalized = raw.replacen(' ', "T", 1);
    if let Ok(ts) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(&format!("{normalized}Z")) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Extract the media id from the path segment following `/<yyyy>/<mm>/`.
pub fn extract_media_id(url: &str) -> Result<String, FamsyncError> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    MEDIA_ID
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FamsyncError::mapping("image", format!("media url {url}")))
}

/// `"Jane  Martin "` becomes `"Jane_Martin"`.
pub fn author_token(firstname: Option<&str>, lastname: Option<&str>) -> String {
    let full = format!(
        "{} {}",
        firstname.unwrap_or_default(),
        lastname.unwrap_or_default()
    );
    full.split_whitespace().collect::<Vec<_>>().join("_")
}

/// File extension of a URL's last path segment, dot included.
pub fn url_extension(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rfind('.') {
        Some(dot) if dot > 0 => &segment[dot..],
        _ => "",
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

pub fn family(raw: &RawFamily) -> Mapped<Family> {
    let Some(pad_id) = non_blank(raw.pad_id.as_ref()) else {
        return Mapped::Skip("family has no pad id");
    };
    let pad_name = non_blank(raw.pad_name.as_ref()).unwrap_or(pad_id);
    Mapped::Document(Family {
        pad_id: pad_id.to_string(),
        pad_name: pad_name.to_string(),
        created_at: raw.created_at.as_deref().and_then(parse_remote_time),
    })
}

fn gazette_label(raw: &RawGazette) -> String {
    match &raw.id {
        Some(id) => format!("gazette {id}"),
        None => format!("gazette of {}", raw.created_at.as_deref().unwrap_or("unknown date")),
    }
}

pub fn gazette(raw: &RawGazette, ctx: &MapContext<'_>) -> Result<Mapped<FileRequest>, FamsyncError> {
    let Some(url) = non_blank(raw.pdf.as_ref()) else {
        return Ok(Mapped::Skip("gazette has no pdf"));
    };
    let created = raw
        .created_at
        .as_deref()
        .and_then(parse_remote_time)
        .ok_or_else(|| FamsyncError::mapping("created_at", gazette_label(raw)))?;

    let (id_attributes, vendor) = match &raw.id {
        Some(id) => (
            vec![GAZETTE_ID_ATTRIBUTE.to_string()],
            json!({ "gazetteId": id }),
        ),
        None => (Vec::new(), Value::Null),
    };

    Ok(Mapped::Document(FileRequest {
        url: url.to_string(),
        filename: format!("Gazette du {}.pdf", created.format("%Y-%m-%d")),
        sub_path: ctx.sub_path("Gazettes"),
        content_type: Some("application/pdf".to_string()),
        id_attributes,
        metadata: ctx.metadata(vendor),
        modified_at: Some(created),
    }))
}

pub fn contact(raw: &RawMember, ctx: &MapContext<'_>) -> Mapped<Value> {
    let given = non_blank(raw.firstname.as_ref());
    let family_name = non_blank(raw.lastname.as_ref());
    if given.is_none() && family_name.is_none() {
        return Mapped::Skip("member has no name");
    }

    let mut body = Map::new();
    body.insert(
        "name".into(),
        json!({
            "familyName": family_name.unwrap_or_default(),
            "givenName": given.unwrap_or_default(),
        }),
    );
    if let Some(birthday) = non_blank(raw.birthday.as_ref())
        .and_then(|b| b.split(' ').next())
        .filter(|b| !b.is_empty())
    {
        body.insert("birthday".into(), json!(birthday));
    }
    if let Some(address) = non_blank(raw.email.as_ref()) {
        body.insert(
            "email".into(),
            json!([{ "address": address, "type": "home", "label": "Personnel" }]),
        );
    }
    let vendor = match &raw.id {
        Some(id) => json!({ "id": id }),
        None => Value::Null,
    };
    body.insert("metadata".into(), ctx.metadata(vendor));
    Mapped::Document(Value::Object(body))
}

/// The two groups every contact of a family belongs to.
pub fn contact_groups(ctx: &MapContext<'_>) -> Vec<Value> {
    ["Famille".to_string(), format!("Famille de {}", ctx.family.pad_name)]
        .into_iter()
        .map(|name| json!({ "name": name, "metadata": ctx.metadata(Value::Null) }))
        .collect()
}

pub fn album_name(family: &Family) -> String {
    format!("Famileo - Famille de {}", family.pad_name)
}

pub fn album(family: &Family) -> Value {
    let mut body = Map::new();
    body.insert("name".into(), json!(album_name(family)));
    if let Some(created) = family.created_at {
        body.insert("created_at".into(), json!(created.to_rfc3339()));
    }
    Value::Object(body)
}

pub fn post_label(raw: &RawPost) -> String {
    match (&raw.post_id, &raw.created_at) {
        (Some(id), _) => format!("post {id}"),
        (None, Some(created)) => format!("post of {created}"),
        (None, None) => "post".to_string(),
    }
}

pub fn photo(raw: &RawPost, ctx: &MapContext<'_>) -> Result<Mapped<FileRequest>, FamsyncError> {
    let Some(url) = non_blank(raw.image.as_ref()) else {
        return Ok(Mapped::Skip("post has no image"));
    };
    let media_id = match non_blank(raw.post_id.as_ref()) {
        Some(id) => id.to_string(),
        None => extract_media_id(url)?,
    };
    let created = raw
        .created_at
        .as_deref()
        .and_then(parse_remote_time)
        .ok_or_else(|| FamsyncError::mapping("created_at", post_label(raw)))?;

    let author = author_token(raw.firstname.as_deref(), raw.lastname.as_deref());
    let mut vendor = Map::new();
    vendor.insert("postId".into(), json!(media_id));
    if let Some(text) = non_blank(raw.text.as_ref()) {
        vendor.insert("text".into(), json!(text));
    }

    Ok(Mapped::Document(FileRequest {
        url: url.to_string(),
        filename: format!(
            "{}-{author}-{media_id}{}",
            created.format("%Y_%m_%d"),
            url_extension(url)
        ),
        sub_path: ctx.sub_path("Photos"),
        content_type: Some("image/jpeg".to_string()),
        id_attributes: Vec::new(),
        metadata: ctx.metadata(Value::Object(vendor)),
        modified_at: Some(created),
    }))
}
