// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw records as the remote service returns them.
//!
//! Remote payloads freely omit fields, so every field is optional. The record
//! mapper decides which absences are fatal, which drop the record, and which
//! are filled with defaults.

use serde::{Deserialize, Deserializer};

/// A family ("pad") entry from the user's pad list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFamily {
    #[serde(default, deserialize_with = "lenient_id")]
    pub pad_id: Option<String>,
    #[serde(default)]
    pub pad_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A gazette (periodical PDF) entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawGazette {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub pdf: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A family member entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMember {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A post from a family's gallery. Posts without `image` carry no photo.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPost {
    #[serde(default, deserialize_with = "lenient_id")]
    pub post_id: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Accepts identifiers encoded either as JSON strings or numbers.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_both_deserialize() {
        let numeric: RawFamily =
            serde_json::from_str(r#"{"pad_id": 42, "pad_name": "Dupont"}"#).unwrap();
        let textual: RawFamily =
            serde_json::from_str(r#"{"pad_id": "42", "pad_name": "Dupont"}"#).unwrap();
        assert_eq!(numeric.pad_id.as_deref(), Some("42"));
        assert_eq!(numeric, textual);
    }

    #[test]
    fn missing_and_null_fields_become_none() {
        let post: RawPost =
            serde_json::from_str(r#"{"post_id": null, "firstname": "Anne", "extra": true}"#)
                .unwrap();
        assert_eq!(post.post_id, None);
        assert_eq!(post.image, None);
        assert_eq!(post.firstname.as_deref(), Some("Anne"));
    }

    #[test]
    fn blank_string_id_is_treated_as_absent() {
        let gazette: RawGazette = serde_json::from_str(r#"{"id": "  ", "pdf": "x.pdf"}"#).unwrap();
        assert_eq!(gazette.id, None);
    }
}
