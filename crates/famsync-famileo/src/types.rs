// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response envelopes of the Famileo JSON API.

use serde::{Deserialize, Deserializer};

use famsync_core::records::{RawFamily, RawGazette, RawMember, RawPost};

/// `GET /api/user/pad`
#[derive(Debug, Default, Deserialize)]
pub struct PadsResponse {
    #[serde(default)]
    pub pads: Vec<RawFamily>,
}

/// `GET /api/gazettes/{pad_id}`
#[derive(Debug, Default, Deserialize)]
pub struct GazettesResponse {
    #[serde(default)]
    pub gazettes: Vec<RawGazette>,
}

/// `GET /api/families/{pad_id}/members`
#[derive(Debug, Default, Deserialize)]
pub struct MembersResponse {
    #[serde(default)]
    pub family_members: Vec<RawMember>,
}

/// `GET /api/galleries/{pad_id}`
#[derive(Debug, Default, Deserialize)]
pub struct GalleryResponse {
    #[serde(default)]
    pub gallery: Vec<RawPost>,
    /// Number of images in the whole gallery.
    #[serde(default, deserialize_with = "lenient_count")]
    pub nb_all_image: Option<usize>,
}

/// Accepts counts sent as numbers or numeric strings.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
