// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw record builders.

use famsync_core::Page;
use famsync_core::records::{RawFamily, RawGazette, RawMember, RawPost};

pub fn family(pad_id: &str, pad_name: &str) -> RawFamily {
    RawFamily {
        pad_id: Some(pad_id.to_string()),
        pad_name: Some(pad_name.to_string()),
        created_at: Some("2021-09-01 08:00:00".to_string()),
    }
}

pub fn gazette(id: &str, created_at: &str) -> RawGazette {
    RawGazette {
        id: Some(id.to_string()),
        pdf: Some(format!("https://cdn.famileo.test/gazettes/{id}.pdf")),
        created_at: Some(created_at.to_string()),
    }
}

pub fn member(firstname: &str, lastname: &str) -> RawMember {
    RawMember {
        id: Some(format!("{firstname}-{lastname}").to_lowercase()),
        firstname: Some(firstname.to_string()),
        lastname: Some(lastname.to_string()),
        birthday: Some("1950-02-03 00:00:00".to_string()),
        email: Some(format!("{}@example.com", firstname.to_lowercase())),
    }
}

/// A photo post with an explicit id and an image URL.
pub fn post(post_id: &str, created_at: &str) -> RawPost {
    RawPost {
        post_id: Some(post_id.to_string()),
        image: Some(format!(
            "https://cdn.famileo.test/images/2023/04/{post_id}_large.jpg"
        )),
        firstname: Some("Jane".to_string()),
        lastname: Some("Martin".to_string()),
        created_at: Some(created_at.to_string()),
        text: Some("hello".to_string()),
    }
}

/// A text-only post: no image attached.
pub fn text_post(post_id: &str, created_at: &str) -> RawPost {
    RawPost {
        image: None,
        ..post(post_id, created_at)
    }
}

/// Three full pages of two posts, newest first, with one text-only post.
///
/// The remote reports six posts in total, so pagination is count-bounded.
pub fn gallery_of_six() -> Vec<Page<RawPost>> {
    vec![
        Page::with_total(
            vec![
                post("p6", "2023-04-06 10:00:00"),
                post("p5", "2023-04-05 10:00:00"),
            ],
            6,
        ),
        Page::with_total(
            vec![
                text_post("p4", "2023-04-04 10:00:00"),
                post("p3", "2023-04-03 10:00:00"),
            ],
            6,
        ),
        Page::with_total(
            vec![
                post("p2", "2023-04-02 10:00:00"),
                post("p1", "2023-04-01 10:00:00"),
            ],
            6,
        ),
    ]
}
