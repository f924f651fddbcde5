// SPDX-FileCopyrightText: 2026 Famsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for gallery pagination.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use famsync_core::{Cursor, Family, Page, Session};
use famsync_sync::Paginator;
use famsync_sync::mapper::parse_remote_time;
use famsync_sync::streams::GalleryPages;
use famsync_test_utils::ScriptedRemote;
use famsync_test_utils::fixtures::post;

fn martin() -> Family {
    Family {
        pad_id: "42".into(),
        pad_name: "Martin".into(),
        created_at: None,
    }
}

/// Posts newest first, with strictly decreasing times, cut into pages.
fn gallery(gaps: &[u32], page_size: usize) -> Vec<Page<famsync_core::records::RawPost>> {
    let mut at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let posts: Vec<_> = gaps
        .iter()
        .enumerate()
        .map(|(i, gap)| {
            at -= Duration::minutes(i64::from(*gap) + 1);
            post(&format!("p{i}"), &at.format("%Y-%m-%d %H:%M:%S").to_string())
        })
        .collect();
    let total = posts.len();
    posts
        .chunks(page_size)
        .map(|chunk| Page::with_total(chunk.to_vec(), total))
        .collect()
}

proptest! {
    #[test]
    fn cursors_follow_the_last_post_of_each_page(
        gaps in prop::collection::vec(0u32..600, 1..40),
        page_size in 1usize..7,
    ) {
        let pages = gallery(&gaps, page_size);
        let remote = Arc::new(ScriptedRemote::new().with_gallery("42", pages.clone()));
        let source = GalleryPages::new(remote.clone(), Session::new("PHPSESSID=p"), martin());

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (items, cursors) = runtime.block_on(async {
            let items = Paginator::new(source).collect_all().await.unwrap();
            (items, remote.gallery_cursors("42").await)
        });

        // Every post comes back once, and no request goes past the last page.
        prop_assert_eq!(items.len(), gaps.len());
        prop_assert_eq!(cursors.len(), pages.len());
        prop_assert_eq!(&cursors[0], &None);

        for (page, cursor) in pages.iter().zip(cursors.iter().skip(1)) {
            let last = page
                .items
                .last()
                .and_then(|p| p.created_at.as_deref())
                .and_then(parse_remote_time)
                .unwrap();
            let Some(Cursor::Timestamp(sent)) = cursor else {
                return Err(TestCaseError::fail(format!("expected a timestamp cursor, got {cursor:?}")));
            };
            prop_assert!(*sent >= last);
        }

        // Walking backward in time, each cursor is older than the previous one.
        let sent: Vec<_> = cursors.iter().flatten().collect();
        for pair in sent.windows(2) {
            prop_assert!(pair[0] != pair[1]);
        }
    }
}
