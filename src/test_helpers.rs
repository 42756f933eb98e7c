//! Shared test utilities: document builders and manifest lookups.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let manifest = manifest_with(vec![
//!     post_on("newest", "2021-03-20T10:00:00+0000"),
//!     post_on("oldest", "2021-03-01T10:00:00+0000"),
//! ]);
//! let newest = find_post(&manifest, "newest");
//! ```

use crate::config::SiteConfig;
use crate::fetch::Manifest;
use crate::humanize::parse_timestamp;
use crate::richtext::{RichTextBlock, TextBlock};
use crate::types::{Banner, ContentSection, PostData, PostDocument};

// =========================================================================
// Document builders
// =========================================================================

/// A paragraph block without spans.
pub fn paragraph(text: &str) -> RichTextBlock {
    RichTextBlock::Paragraph(TextBlock {
        text: text.to_string(),
        spans: vec![],
    })
}

/// A published post with one short section and no publication date.
///
/// `id` is `id-{uid}`, the title is the uid upper-cased.
pub fn post(uid: &str) -> PostDocument {
    PostDocument {
        id: format!("id-{uid}"),
        uid: Some(uid.to_string()),
        first_publication_date: None,
        last_publication_date: None,
        data: PostData {
            title: uid.to_uppercase(),
            subtitle: Some(format!("About {uid}")),
            author: "Joseph Oliveira".to_string(),
            banner: Banner {
                url: Some(format!("https://images.example/{uid}.png")),
                alt: None,
            },
            content: vec![ContentSection {
                heading: Some("Introduction".to_string()),
                body: vec![paragraph("Lorem ipsum dolor sit amet")],
            }],
        },
    }
}

/// Like [`post`], first (and last) published at `timestamp`.
pub fn post_on(uid: &str, timestamp: &str) -> PostDocument {
    let date = parse_timestamp(timestamp)
        .unwrap_or_else(|| panic!("bad timestamp in test: {timestamp}"));
    PostDocument {
        first_publication_date: Some(date),
        last_publication_date: Some(date),
        ..post(uid)
    }
}

/// A body of `n` words.
pub fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

/// Manifest over `posts` (kept in the given order) with default config.
pub fn manifest_with(posts: Vec<PostDocument>) -> Manifest {
    Manifest {
        api_ref: "master-ref".to_string(),
        preview: false,
        posts,
        config: SiteConfig::default(),
    }
}

// =========================================================================
// Manifest lookups: panic with a clear message on miss
// =========================================================================

/// Find a post by uid. Panics if not found.
pub fn find_post<'a>(manifest: &'a Manifest, uid: &str) -> &'a PostDocument {
    manifest
        .posts
        .iter()
        .find(|p| p.uid.as_deref() == Some(uid))
        .unwrap_or_else(|| {
            let uids = post_uids(manifest);
            panic!("post '{uid}' not found. Available: {uids:?}")
        })
}

/// All post uids in manifest order.
pub fn post_uids(manifest: &Manifest) -> Vec<&str> {
    manifest.posts.iter().map(|p| p.uid()).collect()
}
