//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every post leads with
//! its positional index and title; the uid, dates and output paths follow as
//! indented context lines. The output reads as a content inventory while
//! still letting users trace a page back to its document.
//!
//! # Output Format
//!
//! ## Fetch
//!
//! ```text
//! Posts (ref YDpOdRIAACMAqCZb)
//! 001 Como utilizar Hooks
//!     Uid: como-utilizar-hooks
//!     Published: 15 mar 2021
//!     Author: Joseph Oliveira
//!     Reading time: 4 min
//!
//! Fetched 1 post
//! ```
//!
//! ## Generate
//!
//! ```text
//! Listing
//! 001 → index.html (2 posts)
//! 002 → page/2/index.html (3 posts)
//!
//! Posts
//! 001 Como utilizar Hooks → post/como-utilizar-hooks/index.html (cached)
//! 002 Criando um app CRA do zero → post/criando-um-app-cra-do-zero/index.html (rendered)
//!
//! Generated 2 listing pages, 2 post pages
//! Cache: 1 cached, 1 rendered (2 total)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::fetch::{Manifest, RefreshOutcome};
use crate::generate::{GenerateResult, PageStatus};
use crate::humanize;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// `1 post`, `3 posts`.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

fn status_label(status: PageStatus) -> &'static str {
    match status {
        PageStatus::Cached => "cached",
        PageStatus::Copied => "copied",
        PageStatus::Rendered => "rendered",
    }
}

// ============================================================================
// Stage 1: Fetch output
// ============================================================================

/// Format fetch stage output: one entry per post, newest first.
pub fn format_fetch_output(manifest: &Manifest) -> Vec<String> {
    let config = &manifest.config;
    let locale = config.site.locale;
    let mut lines = Vec::new();

    if manifest.preview {
        lines.push(format!("Posts (preview ref {})", manifest.api_ref));
    } else {
        lines.push(format!("Posts (ref {})", manifest.api_ref));
    }

    for (i, post) in manifest.posts.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), post.data.title));
        lines.push(format!("    Uid: {}", post.uid()));
        match &post.first_publication_date {
            Some(dt) => lines.push(format!(
                "    Published: {}",
                humanize::format_date(dt, locale)
            )),
            None => lines.push("    Published: (unpublished)".to_string()),
        }
        if post.was_edited()
            && let Some(dt) = &post.last_publication_date
        {
            lines.push(format!("    Edited: {}", humanize::format_date(dt, locale)));
        }
        if !post.data.author.is_empty() {
            lines.push(format!("    Author: {}", post.data.author));
        }
        let minutes = humanize::reading_time(
            humanize::count_words(&post.data.content),
            config.reading.words_per_minute,
        );
        lines.push(format!("    Reading time: {} min", minutes));
    }

    lines.push(String::new());
    lines.push(format!("Fetched {}", plural(manifest.posts.len(), "post")));
    lines
}

/// Print fetch output to stdout.
pub fn print_fetch_output(manifest: &Manifest) {
    for line in format_fetch_output(manifest) {
        println!("{}", line);
    }
}

/// Format the result of `check`: what a build would produce.
pub fn format_check_output(manifest: &Manifest) -> Vec<String> {
    let pages = crate::pagination::paginate(
        manifest.posts.len(),
        manifest.config.listing.posts_per_page,
    );
    vec![
        format!("Content OK at ref {}", manifest.api_ref),
        format!(
            "    {}, {}",
            plural(manifest.posts.len(), "post"),
            plural(pages.len(), "listing page")
        ),
    ]
}

pub fn print_check_output(manifest: &Manifest) {
    for line in format_check_output(manifest) {
        println!("{}", line);
    }
}

/// Format the outcome of refreshing a single post.
pub fn format_refresh_output(uid: &str, outcome: RefreshOutcome) -> Vec<String> {
    let what = match outcome {
        RefreshOutcome::Inserted => "added",
        RefreshOutcome::Updated => "updated",
        RefreshOutcome::Removed => "removed",
    };
    vec![format!("Refreshed {}: {}", uid, what)]
}

pub fn print_refresh_output(uid: &str, outcome: RefreshOutcome) {
    for line in format_refresh_output(uid, outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output: listing pages, post pages and totals.
pub fn format_generate_output(result: &GenerateResult) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Listing".to_string());
    for page in &result.listing_pages {
        lines.push(format!(
            "{} \u{2192} {} ({})",
            format_index(page.number),
            page.path,
            plural(page.post_count, "post")
        ));
    }

    if !result.posts.is_empty() {
        lines.push(String::new());
        lines.push("Posts".to_string());
        for (i, post) in result.posts.iter().enumerate() {
            lines.push(format!(
                "{} {} \u{2192} {} ({})",
                format_index(i + 1),
                post.title,
                post.path,
                status_label(post.status)
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}",
        plural(result.listing_pages.len(), "listing page"),
        plural(result.posts.len(), "post page")
    ));
    if !result.posts.is_empty() {
        lines.push(format!("Cache: {}", result.cache_stats));
    }
    if result.assets_copied > 0 {
        lines.push(format!("Assets: {} copied", plural(result.assets_copied, "file")));
    }

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(result: &GenerateResult) {
    for line in format_generate_output(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;
    use crate::generate::{GeneratedListing, GeneratedPost};
    use crate::test_helpers::*;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(0, "post"), "0 posts");
        assert_eq!(plural(1, "post"), "1 post");
        assert_eq!(plural(2, "listing page"), "2 listing pages");
    }

    // =========================================================================
    // Fetch output tests
    // =========================================================================

    #[test]
    fn fetch_output_lists_posts() {
        let mut hooks = post_on("como-utilizar-hooks", "2021-03-15T19:25:28+0000");
        hooks.data.title = "Como utilizar Hooks".into();
        let manifest = manifest_with(vec![hooks, post("draft")]);

        let lines = format_fetch_output(&manifest);
        assert_eq!(lines[0], "Posts (ref master-ref)");
        assert_eq!(lines[1], "001 Como utilizar Hooks");
        assert_eq!(lines[2], "    Uid: como-utilizar-hooks");
        assert_eq!(lines[3], "    Published: 15 mar 2021");
        assert_eq!(lines[4], "    Author: Joseph Oliveira");
        assert_eq!(lines[5], "    Reading time: 1 min");
        assert_eq!(lines[6], "002 DRAFT");
        assert_eq!(lines[8], "    Published: (unpublished)");
        assert_eq!(lines.last().unwrap(), "Fetched 2 posts");
    }

    #[test]
    fn fetch_output_shows_edit_date() {
        let mut p = post_on("a", "2021-03-15T19:25:28+0000");
        p.last_publication_date = humanize::parse_timestamp("2021-03-19T15:49:00+0000");
        let lines = format_fetch_output(&manifest_with(vec![p]));
        assert!(lines.contains(&"    Edited: 19 mar 2021".to_string()));
    }

    #[test]
    fn fetch_output_marks_preview() {
        let mut manifest = manifest_with(vec![]);
        manifest.preview = true;
        let lines = format_fetch_output(&manifest);
        assert_eq!(lines[0], "Posts (preview ref master-ref)");
        assert_eq!(lines.last().unwrap(), "Fetched 0 posts");
    }

    #[test]
    fn check_output_counts_pages() {
        let manifest = manifest_with(vec![post("a"), post("b"), post("c")]);
        let lines = format_check_output(&manifest);
        assert_eq!(lines[0], "Content OK at ref master-ref");
        assert_eq!(lines[1], "    3 posts, 2 listing pages");
    }

    #[test]
    fn refresh_output() {
        assert_eq!(
            format_refresh_output("hooks", RefreshOutcome::Removed),
            vec!["Refreshed hooks: removed"]
        );
    }

    // =========================================================================
    // Generate output tests
    // =========================================================================

    fn sample_result() -> GenerateResult {
        GenerateResult {
            listing_pages: vec![
                GeneratedListing {
                    number: 1,
                    path: "index.html".into(),
                    post_count: 2,
                },
                GeneratedListing {
                    number: 2,
                    path: "page/2/index.html".into(),
                    post_count: 3,
                },
            ],
            posts: vec![
                GeneratedPost {
                    title: "Como utilizar Hooks".into(),
                    path: "post/como-utilizar-hooks/index.html".into(),
                    status: PageStatus::Cached,
                },
                GeneratedPost {
                    title: "Criando um app".into(),
                    path: "post/criando-um-app/index.html".into(),
                    status: PageStatus::Rendered,
                },
            ],
            assets_copied: 1,
            cache_stats: CacheStats {
                hits: 1,
                copies: 0,
                misses: 1,
            },
        }
    }

    #[test]
    fn generate_output_lists_pages() {
        let lines = format_generate_output(&sample_result());
        assert_eq!(lines[0], "Listing");
        assert_eq!(lines[1], "001 \u{2192} index.html (2 posts)");
        assert_eq!(lines[2], "002 \u{2192} page/2/index.html (3 posts)");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Posts");
        assert_eq!(
            lines[5],
            "001 Como utilizar Hooks \u{2192} post/como-utilizar-hooks/index.html (cached)"
        );
        assert_eq!(
            lines[6],
            "002 Criando um app \u{2192} post/criando-um-app/index.html (rendered)"
        );
    }

    #[test]
    fn generate_output_totals() {
        let lines = format_generate_output(&sample_result());
        let n = lines.len();
        assert_eq!(lines[n - 3], "Generated 2 listing pages, 2 post pages");
        assert_eq!(lines[n - 2], "Cache: 1 cached, 1 rendered (2 total)");
        assert_eq!(lines[n - 1], "Assets: 1 file copied");
    }

    #[test]
    fn generate_output_empty_site() {
        let result = GenerateResult {
            listing_pages: vec![GeneratedListing {
                number: 1,
                path: "index.html".into(),
                post_count: 0,
            }],
            posts: vec![],
            assets_copied: 0,
            cache_stats: CacheStats::default(),
        };
        let lines = format_generate_output(&result);
        assert_eq!(
            lines,
            vec![
                "Listing",
                "001 \u{2192} index.html (0 posts)",
                "",
                "Generated 1 listing page, 0 post pages",
            ]
        );
    }
}
