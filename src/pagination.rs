//! Listing pagination, output paths and adjacent-post lookup.
//!
//! The listing uses "load more" semantics: each listing page shows everything
//! the previous page showed plus the next batch. Page `k` is therefore the
//! state of the home page after `k - 1` clicks on the load-more link, which
//! keeps the site fully static while the embedded script swaps pages in place.
//!
//! ```text
//! 5 posts, 2 per page
//! index.html          posts 0..2   next → /page/2/
//! page/2/index.html   posts 0..4   next → /page/3/
//! page/3/index.html   posts 0..5
//! ```

use std::ops::Range;

/// One listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// 1-based page number.
    pub number: usize,
    /// Indices into the newest-first post list shown on this page.
    pub posts: Range<usize>,
    /// Page number reached by the load-more link, if more posts remain.
    pub next: Option<usize>,
}

/// Split `total` posts into cumulative listing pages of `per_page` steps.
pub fn paginate(total: usize, per_page: usize) -> Vec<ListingPage> {
    let per_page = per_page.max(1);
    if total == 0 {
        return vec![ListingPage {
            number: 1,
            posts: 0..0,
            next: None,
        }];
    }
    let pages = total.div_ceil(per_page);
    (1..=pages)
        .map(|number| {
            let end = (number * per_page).min(total);
            ListingPage {
                number,
                posts: 0..end,
                next: (end < total).then_some(number + 1),
            }
        })
        .collect()
}

/// Output path of a listing page, relative to the site root.
pub fn listing_page_path(number: usize) -> String {
    if number <= 1 {
        "index.html".to_string()
    } else {
        format!("page/{number}/index.html")
    }
}

pub fn listing_page_href(number: usize) -> String {
    if number <= 1 {
        "/".to_string()
    } else {
        format!("/page/{number}/")
    }
}

pub fn post_path(uid: &str) -> String {
    format!("post/{uid}/index.html")
}

pub fn post_href(uid: &str) -> String {
    format!("/post/{uid}/")
}

/// Chronological neighbours of a post.
#[derive(Debug, PartialEq, Eq)]
pub struct Neighbors<'a, T> {
    /// The post published just before (older).
    pub previous: Option<&'a T>,
    /// The post published just after (newer).
    pub next: Option<&'a T>,
}

/// Look up the neighbours of `items[idx]` in a newest-first list.
pub fn neighbors<T>(items: &[T], idx: usize) -> Neighbors<'_, T> {
    Neighbors {
        previous: items.get(idx + 1),
        next: idx.checked_sub(1).and_then(|i| items.get(i)),
    }
}
