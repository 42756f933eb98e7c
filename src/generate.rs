//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the fetch manifest and writes the
//! final static site.
//!
//! ## Generated Pages
//!
//! - **Listing pages** (`/index.html`, `/page/{n}/index.html`): post cards
//!   with title, subtitle, date and author, plus a load-more link
//! - **Post pages** (`/post/{uid}/index.html`): banner, meta line with
//!   reading time, content sections, previous/next navigation, comments
//! - **Not found** (`/404.html`)
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── page/
//! │   └── 2/index.html
//! ├── post/
//! │   ├── como-utilizar-hooks/index.html
//! │   └── criando-um-app-cra-do-zero/index.html
//! ├── .render-cache.json
//! └── favicon.png                 # from the assets directory
//! ```
//!
//! ## CSS and JavaScript
//!
//! Embedded at compile time and inlined into every page:
//! - `static/style.css`: base styles (colors injected from config)
//! - `static/load-more.js`: swaps in the next listing page without a reload;
//!   the link works without it
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Post bodies come from [`richtext::as_html`].

use crate::cache::{self, CacheManifest, CacheStats};
use crate::config::{self, CommentsConfig, SiteConfig};
use crate::fetch::Manifest;
use crate::humanize::{self, Labels};
use crate::pagination::{self, ListingPage, Neighbors};
use crate::richtext;
use crate::types::PostDocument;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Asset copy error: {0}")]
    Walk(#[from] walkdir::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const LOAD_MORE_JS: &str = include_str!("../static/load-more.js");

const UTTERANCES_CLIENT: &str = "https://utteranc.es/client.js";

// Feather icons (MIT).
const ICON_CALENDAR: &str = r#"<svg class="icon" viewBox="0 0 24 24" width="20" height="20" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" aria-hidden="true"><rect x="3" y="4" width="18" height="18" rx="2" ry="2"></rect><line x1="16" y1="2" x2="16" y2="6"></line><line x1="8" y1="2" x2="8" y2="6"></line><line x1="3" y1="10" x2="21" y2="10"></line></svg>"#;
const ICON_USER: &str = r#"<svg class="icon" viewBox="0 0 24 24" width="20" height="20" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" aria-hidden="true"><path d="M20 21v-2a4 4 0 0 0-4-4H8a4 4 0 0 0-4 4v2"></path><circle cx="12" cy="7" r="4"></circle></svg>"#;
const ICON_CLOCK: &str = r#"<svg class="icon" viewBox="0 0 24 24" width="20" height="20" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round" aria-hidden="true"><circle cx="12" cy="12" r="10"></circle><polyline points="12 6 12 12 16 14"></polyline></svg>"#;

/// How a post page got into the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Unchanged since the last build; left in place.
    Cached,
    /// Unchanged content under a new uid; copied from the old path.
    Copied,
    Rendered,
}

#[derive(Debug, Clone)]
pub struct GeneratedListing {
    pub number: usize,
    pub path: String,
    pub post_count: usize,
}

#[derive(Debug, Clone)]
pub struct GeneratedPost {
    pub title: String,
    pub path: String,
    pub status: PageStatus,
}

/// Everything the generate stage wrote, for the CLI summary.
#[derive(Debug)]
pub struct GenerateResult {
    pub listing_pages: Vec<GeneratedListing>,
    pub posts: Vec<GeneratedPost>,
    pub assets_copied: usize,
    pub cache_stats: CacheStats,
}

/// Per-build rendering context shared by every page.
struct SiteContext<'a> {
    config: &'a SiteConfig,
    labels: &'static Labels,
    css: &'a str,
    preview: bool,
}

/// Display values derived once per post.
struct PostView<'a> {
    doc: &'a PostDocument,
    date: Option<String>,
    reading_minutes: u32,
}

impl<'a> PostView<'a> {
    fn new(doc: &'a PostDocument, config: &SiteConfig) -> Self {
        let locale = config.site.locale;
        Self {
            doc,
            date: doc
                .first_publication_date
                .as_ref()
                .map(|dt| humanize::format_date(dt, locale)),
            reading_minutes: humanize::reading_time(
                humanize::count_words(&doc.data.content),
                config.reading.words_per_minute,
            ),
        }
    }

    fn uid(&self) -> &str {
        self.doc.uid()
    }
}

/// Render the whole site for `manifest` into `output_dir`.
pub fn generate(
    manifest: &Manifest,
    output_dir: &Path,
    assets_dir: Option<&Path>,
    use_cache: bool,
) -> Result<GenerateResult, GenerateError> {
    let config = &manifest.config;
    let css = format!(
        "{}\n\n{}",
        config::generate_color_css(&config.colors),
        CSS_STATIC
    );
    let ctx = SiteContext {
        config,
        labels: config.site.locale.labels(),
        css: &css,
        preview: manifest.preview,
    };

    fs::create_dir_all(output_dir)?;

    let assets_copied = match assets_dir {
        Some(dir) if dir.is_dir() => copy_assets(dir, output_dir)?,
        _ => 0,
    };

    let views: Vec<PostView> = manifest
        .posts
        .iter()
        .map(|doc| PostView::new(doc, config))
        .collect();

    let listing_pages = write_listing_pages(&ctx, &views, output_dir)?;

    // The previous manifest still knows which pages exist, with or without
    // the cache.
    let previous = CacheManifest::load(output_dir);
    let previous_paths: Vec<String> = previous.entries.keys().cloned().collect();
    let mut render_cache = if use_cache {
        previous
    } else {
        CacheManifest::empty()
    };
    let (posts, cache_stats) = write_post_pages(
        &ctx,
        &views,
        output_dir,
        &mut render_cache,
        &previous_paths,
    )?;
    render_cache.save(output_dir)?;

    fs::write(
        output_dir.join("404.html"),
        render_not_found(&ctx).into_string(),
    )?;

    info!(
        listing_pages = listing_pages.len(),
        posts = posts.len(),
        cache = %cache_stats,
        "site generated at {}",
        output_dir.display()
    );

    Ok(GenerateResult {
        listing_pages,
        posts,
        assets_copied,
        cache_stats,
    })
}

fn write_listing_pages(
    ctx: &SiteContext,
    views: &[PostView],
    output_dir: &Path,
) -> Result<Vec<GeneratedListing>, GenerateError> {
    // Page count shrinks when posts are removed; start from a clean slate.
    let page_dir = output_dir.join("page");
    if page_dir.exists() {
        fs::remove_dir_all(&page_dir)?;
    }

    let pages = pagination::paginate(views.len(), ctx.config.listing.posts_per_page);
    let mut written = Vec::with_capacity(pages.len());
    for page in &pages {
        let path = pagination::listing_page_path(page.number);
        let target = output_dir.join(&path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let html = render_listing_page(ctx, page, &views[page.posts.clone()]);
        fs::write(&target, html.into_string())?;
        debug!(path, "wrote listing page");
        written.push(GeneratedListing {
            number: page.number,
            path,
            post_count: page.posts.len(),
        });
    }
    Ok(written)
}

/// Outcome of one post page job, applied to the cache afterwards.
struct PostJob {
    title: String,
    path: String,
    source_hash: String,
    params_hash: String,
    status: PageStatus,
    moved_from: Option<String>,
}

fn write_post_pages(
    ctx: &SiteContext,
    views: &[PostView],
    output_dir: &Path,
    render_cache: &mut CacheManifest,
    previous_paths: &[String],
) -> Result<(Vec<GeneratedPost>, CacheStats), GenerateError> {
    let config_json = serde_json::to_string(ctx.config)?;
    let preview_flag = if ctx.preview { "preview" } else { "live" };
    let lookup: &CacheManifest = render_cache;

    let jobs: Vec<PostJob> = views
        .par_iter()
        .enumerate()
        .map(|(idx, view)| -> Result<PostJob, GenerateError> {
            let neighbors = pagination::neighbors(views, idx);
            let (prev_uid, prev_title) = neighbor_key(neighbors.previous);
            let (next_uid, next_title) = neighbor_key(neighbors.next);
            let params_hash = cache::hash_render_params(&[
                env!("CARGO_PKG_VERSION"),
                &config_json,
                ctx.css,
                preview_flag,
                prev_uid,
                prev_title,
                next_uid,
                next_title,
            ]);
            let source_hash = cache::hash_document(view.doc);
            let path = pagination::post_path(view.uid());
            let target = output_dir.join(&path);

            let (status, moved_from) = match lookup.find_cached(&source_hash, &params_hash, output_dir)
            {
                Some(stored) if stored == path => (PageStatus::Cached, None),
                Some(stored) => {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::copy(output_dir.join(&stored), &target)?;
                    (PageStatus::Copied, Some(stored))
                }
                None => {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    let html = render_post_page(ctx, view, &neighbors);
                    fs::write(&target, html.into_string())?;
                    (PageStatus::Rendered, None)
                }
            };

            Ok(PostJob {
                title: view.doc.data.title.clone(),
                path,
                source_hash,
                params_hash,
                status,
                moved_from,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut stats = CacheStats::default();
    let mut generated = Vec::with_capacity(jobs.len());
    let mut moved = Vec::new();
    for job in jobs {
        match job.status {
            PageStatus::Cached => stats.hit(),
            PageStatus::Copied => stats.copy(),
            PageStatus::Rendered => stats.miss(),
        }
        if let Some(old) = job.moved_from {
            moved.push(old);
        }
        render_cache.insert(job.path.clone(), job.source_hash, job.params_hash);
        generated.push(GeneratedPost {
            title: job.title,
            path: job.path,
            status: job.status,
        });
    }

    let live: Vec<String> = generated.iter().map(|p| p.path.clone()).collect();
    let mut stale = render_cache.retain_paths(&live);
    stale.extend(
        moved
            .into_iter()
            .chain(previous_paths.iter().cloned())
            .filter(|p| !live.contains(p)),
    );
    stale.sort();
    stale.dedup();
    for path in stale {
        remove_page(output_dir, &path)?;
    }

    Ok((generated, stats))
}

fn neighbor_key<'a>(post: Option<&'a PostView<'a>>) -> (&'a str, &'a str) {
    match post {
        Some(view) => (view.uid(), view.doc.data.title.as_str()),
        None => ("", ""),
    }
}

/// Delete a page that no longer has a post, and its directory if now empty.
fn remove_page(output_dir: &Path, path: &str) -> std::io::Result<()> {
    let target = output_dir.join(path);
    if target.exists() {
        fs::remove_file(&target)?;
        debug!(path, "removed stale page");
    }
    if let Some(parent) = target.parent()
        && parent != output_dir
    {
        // Fails when not empty, which is fine.
        let _ = fs::remove_dir(parent);
    }
    Ok(())
}

/// Copy the assets directory into the output root, keeping its layout.
fn copy_assets(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(ctx: &SiteContext, title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(ctx.labels.html_lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(ctx.css)) }
            }
            body {
                @if ctx.preview {
                    aside.preview-banner { (ctx.labels.preview) }
                }
                (site_header(&ctx.config.site.title))
                (content)
            }
        }
    }
}

/// Renders the site header: the logo links home.
fn site_header(site_title: &str) -> Markup {
    html! {
        header.site-header {
            a.logo href="/" {
                (site_title)
                span.logo-dot { "." }
            }
        }
    }
}

/// Renders the date / author / reading time line.
fn post_info(date: Option<&str>, author: &str, reading: Option<String>) -> Markup {
    html! {
        div.post-info {
            @if let Some(date) = date {
                span.info-item {
                    (PreEscaped(ICON_CALENDAR))
                    time { (date) }
                }
            }
            @if !author.is_empty() {
                span.info-item {
                    (PreEscaped(ICON_USER))
                    span { (author) }
                }
            }
            @if let Some(reading) = reading {
                span.info-item {
                    (PreEscaped(ICON_CLOCK))
                    span { (reading) }
                }
            }
        }
    }
}

/// Renders the utterances comment widget, or nothing without a repository.
pub fn comments_widget(comments: &CommentsConfig) -> Option<Markup> {
    let repo = comments.repo.as_deref()?;
    Some(html! {
        section.comments id="inject-comments-for-utterances" {
            script src=(UTTERANCES_CLIENT) repo=(repo) issue-term=(comments.issue_term) label=[comments.label.as_deref()] theme=(comments.theme) crossorigin="anonymous" async {}
        }
    })
}

fn post_navigation(neighbors: &Neighbors<PostView>, labels: &Labels) -> Markup {
    html! {
        @if neighbors.previous.is_some() || neighbors.next.is_some() {
            nav.post-navigation {
                @if let Some(prev) = neighbors.previous {
                    a.nav-previous href=(pagination::post_href(prev.uid())) {
                        span.nav-title { (prev.doc.data.title) }
                        span.nav-label { (labels.previous_post) }
                    }
                }
                @if let Some(next) = neighbors.next {
                    a.nav-next href=(pagination::post_href(next.uid())) {
                        span.nav-title { (next.doc.data.title) }
                        span.nav-label { (labels.next_post) }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders one listing page.
fn render_listing_page(ctx: &SiteContext, page: &ListingPage, posts: &[PostView]) -> Markup {
    let content = html! {
        main.listing {
            div.post-list {
                @for view in posts {
                    article.post-card {
                        a href=(pagination::post_href(view.uid())) {
                            h2 { (view.doc.data.title) }
                        }
                        @if let Some(subtitle) = &view.doc.data.subtitle {
                            p.subtitle { (subtitle) }
                        }
                        (post_info(view.date.as_deref(), &view.doc.data.author, None))
                    }
                }
                @if posts.is_empty() {
                    p.empty { (ctx.labels.no_posts) }
                }
            }
            @if let Some(next) = page.next {
                a.load-more href=(pagination::listing_page_href(next)) data-load-more {
                    (ctx.labels.load_more)
                }
            }
        }
        @if page.next.is_some() {
            script { (PreEscaped(LOAD_MORE_JS)) }
        }
    };

    base_document(ctx, &ctx.config.site.title, content)
}

/// Renders a post page.
fn render_post_page(ctx: &SiteContext, view: &PostView, neighbors: &Neighbors<PostView>) -> Markup {
    let data = &view.doc.data;
    let locale = ctx.config.site.locale;
    let reading = format!("{} {}", view.reading_minutes, ctx.labels.minutes);
    let edited = view
        .doc
        .was_edited()
        .then(|| view.doc.last_publication_date.as_ref())
        .flatten()
        .map(|dt| humanize::format_edited(dt, locale));
    let page_title = format!("{} | {}", data.title, ctx.config.site.title);

    let content = html! {
        @if let Some(url) = &data.banner.url {
            div.banner {
                img src=(url) alt=(data.banner.alt.as_deref().unwrap_or(&data.title));
            }
        }
        main.post {
            article {
                h1 { (data.title) }
                (post_info(view.date.as_deref(), &data.author, Some(reading)))
                @if let Some(edited) = edited {
                    p.edited { (edited) }
                }
                @for section in &data.content {
                    section.post-section {
                        @if let Some(heading) = &section.heading {
                            h2 { (heading) }
                        }
                        div.post-body {
                            (richtext::as_html(&section.body))
                        }
                    }
                }
            }
            (post_navigation(neighbors, ctx.labels))
            @if let Some(widget) = comments_widget(&ctx.config.comments) {
                (widget)
            }
        }
    };

    base_document(ctx, &page_title, content)
}

/// Renders the 404 page.
fn render_not_found(ctx: &SiteContext) -> Markup {
    let content = html! {
        main.not-found {
            h1 { (ctx.labels.not_found) }
            a href="/" { (ctx.labels.back_home) }
        }
    };
    base_document(ctx, ctx.labels.not_found, content)
}

// ============================================================================
// Tests
// ============================================================================
