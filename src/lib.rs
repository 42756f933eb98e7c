//! # spacetraveling
//!
//! A static blog generator for posts kept in a Prismic repository. The CMS is
//! the data source: every document of the post type becomes a page, listed
//! newest first on paginated listing pages with reading times, edit dates and
//! previous/next navigation.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! Content flows through two independent stages joined by a JSON manifest:
//!
//! ```text
//! 1. Fetch     Prismic API  →  manifest.json   (documents + resolved config)
//! 2. Generate  manifest     →  dist/           (final HTML site)
//! ```
//!
//! - **Debuggability**: the manifest is human-readable JSON you can inspect.
//! - **Offline rebuilds**: `generate` never touches the network, so template
//!   and style changes rebuild from the stored manifest.
//! - **Testability**: generation is a function from manifest to files, and
//!   fetching goes through the [`prismic::ContentSource`] trait, so tests run
//!   against in-memory documents.
//!
//! `refresh <uid>` re-fetches a single document, splices it into the stored
//! manifest and regenerates, the static counterpart of on-demand
//! revalidation.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`prismic`] | REST API client: master ref, search queries, pagination through results |
//! | [`fetch`] | Stage 1: pulls all posts, validates uids, orders newest first, writes the manifest |
//! | [`generate`] | Stage 2: renders listing, post and 404 pages with Maud |
//! | [`cache`] | Content-addressed render cache for post pages |
//! | [`config`] | `config.toml` loading, stock defaults, env overrides, color CSS |
//! | [`types`] | Post documents as stored in the manifest |
//! | [`richtext`] | Prismic rich text (blocks + spans) to HTML and plain text |
//! | [`pagination`] | Cumulative listing pages, URLs, previous/next neighbours |
//! | [`humanize`] | Localized dates, edit line, reading time |
//! | [`output`] | CLI output formatting for each stage |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Static "Load More"
//!
//! Listing page *k* holds the first *k × posts_per_page* posts, and its "load
//! more" link points to page *k + 1*. Without JavaScript that is a normal
//! link; with it, a small inline script swaps the post list in place. Either
//! way there is no client-side API access and no token in the page.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Malformed markup is a build error, interpolation is escaped
//! by default, and there is no template directory to ship.
//!
//! ## Rich Text Offsets
//!
//! Prismic span offsets count UTF-16 code units. [`richtext`] converts them to
//! byte offsets before slicing, so accented Portuguese text and emoji keep
//! their formatting in the right place.

pub mod cache;
pub mod config;
pub mod fetch;
pub mod generate;
pub mod humanize;
pub mod logging;
pub mod output;
pub mod pagination;
pub mod prismic;
pub mod richtext;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
