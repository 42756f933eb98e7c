//! Content fetching and manifest generation.
//!
//! Stage 1 of the build pipeline. Pulls every post document from the content
//! API and writes a manifest that the generate stage consumes.
//!
//! ## Output
//!
//! Produces a [`Manifest`] containing:
//! - the ref the content was read at, and whether it was a preview ref
//! - all routable posts, newest first
//! - the site configuration in effect (minus the access token)
//!
//! ## Validation
//!
//! - Documents without a uid cannot be given a URL and are skipped.
//! - Two documents with the same uid would overwrite each other's page, so
//!   that is an error.
//! - Posts with no publication date (never published at this ref) sort last.

use crate::config::SiteConfig;
use crate::prismic::{self, ClientError, ContentSource};
use crate::types::PostDocument;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Content API error: {0}")]
    Client(#[from] ClientError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate uid {0:?}: two posts would share one URL")]
    DuplicateUid(String),
    #[error("No post with uid {0:?} at this ref or in the manifest")]
    PostNotFound(String),
}

/// Manifest output from the fetch stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Ref the documents were read at.
    pub api_ref: String,
    /// True when fetched at a configured preview ref.
    #[serde(default)]
    pub preview: bool,
    pub posts: Vec<PostDocument>,
    pub config: SiteConfig,
}

/// What `refresh_post` did to the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Inserted,
    Updated,
    /// The post is gone from the API and was dropped from the manifest.
    Removed,
}

/// Fetch all posts into a fresh manifest.
pub fn fetch<S: ContentSource + ?Sized>(
    source: &S,
    config: &SiteConfig,
) -> Result<Manifest, FetchError> {
    let api_ref = source.resolve_ref()?;
    info!(api_ref = %api_ref, doc_type = %config.api.document_type, "fetching documents");

    let documents = prismic::fetch_all(
        source,
        &api_ref,
        &config.api.document_type,
        config.api.page_size,
    )?;

    let mut posts = Vec::with_capacity(documents.len());
    let mut seen = HashSet::new();
    for doc in documents {
        let Some(uid) = doc.uid.clone() else {
            warn!(id = %doc.id, title = %doc.data.title, "skipping document without uid");
            continue;
        };
        if !seen.insert(uid.clone()) {
            return Err(FetchError::DuplicateUid(uid));
        }
        posts.push(doc);
    }
    sort_newest_first(&mut posts);

    Ok(Manifest {
        api_ref,
        preview: config.api.preview_ref.is_some(),
        posts,
        config: config.clone(),
    })
}

/// Re-fetch one post and splice it into an existing manifest.
///
/// A post that no longer exists at the current ref is removed; a uid unknown
/// to both the API and the manifest is an error.
pub fn refresh_post<S: ContentSource + ?Sized>(
    source: &S,
    manifest: &mut Manifest,
    uid: &str,
) -> Result<RefreshOutcome, FetchError> {
    let api_ref = source.resolve_ref()?;
    let doc_type = manifest.config.api.document_type.clone();
    let fetched = prismic::get_by_uid(source, &api_ref, &doc_type, uid)?;
    manifest.api_ref = api_ref;
    manifest.preview = manifest.config.api.preview_ref.is_some();

    match fetched {
        Some(post) => {
            if splice_post(manifest, post) {
                Ok(RefreshOutcome::Updated)
            } else {
                Ok(RefreshOutcome::Inserted)
            }
        }
        None => {
            let before = manifest.posts.len();
            manifest.posts.retain(|p| p.uid.as_deref() != Some(uid));
            if manifest.posts.len() == before {
                Err(FetchError::PostNotFound(uid.to_string()))
            } else {
                Ok(RefreshOutcome::Removed)
            }
        }
    }
}

/// Replace the post with the same uid, or insert it. Keeps newest-first order.
///
/// Returns `true` when an existing post was replaced.
pub fn splice_post(manifest: &mut Manifest, post: PostDocument) -> bool {
    let existing = manifest
        .posts
        .iter()
        .position(|p| p.uid.is_some() && p.uid == post.uid);
    let replaced = match existing {
        Some(idx) => {
            manifest.posts[idx] = post;
            true
        }
        None => {
            manifest.posts.push(post);
            false
        }
    };
    sort_newest_first(&mut manifest.posts);
    replaced
}

/// Stable sort by first publication date, newest first, undated last.
pub fn sort_newest_first(posts: &mut [PostDocument]) {
    posts.sort_by(|a, b| {
        match (a.first_publication_date, b.first_publication_date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

pub fn load_manifest(path: &Path) -> Result<Manifest, FetchError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_manifest(path: &Path, manifest: &Manifest) -> Result<(), FetchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prismic::tests::MemorySource;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn fetch_orders_newest_first() {
        let source = MemorySource::new(vec![
            post_on("middle", "2021-03-10T10:00:00+0000"),
            post_on("oldest", "2021-03-01T10:00:00+0000"),
            post_on("newest", "2021-03-20T10:00:00+0000"),
        ]);
        let manifest = fetch(&source, &SiteConfig::default()).unwrap();
        assert_eq!(post_uids(&manifest), vec!["newest", "middle", "oldest"]);
        assert_eq!(manifest.api_ref, "master-ref");
        assert!(!manifest.preview);
    }

    #[test]
    fn fetch_puts_undated_posts_last() {
        let source = MemorySource::new(vec![
            post("draft"),
            post_on("published", "2021-03-01T10:00:00+0000"),
        ]);
        let manifest = fetch(&source, &SiteConfig::default()).unwrap();
        assert_eq!(post_uids(&manifest), vec!["published", "draft"]);
    }

    #[test]
    fn fetch_skips_documents_without_uid() {
        let mut orphan = post("orphan");
        orphan.uid = None;
        let source = MemorySource::new(vec![post("kept"), orphan]);
        let manifest = fetch(&source, &SiteConfig::default()).unwrap();
        assert_eq!(post_uids(&manifest), vec!["kept"]);
    }

    #[test]
    fn fetch_rejects_duplicate_uids() {
        let source = MemorySource::new(vec![post("twin"), post("twin")]);
        assert!(matches!(
            fetch(&source, &SiteConfig::default()),
            Err(FetchError::DuplicateUid(uid)) if uid == "twin"
        ));
    }

    #[test]
    fn fetch_uses_configured_page_size() {
        let source = MemorySource::new(vec![post("a"), post("b"), post("c")]);
        let mut config = SiteConfig::default();
        config.api.page_size = 1;
        let manifest = fetch(&source, &config).unwrap();
        assert_eq!(manifest.posts.len(), 3);
        assert_eq!(source.queries.lock().unwrap().len(), 3);
    }

    #[test]
    fn fetch_marks_preview_manifests() {
        let source = MemorySource::new(vec![]);
        let mut config = SiteConfig::default();
        config.api.preview_ref = Some("master-ref".into());
        let manifest = fetch(&source, &config).unwrap();
        assert!(manifest.preview);
    }

    #[test]
    fn splice_replaces_existing_post() {
        let mut manifest = manifest_with(vec![post("a"), post("b")]);
        let mut edited = post("b");
        edited.data.title = "Edited".into();
        assert!(splice_post(&mut manifest, edited));
        assert_eq!(manifest.posts.len(), 2);
        assert_eq!(find_post(&manifest, "b").data.title, "Edited");
    }

    #[test]
    fn splice_inserts_in_date_order() {
        let mut manifest = manifest_with(vec![
            post_on("new", "2021-03-20T10:00:00+0000"),
            post_on("old", "2021-03-01T10:00:00+0000"),
        ]);
        assert!(!splice_post(
            &mut manifest,
            post_on("mid", "2021-03-10T10:00:00+0000")
        ));
        assert_eq!(post_uids(&manifest), vec!["new", "mid", "old"]);
    }

    #[test]
    fn refresh_updates_and_inserts() {
        let mut manifest = manifest_with(vec![post("a")]);
        let mut changed = post("a");
        changed.data.author = "Danilo Vieira".into();
        let source = MemorySource::new(vec![changed, post("b")]);

        assert_eq!(
            refresh_post(&source, &mut manifest, "a").unwrap(),
            RefreshOutcome::Updated
        );
        assert_eq!(find_post(&manifest, "a").data.author, "Danilo Vieira");
        assert_eq!(
            refresh_post(&source, &mut manifest, "b").unwrap(),
            RefreshOutcome::Inserted
        );
        assert_eq!(manifest.posts.len(), 2);
    }

    #[test]
    fn refresh_removes_unpublished_post() {
        let mut manifest = manifest_with(vec![post("a"), post("gone")]);
        let source = MemorySource::new(vec![post("a")]);
        assert_eq!(
            refresh_post(&source, &mut manifest, "gone").unwrap(),
            RefreshOutcome::Removed
        );
        assert_eq!(post_uids(&manifest), vec!["a"]);
    }

    #[test]
    fn refresh_follows_preview_setting() {
        let mut manifest = manifest_with(vec![post("a")]);
        manifest.config.api.preview_ref = Some("master-ref".into());
        let source = MemorySource::new(vec![post("a")]);
        refresh_post(&source, &mut manifest, "a").unwrap();
        assert!(manifest.preview);

        manifest.config.api.preview_ref = None;
        refresh_post(&source, &mut manifest, "a").unwrap();
        assert!(!manifest.preview);
    }

    #[test]
    fn refresh_unknown_uid_is_error() {
        let mut manifest = manifest_with(vec![post("a")]);
        let source = MemorySource::new(vec![post("a")]);
        assert!(matches!(
            refresh_post(&source, &mut manifest, "nope"),
            Err(FetchError::PostNotFound(_))
        ));
    }

    #[test]
    fn manifest_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/manifest.json");
        let mut manifest = manifest_with(vec![post_on("a", "2021-03-20T10:00:00+0000")]);
        manifest.config.api.access_token = Some("secret".into());

        save_manifest(&path, &manifest).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("secret"));

        let loaded = load_manifest(&path).unwrap();
        assert_eq!(loaded.posts, manifest.posts);
        assert!(loaded.config.api.access_token.is_none());
    }
}
