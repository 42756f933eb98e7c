//! Render cache for incremental builds.
//!
//! Post pages are the bulk of the output. This module lets the generate
//! stage skip re-rendering and re-writing a post page when neither the
//! document nor anything else the page depends on changed since the last
//! build. Listing pages and the 404 page are always rewritten; they are few.
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: lookups are by the pair
//! (`source_hash`, `params_hash`), not by output path.
//!
//! - **`source_hash`**: SHA-256 of the document's dates and data JSON.
//! - **`params_hash`**: SHA-256 of everything else that ends up in the page:
//!   the crate version, the resolved config, the previous/next neighbours,
//!   the embedded CSS and the preview flag.
//!
//! A hit requires a matching entry whose output file still exists. A page
//! whose uid changed renders identically, so a hit under another path is
//! copied to the new location.
//!
//! ## Storage
//!
//! The cache manifest is a JSON file at `<output_dir>/.render-cache.json`.
//!
//! ## Bypassing the cache
//!
//! `--no-cache` loads an empty manifest, so every page is rendered.

use crate::types::PostDocument;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the output directory.
const MANIFEST_FILENAME: &str = ".render-cache.json";

/// Bump to invalidate all existing caches when the key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// A single cached output file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk cache manifest mapping output paths to their cache entries.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
    /// `"{source_hash}:{params_hash}"` → output path. Rebuilt on load.
    #[serde(skip)]
    content_index: HashMap<String, String>,
}

impl CacheManifest {
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
            content_index: HashMap::new(),
        }
    }

    /// Load from the output directory. Missing, corrupt or outdated
    /// manifests load as empty.
    pub fn load(output_dir: &Path) -> Self {
        let path = output_dir.join(MANIFEST_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let mut manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest.content_index = build_content_index(&manifest.entries);
        manifest
    }

    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let path = output_dir.join(MANIFEST_FILENAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Look up a previously written page by content hashes.
    ///
    /// Returns the stored output path if the entry exists **and** the file
    /// is still on disk. It may differ from the path the caller wants.
    pub fn find_cached(
        &self,
        source_hash: &str,
        params_hash: &str,
        output_dir: &Path,
    ) -> Option<String> {
        let content_key = format!("{}:{}", source_hash, params_hash);
        let stored_path = self.content_index.get(&content_key)?;
        if output_dir.join(stored_path).exists() {
            Some(stored_path.clone())
        } else {
            None
        }
    }

    /// Record a cache entry for an output file, dropping any entry for the
    /// same content under an older path.
    pub fn insert(&mut self, output_path: String, source_hash: String, params_hash: String) {
        let content_key = format!("{}:{}", source_hash, params_hash);

        if let Some(old_path) = self.content_index.get(&content_key)
            && *old_path != output_path
        {
            self.entries.remove(old_path.as_str());
        }

        self.content_index.insert(content_key, output_path.clone());
        self.entries.insert(
            output_path,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }

    /// Forget every entry whose path is not in `live`.
    ///
    /// Returns the removed paths so the caller can delete stale pages.
    pub fn retain_paths(&mut self, live: &[String]) -> Vec<String> {
        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|path| !live.contains(path))
            .cloned()
            .collect();
        for path in &stale {
            self.entries.remove(path);
        }
        self.content_index = build_content_index(&self.entries);
        stale
    }
}

fn build_content_index(entries: &HashMap<String, CacheEntry>) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(output_path, entry)| {
            let content_key = format!("{}:{}", entry.source_hash, entry.params_hash);
            (content_key, output_path.clone())
        })
        .collect()
}

/// SHA-256 of what a document contributes to its own page, as hex.
///
/// The id and uid are left out: they decide where the page goes, not what
/// it contains.
pub fn hash_document(doc: &PostDocument) -> String {
    let mut hasher = Sha256::new();
    for date in [&doc.first_publication_date, &doc.last_publication_date] {
        if let Some(dt) = date {
            hasher.update(dt.to_rfc3339().as_bytes());
        }
        hasher.update(b"\0");
    }
    hasher.update(serde_json::to_vec(&doc.data).unwrap_or_default());
    format!("{:x}", hasher.finalize())
}

/// SHA-256 over an ordered list of render inputs, as hex.
///
/// Parts are NUL-separated so `["ab", "c"]` and `["a", "bc"]` differ.
pub fn hash_render_params(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"post-page\0");
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"\0");
    }
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub copies: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn copy(&mut self) {
        self.copies += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.copies + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 || self.copies > 0 {
            if self.copies > 0 {
                write!(
                    f,
                    "{} cached, {} copied, {} rendered ({} total)",
                    self.hits,
                    self.copies,
                    self.misses,
                    self.total()
                )
            } else {
                write!(
                    f,
                    "{} cached, {} rendered ({} total)",
                    self.hits,
                    self.misses,
                    self.total()
                )
            }
        } else {
            write!(f, "{} rendered", self.misses)
        }
    }
}

pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILENAME)
}
