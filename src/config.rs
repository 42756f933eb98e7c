//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; the user's file is merged on top key-by-key, so it only
//! needs the values it wants to change. Two environment variables are applied
//! last so credentials can stay out of the file:
//!
//! - `PRISMIC_API_ENDPOINT` replaces `api.endpoint`
//! - `PRISMIC_ACCESS_TOKEN` replaces `api.access_token`
//!
//! ## Configuration Options
//!
//! ```toml
//! assets_dir = "assets"          # Copied into the output root when present
//!
//! [site]
//! title = "spacetraveling"
//! locale = "pt-BR"               # "pt-BR" or "en"
//!
//! [api]
//! endpoint = "https://your-repo.cdn.prismic.io/api/v2"
//! # access_token = "..."
//! document_type = "posts"
//! page_size = 100
//! timeout_secs = 30
//! # preview_ref = "..."
//!
//! [listing]
//! posts_per_page = 2
//!
//! [reading]
//! words_per_minute = 200
//!
//! [comments]
//! # repo = "owner/name"
//! issue_term = "pathname"
//! theme = "dark-blue"
//!
//! [colors]
//! background = "#1a1d23"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::humanize::Locale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Largest page the search API will return.
const MAX_API_PAGE_SIZE: u32 = 100;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Static assets directory, relative to the config directory.
    pub assets_dir: String,
    pub site: SiteSettings,
    pub api: ApiConfig,
    pub listing: ListingConfig,
    pub reading: ReadingConfig,
    pub comments: CommentsConfig,
    pub colors: ColorScheme,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            assets_dir: "assets".to_string(),
            site: SiteSettings::default(),
            api: ApiConfig::default(),
            listing: ListingConfig::default(),
            reading: ReadingConfig::default(),
            comments: CommentsConfig::default(),
            colors: ColorScheme::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listing.posts_per_page == 0 {
            return Err(ConfigError::Validation(
                "listing.posts_per_page must be greater than 0".into(),
            ));
        }
        if self.reading.words_per_minute == 0 {
            return Err(ConfigError::Validation(
                "reading.words_per_minute must be greater than 0".into(),
            ));
        }
        if self.api.page_size == 0 || self.api.page_size > MAX_API_PAGE_SIZE {
            return Err(ConfigError::Validation(format!(
                "api.page_size must be 1-{MAX_API_PAGE_SIZE}"
            )));
        }
        if self.api.document_type.trim().is_empty() {
            return Err(ConfigError::Validation(
                "api.document_type must not be empty".into(),
            ));
        }
        if let Some(repo) = &self.comments.repo
            && repo.split('/').filter(|p| !p.is_empty()).count() != 2
        {
            return Err(ConfigError::Validation(format!(
                "comments.repo must look like owner/name, got {repo:?}"
            )));
        }
        Ok(())
    }
}

/// General site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSettings {
    /// Shown in the header logo and the `<title>` of every page.
    pub title: String,
    /// Language for dates and UI strings.
    pub locale: Locale,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            locale: Locale::PtBr,
        }
    }
}

/// Content API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// API root, e.g. `https://your-repo.cdn.prismic.io/api/v2`.
    pub endpoint: String,
    /// Permanent access token for private repositories. Never written out.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// Custom type of the blog post documents.
    pub document_type: String,
    /// Documents requested per search call.
    pub page_size: u32,
    /// HTTP request timeout.
    pub timeout_secs: u64,
    /// Preview or release ref to query instead of the published master ref.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_ref: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: MAX_API_PAGE_SIZE,
            timeout_secs: 30,
            preview_ref: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Posts added to the listing by each load-more step.
    pub posts_per_page: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { posts_per_page: 2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
        }
    }
}

/// utterances comment widget settings. No `repo` means no widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommentsConfig {
    /// GitHub repository holding the comment issues, `owner/name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// How a page is mapped to an issue (`pathname`, `url`, `title`, ...).
    pub issue_term: String,
    pub theme: String,
    /// Label applied to created issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: None,
            issue_term: "pathname".to_string(),
            theme: "dark-blue".to_string(),
            label: None,
        }
    }
}

/// Site color scheme, emitted as CSS custom properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    /// Body text.
    pub text: String,
    /// Titles and headings.
    pub heading: String,
    /// Dates, authors, subtitles.
    pub muted: String,
    /// Links, buttons and the logo dot.
    pub accent: String,
    /// Cards, the preview banner and the post navigation.
    pub surface: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: "#1a1d23".to_string(),
            text: "#d7d7d7".to_string(),
            heading: "#f8f8f8".to_string(),
            muted: "#bbbbbb".to_string(),
            accent: "#ff57b2".to_string(),
            surface: "#282a36".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Replace API settings with values found through `lookup`.
///
/// Empty values are ignored. `lookup` is `std::env::var` in production.
pub fn apply_env_overrides<F>(config: &mut SiteConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
        config.api.endpoint = endpoint;
    }
    if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
        config.api.access_token = Some(token);
    }
}

/// Load config from `config.toml` in the given directory, then apply the
/// environment overrides.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    let mut config = resolve_config(base, overlay)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# spacetraveling configuration
# ===========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory (relative to this file) copied into the output root.
assets_dir = "assets"

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
title = "spacetraveling"
# Language for dates and interface strings: "pt-BR" or "en".
locale = "pt-BR"

# ---------------------------------------------------------------------------
# Content API (Prismic)
# ---------------------------------------------------------------------------
[api]
# API root of the repository. PRISMIC_API_ENDPOINT overrides this.
endpoint = ""
# Access token for private repositories. PRISMIC_ACCESS_TOKEN overrides this.
# access_token = ""
# Custom type of the blog post documents.
document_type = "posts"
# Documents per search request (1-100).
page_size = 100
# HTTP request timeout in seconds.
timeout_secs = 30
# Query a preview/release ref instead of the published content.
# preview_ref = ""

# ---------------------------------------------------------------------------
# Listing
# ---------------------------------------------------------------------------
[listing]
# Posts added by each "load more" step.
posts_per_page = 2

# ---------------------------------------------------------------------------
# Reading time
# ---------------------------------------------------------------------------
[reading]
words_per_minute = 200

# ---------------------------------------------------------------------------
# Comments (utterances). Leave repo unset to disable the widget.
# ---------------------------------------------------------------------------
[comments]
# repo = "owner/name"
issue_term = "pathname"
theme = "dark-blue"
# label = "comments"

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
background = "#1a1d23"
text = "#d7d7d7"
heading = "#f8f8f8"
muted = "#bbbbbb"
accent = "#ff57b2"
surface = "#282a36"
"##
}

/// Generate CSS custom properties from the color scheme.
pub fn generate_color_css(colors: &ColorScheme) -> String {
    format!(
        r#":root {{
    --color-bg: {background};
    --color-text: {text};
    --color-heading: {heading};
    --color-muted: {muted};
    --color-accent: {accent};
    --color-surface: {surface};
}}"#,
        background = colors.background,
        text = colors.text,
        heading = colors.heading,
        muted = colors.muted,
        accent = colors.accent,
        surface = colors.surface,
    )
}
