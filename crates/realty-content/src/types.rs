//! Core data types: normalized blog posts and WordPress REST projections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ContentError;

/// A blog post normalized from any content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    /// Post body as HTML.
    pub content: String,
    pub excerpt: String,
    pub date: String,
    pub author: String,
    pub image: Option<String>,
    pub image_alt: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub original_url: String,
    /// Estimated minutes to read, always at least 1.
    pub reading_time: u32,
}

/// Which strategy the fetcher should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSource {
    Api,
    Rss,
    Scraping,
    Fallback,
    Auto,
}

impl PostSource {
    /// The fixed trial order used by `Auto`.
    pub const CHAIN: [PostSource; 4] = [
        PostSource::Api,
        PostSource::Rss,
        PostSource::Scraping,
        PostSource::Fallback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostSource::Api => "api",
            PostSource::Rss => "rss",
            PostSource::Scraping => "scraping",
            PostSource::Fallback => "fallback",
            PostSource::Auto => "auto",
        }
    }
}

impl fmt::Display for PostSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostSource {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" | "rest" => Ok(PostSource::Api),
            "rss" | "feed" => Ok(PostSource::Rss),
            "scraping" | "scrape" => Ok(PostSource::Scraping),
            "fallback" => Ok(PostSource::Fallback),
            "auto" => Ok(PostSource::Auto),
            other => Err(ContentError::InvalidInput(format!(
                "unknown post source '{other}' (expected api, rss, scraping, fallback, auto)"
            ))),
        }
    }
}

// ── WordPress REST projections ──────────────────────────────────────────────

/// A `{ "rendered": "..." }` field from the WordPress REST API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
    #[serde(default)]
    pub protected: bool,
}

/// A post as returned by `/wp-json/wp/v2/posts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordPressPost {
    pub id: u64,
    pub date: String,
    pub date_gmt: Option<String>,
    pub modified: Option<String>,
    pub slug: String,
    pub status: String,
    pub link: String,
    pub title: Rendered,
    pub content: Rendered,
    pub excerpt: Rendered,
    pub author: u64,
    pub featured_media: u64,
    pub categories: Vec<u64>,
    pub tags: Vec<u64>,
    #[serde(rename = "_embedded", skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Embedded>,
}

/// The `_embedded` side-channel populated when `_embed` is requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Embedded {
    pub author: Vec<EmbeddedAuthor>,
    #[serde(rename = "wp:featuredmedia")]
    pub featured_media: Vec<EmbeddedMedia>,
    /// One list per taxonomy, usually `[categories, tags]`.
    #[serde(rename = "wp:term")]
    pub terms: Vec<Vec<EmbeddedTerm>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddedAuthor {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddedMedia {
    pub id: u64,
    pub source_url: String,
    pub alt_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddedTerm {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub taxonomy: String,
}

/// A category as returned by `/wp-json/wp/v2/categories`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordPressCategory {
    pub id: u64,
    pub count: u64,
    pub description: String,
    pub link: String,
    pub name: String,
    pub slug: String,
    pub parent: u64,
}

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Query parameters for `/posts`.
#[derive(Debug, Clone, PartialEq)]
pub struct PostQuery {
    pub page: u32,
    pub per_page: u32,
    pub order: SortOrder,
    pub orderby: String,
    pub categories: Vec<u64>,
    pub tags: Vec<u64>,
    pub search: Option<String>,
    pub embed: bool,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            order: SortOrder::Desc,
            orderby: "date".to_string(),
            categories: Vec::new(),
            tags: Vec::new(),
            search: None,
            embed: true,
        }
    }
}

impl PostQuery {
    /// Render as query-string pairs. WordPress caps `per_page` at 100.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.max(1).to_string()),
            ("per_page".to_string(), self.per_page.clamp(1, 100).to_string()),
            ("order".to_string(), self.order.as_str().to_string()),
            ("orderby".to_string(), self.orderby.clone()),
        ];
        if !self.categories.is_empty() {
            pairs.push(("categories".to_string(), join_ids(&self.categories)));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags".to_string(), join_ids(&self.tags)));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search".to_string(), search.trim().to_string()));
        }
        if self.embed {
            pairs.push(("_embed".to_string(), "true".to_string()));
        }
        pairs
    }
}

/// Query parameters for `/categories`.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryQuery {
    pub per_page: u32,
    pub hide_empty: bool,
    pub orderby: String,
    pub order: SortOrder,
}

impl Default for CategoryQuery {
    fn default() -> Self {
        Self {
            per_page: 100,
            hide_empty: true,
            orderby: "count".to_string(),
            order: SortOrder::Desc,
        }
    }
}

impl CategoryQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("per_page".to_string(), self.per_page.clamp(1, 100).to_string()),
            ("hide_empty".to_string(), self.hide_empty.to_string()),
            ("orderby".to_string(), self.orderby.clone()),
            ("order".to_string(), self.order.as_str().to_string()),
        ]
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
