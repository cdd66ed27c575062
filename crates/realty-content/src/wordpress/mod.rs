//! Thin client over the WordPress REST API (`/wp-json/wp/v2`).
//!
//! Covers `/posts` and `/categories` with optional HTTP Basic auth
//! (application passwords), a fixed per-call timeout, and retry with
//! exponential backoff on 5xx and network failures. 4xx responses are
//! never retried.

pub mod helpers;
pub mod integration;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::WordPressConfig;
use crate::error::{ContentError, ContentResult};
use crate::http::{HttpClient, HttpResponse};
use crate::types::{CategoryQuery, PostQuery, WordPressCategory, WordPressPost};

pub use helpers::{
    author_name, excerpt, featured_image, format_post_date, post_category_names, post_tag_names,
    post_title, reading_time, relative_post_date, to_blog_post, FeaturedImage,
};
pub use integration::BlogService;

/// One page of `/posts` plus the pagination totals WordPress reports.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<WordPressPost>,
    /// `X-WP-Total`, when present.
    pub total: Option<u64>,
    /// `X-WP-TotalPages`, when present.
    pub total_pages: Option<u32>,
}

/// WordPress REST client.
#[derive(Clone)]
pub struct WordPressClient {
    http: HttpClient,
    config: WordPressConfig,
}

impl WordPressClient {
    pub fn new(config: WordPressConfig) -> Self {
        let http = HttpClient::new(&config.user_agent);
        Self { http, config }
    }

    /// Reuse an existing HTTP client.
    pub fn with_http(http: HttpClient, config: WordPressConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &WordPressConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET an endpoint, retrying retryable failures with exponential backoff.
    async fn get_with_retry(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ContentResult<HttpResponse> {
        let url = self.endpoint(path);
        let mut attempt = 0u32;

        loop {
            let result = self
                .http
                .get(
                    &url,
                    query,
                    self.config.credentials.as_ref(),
                    self.config.timeout,
                )
                .await
                .and_then(HttpResponse::error_for_status);

            match result {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() && attempt < self.config.retries => {
                    let delay = backoff_delay(self.config.retry_delay, attempt);
                    attempt += 1;
                    tracing::warn!(
                        "WordPress GET {url} failed ({e}), retry {attempt}/{} in {:?}",
                        self.config.retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ContentResult<T> {
        let resp = self.get_with_retry(path, query).await?;
        parse_json(&resp)
    }

    /// List posts matching the query.
    pub async fn list_posts(&self, query: &PostQuery) -> ContentResult<Vec<WordPressPost>> {
        self.get_json("posts", &query.to_pairs()).await
    }

    /// List posts along with the pagination totals.
    pub async fn list_posts_page(&self, query: &PostQuery) -> ContentResult<PostPage> {
        let resp = self.get_with_retry("posts", &query.to_pairs()).await?;
        let total = resp.header("x-wp-total").and_then(|v| v.trim().parse().ok());
        let total_pages = resp
            .header("x-wp-totalpages")
            .and_then(|v| v.trim().parse().ok());
        let posts = parse_json(&resp)?;
        Ok(PostPage {
            posts,
            total,
            total_pages,
        })
    }

    /// Fetch a single post by slug, `None` if no post has it.
    pub async fn get_post_by_slug(&self, slug: &str) -> ContentResult<Option<WordPressPost>> {
        let query = vec![
            ("slug".to_string(), slug.to_string()),
            ("_embed".to_string(), "true".to_string()),
        ];
        let posts: Vec<WordPressPost> = self.get_json("posts", &query).await?;
        Ok(posts.into_iter().next())
    }

    /// List categories.
    pub async fn list_categories(
        &self,
        query: &CategoryQuery,
    ) -> ContentResult<Vec<WordPressCategory>> {
        self.get_json("categories", &query.to_pairs()).await
    }

    /// Fetch a single category by slug.
    pub async fn get_category_by_slug(
        &self,
        slug: &str,
    ) -> ContentResult<Option<WordPressCategory>> {
        let query = vec![("slug".to_string(), slug.to_string())];
        let categories: Vec<WordPressCategory> = self.get_json("categories", &query).await?;
        Ok(categories.into_iter().next())
    }

    /// Posts filed under the category with this slug.
    pub async fn list_posts_in_category(
        &self,
        category_slug: &str,
        per_page: u32,
    ) -> ContentResult<Vec<WordPressPost>> {
        let category = self
            .get_category_by_slug(category_slug)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("category '{category_slug}'")))?;

        let query = PostQuery {
            per_page,
            categories: vec![category.id],
            ..PostQuery::default()
        };
        self.list_posts(&query).await
    }

    /// Every published slug, walking pages of 100 up to `max_pages`.
    pub async fn list_post_slugs(&self, max_pages: u32) -> ContentResult<Vec<String>> {
        let mut slugs = Vec::new();
        let mut page = 1u32;

        while page <= max_pages.max(1) {
            let query = PostQuery {
                page,
                per_page: 100,
                embed: false,
                ..PostQuery::default()
            };
            let result = self.list_posts_page(&query).await?;
            let fetched = result.posts.len();
            slugs.extend(result.posts.into_iter().map(|p| p.slug));

            let last_page = match result.total_pages {
                Some(total) => page >= total,
                None => fetched < 100,
            };
            if last_page || fetched == 0 {
                break;
            }
            page += 1;
        }

        Ok(slugs)
    }
}

/// Sleep before retry number `attempt + 1`: `base * 2^attempt`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

fn parse_json<T: DeserializeOwned>(resp: &HttpResponse) -> ContentResult<T> {
    serde_json::from_str(&resp.body)
        .map_err(|e| ContentError::Parse(format!("invalid JSON from {}: {e}", resp.url)))
}
