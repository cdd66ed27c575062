//! Multi-source blog fetcher.
//!
//! Sources are tried in a fixed order (REST API → RSS → scraping →
//! secondary REST) and the first one that yields posts wins. Individual
//! failures are logged and swallowed; only exhaustion of the whole chain
//! reaches the caller. There is no shared retry budget and no memory of
//! which source last worked.

use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::config::FetcherConfig;
use crate::error::{ContentError, ContentResult};
use crate::feed::{item_to_post, parse_rss};
use crate::http::HttpClient;
use crate::scrape::extract_posts;
use crate::types::{BlogPost, PostQuery, PostSource};
use crate::wordpress::{to_blog_post, WordPressClient};

/// A place blog posts can be fetched from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Which hint selects this source.
    fn kind(&self) -> PostSource;
    /// The URL this source reads.
    fn endpoint(&self) -> String;
    /// Fetch up to `max_posts` normalized posts.
    async fn fetch(&self, max_posts: usize) -> ContentResult<Vec<BlogPost>>;
}

/// Primary WordPress REST API.
pub struct RestApiSource {
    client: WordPressClient,
}

impl RestApiSource {
    pub fn new(client: WordPressClient) -> Self {
        Self { client }
    }
}

async fn fetch_rest(client: &WordPressClient, max_posts: usize) -> ContentResult<Vec<BlogPost>> {
    let query = PostQuery {
        per_page: max_posts.min(100) as u32,
        ..PostQuery::default()
    };
    let posts = client.list_posts(&query).await?;
    Ok(posts.iter().map(to_blog_post).collect())
}

#[async_trait]
impl ContentSource for RestApiSource {
    fn kind(&self) -> PostSource {
        PostSource::Api
    }

    fn endpoint(&self) -> String {
        format!("{}/posts", self.client.config().api_url)
    }

    async fn fetch(&self, max_posts: usize) -> ContentResult<Vec<BlogPost>> {
        fetch_rest(&self.client, max_posts).await
    }
}

/// RSS feed.
pub struct RssSource {
    http: HttpClient,
    url: String,
    timeout: Duration,
}

impl RssSource {
    pub fn new(http: HttpClient, url: &str, timeout: Duration) -> Self {
        Self {
            http,
            url: url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl ContentSource for RssSource {
    fn kind(&self) -> PostSource {
        PostSource::Rss
    }

    fn endpoint(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self, max_posts: usize) -> ContentResult<Vec<BlogPost>> {
        let xml = self.http.get_text(&self.url, self.timeout).await?;
        let items = parse_rss(&xml)?;
        Ok(items.iter().take(max_posts).map(item_to_post).collect())
    }
}

/// HTML scrape of the blog index page.
pub struct ScrapeSource {
    http: HttpClient,
    url: String,
    timeout: Duration,
}

impl ScrapeSource {
    pub fn new(http: HttpClient, url: &str, timeout: Duration) -> Self {
        Self {
            http,
            url: url.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl ContentSource for ScrapeSource {
    fn kind(&self) -> PostSource {
        PostSource::Scraping
    }

    fn endpoint(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self, max_posts: usize) -> ContentResult<Vec<BlogPost>> {
        let page = self.http.get_page(&self.url, self.timeout).await?;
        // Relative links resolve against where the index actually lives.
        Ok(extract_posts(&page.body, &page.final_url, max_posts))
    }
}

/// Secondary WordPress REST endpoint, tried last.
pub struct FallbackApiSource {
    client: WordPressClient,
}

impl FallbackApiSource {
    pub fn new(client: WordPressClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentSource for FallbackApiSource {
    fn kind(&self) -> PostSource {
        PostSource::Fallback
    }

    fn endpoint(&self) -> String {
        format!("{}/posts", self.client.config().api_url)
    }

    async fn fetch(&self, max_posts: usize) -> ContentResult<Vec<BlogPost>> {
        fetch_rest(&self.client, max_posts).await
    }
}

/// Which source produced the posts, and how many sources were tried.
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub source: PostSource,
    pub attempts: usize,
    pub posts: Vec<BlogPost>,
}

/// Ordered chain of content sources.
pub struct BlogFetcher {
    sources: Vec<Box<dyn ContentSource>>,
}

impl BlogFetcher {
    /// The standard four-source chain, sharing one HTTP client.
    pub fn new(config: &FetcherConfig) -> Self {
        let http = HttpClient::new(&config.wordpress.user_agent);
        let primary = WordPressClient::with_http(http.clone(), config.chain_wordpress());
        let secondary = WordPressClient::with_http(http.clone(), config.fallback_wordpress());

        Self::from_sources(vec![
            Box::new(RestApiSource::new(primary)),
            Box::new(RssSource::new(
                http.clone(),
                &config.rss_url,
                config.page_timeout,
            )),
            Box::new(ScrapeSource::new(
                http,
                &config.blog_index_url,
                config.page_timeout,
            )),
            Box::new(FallbackApiSource::new(secondary)),
        ])
    }

    /// A chain over arbitrary sources, tried in the given order.
    pub fn from_sources(sources: Vec<Box<dyn ContentSource>>) -> Self {
        Self { sources }
    }

    /// Source kinds in trial order.
    pub fn chain(&self) -> Vec<PostSource> {
        self.sources.iter().map(|s| s.kind()).collect()
    }

    /// Fetch up to `max_posts` posts using the given source hint.
    pub async fn fetch(&self, source: PostSource, max_posts: usize) -> ContentResult<Vec<BlogPost>> {
        self.fetch_with_report(source, max_posts)
            .await
            .map(|report| report.posts)
    }

    /// Like [`fetch`](Self::fetch), also reporting which source won.
    ///
    /// An explicit hint runs exactly that source and returns its error.
    /// `Auto` walks the chain and fails with
    /// [`ContentError::AllSourcesFailed`] only when every source failed.
    pub async fn fetch_with_report(
        &self,
        source: PostSource,
        max_posts: usize,
    ) -> ContentResult<FetchReport> {
        if max_posts == 0 {
            return Err(ContentError::InvalidInput(
                "max_posts must be at least 1".to_string(),
            ));
        }

        if source != PostSource::Auto {
            let chosen = self
                .sources
                .iter()
                .find(|s| s.kind() == source)
                .ok_or_else(|| {
                    ContentError::InvalidInput(format!("no {source} source configured"))
                })?;
            let posts = run_source(chosen.as_ref(), max_posts).await?;
            return Ok(FetchReport {
                source,
                attempts: 1,
                posts,
            });
        }

        let mut attempts = 0usize;
        for candidate in &self.sources {
            attempts += 1;
            match run_source(candidate.as_ref(), max_posts).await {
                Ok(posts) => {
                    tracing::info!(
                        "fetched {} posts via {} after {attempts} attempt(s)",
                        posts.len(),
                        candidate.kind()
                    );
                    return Ok(FetchReport {
                        source: candidate.kind(),
                        attempts,
                        posts,
                    });
                }
                Err(e) => {
                    tracing::warn!("{} source failed: {e}", candidate.kind());
                }
            }
        }

        Err(ContentError::AllSourcesFailed { attempts })
    }
}

async fn run_source(source: &dyn ContentSource, max_posts: usize) -> ContentResult<Vec<BlogPost>> {
    let started = Instant::now();
    tracing::debug!("trying {} source at {}", source.kind(), source.endpoint());

    let mut posts = source.fetch(max_posts).await?;
    tracing::debug!(
        "{} source answered in {}ms with {} posts",
        source.kind(),
        started.elapsed().as_millis(),
        posts.len()
    );

    if posts.is_empty() {
        return Err(ContentError::Empty(source.kind().to_string()));
    }
    posts.truncate(max_posts);
    Ok(posts)
}

/// Reachability of one configured source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceProbe {
    pub source: PostSource,
    pub url: String,
    pub status: Option<u16>,
    pub content_type: Option<String>,
    pub error: Option<String>,
}

impl SourceProbe {
    pub fn is_reachable(&self) -> bool {
        matches!(self.status, Some(s) if (200..400).contains(&s))
    }
}

/// HEAD every source in the chain, in order.
pub async fn probe_sources(fetcher: &BlogFetcher, http: &HttpClient, timeout: Duration) -> Vec<SourceProbe> {
    let mut probes = Vec::with_capacity(fetcher.sources.len());
    for source in &fetcher.sources {
        let url = source.endpoint();
        let probe = match http.head(&url, timeout).await {
            Ok(resp) => SourceProbe {
                source: source.kind(),
                url,
                status: Some(resp.status),
                content_type: resp.content_type,
                error: None,
            },
            Err(e) => SourceProbe {
                source: source.kind(),
                url,
                status: None,
                content_type: None,
                error: Some(e.to_string()),
            },
        };
        probes.push(probe);
    }
    probes
}
