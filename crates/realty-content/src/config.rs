//! Configuration loading and resolution.
//!
//! Every setting resolves explicit value > environment variable > default.
//! Environment access goes through a lookup function so tests can supply
//! their own variables without touching the process environment.

use std::time::Duration;

/// Default WordPress REST base for the brokerage blog.
pub const DEFAULT_API_URL: &str = "https://www.bhhscalifornia.com/wp-json/wp/v2";
/// Default RSS feed for the brokerage blog.
pub const DEFAULT_RSS_URL: &str = "https://www.bhhscalifornia.com/blog/feed/";
/// Default blog index page used for scraping.
pub const DEFAULT_BLOG_INDEX_URL: &str = "https://www.bhhscalifornia.com/blog/";
/// Default secondary REST base tried last.
pub const DEFAULT_FALLBACK_API_URL: &str = "https://www.bhhs.com/wp-json/wp/v2";

/// Fixed User-Agent sent with every request.
pub fn user_agent() -> String {
    format!(
        "Mozilla/5.0 (compatible; realty-content/{}; +https://github.com/realty-content/realty-content)",
        env!("CARGO_PKG_VERSION")
    )
}

/// HTTP Basic credentials (WordPress application password).
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings for the WordPress REST client.
#[derive(Debug, Clone, PartialEq)]
pub struct WordPressConfig {
    /// Base URL ending in `/wp-json/wp/v2` (no trailing slash).
    pub api_url: String,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
    /// Retries after the first attempt on 5xx or network failure.
    pub retries: u32,
    /// First backoff delay; doubles on every retry.
    pub retry_delay: Duration,
    pub user_agent: String,
}

impl Default for WordPressConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials: None,
            timeout: Duration::from_secs(10),
            retries: 3,
            retry_delay: Duration::from_secs(1),
            user_agent: user_agent(),
        }
    }
}

impl WordPressConfig {
    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = non_empty(lookup("WORDPRESS_API_URL")) {
            config.api_url = normalize_base(&url);
        }
        config.credentials = resolve_credentials(&lookup);
        config
    }

    /// Same settings, pointed at a different REST base.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = normalize_base(api_url);
        self
    }
}

/// Settings for the multi-source fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherConfig {
    pub wordpress: WordPressConfig,
    pub rss_url: String,
    pub blog_index_url: String,
    pub fallback_api_url: String,
    /// Timeout for the RSS and scraping requests.
    pub page_timeout: Duration,
    /// Timeout for the secondary REST endpoint.
    pub fallback_timeout: Duration,
    /// Page-level revalidation TTL handed to the hosting framework.
    pub revalidate: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            wordpress: WordPressConfig::default(),
            rss_url: DEFAULT_RSS_URL.to_string(),
            blog_index_url: DEFAULT_BLOG_INDEX_URL.to_string(),
            fallback_api_url: DEFAULT_FALLBACK_API_URL.to_string(),
            page_timeout: Duration::from_secs(10),
            fallback_timeout: Duration::from_secs(5),
            revalidate: Duration::from_secs(3600),
        }
    }
}

impl FetcherConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            wordpress: WordPressConfig::from_lookup(&lookup),
            ..Self::default()
        };
        if let Some(url) = non_empty(lookup("BLOG_RSS_URL")) {
            config.rss_url = url;
        }
        if let Some(url) = non_empty(lookup("BLOG_INDEX_URL")) {
            config.blog_index_url = url;
        }
        if let Some(url) = non_empty(lookup("BLOG_FALLBACK_API_URL")) {
            config.fallback_api_url = normalize_base(&url);
        }
        if let Some(secs) = non_empty(lookup("BLOG_REVALIDATE_SECS")).and_then(|s| s.parse().ok())
        {
            config.revalidate = Duration::from_secs(secs);
        }
        config
    }

    /// Config for the chain's primary REST step. Each source in the chain
    /// gets one attempt; backoff stays with direct client use.
    pub fn chain_wordpress(&self) -> WordPressConfig {
        let mut wp = self.wordpress.clone();
        wp.retries = 0;
        wp
    }

    /// Config for the secondary REST endpoint: same credentials, shorter
    /// timeout, single attempt.
    pub fn fallback_wordpress(&self) -> WordPressConfig {
        let mut wp = self.wordpress.clone().with_api_url(&self.fallback_api_url);
        wp.timeout = self.fallback_timeout;
        wp.retries = 0;
        wp
    }
}

fn resolve_credentials<F>(lookup: &F) -> Option<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let username = non_empty(lookup("WORDPRESS_USER")).or_else(|| non_empty(lookup("WP_USER")))?;
    let password = non_empty(lookup("WORDPRESS_APP_PASSWORD"))
        .or_else(|| non_empty(lookup("WP_APP_PASS")))?;
    Some(Credentials { username, password })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = WordPressConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.credentials.is_none());
        assert_eq!(config.retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_primary_env_names() {
        let config = WordPressConfig::from_lookup(lookup_from(&[
            ("WORDPRESS_API_URL", "https://blog.example.com/wp-json/wp/v2/"),
            ("WORDPRESS_USER", "editor"),
            ("WORDPRESS_APP_PASSWORD", "abcd efgh"),
        ]));
        assert_eq!(config.api_url, "https://blog.example.com/wp-json/wp/v2");
        let creds = config.credentials.unwrap();
        assert_eq!(creds.username, "editor");
        assert_eq!(creds.password, "abcd efgh");
    }

    #[test]
    fn test_alias_env_names() {
        let config = WordPressConfig::from_lookup(lookup_from(&[
            ("WP_USER", "alias"),
            ("WP_APP_PASS", "secret"),
        ]));
        assert_eq!(config.credentials.unwrap().username, "alias");
    }

    #[test]
    fn test_credentials_need_both_halves() {
        let config = WordPressConfig::from_lookup(lookup_from(&[("WORDPRESS_USER", "editor")]));
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            username: "editor".into(),
            password: "hunter2".into(),
        };
        let shown = format!("{creds:?}");
        assert!(shown.contains("editor"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn test_fetcher_config_overrides() {
        let config = FetcherConfig::from_lookup(lookup_from(&[
            ("BLOG_RSS_URL", "https://example.com/feed/"),
            ("BLOG_FALLBACK_API_URL", "https://backup.example.com/wp-json/wp/v2/"),
            ("BLOG_REVALIDATE_SECS", "600"),
        ]));
        assert_eq!(config.rss_url, "https://example.com/feed/");
        assert_eq!(config.blog_index_url, DEFAULT_BLOG_INDEX_URL);
        assert_eq!(config.revalidate, Duration::from_secs(600));

        let fallback = config.fallback_wordpress();
        assert_eq!(fallback.api_url, "https://backup.example.com/wp-json/wp/v2");
        assert_eq!(fallback.timeout, Duration::from_secs(5));
        assert_eq!(fallback.retries, 0);
    }

    #[test]
    fn test_chain_wordpress_is_single_attempt() {
        let config = FetcherConfig::from_lookup(lookup_from(&[(
            "WORDPRESS_API_URL",
            "https://blog.example.com/wp-json/wp/v2",
        )]));
        let primary = config.chain_wordpress();
        assert_eq!(primary.retries, 0);
        assert_eq!(primary.api_url, "https://blog.example.com/wp-json/wp/v2");
        assert_eq!(primary.timeout, config.wordpress.timeout);
        // Direct client use keeps the retry policy.
        assert_eq!(config.wordpress.retries, 3);
    }
}
