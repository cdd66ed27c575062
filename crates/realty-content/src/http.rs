//! Async HTTP client wrapping reqwest.
//!
//! One attempt per call with a per-call timeout and a bounded redirect
//! policy. Retry and backoff belong to the callers that want them (the
//! WordPress client); the RSS and scraping paths make a single attempt.

use std::time::Duration;

use crate::config::Credentials;
use crate::error::{ContentError, ContentResult};

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    pub status: u16,
    /// Response headers (selected subset).
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive lookup in the captured headers.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Turn a non-2xx response into a client or server error.
    pub fn error_for_status(self) -> ContentResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            let snippet: String = self.body.chars().take(200).collect();
            Err(ContentError::from_status(
                self.status,
                format!("GET {} returned {}: {}", self.url, self.status, snippet.trim()),
            ))
        }
    }
}

/// Response from an HTTP HEAD request.
#[derive(Debug, Clone)]
pub struct HeadResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
}

/// HTTP client shared by every content source.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client that sends the given User-Agent on every request.
    pub fn new(user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Single GET with optional query pairs and Basic auth.
    pub async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        credentials: Option<&Credentials>,
        timeout: Duration,
    ) -> ContentResult<HttpResponse> {
        let mut builder = self.client.get(url).timeout(timeout);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(creds) = credentials {
            builder = builder.basic_auth(&creds.username, Some(&creds.password));
        }

        let r = builder.send().await?;
        let status = r.status().as_u16();
        let final_url = r.url().to_string();

        let headers: Vec<(String, String)> = r
            .headers()
            .iter()
            .filter(|(k, _)| {
                matches!(
                    k.as_str(),
                    "content-type" | "last-modified" | "x-wp-total" | "x-wp-totalpages"
                )
            })
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = r.text().await?;

        Ok(HttpResponse {
            url: url.to_string(),
            final_url,
            status,
            headers,
            body,
        })
    }

    /// GET a page, failing on any non-2xx status.
    pub async fn get_page(&self, url: &str, timeout: Duration) -> ContentResult<HttpResponse> {
        self.get(url, &[], None, timeout).await?.error_for_status()
    }

    /// GET a page and return its body, failing on any non-2xx status.
    pub async fn get_text(&self, url: &str, timeout: Duration) -> ContentResult<String> {
        Ok(self.get_page(url, timeout).await?.body)
    }

    /// HEAD request, used to probe whether a source is reachable.
    pub async fn head(&self, url: &str, timeout: Duration) -> ContentResult<HeadResponse> {
        let resp = self.client.head(url).timeout(timeout).send().await?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Ok(HeadResponse {
            url: url.to_string(),
            status,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            url: "https://example.com/feed/".to_string(),
            final_url: "https://example.com/feed/".to_string(),
            status,
            headers: vec![("content-type".to_string(), "application/rss+xml".to_string())],
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_sends_user_agent_and_follows_redirects() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blog/"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", format!("{}/news/", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/news/"))
            .and(header("user-agent", "realty-content-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let client = HttpClient::new("realty-content-test");
        let url = format!("{}/blog/", server.uri());
        let resp = client.get(&url, &[], None, Duration::from_secs(5)).await.unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, "moved");
        assert_eq!(resp.url, url);
        assert_eq!(resp.final_url, format!("{}/news/", server.uri()));
    }

    #[tokio::test]
    async fn test_head_reports_content_type() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/rss+xml"))
            .mount(&server)
            .await;

        let client = HttpClient::new("realty-content-test");
        let head = client.head(&server.uri(), Duration::from_secs(5)).await.unwrap();
        assert_eq!(head.status, 200);
        assert_eq!(head.content_type.as_deref(), Some("application/rss+xml"));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let resp = response(200, "");
        assert_eq!(resp.header("Content-Type"), Some("application/rss+xml"));
        assert_eq!(resp.header("x-wp-total"), None);
    }

    #[test]
    fn test_error_for_status() {
        assert!(response(200, "ok").error_for_status().is_ok());
        let err = response(404, "nope").error_for_status().unwrap_err();
        assert!(matches!(err, ContentError::Client { status: 404, .. }));
        let err = response(502, "bad gateway").error_for_status().unwrap_err();
        assert!(err.is_retryable());
    }
}
