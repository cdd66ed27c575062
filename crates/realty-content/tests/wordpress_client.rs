//! WordPress REST client against a mock server: retry policy, auth,
//! query parameters, pagination, and the degrading blog service.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use realty_content::wordpress::{BlogService, WordPressClient};
use realty_content::{ContentError, CategoryQuery, Credentials, PostQuery, WordPressConfig};

const POSTS: &str = "/wp-json/wp/v2/posts";
const CATEGORIES: &str = "/wp-json/wp/v2/categories";

// ─────────────────────── helpers ───────────────────────

fn config(server: &MockServer, retries: u32) -> WordPressConfig {
    WordPressConfig {
        api_url: format!("{}/wp-json/wp/v2", server.uri()),
        retries,
        retry_delay: Duration::from_millis(1),
        timeout: Duration::from_secs(5),
        ..WordPressConfig::default()
    }
}

fn wp_post(id: u64, slug: &str, categories: &[(&str, &str)]) -> Value {
    let terms: Vec<Value> = categories
        .iter()
        .map(|(name, slug)| json!({"id": 1, "name": name, "slug": slug, "taxonomy": "category"}))
        .collect();
    json!({
        "id": id,
        "date": "2024-03-01T09:30:00",
        "slug": slug,
        "link": format!("https://example.com/blog/{slug}/"),
        "title": {"rendered": format!("Post {id}")},
        "content": {"rendered": "<p>Body text here.</p>"},
        "excerpt": {"rendered": "<p>Body text here.</p>"},
        "_embedded": {
            "author": [{"id": 1, "name": "Jane Agent", "slug": "jane"}],
            "wp:term": [terms, []]
        }
    })
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

/// Answers every request with `status` and records when it arrived.
struct Timed {
    status: u16,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for Timed {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(self.status)
    }
}

// ─────────────────────── retry policy ───────────────────────

#[tokio::test]
async fn retries_exactly_configured_times_on_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = WordPressClient::new(config(&server, 3));
    let err = client.list_posts(&PostQuery::default()).await.unwrap_err();

    assert!(matches!(err, ContentError::Server { status: 500, .. }));
    assert_eq!(request_count(&server).await, 4);
}

#[tokio::test]
async fn retry_delays_double_each_attempt() {
    let server = MockServer::start().await;
    let arrivals = Arc::new(Mutex::new(Vec::new()));
    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(Timed {
            status: 503,
            arrivals: arrivals.clone(),
        })
        .mount(&server)
        .await;

    let base = Duration::from_millis(60);
    let client = WordPressClient::new(WordPressConfig {
        retry_delay: base,
        ..config(&server, 3)
    });
    let started = Instant::now();
    let err = client.list_posts(&PostQuery::default()).await.unwrap_err();

    assert!(matches!(err, ContentError::Server { status: 503, .. }));
    let arrivals = arrivals.lock().unwrap().clone();
    assert_eq!(arrivals.len(), 4);
    // Gaps follow base, 2*base, 4*base.
    for (n, pair) in arrivals.windows(2).enumerate() {
        let gap = pair[1].duration_since(pair[0]);
        assert!(gap >= base * 2u32.pow(n as u32), "gap {n} was {gap:?}");
    }
    assert!(started.elapsed() >= base * 7);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn slow_upstream_times_out_and_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = WordPressClient::new(WordPressConfig {
        timeout: Duration::from_millis(100),
        ..config(&server, 1)
    });
    let err = client.list_posts(&PostQuery::default()).await.unwrap_err();

    assert!(matches!(err, ContentError::Timeout(_)), "got {err:?}");
    assert!(err.is_retryable());
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn recovers_after_a_timed_out_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([wp_post(9, "late", &[])])))
        .mount(&server)
        .await;

    let client = WordPressClient::new(WordPressConfig {
        timeout: Duration::from_millis(200),
        ..config(&server, 2)
    });
    let posts = client.list_posts(&PostQuery::default()).await.unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].slug, "late");
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn does_not_retry_on_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(ResponseTemplate::new(404).set_body_string("rest_no_route"))
        .mount(&server)
        .await;

    let client = WordPressClient::new(config(&server, 3));
    let err = client.list_posts(&PostQuery::default()).await.unwrap_err();

    assert!(matches!(err, ContentError::Client { status: 404, .. }));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn recovers_when_server_comes_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([wp_post(1, "one", &[])])))
        .mount(&server)
        .await;

    let client = WordPressClient::new(config(&server, 3));
    let posts = client.list_posts(&PostQuery::default()).await.unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn invalid_json_is_parse_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = WordPressClient::new(config(&server, 3));
    let err = client.list_posts(&PostQuery::default()).await.unwrap_err();

    assert!(matches!(err, ContentError::Parse(_)));
    assert_eq!(request_count(&server).await, 1);
}

// ─────────────────────── endpoints ───────────────────────

#[tokio::test]
async fn sends_basic_auth_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(basic_auth("editor", "app pass"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = config(&server, 0);
    cfg.credentials = Some(Credentials {
        username: "editor".to_string(),
        password: "app pass".to_string(),
    });
    let posts = WordPressClient::new(cfg)
        .list_posts(&PostQuery::default())
        .await
        .unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn list_posts_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(query_param("per_page", "5"))
        .and(query_param("page", "2"))
        .and(query_param("order", "desc"))
        .and(query_param("orderby", "date"))
        .and(query_param("categories", "4"))
        .and(query_param("_embed", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([wp_post(9, "nine", &[])])))
        .expect(1)
        .mount(&server)
        .await;

    let query = PostQuery {
        page: 2,
        per_page: 5,
        categories: vec![4],
        ..PostQuery::default()
    };
    let posts = WordPressClient::new(config(&server, 0))
        .list_posts(&query)
        .await
        .unwrap();
    assert_eq!(posts[0].slug, "nine");
}

#[tokio::test]
async fn get_post_by_slug_found_and_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(query_param("slug", "spring-update"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([wp_post(3, "spring-update", &[])])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(query_param("slug", "nope"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = WordPressClient::new(config(&server, 0));
    let found = client.get_post_by_slug("spring-update").await.unwrap();
    assert_eq!(found.unwrap().id, 3);
    assert!(client.get_post_by_slug("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn categories_and_posts_in_category() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CATEGORIES))
        .and(query_param("slug", "market"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 12, "count": 4, "name": "Market", "slug": "market"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CATEGORIES))
        .and(query_param("hide_empty", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 12, "count": 4, "name": "Market", "slug": "market"},
            {"id": 13, "count": 2, "name": "Buying", "slug": "buying"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(query_param("categories", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([wp_post(
            5,
            "rates",
            &[("Market", "market")]
        )])))
        .mount(&server)
        .await;

    let client = WordPressClient::new(config(&server, 0));
    let categories = client
        .list_categories(&CategoryQuery::default())
        .await
        .unwrap();
    assert_eq!(categories.len(), 2);

    let posts = client.list_posts_in_category("market", 10).await.unwrap();
    assert_eq!(posts[0].slug, "rates");
}

#[tokio::test]
async fn posts_in_unknown_category_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CATEGORIES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = WordPressClient::new(config(&server, 0))
        .list_posts_in_category("ghost", 10)
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::NotFound(_)));
}

#[tokio::test]
async fn list_post_slugs_follows_total_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-WP-Total", "3")
                .insert_header("X-WP-TotalPages", "2")
                .set_body_json(json!([wp_post(1, "a", &[]), wp_post(2, "b", &[])])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-WP-Total", "3")
                .insert_header("X-WP-TotalPages", "2")
                .set_body_json(json!([wp_post(3, "c", &[])])),
        )
        .mount(&server)
        .await;

    let slugs = WordPressClient::new(config(&server, 0))
        .list_post_slugs(10)
        .await
        .unwrap();
    assert_eq!(slugs, vec!["a", "b", "c"]);
    assert_eq!(request_count(&server).await, 2);
}

// ─────────────────────── blog service ───────────────────────

#[tokio::test]
async fn blog_service_degrades_to_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = BlogService::new(
        WordPressClient::new(config(&server, 0)),
        Duration::from_secs(3600),
    );
    assert!(service.latest_posts(5).await.is_empty());
    assert!(service.post("anything").await.is_none());
    assert!(service.categories().await.is_empty());
    assert_eq!(service.revalidate_secs(), 3600);
}

#[tokio::test]
async fn blog_service_related_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            wp_post(1, "current", &[("Market", "market")]),
            wp_post(2, "related", &[("Market", "market")]),
            wp_post(3, "unrelated", &[("Selling", "selling")])
        ])))
        .mount(&server)
        .await;

    let service = BlogService::new(
        WordPressClient::new(config(&server, 0)),
        Duration::from_secs(60),
    );
    let latest = service.latest_posts(3).await;
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0].author, "Jane Agent");

    let related = service.related_posts(&latest[0], 3).await;
    let slugs: Vec<&str> = related.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["related"]);
}
