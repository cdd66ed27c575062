//! Page-facing blog service over the WordPress client.
//!
//! Pages never fail because the blog is down: every call logs the error
//! and degrades to an empty result. The revalidation TTL is handed to the
//! hosting framework; nothing is cached here.

use std::time::Duration;

use super::helpers::to_blog_post;
use super::WordPressClient;
use crate::types::{BlogPost, CategoryQuery, PostQuery, WordPressCategory};

/// How many recent posts `related_posts` ranks.
const RELATED_CANDIDATES: u32 = 20;

/// Blog data access for page renders.
#[derive(Clone)]
pub struct BlogService {
    client: WordPressClient,
    revalidate: Duration,
}

impl BlogService {
    pub fn new(client: WordPressClient, revalidate: Duration) -> Self {
        Self { client, revalidate }
    }

    /// Revalidation TTL in seconds for the page that renders this data.
    pub fn revalidate_secs(&self) -> u64 {
        self.revalidate.as_secs()
    }

    /// The `limit` newest posts.
    pub async fn latest_posts(&self, limit: u32) -> Vec<BlogPost> {
        let query = PostQuery {
            per_page: limit,
            ..PostQuery::default()
        };
        match self.client.list_posts(&query).await {
            Ok(posts) => posts.iter().map(to_blog_post).collect(),
            Err(e) => {
                tracing::warn!("failed to load latest posts: {e}");
                Vec::new()
            }
        }
    }

    /// A single post by slug.
    pub async fn post(&self, slug: &str) -> Option<BlogPost> {
        match self.client.get_post_by_slug(slug).await {
            Ok(post) => post.as_ref().map(to_blog_post),
            Err(e) => {
                tracing::warn!("failed to load post '{slug}': {e}");
                None
            }
        }
    }

    /// Posts in a category, newest first.
    pub async fn posts_in_category(&self, category_slug: &str, limit: u32) -> Vec<BlogPost> {
        match self.client.list_posts_in_category(category_slug, limit).await {
            Ok(posts) => posts.iter().map(to_blog_post).collect(),
            Err(e) => {
                tracing::warn!("failed to load category '{category_slug}': {e}");
                Vec::new()
            }
        }
    }

    /// Non-empty categories, most used first.
    pub async fn categories(&self) -> Vec<WordPressCategory> {
        match self.client.list_categories(&CategoryQuery::default()).await {
            Ok(categories) => categories,
            Err(e) => {
                tracing::warn!("failed to load categories: {e}");
                Vec::new()
            }
        }
    }

    /// Up to `limit` recent posts sharing categories with `post`.
    pub async fn related_posts(&self, post: &BlogPost, limit: usize) -> Vec<BlogPost> {
        let candidates = self.latest_posts(RELATED_CANDIDATES).await;
        rank_related(post, &candidates, limit)
    }
}

/// Rank candidates by number of categories shared with `post`.
///
/// The post itself and candidates sharing nothing are dropped; ties keep
/// the candidates' original (newest-first) order.
pub fn rank_related(post: &BlogPost, candidates: &[BlogPost], limit: usize) -> Vec<BlogPost> {
    let mut scored: Vec<(usize, &BlogPost)> = candidates
        .iter()
        .filter(|c| c.slug != post.slug)
        .map(|c| {
            let shared = c
                .categories
                .iter()
                .filter(|cat| post.categories.contains(cat))
                .count();
            (shared, c)
        })
        .filter(|(shared, _)| *shared > 0)
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, c)| c.clone())
        .collect()
}
