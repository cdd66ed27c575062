//! `realty-content post <slug>`, `related <slug>`, and `slugs`.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use realty_content::wordpress::{
    format_post_date, relative_post_date, to_blog_post, BlogService, WordPressClient,
};
use realty_content::{FetcherConfig, WordPressConfig, WordPressPost};

use super::output::{is_json, print_json, post_line};

/// Show a single post.
pub async fn run(config: &WordPressConfig, slug: &str) -> Result<()> {
    let client = WordPressClient::new(config.clone());
    let post = client
        .get_post_by_slug(slug)
        .await
        .with_context(|| format!("failed to load post '{slug}'"))?;
    let Some(post) = post else {
        bail!("no post with slug '{slug}'");
    };

    if is_json() {
        print_json(&serde_json::to_value(to_blog_post(&post))?);
    } else {
        print!("{}", render(&post));
    }
    Ok(())
}

/// Detail view of a post.
pub fn render(post: &WordPressPost) -> String {
    let blog = to_blog_post(post);
    let mut out = format!("{}\n", blog.title);
    out.push_str(&format!(
        "  {} ({}) by {}\n",
        format_post_date(post),
        relative_post_date(post, &Utc::now()),
        blog.author
    ));
    if !blog.categories.is_empty() {
        out.push_str(&format!("  Categories: {}\n", blog.categories.join(", ")));
    }
    if !blog.tags.is_empty() {
        out.push_str(&format!("  Tags: {}\n", blog.tags.join(", ")));
    }
    out.push_str(&format!("  {} min read\n", blog.reading_time));
    if !blog.original_url.is_empty() {
        out.push_str(&format!("  {}\n", blog.original_url));
    }
    if !blog.excerpt.is_empty() {
        out.push_str(&format!("\n  {}\n", blog.excerpt));
    }
    out
}

/// Posts sharing categories with the given one.
pub async fn run_related(config: &FetcherConfig, slug: &str, limit: usize) -> Result<()> {
    let service = BlogService::new(
        WordPressClient::new(config.wordpress.clone()),
        config.revalidate,
    );
    let Some(post) = service.post(slug).await else {
        bail!("no post with slug '{slug}'");
    };
    let related = service.related_posts(&post, limit).await;

    if is_json() {
        print_json(&serde_json::json!({
            "post": post.slug,
            "revalidate": service.revalidate_secs(),
            "related": related,
        }));
    } else if related.is_empty() {
        println!("No related posts for '{slug}'");
    } else {
        println!("Related to {}:", post.title);
        for p in &related {
            println!("  - {}", post_line(p));
        }
    }
    Ok(())
}

/// Every published slug.
pub async fn run_slugs(config: &WordPressConfig, max_pages: u32) -> Result<()> {
    let client = WordPressClient::new(config.clone());
    let slugs = client
        .list_post_slugs(max_pages)
        .await
        .context("failed to list post slugs")?;

    if is_json() {
        print_json(&serde_json::to_value(&slugs)?);
    } else {
        for slug in &slugs {
            println!("{slug}");
        }
    }
    Ok(())
}
