//! Pure view helpers over already-fetched WordPress posts.

use chrono::{DateTime, Utc};

use crate::dates::{format_date_str, format_relative, parse_post_date};
use crate::text::{calculate_reading_time, decode_entities, strip_html, truncate_with_ellipsis};
use crate::types::{BlogPost, WordPressPost};

/// Shown when a post has no embedded author.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// A post's featured image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturedImage {
    pub url: String,
    pub alt: String,
}

/// Plain-text title with entities decoded.
pub fn post_title(post: &WordPressPost) -> String {
    let title = strip_html(&post.title.rendered);
    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title
    }
}

/// Plain-text excerpt of at most `max_len` characters.
///
/// Uses the rendered excerpt, or the body when the excerpt is empty. The
/// ellipsis is only appended when the text had to be cut.
pub fn excerpt(post: &WordPressPost, max_len: usize) -> String {
    let mut text = strip_html(&post.excerpt.rendered);
    if text.is_empty() {
        text = strip_html(&post.content.rendered);
    }
    truncate_with_ellipsis(&text, max_len)
}

/// Display name of the embedded author.
pub fn author_name(post: &WordPressPost) -> String {
    post.embedded
        .as_ref()
        .and_then(|e| e.author.first())
        .map(|a| decode_entities(a.name.trim()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

/// Embedded featured image; the alt text falls back to the post title.
pub fn featured_image(post: &WordPressPost) -> Option<FeaturedImage> {
    let media = post.embedded.as_ref()?.featured_media.first()?;
    if media.source_url.trim().is_empty() {
        return None;
    }
    let alt = if media.alt_text.trim().is_empty() {
        post_title(post)
    } else {
        decode_entities(media.alt_text.trim())
    };
    Some(FeaturedImage {
        url: media.source_url.clone(),
        alt,
    })
}

fn term_names(post: &WordPressPost, taxonomy: &str) -> Vec<String> {
    post.embedded
        .as_ref()
        .map(|e| {
            e.terms
                .iter()
                .flatten()
                .filter(|t| t.taxonomy == taxonomy)
                .map(|t| decode_entities(&t.name))
                .collect()
        })
        .unwrap_or_default()
}

/// Names of the post's embedded categories.
pub fn post_category_names(post: &WordPressPost) -> Vec<String> {
    term_names(post, "category")
}

/// Names of the post's embedded tags.
pub fn post_tag_names(post: &WordPressPost) -> Vec<String> {
    term_names(post, "post_tag")
}

/// Minutes to read the post body.
pub fn reading_time(post: &WordPressPost) -> u32 {
    calculate_reading_time(&post.content.rendered)
}

/// "January 5, 2024"; the raw value if it cannot be parsed.
pub fn format_post_date(post: &WordPressPost) -> String {
    format_date_str(&post.date)
}

/// "3 days ago", relative to `now`.
pub fn relative_post_date(post: &WordPressPost, now: &DateTime<Utc>) -> String {
    let raw = post.date_gmt.as_deref().unwrap_or(&post.date);
    match parse_post_date(raw).or_else(|| parse_post_date(&post.date)) {
        Some(dt) => format_relative(&dt, now),
        None => post.date.clone(),
    }
}

/// Normalize a REST post into a [`BlogPost`].
pub fn to_blog_post(post: &WordPressPost) -> BlogPost {
    let image = featured_image(post);
    let slug = if post.slug.trim().is_empty() {
        "untitled".to_string()
    } else {
        post.slug.clone()
    };
    BlogPost {
        id: post.id.to_string(),
        title: post_title(post),
        slug,
        content: post.content.rendered.clone(),
        excerpt: excerpt(post, 160),
        date: post.date.clone(),
        author: author_name(post),
        image_alt: image.as_ref().map(|i| i.alt.clone()),
        image: image.map(|i| i.url),
        categories: post_category_names(post),
        tags: post_tag_names(post),
        original_url: post.link.clone(),
        reading_time: reading_time(post),
    }
}
