//! Heuristic extraction of post cards from a blog index page.
//!
//! Tries a fixed list of card selectors in order; the first selector that
//! matches any element decides the card set. Each field then falls back
//! through its own selector list. This is coupled to the target site's
//! markup and does no structural validation beyond "has a title".

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

use crate::text::{calculate_reading_time, collapse_whitespace, slugify, truncate_with_ellipsis};
use crate::types::BlogPost;
use crate::wordpress::helpers::UNKNOWN_AUTHOR;

/// Card selectors, tried in order.
pub const CARD_SELECTORS: &[&str] = &[
    "article",
    ".post",
    ".blog-post",
    ".entry",
    ".post-item",
    r#"[class*="post"]"#,
    ".card",
];

const TITLE_SELECTORS: &[&str] = &[
    ".entry-title",
    ".post-title",
    "h1",
    "h2",
    "h3",
    ".title",
];
const EXCERPT_SELECTORS: &[&str] = &[".excerpt", ".entry-summary", ".post-excerpt", "p"];
const DATE_SELECTORS: &[&str] = &["time", ".date", ".post-date", ".entry-date"];
const AUTHOR_SELECTORS: &[&str] = &[".author", ".byline", ".entry-author"];
const CATEGORY_SELECTORS: &[&str] = &[".cat-links a", ".category a", ".post-category"];

/// Extract up to `max_posts` posts from a blog index page.
pub fn extract_posts(html: &str, page_url: &str, max_posts: usize) -> Vec<BlogPost> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    for raw in CARD_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        let cards: Vec<ElementRef<'_>> = document.select(&selector).collect();
        if cards.is_empty() {
            continue;
        }
        tracing::debug!("scrape: selector '{raw}' matched {} cards", cards.len());

        let mut seen = HashSet::new();
        return cards
            .iter()
            .filter_map(|card| extract_card(card, base.as_ref()))
            .filter(|post| post.original_url.is_empty() || seen.insert(post.original_url.clone()))
            .take(max_posts)
            .collect();
    }

    Vec::new()
}

fn extract_card(card: &ElementRef<'_>, base: Option<&Url>) -> Option<BlogPost> {
    let (title, title_el) = TITLE_SELECTORS.iter().find_map(|raw| {
        let el = first_match(card, raw)?;
        let text = element_text(&el);
        (!text.is_empty()).then_some((text, el))
    })?;

    let href = link_in(&title_el)
        .or_else(|| first_match(card, "a[href]").and_then(|a| a.value().attr("href")))
        .or_else(|| (card.value().name() == "a").then(|| card.value().attr("href")).flatten())
        .map(|h| resolve(h, base))
        .unwrap_or_default();

    let excerpt = EXCERPT_SELECTORS
        .iter()
        .filter_map(|raw| first_match(card, raw))
        .map(|el| element_text(&el))
        .find(|t| !t.is_empty())
        .map(|t| truncate_with_ellipsis(&t, 160))
        .unwrap_or_default();

    let image_el = first_match(card, "img");
    let image = image_el.as_ref().and_then(|img| {
        ["src", "data-src", "data-lazy-src"]
            .iter()
            .filter_map(|attr| img.value().attr(attr))
            .find(|v| !v.trim().is_empty() && !v.starts_with("data:"))
            .map(|v| resolve(v, base))
    });
    let image_alt = image.as_ref().map(|_| {
        image_el
            .as_ref()
            .and_then(|img| img.value().attr("alt"))
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(title.as_str())
            .to_string()
    });

    let date = DATE_SELECTORS
        .iter()
        .filter_map(|raw| first_match(card, raw))
        .map(|el| {
            el.value()
                .attr("datetime")
                .map(|d| d.trim().to_string())
                .unwrap_or_else(|| element_text(&el))
        })
        .find(|d| !d.is_empty())
        .unwrap_or_default();

    let author = AUTHOR_SELECTORS
        .iter()
        .filter_map(|raw| first_match(card, raw))
        .map(|el| element_text(&el))
        .map(|a| a.trim_start_matches("By ").trim_start_matches("by ").to_string())
        .find(|a| !a.is_empty())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    let categories = categories_in(card);
    let slug = slug_for_url(&href).unwrap_or_else(|| slugify(&title));
    let slug = if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    };

    Some(BlogPost {
        id: if href.is_empty() { slug.clone() } else { href.clone() },
        reading_time: calculate_reading_time(&excerpt),
        content: excerpt.clone(),
        title,
        slug,
        excerpt,
        date,
        author,
        image,
        image_alt,
        categories,
        tags: Vec::new(),
        original_url: href,
    })
}

fn first_match<'a>(scope: &ElementRef<'a>, raw: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(raw).ok()?;
    scope.select(&selector).next()
}

fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// `href` of the element itself if it is a link, else of its first link.
fn link_in<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    if el.value().name() == "a" {
        if let Some(href) = el.value().attr("href") {
            return Some(href);
        }
    }
    first_match(el, "a[href]").and_then(|a| a.value().attr("href"))
}

fn categories_in(card: &ElementRef<'_>) -> Vec<String> {
    for raw in CATEGORY_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        let names: Vec<String> = card
            .select(&selector)
            .map(|el| element_text(&el))
            .filter(|t| !t.is_empty())
            .collect();
        if !names.is_empty() {
            return names;
        }
    }
    Vec::new()
}

fn resolve(href: &str, base: Option<&Url>) -> String {
    let href = href.trim();
    match base {
        Some(base) => base
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
        None => href.to_string(),
    }
}

/// Last non-empty path segment of an absolute URL.
fn slug_for_url(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(|s| s.to_string())
}
