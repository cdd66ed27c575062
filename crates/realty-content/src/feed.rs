//! Parse RSS 2.0 feeds into blog posts.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ContentError, ContentResult};
use crate::text::{calculate_reading_time, strip_html, truncate_with_ellipsis};
use crate::types::BlogPost;
use crate::wordpress::helpers::UNKNOWN_AUTHOR;

/// One `<item>` from an RSS feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RssItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
    pub categories: Vec<String>,
    /// `content:encoded`, when the feed carries full bodies.
    pub content: Option<String>,
    /// `dc:creator`.
    pub creator: Option<String>,
    pub guid: Option<String>,
    /// Image from `enclosure`, `media:content` or `media:thumbnail`.
    pub image: Option<String>,
}

/// Parse every `<item>` in an RSS document.
pub fn parse_rss(xml: &str) -> ContentResult<Vec<RssItem>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<RssItem> = None;
    let mut field: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = qualified_name(&e);
                if name == "item" {
                    current = Some(RssItem::default());
                    field = None;
                } else if let Some(item) = current.as_mut() {
                    capture_image(&e, &name, item);
                    field = Some(name);
                    text.clear();
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(item) = current.as_mut() {
                    capture_image(&e, &qualified_name(&e), item);
                }
            }
            Ok(Event::Text(e)) => {
                if field.is_some() {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| ContentError::Parse(format!("RSS text: {err}")))?;
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(e)) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                    field = None;
                } else if field.as_deref() == Some(name.as_str()) {
                    if let Some(item) = current.as_mut() {
                        assign_field(item, &name, text.trim());
                    }
                    field = None;
                    text.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ContentError::Parse(format!(
                    "RSS parse error at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(items)
}

fn qualified_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}

fn capture_image(e: &BytesStart<'_>, name: &str, item: &mut RssItem) {
    if item.image.is_some() {
        return;
    }
    let is_image = match name {
        "enclosure" => attribute(e, "type")
            .map(|t| t.starts_with("image/"))
            .unwrap_or(false),
        "media:content" => attribute(e, "medium").map_or(true, |m| m == "image"),
        "media:thumbnail" => true,
        _ => false,
    };
    if is_image {
        item.image = attribute(e, "url").filter(|u| !u.is_empty());
    }
}

fn assign_field(item: &mut RssItem, name: &str, value: &str) {
    let value = value.to_string();
    match name {
        "title" => item.title = value,
        "link" => item.link = value,
        "description" => item.description = value,
        "pubDate" => item.pub_date = value,
        "category" => {
            if !value.is_empty() {
                item.categories.push(value);
            }
        }
        "content:encoded" => item.content = Some(value),
        "dc:creator" => item.creator = Some(value),
        "guid" => item.guid = Some(value),
        _ => {}
    }
}

/// Slug from a permalink: the second-to-last `/`-separated segment.
///
/// WordPress permalinks end in a slash, so `.../category/my-post/` yields
/// `my-post`. Falls back to `"untitled"`.
pub fn slug_from_link(link: &str) -> String {
    let parts: Vec<&str> = link.split('/').collect();
    parts
        .len()
        .checked_sub(2)
        .and_then(|i| parts.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "untitled".to_string())
}

/// Normalize an RSS item into a [`BlogPost`].
pub fn item_to_post(item: &RssItem) -> BlogPost {
    let title = strip_html(&item.title);
    let body = item
        .content
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(&item.description);
    let author = item
        .creator
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR);

    BlogPost {
        id: item.guid.clone().unwrap_or_else(|| item.link.clone()),
        title: if title.is_empty() {
            "Untitled".to_string()
        } else {
            title
        },
        slug: slug_from_link(&item.link),
        content: body.to_string(),
        excerpt: truncate_with_ellipsis(&strip_html(&item.description), 160),
        date: item.pub_date.clone(),
        author: author.to_string(),
        image: item.image.clone(),
        image_alt: item.image.as_ref().map(|_| strip_html(&item.title)),
        categories: item.categories.clone(),
        tags: Vec::new(),
        original_url: item.link.clone(),
        reading_time: calculate_reading_time(body),
    }
}
