//! Text helpers shared by every content source: HTML stripping, entity
//! decoding, word counts, reading time, and excerpt truncation.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Words per minute used for reading-time estimates.
pub const WORDS_PER_MINUTE: usize = 200;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"))
}

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script\b.*?</script>").expect("script regex is valid"))
}

fn style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<style\b.*?</style>").expect("style regex is valid"))
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});")
            .expect("entity regex is valid")
    })
}

/// Remove tags (and script/style bodies), decode entities, collapse whitespace.
pub fn strip_html(html: &str) -> String {
    let without_scripts = script_re().replace_all(html, " ");
    let without_styles = style_re().replace_all(&without_scripts, " ");
    let text = tag_re().replace_all(&without_styles, " ");
    collapse_whitespace(&decode_entities(&text))
}

/// Decode the HTML entities WordPress commonly emits.
///
/// Unknown named entities are left untouched.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    entity_re()
        .replace_all(text, |caps: &Captures<'_>| {
            let body = &caps[1];
            let decoded = if let Some(hex) = body
                .strip_prefix("#x")
                .or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "trade" => '\u{2122}',
        "bull" => '\u{2022}',
        "middot" => '\u{00B7}',
        _ => return None,
    };
    Some(c)
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of whitespace-separated words after stripping markup.
pub fn word_count(html: &str) -> usize {
    strip_html(html).split_whitespace().count()
}

/// Estimated minutes to read: `ceil(words / 200)`, never below 1.
pub fn calculate_reading_time(html: &str) -> u32 {
    let words = word_count(html);
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Cut `text` to `max_chars` characters, appending `...` only if it was longer.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

/// Lowercase ASCII slug: alphanumerics kept, everything else becomes `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
