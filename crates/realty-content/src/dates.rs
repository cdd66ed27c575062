//! Date parsing and display for post timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse the date formats the content sources emit.
///
/// WordPress `date` is a naive local timestamp (`2024-03-01T09:30:00`),
/// `date_gmt` and scraped `<time datetime>` are usually RFC 3339, and RSS
/// `pubDate` is RFC 2822. Naive timestamps are taken as UTC.
pub fn parse_post_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// "January 5, 2024".
pub fn format_long_date(dt: &DateTime<Utc>) -> String {
    dt.format("%B %-d, %Y").to_string()
}

/// Human relative time ("3 days ago"); older than 30 days, or in the
/// future, falls back to the long date.
pub fn format_relative(dt: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let secs = (*now - *dt).num_seconds();
    if secs < 0 {
        return format_long_date(dt);
    }
    let (n, unit) = match secs {
        0..=59 => return "just now".to_string(),
        60..=3_599 => (secs / 60, "minute"),
        3_600..=86_399 => (secs / 3_600, "hour"),
        86_400..=2_591_999 => (secs / 86_400, "day"),
        _ => return format_long_date(dt),
    };
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Long-format a raw date string, returning it unchanged if unparseable.
pub fn format_date_str(raw: &str) -> String {
    parse_post_date(raw)
        .map(|dt| format_long_date(&dt))
        .unwrap_or_else(|| raw.to_string())
}
