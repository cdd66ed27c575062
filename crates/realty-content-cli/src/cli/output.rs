//! Output mode flags and shared formatting.
//!
//! `main` exports the global flags as environment variables so every
//! command can check them without threading them through.

use realty_content::BlogPost;
use serde_json::Value;

pub const JSON_VAR: &str = "REALTY_JSON";
pub const QUIET_VAR: &str = "REALTY_QUIET";

pub fn is_json() -> bool {
    std::env::var_os(JSON_VAR).is_some()
}

pub fn is_quiet() -> bool {
    std::env::var_os(QUIET_VAR).is_some()
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("  Error: failed to serialize output: {e}"),
    }
}

/// One-line summary of a post for list output.
pub fn post_line(post: &BlogPost) -> String {
    let date = realty_content::dates::format_date_str(&post.date);
    let mut line = format!("{}  ({}, {} min read)", post.title, post.slug, post.reading_time);
    if !date.is_empty() {
        line.push_str(&format!("  {date}"));
    }
    line
}
