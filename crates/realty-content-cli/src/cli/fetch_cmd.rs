//! `realty-content fetch`: fetch posts through the fallback chain.

use anyhow::{Context, Result};
use realty_content::{BlogFetcher, FetchReport, FetcherConfig, PostSource};

use super::output::{is_json, print_json, post_line};

/// Run the fetch command.
pub async fn run(config: &FetcherConfig, source: PostSource, max_posts: usize) -> Result<()> {
    let fetcher = BlogFetcher::new(config);
    let report = fetcher
        .fetch_with_report(source, max_posts)
        .await
        .with_context(|| format!("failed to fetch posts (source: {source})"))?;

    if is_json() {
        print_json(&serde_json::to_value(&report)?);
    } else {
        print!("{}", render(&report));
    }
    Ok(())
}

/// Human-readable listing of a fetch result.
pub fn render(report: &FetchReport) -> String {
    let mut out = format!(
        "{} posts via {} ({} source(s) tried)\n",
        report.posts.len(),
        report.source,
        report.attempts
    );
    for (i, post) in report.posts.iter().enumerate() {
        out.push_str(&format!("  {:>2}. {}\n", i + 1, post_line(post)));
    }
    out
}
