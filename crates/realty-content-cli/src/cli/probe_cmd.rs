//! `realty-content probe`: check which content sources are reachable.

use std::time::Duration;

use anyhow::{bail, Result};
use realty_content::fetcher::{probe_sources, SourceProbe};
use realty_content::http::HttpClient;
use realty_content::{BlogFetcher, FetcherConfig};

use super::output::{is_json, print_json};

/// Run the probe command.
pub async fn run(config: &FetcherConfig, timeout_ms: u64) -> Result<()> {
    let fetcher = BlogFetcher::new(config);
    let http = HttpClient::new(&config.wordpress.user_agent);
    let probes = probe_sources(&fetcher, &http, Duration::from_millis(timeout_ms)).await;

    if is_json() {
        print_json(&serde_json::to_value(&probes)?);
    } else {
        print!("{}", render(&probes));
    }

    if !probes.iter().any(SourceProbe::is_reachable) {
        bail!("no content source is reachable");
    }
    Ok(())
}

pub fn render(probes: &[SourceProbe]) -> String {
    probes
        .iter()
        .map(|p| {
            let status = match (p.status, &p.error) {
                (Some(code), _) => code.to_string(),
                (None, Some(e)) => format!("error: {e}"),
                (None, None) => "unknown".to_string(),
            };
            let mark = if p.is_reachable() { "ok " } else { "!! " };
            let kind = p
                .content_type
                .as_deref()
                .map(|ct| format!("  [{ct}]"))
                .unwrap_or_default();
            format!("  {mark}{:<9} {}  {status}{kind}\n", p.source.as_str(), p.url)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use realty_content::PostSource;

    #[test]
    fn test_render_marks_unreachable() {
        let probes = vec![
            SourceProbe {
                source: PostSource::Api,
                url: "https://example.com/wp-json/wp/v2/posts".into(),
                status: Some(200),
                content_type: Some("application/json; charset=UTF-8".into()),
                error: None,
            },
            SourceProbe {
                source: PostSource::Rss,
                url: "https://example.com/feed/".into(),
                status: None,
                content_type: None,
                error: Some("timed out".into()),
            },
        ];
        let out = render(&probes);
        assert!(out.contains("ok api"));
        assert!(out.contains("!! rss"));
        assert!(out.contains("error: timed out"));
        assert!(out.contains("200  [application/json; charset=UTF-8]"));
        assert!(!out.lines().nth(1).unwrap().contains('['));
    }
}
