//! `realty-content validate-schema <files>`: lint JSON-LD files.
//!
//! Accepts `.json`/`.jsonld` documents and HTML pages; for HTML every
//! `application/ld+json` block is validated separately.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use realty_content::schema::{extract_jsonld_blocks, validate_document, SchemaReport, Severity};
use serde::Serialize;

use super::output::{is_json, is_quiet, print_json};

/// Validation results for one input file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub documents: Vec<SchemaReport>,
}

impl FileReport {
    pub fn error_count(&self) -> usize {
        self.documents.iter().map(SchemaReport::error_count).sum()
    }
}

fn is_html(path: &Path, contents: &str) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("html") | Some("htm")
    ) || contents.trim_start().starts_with('<')
}

/// Validate every JSON-LD document in one file.
pub fn validate_file(path: &Path) -> Result<FileReport> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let documents = if is_html(path, &contents) {
        let blocks = extract_jsonld_blocks(&contents);
        if blocks.is_empty() {
            bail!("{}: no application/ld+json blocks found", path.display());
        }
        blocks
            .into_iter()
            .enumerate()
            .map(|(i, block)| {
                block
                    .map(|value| validate_document(&value))
                    .with_context(|| format!("{}: block {}", path.display(), i + 1))
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        let value: serde_json::Value = serde_json::from_str(&contents)
            .with_context(|| format!("{}: invalid JSON", path.display()))?;
        vec![validate_document(&value)]
    };

    Ok(FileReport {
        path: path.to_path_buf(),
        documents,
    })
}

/// Run the validate-schema command.
pub fn run(paths: &[PathBuf]) -> Result<()> {
    let reports = paths
        .iter()
        .map(|p| validate_file(p))
        .collect::<Result<Vec<_>>>()?;

    if is_json() {
        print_json(&serde_json::to_value(&reports)?);
    } else {
        print!("{}", render(&reports, is_quiet()));
    }

    let failed = reports.iter().filter(|r| r.error_count() > 0).count();
    if failed > 0 {
        bail!("{failed} file(s) failed schema validation");
    }
    Ok(())
}

/// Text report; `quiet` hides warnings.
pub fn render(reports: &[FileReport], quiet: bool) -> String {
    let mut out = String::new();
    for report in reports {
        let errors = report.error_count();
        let nodes: usize = report.documents.iter().map(|d| d.nodes_checked).sum();
        let verdict = if errors == 0 { "valid" } else { "INVALID" };
        out.push_str(&format!(
            "{}: {verdict} ({nodes} nodes, {errors} errors)\n",
            report.path.display()
        ));
        for issue in report.documents.iter().flat_map(|d| &d.issues) {
            if quiet && issue.severity == Severity::Warning {
                continue;
            }
            let tag = match issue.severity {
                Severity::Error => "error",
                Severity::Warning => "warn ",
            };
            out.push_str(&format!("  {tag} {}: {}\n", issue.path, issue.message));
        }
    }
    out
}
