//! Lint hand-authored JSON-LD structured data against required-field rules
//! for the schema.org types the site publishes.

use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ContentError, ContentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding, located by a JSON-path-like string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaIssue {
    pub path: String,
    pub severity: Severity,
    pub message: String,
}

/// Result of validating one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaReport {
    pub nodes_checked: usize,
    pub issues: Vec<SchemaIssue>,
}

impl SchemaReport {
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }

    fn error(&mut self, path: &str, message: String) {
        self.issues.push(SchemaIssue {
            path: path.to_string(),
            severity: Severity::Error,
            message,
        });
    }

    fn warn(&mut self, path: &str, message: String) {
        self.issues.push(SchemaIssue {
            path: path.to_string(),
            severity: Severity::Warning,
            message,
        });
    }

    fn merge(&mut self, other: SchemaReport) {
        self.nodes_checked += other.nodes_checked;
        self.issues.extend(other.issues);
    }
}

/// Fields that must be present for each known type.
fn required_fields(ld_type: &str) -> Option<&'static [&'static str]> {
    let fields: &'static [&'static str] = match ld_type {
        "RealEstateAgent" => &["name", "url", "telephone", "address"],
        "LocalBusiness" => &["name", "address"],
        "Organization" => &["name", "url"],
        "Person" => &["name"],
        "WebSite" => &["name", "url"],
        "WebPage" | "AboutPage" | "ContactPage" => &["name"],
        "Article" | "BlogPosting" | "NewsArticle" => &["headline", "author", "datePublished"],
        "FAQPage" => &["mainEntity"],
        "Question" => &["name", "acceptedAnswer"],
        "Answer" => &["text"],
        "BreadcrumbList" => &["itemListElement"],
        "ListItem" => &["position", "name"],
        "PostalAddress" => &["streetAddress", "addressLocality", "addressRegion"],
        "Residence" | "SingleFamilyResidence" | "House" | "Apartment" => &["name", "address"],
        "Review" => &["author", "reviewBody"],
        "AggregateRating" => &["ratingValue"],
        "Offer" => &["price", "priceCurrency"],
        "ImageObject" => &["url"],
        _ => return None,
    };
    Some(fields)
}

/// Fields whose absence is only a warning.
fn recommended_fields(ld_type: &str) -> &'static [&'static str] {
    match ld_type {
        "RealEstateAgent" => &["image", "areaServed", "priceRange"],
        "Article" | "BlogPosting" | "NewsArticle" => &["image", "dateModified"],
        "Organization" => &["logo"],
        "LocalBusiness" => &["telephone"],
        _ => &[],
    }
}

/// Keys whose string values must be absolute http(s) URLs.
const URL_KEYS: &[&str] = &["url", "logo", "sameAs", "image"];

/// Parse and validate a JSON-LD document.
pub fn validate_str(json: &str) -> ContentResult<SchemaReport> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ContentError::Parse(format!("invalid JSON-LD: {e}")))?;
    Ok(validate_document(&value))
}

/// Validate a JSON-LD document: a single object, an array of objects, or
/// an object carrying a `@graph`.
pub fn validate_document(value: &Value) -> SchemaReport {
    let mut report = SchemaReport::default();
    match value {
        Value::Array(docs) => {
            for (i, doc) in docs.iter().enumerate() {
                report.merge(validate_root(doc, &format!("[{i}]")));
            }
        }
        _ => report.merge(validate_root(value, "$")),
    }
    report
}

fn validate_root(value: &Value, path: &str) -> SchemaReport {
    let mut report = SchemaReport::default();
    let Some(obj) = value.as_object() else {
        report.error(path, "JSON-LD document must be an object".to_string());
        return report;
    };

    match obj.get("@context") {
        None => report.error(path, "missing @context".to_string()),
        Some(ctx) if !context_is_schema_org(ctx) => {
            report.warn(path, "@context does not reference schema.org".to_string())
        }
        Some(_) => {}
    }

    if let Some(graph) = obj.get("@graph") {
        match graph.as_array() {
            Some(nodes) => {
                for (i, node) in nodes.iter().enumerate() {
                    validate_node(node, &format!("{path}.@graph[{i}]"), &mut report);
                }
            }
            None => report.error(path, "@graph must be an array".to_string()),
        }
    } else {
        validate_node(value, path, &mut report);
    }
    report
}

fn context_is_schema_org(ctx: &Value) -> bool {
    match ctx {
        Value::String(s) => s.contains("schema.org"),
        Value::Array(items) => items.iter().any(context_is_schema_org),
        Value::Object(map) => map.values().any(context_is_schema_org),
        _ => false,
    }
}

fn node_types(value: &Value) -> Vec<String> {
    match value.get("@type") {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(ts)) => ts
            .iter()
            .filter_map(|t| t.as_str().map(|s| s.to_string()))
            .collect(),
        _ => Vec::new(),
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

fn validate_node(value: &Value, path: &str, report: &mut SchemaReport) {
    let Some(obj) = value.as_object() else {
        report.error(path, "node must be an object".to_string());
        return;
    };
    report.nodes_checked += 1;

    let types = node_types(value);
    if types.is_empty() {
        report.error(path, "missing @type".to_string());
    }

    for ld_type in &types {
        match required_fields(ld_type) {
            Some(fields) => {
                for field in fields {
                    if !is_present(obj.get(*field)) {
                        report.error(path, format!("{ld_type} is missing required field '{field}'"));
                    }
                }
                for field in recommended_fields(ld_type) {
                    if !is_present(obj.get(*field)) {
                        report.warn(path, format!("{ld_type} should include '{field}'"));
                    }
                }
            }
            None => report.warn(path, format!("no validation rules for type '{ld_type}'")),
        }
    }

    for (key, child) in obj {
        if key.starts_with('@') {
            continue;
        }
        let child_path = format!("{path}.{key}");
        if URL_KEYS.contains(&key.as_str()) {
            check_urls(child, &child_path, report);
        }
        match child {
            Value::Object(_) if child.get("@type").is_some() => {
                validate_node(child, &child_path, report);
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if item.get("@type").is_some() {
                        validate_node(item, &format!("{child_path}[{i}]"), report);
                    }
                }
            }
            _ => {}
        }
    }
}

fn check_urls(value: &Value, path: &str, report: &mut SchemaReport) {
    match value {
        Value::String(s) => {
            let ok = url::Url::parse(s)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !ok {
                report.error(path, format!("'{s}' is not an absolute http(s) URL"));
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                check_urls(item, &format!("{path}[{i}]"), report);
            }
        }
        _ => {}
    }
}

/// Pull every `<script type="application/ld+json">` block out of a page.
///
/// Blocks that are not valid JSON are returned as parse errors in place.
pub fn extract_jsonld_blocks(html: &str) -> Vec<ContentResult<Value>> {
    let document = Html::parse_document(html);
    let Ok(sel) = Selector::parse(r#"script[type="application/ld+json"]"#) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .map(|el| el.inner_html())
        .filter(|text| !text.trim().is_empty())
        .map(|text| {
            serde_json::from_str::<Value>(text.trim())
                .map_err(|e| ContentError::Parse(format!("invalid JSON-LD block: {e}")))
        })
        .collect()
}
