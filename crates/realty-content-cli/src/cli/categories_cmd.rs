//! `realty-content categories`: list blog categories.

use anyhow::{Context, Result};
use realty_content::{CategoryQuery, WordPressCategory, WordPressClient, WordPressConfig};

use super::output::{is_json, print_json};

/// Run the categories command.
pub async fn run(config: &WordPressConfig, include_empty: bool) -> Result<()> {
    let query = CategoryQuery {
        hide_empty: !include_empty,
        ..CategoryQuery::default()
    };
    let categories = WordPressClient::new(config.clone())
        .list_categories(&query)
        .await
        .context("failed to list categories")?;

    if is_json() {
        print_json(&serde_json::to_value(&categories)?);
    } else {
        print!("{}", render(&categories));
    }
    Ok(())
}

pub fn render(categories: &[WordPressCategory]) -> String {
    if categories.is_empty() {
        return "No categories\n".to_string();
    }
    let width = categories
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0);
    categories
        .iter()
        .map(|c| format!("  {:<width$}  {:>4}  {}\n", c.name, c.count, c.slug))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligns_columns() {
        let categories = vec![
            WordPressCategory {
                name: "Market".into(),
                slug: "market".into(),
                count: 12,
                ..Default::default()
            },
            WordPressCategory {
                name: "Buying".into(),
                slug: "buying".into(),
                count: 3,
                ..Default::default()
            },
        ];
        assert_eq!(
            render(&categories),
            "  Market    12  market\n  Buying     3  buying\n"
        );
        assert_eq!(render(&[]), "No categories\n");
    }
}
