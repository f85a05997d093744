//! Embedded site templates using the Tera template engine
//!
//! Templates are compiled into the binary. Autoescaping stays on; rendered
//! article bodies are passed through `safe`.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

/// Template renderer with the embedded site theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Same escaping as the rich-text renderer; keeps `/` in paths readable
        tera.set_escape_fn(crate::helpers::html_escape);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("article.html", include_str!("site/article.html")),
            ("category.html", include_str!("site/category.html")),
            ("status.html", include_str!("site/status.html")),
            // Partials
            ("partials/card.html", include_str!("site/partials/card.html")),
            (
                "partials/pager.html",
                include_str!("site/partials/pager.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };
    Ok(tera::Value::String(crate::helpers::truncate(
        &s,
        length,
        Some(&omission),
    )))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub url: String,
    pub language: String,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavCategory {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageData {
    pub url: String,
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardData {
    pub title: String,
    pub path: String,
    pub excerpt: String,
    pub date: Option<String>,
    pub date_xml: Option<String>,
    pub categories: Vec<NavCategory>,
    pub image: Option<ImageData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleData {
    pub title: String,
    pub date: Option<String>,
    pub date_xml: Option<String>,
    pub categories: Vec<NavCategory>,
    pub image: Option<ImageData>,
    /// Rendered body, or `None` when the article has no renderable content
    pub content: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub current: usize,
    pub total: usize,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusData {
    pub code: u16,
    pub heading: String,
    pub message: String,
}
