//! Structural validation predicates
//!
//! These mirror the authoring-time rules. Read paths never reject content on
//! their basis; they exist for diagnostics and tooling.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::{Article, Category, HomepageSettings, EXCERPT_MAX_LEN, SLUG_MAX_LEN};

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// A broken authoring-time rule
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be at most {max} characters, got {len}")]
    TooLong {
        field: &'static str,
        max: usize,
        len: usize,
    },

    #[error("{0} is not a valid slug")]
    InvalidSlug(String),

    #[error("{0} must contain at least one entry")]
    Empty(&'static str),
}

/// Check a URL slug: lowercase alphanumeric runs separated by single dashes
pub fn is_valid_slug(slug: &str) -> bool {
    slug.chars().count() <= SLUG_MAX_LEN && SLUG_RE.is_match(slug)
}

/// Derive a slug from a title, capped at the schema's maximum length
pub fn derive_slug(title: &str) -> String {
    let slug = slug::slugify(title);
    if slug.len() <= SLUG_MAX_LEN {
        return slug;
    }
    // slugify output is ASCII, so byte slicing is safe
    slug[..SLUG_MAX_LEN].trim_end_matches('-').to_string()
}

fn check_slug(slug: Option<&str>, violations: &mut Vec<SchemaViolation>) {
    match slug {
        None => violations.push(SchemaViolation::Missing("slug")),
        Some(s) if !is_valid_slug(s) => violations.push(SchemaViolation::InvalidSlug(s.to_string())),
        Some(_) => {}
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|s| s.trim().is_empty()).unwrap_or(true)
}

impl Article {
    /// Report every authoring rule this article breaks
    pub fn validate(&self) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();

        if is_blank(self.title.as_deref()) {
            violations.push(SchemaViolation::Missing("title"));
        }
        check_slug(self.slug.as_deref(), &mut violations);
        if self.published_at.is_none() {
            violations.push(SchemaViolation::Missing("publishedAt"));
        }
        if self.categories.is_empty() && self.category_ids.is_empty() {
            violations.push(SchemaViolation::Empty("categories"));
        }
        if let Some(excerpt) = &self.excerpt {
            let len = excerpt.chars().count();
            if len > EXCERPT_MAX_LEN {
                violations.push(SchemaViolation::TooLong {
                    field: "excerpt",
                    max: EXCERPT_MAX_LEN,
                    len,
                });
            }
        }
        if self.body.is_empty() {
            violations.push(SchemaViolation::Empty("body"));
        }
        if let Some(image) = &self.main_image {
            if image.alt_text().is_none() {
                violations.push(SchemaViolation::Missing("mainImage.alt"));
            }
        }

        violations
    }
}

impl Category {
    pub fn validate(&self) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        if is_blank(self.title.as_deref()) {
            violations.push(SchemaViolation::Missing("title"));
        }
        check_slug(self.slug.as_deref(), &mut violations);
        violations
    }
}

impl HomepageSettings {
    pub fn validate(&self) -> Vec<SchemaViolation> {
        if self.hero_article.is_none() {
            vec![SchemaViolation::Missing("heroArticle")]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ImageRef;
    use serde_json::json;

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("hello-world"));
        assert!(is_valid_slug("2025-trends"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Hello"));
        assert!(!is_valid_slug("double--dash"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug(&"a".repeat(97)));
        assert!(is_valid_slug(&"a".repeat(96)));
    }

    #[test]
    fn test_derive_slug() {
        assert_eq!(derive_slug("Hello, World!"), "hello-world");
        let long = "word ".repeat(40);
        let slug = derive_slug(&long);
        assert!(slug.len() <= 96);
        assert!(!slug.ends_with('-'));
        assert!(is_valid_slug(&slug));
    }

    #[test]
    fn test_article_violations() {
        let article = Article {
            excerpt: Some("x".repeat(501)),
            main_image: Some(ImageRef::default()),
            slug: Some("Bad Slug".to_string()),
            ..Default::default()
        };
        let violations = article.validate();
        assert!(violations.contains(&SchemaViolation::Missing("title")));
        assert!(violations.contains(&SchemaViolation::InvalidSlug("Bad Slug".to_string())));
        assert!(violations.contains(&SchemaViolation::Missing("publishedAt")));
        assert!(violations.contains(&SchemaViolation::Empty("categories")));
        assert!(violations.contains(&SchemaViolation::Empty("body")));
        assert!(violations.contains(&SchemaViolation::Missing("mainImage.alt")));
        assert!(violations.contains(&SchemaViolation::TooLong {
            field: "excerpt",
            max: 500,
            len: 501
        }));
    }

    #[test]
    fn test_valid_article() {
        let article = Article {
            title: Some("Fine".to_string()),
            slug: Some("fine".to_string()),
            published_at: Some(chrono::Utc::now()),
            category_ids: vec!["cat-1".to_string()],
            body: vec![json!({ "_type": "block", "children": [] })],
            ..Default::default()
        };
        assert!(article.validate().is_empty());
    }

    #[test]
    fn test_category_and_settings() {
        let category = Category {
            title: Some("Tech".to_string()),
            slug: Some("tech".to_string()),
            ..Default::default()
        };
        assert!(category.validate().is_empty());
        assert_eq!(
            HomepageSettings::default().validate(),
            vec![SchemaViolation::Missing("heroArticle")]
        );
    }
}
