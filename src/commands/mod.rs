//! CLI subcommands

pub mod list;
pub mod render;
pub mod serve;
pub mod show;

use crate::schema::{derive_slug, SchemaViolation};

/// Log each violation for `subject`
pub(crate) fn report_violations(
    subject: &str,
    title: Option<&str>,
    violations: &[SchemaViolation],
) {
    for violation in violations {
        tracing::warn!("{}: {}", subject, violation);
    }
    if let Some(slug) = slug_suggestion(title, violations) {
        tracing::warn!("{}: a valid slug would be {:?}", subject, slug);
    }
}

/// A slug derived from the title when the stored one is missing or invalid
fn slug_suggestion(title: Option<&str>, violations: &[SchemaViolation]) -> Option<String> {
    let broken = violations.iter().any(|v| {
        matches!(
            v,
            SchemaViolation::InvalidSlug(_) | SchemaViolation::Missing("slug")
        )
    });
    if !broken {
        return None;
    }
    Some(derive_slug(title?)).filter(|slug| !slug.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_suggestion() {
        let invalid = vec![SchemaViolation::InvalidSlug("Hello World".to_string())];
        assert_eq!(
            slug_suggestion(Some("Hello, World!"), &invalid).as_deref(),
            Some("hello-world")
        );
        assert_eq!(
            slug_suggestion(Some("Tech"), &[SchemaViolation::Missing("slug")]).as_deref(),
            Some("tech")
        );
        assert_eq!(slug_suggestion(None, &invalid), None);
        assert_eq!(
            slug_suggestion(Some("Fine"), &[SchemaViolation::Missing("title")]),
            None
        );
    }
}
