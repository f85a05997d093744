//! Related-content ranking
//!
//! Candidates share at least one category with the source article. They are
//! ordered by the number of shared categories, then by publication time,
//! newest first; remaining ties keep the store's order. Counts are raw, not
//! weighted by how common a category is.

use std::collections::HashSet;

use crate::schema::Article;

/// Rank `candidates` against the source article's category ids and keep the
/// top `limit`. An empty source set yields nothing.
pub fn rank_related(
    source_categories: &[String],
    exclude_slug: &str,
    candidates: Vec<Article>,
    limit: usize,
) -> Vec<Article> {
    if source_categories.is_empty() || limit == 0 {
        return Vec::new();
    }
    let wanted: HashSet<&str> = source_categories.iter().map(String::as_str).collect();

    let mut scored: Vec<(usize, Article)> = candidates
        .into_iter()
        .filter(|a| a.slug.as_deref() != Some(exclude_slug))
        .filter_map(|a| {
            let shared = shared_categories(&wanted, &a);
            (shared > 0).then_some((shared, a))
        })
        .collect();

    // sort_by is stable, so equal keys keep store order
    scored.sort_by(|(shared_a, a), (shared_b, b)| {
        shared_b
            .cmp(shared_a)
            .then_with(|| b.published_at.cmp(&a.published_at))
    });

    scored.into_iter().take(limit).map(|(_, a)| a).collect()
}

/// Number of distinct categories of `article` found in `wanted`
pub fn shared_categories(wanted: &HashSet<&str>, article: &Article) -> usize {
    let keys = article.category_keys();
    let own: HashSet<&str> = keys.iter().map(String::as_str).collect();
    own.intersection(wanted).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn article(slug: &str, categories: &[&str], day: u32) -> Article {
        Article {
            slug: Some(slug.to_string()),
            category_ids: categories.iter().map(|c| c.to_string()).collect(),
            published_at: Some(Utc.with_ymd_and_hms(2025, 1, day, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn slugs(articles: &[Article]) -> Vec<&str> {
        articles.iter().filter_map(|a| a.slug.as_deref()).collect()
    }

    fn source() -> Vec<String> {
        vec!["tech".to_string(), "ai".to_string()]
    }

    #[test]
    fn test_shared_count_beats_recency() {
        let ranked = rank_related(
            &source(),
            "src",
            vec![
                article("newer-one-shared", &["tech"], 30),
                article("older-two-shared", &["tech", "ai"], 1),
            ],
            3,
        );
        assert_eq!(slugs(&ranked), vec!["older-two-shared", "newer-one-shared"]);
    }

    #[test]
    fn test_recency_breaks_ties() {
        let ranked = rank_related(
            &source(),
            "src",
            vec![
                article("old", &["tech"], 2),
                article("new", &["ai"], 9),
                article("oldest", &["tech"], 1),
            ],
            3,
        );
        assert_eq!(slugs(&ranked), vec!["new", "old", "oldest"]);
    }

    #[test]
    fn test_excludes_source_and_unrelated() {
        let ranked = rank_related(
            &source(),
            "src",
            vec![
                article("src", &["tech", "ai"], 5),
                article("sports", &["sports"], 6),
                article("ok", &["ai", "sports"], 7),
            ],
            3,
        );
        assert_eq!(slugs(&ranked), vec!["ok"]);
    }

    #[test]
    fn test_limit_and_duplicate_categories() {
        let ranked = rank_related(
            &source(),
            "src",
            vec![
                article("dup", &["tech", "tech", "tech"], 10),
                article("both", &["tech", "ai"], 1),
                article("third", &["ai"], 3),
            ],
            2,
        );
        assert_eq!(slugs(&ranked), vec!["both", "dup"]);
    }

    #[test]
    fn test_empty_source_has_no_fallback() {
        let ranked = rank_related(&[], "src", vec![article("recent", &["tech"], 30)], 3);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let candidates = vec![
            article("a", &["tech"], 5),
            article("b", &["tech"], 5),
            article("c", &["tech", "ai"], 5),
        ];
        let first = rank_related(&source(), "src", candidates.clone(), 3);
        let second = rank_related(&source(), "src", candidates, 3);
        assert_eq!(first, second);
        assert_eq!(slugs(&first), vec!["c", "a", "b"]);
    }
}
