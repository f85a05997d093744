//! Read request objects and their GROQ rendering
//!
//! User-supplied values (slugs, ids) only ever travel as named `$params`.
//! Slice bounds are typed `usize` fields of a [`Window`], so splicing them
//! into the query text cannot inject anything.

use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::Window;
use crate::schema::HOMEPAGE_SETTINGS_ID;

/// Projection of a category
const CATEGORY_PROJECTION: &str = r#"{
  _id,
  title,
  "slug": slug.current,
  description
}"#;

/// Fields every article projection shares
const ARTICLE_CARD_FIELDS: &str = r#"_id,
  title,
  "slug": slug.current,
  mainImage {
    asset->{_id, url, metadata {dimensions}},
    alt
  },
  excerpt,
  publishedAt,
  categories[]->{_id, title, "slug": slug.current}"#;

/// How to identify a category for filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryKey {
    Id(String),
    /// Resolved by sub-query, so listings need not wait for the category
    Slug(String),
}

/// Which articles a collection request covers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ArticleFilter {
    #[default]
    All,
    InCategory(CategoryKey),
}

impl ArticleFilter {
    fn groq(&self) -> &'static str {
        match self {
            ArticleFilter::All => r#"_type == "article""#,
            ArticleFilter::InCategory(CategoryKey::Id(_)) => {
                r#"_type == "article" && references($categoryId)"#
            }
            ArticleFilter::InCategory(CategoryKey::Slug(_)) => {
                r#"_type == "article" && references(*[_type == "category" && slug.current == $categorySlug]._id)"#
            }
        }
    }

    fn bind(&self, params: &mut BTreeMap<String, Value>) {
        match self {
            ArticleFilter::All => {}
            ArticleFilter::InCategory(CategoryKey::Id(id)) => {
                params.insert("categoryId".to_string(), json!(id));
            }
            ArticleFilter::InCategory(CategoryKey::Slug(slug)) => {
                params.insert("categorySlug".to_string(), json!(slug));
            }
        }
    }
}

/// Every read the site performs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRequest {
    /// One article with body and raw category ids, or `null`
    ArticleBySlug { slug: String },
    CategoryBySlug { slug: String },
    /// The singleton settings document with its hero expanded
    HomepageSettings,
    /// A window of articles, newest first
    ArticlePage { filter: ArticleFilter, window: Window },
    ArticleCount { filter: ArticleFilter },
    /// Articles sharing categories with the source, best matches first
    RelatedArticles {
        exclude_slug: String,
        category_ids: Vec<String>,
        limit: usize,
    },
    /// All categories by title
    Categories,
    ArticleSlugs,
    CategorySlugs,
}

impl ContentRequest {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ContentRequest::ArticleBySlug { .. } => "article_by_slug",
            ContentRequest::CategoryBySlug { .. } => "category_by_slug",
            ContentRequest::HomepageSettings => "homepage_settings",
            ContentRequest::ArticlePage { .. } => "article_page",
            ContentRequest::ArticleCount { .. } => "article_count",
            ContentRequest::RelatedArticles { .. } => "related_articles",
            ContentRequest::Categories => "categories",
            ContentRequest::ArticleSlugs => "article_slugs",
            ContentRequest::CategorySlugs => "category_slugs",
        }
    }

    /// Render the request as query text plus named parameters
    pub fn to_query(&self) -> Query {
        let mut params = BTreeMap::new();

        let text = match self {
            ContentRequest::ArticleBySlug { slug } => {
                params.insert("slug".to_string(), json!(slug));
                format!(
                    r#"*[_type == "article" && slug.current == $slug][0] {{
  {},
  body,
  "categoryIds": categories[]._ref
}}"#,
                    ARTICLE_CARD_FIELDS
                )
            }
            ContentRequest::CategoryBySlug { slug } => {
                params.insert("slug".to_string(), json!(slug));
                format!(
                    r#"*[_type == "category" && slug.current == $slug][0] {}"#,
                    CATEGORY_PROJECTION
                )
            }
            ContentRequest::HomepageSettings => {
                params.insert("settingsId".to_string(), json!(HOMEPAGE_SETTINGS_ID));
                format!(
                    r#"*[_type == "homepageSettings" && _id == $settingsId][0] {{
  _id,
  title,
  heroArticle->{{
  {}
  }}
}}"#,
                    ARTICLE_CARD_FIELDS
                )
            }
            ContentRequest::ArticlePage { filter, window } => {
                filter.bind(&mut params);
                format!(
                    "*[{}] | order(publishedAt desc) [{}...{}] {{\n  {}\n}}",
                    filter.groq(),
                    window.offset,
                    window.end(),
                    ARTICLE_CARD_FIELDS
                )
            }
            ContentRequest::ArticleCount { filter } => {
                filter.bind(&mut params);
                format!("count(*[{}])", filter.groq())
            }
            ContentRequest::RelatedArticles {
                exclude_slug,
                category_ids,
                limit,
            } => {
                params.insert("slug".to_string(), json!(exclude_slug));
                params.insert("categoryIds".to_string(), json!(category_ids));
                format!(
                    r#"*[_type == "article" && slug.current != $slug && count((categories[]._ref)[@ in $categoryIds]) > 0]
  | order(count((categories[]._ref)[@ in $categoryIds]) desc, publishedAt desc) [0...{}] {{
  {},
  "categoryIds": categories[]._ref
}}"#,
                    limit, ARTICLE_CARD_FIELDS
                )
            }
            ContentRequest::Categories => format!(
                r#"*[_type == "category"] | order(title asc) {}"#,
                CATEGORY_PROJECTION
            ),
            ContentRequest::ArticleSlugs => {
                r#"*[_type == "article" && defined(slug.current) && !(_id in path("drafts.**"))]{ "slug": slug.current }"#
                    .to_string()
            }
            ContentRequest::CategorySlugs => {
                r#"*[_type == "category" && defined(slug.current) && !(_id in path("drafts.**"))]{ "slug": slug.current }"#
                    .to_string()
            }
        };

        Query {
            text,
            params,
            request: self.clone(),
        }
    }
}

/// A rendered request: query text, named parameters and the structured
/// request it came from (for stores that evaluate requests directly)
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub text: String,
    pub params: BTreeMap<String, Value>,
    request: ContentRequest,
}

impl Query {
    pub fn request(&self) -> &ContentRequest {
        &self.request
    }

    /// Stable identity for caching
    pub fn cache_key(&self) -> String {
        let params = serde_json::to_string(&self.params).unwrap_or_default();
        format!("{}\n{}", self.text, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PageNumber;

    #[test]
    fn test_slug_is_a_parameter() {
        let hostile = r#"x" || true || slug.current == "y"#;
        let query = ContentRequest::ArticleBySlug {
            slug: hostile.to_string(),
        }
        .to_query();
        assert!(!query.text.contains(hostile));
        assert!(query.text.contains("slug.current == $slug"));
        assert_eq!(query.params["slug"], json!(hostile));
    }

    #[test]
    fn test_article_page_window() {
        let window = Window::for_page(PageNumber::new(2), 20).unwrap();
        let query = ContentRequest::ArticlePage {
            filter: ArticleFilter::All,
            window,
        }
        .to_query();
        assert!(query.text.contains("order(publishedAt desc) [20...40]"));
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_category_filters() {
        let by_slug = ContentRequest::ArticleCount {
            filter: ArticleFilter::InCategory(CategoryKey::Slug("tech".to_string())),
        }
        .to_query();
        assert!(by_slug.text.starts_with("count(*["));
        assert!(by_slug.text.contains("slug.current == $categorySlug"));
        assert_eq!(by_slug.params["categorySlug"], json!("tech"));

        let by_id = ContentRequest::ArticleCount {
            filter: ArticleFilter::InCategory(CategoryKey::Id("cat-1".to_string())),
        }
        .to_query();
        assert!(by_id.text.contains("references($categoryId)"));
        assert_eq!(by_id.params["categoryId"], json!("cat-1"));
    }

    #[test]
    fn test_related_query() {
        let query = ContentRequest::RelatedArticles {
            exclude_slug: "source".to_string(),
            category_ids: vec!["a".to_string(), "b".to_string()],
            limit: 3,
        }
        .to_query();
        assert!(query.text.contains("slug.current != $slug"));
        assert!(query.text.contains("[0...3]"));
        assert!(query.text.contains(r#""categoryIds": categories[]._ref"#));
        assert_eq!(query.params["categoryIds"], json!(["a", "b"]));
    }

    #[test]
    fn test_homepage_uses_fixed_id() {
        let query = ContentRequest::HomepageSettings.to_query();
        assert_eq!(query.params["settingsId"], json!("homepageSettings"));
        assert!(query.text.contains("heroArticle->"));
    }

    #[test]
    fn test_cache_key_distinguishes_params() {
        let a = ContentRequest::CategoryBySlug {
            slug: "a".to_string(),
        }
        .to_query();
        let b = ContentRequest::CategoryBySlug {
            slug: "b".to_string(),
        }
        .to_query();
        assert_ne!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), a.clone().cache_key());
        assert_eq!(a.request().name(), "category_by_slug");
    }
}
