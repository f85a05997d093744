//! In-process content store
//!
//! Holds raw documents (as exported from the content lake) and evaluates
//! structured requests with the same projection shapes the GROQ queries
//! produce. References to missing documents expand to `null`. Insertion
//! order is the natural order used to break ordering ties.

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use super::ContentStore;
use crate::error::StoreError;
use crate::query::{rank_related, ArticleFilter, CategoryKey, ContentRequest, Query};
use crate::schema::lenient::{decode_list, parse_timestamp};
use crate::schema::{Article, HOMEPAGE_SETTINGS_ID};

/// Documents keyed by `_id`
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: IndexMap<String, Value>,
}

impl MemoryStore {
    pub fn new(documents: Vec<Value>) -> Self {
        let mut store = Self::default();
        for doc in documents {
            store.insert(doc);
        }
        store
    }

    /// Parse a JSON array of documents or an NDJSON export
    pub fn from_json(content: &str) -> Result<Self> {
        let trimmed = content.trim_start();
        let documents = if trimmed.starts_with('[') {
            serde_json::from_str::<Vec<Value>>(trimmed)?
        } else {
            trimmed
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(serde_json::from_str::<Value>)
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        Ok(Self::new(documents))
    }

    /// Load a dataset file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let store = Self::from_json(&content)?;
        tracing::info!(
            "Loaded {} documents from {:?}",
            store.len(),
            path.as_ref()
        );
        Ok(store)
    }

    /// Add or replace a document; documents without `_id` are ignored
    pub fn insert(&mut self, doc: Value) {
        match doc.get("_id").and_then(Value::as_str) {
            Some(id) => {
                self.docs.insert(id.to_string(), doc);
            }
            None => tracing::warn!("Skipping document without _id"),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Value> {
        self.docs.shift_remove(id)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Evaluate a request against the documents
    pub fn evaluate(&self, request: &ContentRequest) -> Value {
        match request {
            ContentRequest::ArticleBySlug { slug } => self
                .of_type("article")
                .find(|doc| slug_of(doc) == Some(slug.as_str()))
                .map(|doc| self.project_article(doc, true))
                .unwrap_or(Value::Null),
            ContentRequest::CategoryBySlug { slug } => self
                .of_type("category")
                .find(|doc| slug_of(doc) == Some(slug.as_str()))
                .map(project_category)
                .unwrap_or(Value::Null),
            ContentRequest::HomepageSettings => self.homepage_settings(),
            ContentRequest::ArticlePage { filter, window } => {
                let articles = self.ordered_articles(filter);
                let start = window.offset.min(articles.len());
                let end = window.end().min(articles.len());
                Value::Array(
                    articles[start..end]
                        .iter()
                        .map(|doc| self.project_article(doc, false))
                        .collect(),
                )
            }
            ContentRequest::ArticleCount { filter } => {
                json!(self.of_type("article").filter(|d| self.matches(filter, d)).count())
            }
            ContentRequest::RelatedArticles {
                exclude_slug,
                category_ids,
                limit,
            } => self.related(exclude_slug, category_ids, *limit),
            ContentRequest::Categories => {
                let mut categories: Vec<&Value> = self.of_type("category").collect();
                categories.sort_by(|a, b| str_field(a, "title").cmp(&str_field(b, "title")));
                Value::Array(categories.into_iter().map(project_category).collect())
            }
            ContentRequest::ArticleSlugs => self.slugs("article"),
            ContentRequest::CategorySlugs => self.slugs("category"),
        }
    }

    /// Published documents of one type, in natural order
    fn of_type<'a>(&'a self, doc_type: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.docs
            .iter()
            .filter(|(id, _)| !id.starts_with("drafts."))
            .map(|(_, doc)| doc)
            .filter(move |doc| str_field(doc, "_type") == Some(doc_type))
    }

    fn deref(&self, reference: &Value) -> Option<&Value> {
        let id = reference.get("_ref").and_then(Value::as_str)?;
        self.docs.get(id)
    }

    fn matches(&self, filter: &ArticleFilter, doc: &Value) -> bool {
        match filter {
            ArticleFilter::All => true,
            ArticleFilter::InCategory(CategoryKey::Id(id)) => {
                category_refs(doc).contains(&id.as_str())
            }
            ArticleFilter::InCategory(CategoryKey::Slug(slug)) => {
                let ids: Vec<&str> = self
                    .of_type("category")
                    .filter(|c| slug_of(c) == Some(slug.as_str()))
                    .filter_map(|c| str_field(c, "_id"))
                    .collect();
                category_refs(doc).iter().any(|r| ids.contains(r))
            }
        }
    }

    /// Matching articles, newest first; undated ones last; ties keep
    /// insertion order
    fn ordered_articles(&self, filter: &ArticleFilter) -> Vec<&Value> {
        let mut articles: Vec<&Value> = self
            .of_type("article")
            .filter(|doc| self.matches(filter, doc))
            .collect();
        articles.sort_by(|a, b| {
            let a = str_field(a, "publishedAt").and_then(parse_timestamp);
            let b = str_field(b, "publishedAt").and_then(parse_timestamp);
            match (a, b) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
        articles
    }

    fn related(&self, exclude_slug: &str, category_ids: &[String], limit: usize) -> Value {
        let candidates: Vec<Value> = self
            .of_type("article")
            .filter(|doc| slug_of(doc) != Some(exclude_slug))
            .map(|doc| {
                let mut projected = self.project_article(doc, false);
                if let Value::Object(map) = &mut projected {
                    map.insert("categoryIds".to_string(), json!(category_refs(doc)));
                }
                projected
            })
            .collect();
        let candidates: Vec<Article> = decode_list(Value::Array(candidates), "article");
        let ranked = rank_related(category_ids, exclude_slug, candidates, limit);
        serde_json::to_value(ranked).unwrap_or(Value::Array(Vec::new()))
    }

    fn homepage_settings(&self) -> Value {
        let Some(doc) = self
            .docs
            .get(HOMEPAGE_SETTINGS_ID)
            .filter(|d| str_field(d, "_type") == Some("homepageSettings"))
        else {
            return Value::Null;
        };
        let hero = doc
            .get("heroArticle")
            .and_then(|r| self.deref(r))
            .filter(|d| str_field(d, "_type") == Some("article"))
            .map(|d| self.project_article(d, false))
            .unwrap_or(Value::Null);
        json!({
            "_id": field(doc, "_id"),
            "title": field(doc, "title"),
            "heroArticle": hero,
        })
    }

    fn slugs(&self, doc_type: &str) -> Value {
        Value::Array(
            self.of_type(doc_type)
                .filter_map(slug_of)
                .map(|slug| json!({ "slug": slug }))
                .collect(),
        )
    }

    fn project_article(&self, doc: &Value, full: bool) -> Value {
        let categories: Vec<Value> = doc
            .get("categories")
            .and_then(Value::as_array)
            .map(|refs| {
                refs.iter()
                    .map(|r| self.deref(r).map(project_category).unwrap_or(Value::Null))
                    .collect()
            })
            .unwrap_or_default();

        let mut out = Map::new();
        out.insert("_id".to_string(), field(doc, "_id"));
        out.insert("title".to_string(), field(doc, "title"));
        out.insert("slug".to_string(), json!(slug_of(doc)));
        out.insert("mainImage".to_string(), self.project_image(doc.get("mainImage")));
        out.insert("excerpt".to_string(), field(doc, "excerpt"));
        out.insert("publishedAt".to_string(), field(doc, "publishedAt"));
        out.insert("categories".to_string(), Value::Array(categories));
        if full {
            out.insert("body".to_string(), field(doc, "body"));
            out.insert("categoryIds".to_string(), json!(category_refs(doc)));
        }
        Value::Object(out)
    }

    fn project_image(&self, image: Option<&Value>) -> Value {
        let Some(image) = image.filter(|i| i.is_object()) else {
            return Value::Null;
        };
        let asset = image
            .get("asset")
            .and_then(|r| self.deref(r))
            .map(|asset| {
                json!({
                    "_id": field(asset, "_id"),
                    "url": field(asset, "url"),
                    "metadata": {
                        "dimensions": asset.pointer("/metadata/dimensions").cloned().unwrap_or(Value::Null)
                    }
                })
            })
            .unwrap_or(Value::Null);
        json!({ "asset": asset, "alt": field(image, "alt") })
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch(&self, query: &Query) -> Result<Value, StoreError> {
        Ok(self.evaluate(query.request()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

fn field(doc: &Value, name: &str) -> Value {
    doc.get(name).cloned().unwrap_or(Value::Null)
}

fn str_field<'a>(doc: &'a Value, name: &str) -> Option<&'a str> {
    doc.get(name).and_then(Value::as_str)
}

fn slug_of(doc: &Value) -> Option<&str> {
    doc.pointer("/slug/current").and_then(Value::as_str)
}

fn category_refs(doc: &Value) -> Vec<&str> {
    doc.get("categories")
        .and_then(Value::as_array)
        .map(|refs| {
            refs.iter()
                .filter_map(|r| r.get("_ref").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

fn project_category(doc: &Value) -> Value {
    json!({
        "_id": field(doc, "_id"),
        "title": field(doc, "title"),
        "slug": slug_of(doc),
        "description": field(doc, "description"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{PageNumber, Window};

    fn dataset() -> MemoryStore {
        MemoryStore::new(vec![
            json!({ "_id": "cat-tech", "_type": "category", "title": "Tech", "slug": { "current": "tech" } }),
            json!({ "_id": "cat-art", "_type": "category", "title": "Art", "slug": { "current": "art" } }),
            json!({ "_id": "image-a", "_type": "sanity.imageAsset", "url": "https://cdn/a.jpg",
                    "metadata": { "dimensions": { "width": 10, "height": 5 } } }),
            json!({ "_id": "a1", "_type": "article", "title": "One", "slug": { "current": "one" },
                    "publishedAt": "2025-01-01T00:00:00Z",
                    "mainImage": { "asset": { "_ref": "image-a" }, "alt": "pic" },
                    "categories": [{ "_ref": "cat-tech" }, { "_ref": "cat-gone" }],
                    "body": [{ "_type": "block", "children": [] }] }),
            json!({ "_id": "a2", "_type": "article", "title": "Two", "slug": { "current": "two" },
                    "publishedAt": "2025-03-01T00:00:00Z", "categories": [{ "_ref": "cat-art" }] }),
            json!({ "_id": "drafts.a3", "_type": "article", "title": "Draft", "slug": { "current": "draft" } }),
            json!({ "_id": "homepageSettings", "_type": "homepageSettings", "title": "Home",
                    "heroArticle": { "_ref": "a2" } }),
        ])
    }

    #[test]
    fn test_article_by_slug_projection() {
        let value = dataset().evaluate(&ContentRequest::ArticleBySlug {
            slug: "one".to_string(),
        });
        assert_eq!(value["slug"], "one");
        assert_eq!(value["categories"][0]["slug"], "tech");
        assert!(value["categories"][1].is_null());
        assert_eq!(value["categoryIds"], json!(["cat-tech", "cat-gone"]));
        assert_eq!(value["mainImage"]["asset"]["url"], "https://cdn/a.jpg");
        assert_eq!(value["body"].as_array().unwrap().len(), 1);

        let missing = dataset().evaluate(&ContentRequest::ArticleBySlug {
            slug: "nope".to_string(),
        });
        assert!(missing.is_null());
    }

    #[test]
    fn test_drafts_are_hidden() {
        let store = dataset();
        assert_eq!(
            store.evaluate(&ContentRequest::ArticleCount {
                filter: ArticleFilter::All
            }),
            json!(2)
        );
        assert_eq!(
            store.evaluate(&ContentRequest::ArticleSlugs),
            json!([{ "slug": "one" }, { "slug": "two" }])
        );
    }

    #[test]
    fn test_page_is_newest_first() {
        let window = Window::for_page(PageNumber::FIRST, 1).unwrap();
        let value = dataset().evaluate(&ContentRequest::ArticlePage {
            filter: ArticleFilter::All,
            window,
        });
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["slug"], "two");
        assert!(value[0].get("body").is_none());
    }

    #[test]
    fn test_category_filter_by_slug_and_id() {
        let store = dataset();
        let by_slug = store.evaluate(&ContentRequest::ArticleCount {
            filter: ArticleFilter::InCategory(CategoryKey::Slug("tech".to_string())),
        });
        let by_id = store.evaluate(&ContentRequest::ArticleCount {
            filter: ArticleFilter::InCategory(CategoryKey::Id("cat-art".to_string())),
        });
        assert_eq!((by_slug, by_id), (json!(1), json!(1)));
    }

    #[test]
    fn test_homepage_hero_and_dangling() {
        let mut store = dataset();
        let value = store.evaluate(&ContentRequest::HomepageSettings);
        assert_eq!(value["heroArticle"]["slug"], "two");

        store.remove("a2");
        let value = store.evaluate(&ContentRequest::HomepageSettings);
        assert!(value["heroArticle"].is_null());
        assert_eq!(value["title"], "Home");
    }

    #[test]
    fn test_categories_sorted_by_title() {
        let value = dataset().evaluate(&ContentRequest::Categories);
        assert_eq!(value[0]["title"], "Art");
        assert_eq!(value[1]["title"], "Tech");
    }

    #[test]
    fn test_from_ndjson() {
        let store = MemoryStore::from_json(
            "{\"_id\":\"x\",\"_type\":\"category\"}\n\n{\"_id\":\"y\",\"_type\":\"category\"}\n",
        )
        .unwrap();
        assert_eq!(store.len(), 2);
        let store = MemoryStore::from_json("[{\"_id\":\"x\"}, {\"no\":\"id\"}]").unwrap();
        assert_eq!(store.len(), 1);
    }
}
