//! Composed read operations
//!
//! Each operation issues one or more requests; independent requests run
//! concurrently and the first failure fails the whole operation. Every fetch
//! honours the caller's timeout and cancellation token.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{
    rank_related, ArticleFilter, CategoryKey, ContentRequest, PageNumber, Paginated, Window,
};
use crate::config::SiteConfig;
use crate::error::{PressError, Result, StoreError};
use crate::schema::lenient::{decode, decode_list};
use crate::schema::{Article, Category, HomepageSettings};
use crate::store::ContentStore;

/// Per-fetch limits
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub cancel: CancellationToken,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            cancel: CancellationToken::new(),
        }
    }
}

impl FetchOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

/// An article with its related content
#[derive(Debug, Clone, Serialize)]
pub struct ArticleView {
    pub article: Article,
    pub related: Vec<Article>,
}

/// A category and one page of its articles
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub category: Category,
    pub articles: Paginated<Article>,
}

/// Everything the homepage shows
#[derive(Debug, Clone, Serialize)]
pub struct Homepage {
    pub label: String,
    /// `None` when no hero is configured or the reference dangles
    pub hero: Option<Article>,
    pub latest: Paginated<Article>,
}

/// Runs composed read operations against a content store
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    home_per_page: usize,
    category_per_page: usize,
    options: FetchOptions,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>, home_per_page: usize, category_per_page: usize) -> Self {
        Self {
            store,
            home_per_page,
            category_per_page,
            options: FetchOptions::default(),
        }
    }

    pub fn from_config(store: Arc<dyn ContentStore>, config: &SiteConfig) -> Self {
        Self::new(store, config.home_per_page, config.category_per_page)
            .with_fetch_options(FetchOptions::with_timeout(config.store.request_timeout()))
    }

    pub fn with_fetch_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    async fn fetch(&self, request: ContentRequest) -> Result<Value> {
        let query = request.to_query();
        let name = request.name();
        debug!(request = name, store = self.store.name(), "fetching");

        tokio::select! {
            biased;
            _ = self.options.cancel.cancelled() => {
                debug!(request = name, "cancelled");
                Err(PressError::Cancelled)
            }
            result = tokio::time::timeout(self.options.timeout, self.store.fetch(&query)) => {
                match result {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(e)) => {
                        warn!(request = name, "fetch failed: {}", e);
                        Err(e.into())
                    }
                    Err(_) => {
                        warn!(request = name, "fetch timed out after {:?}", self.options.timeout);
                        Err(StoreError::Timeout(self.options.timeout).into())
                    }
                }
            }
        }
    }

    /// One article by slug, `None` when nothing matches
    pub async fn article(&self, slug: &str) -> Result<Option<Article>> {
        if slug.is_empty() {
            return Ok(None);
        }
        let value = self
            .fetch(ContentRequest::ArticleBySlug {
                slug: slug.to_string(),
            })
            .await?;
        Ok(decode(value, "article"))
    }

    /// Up to `limit` articles sharing categories with the source, best
    /// matches first. No categories means no related content.
    pub async fn related(
        &self,
        source_slug: &str,
        category_ids: &[String],
        limit: usize,
    ) -> Result<Vec<Article>> {
        if category_ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let value = self
            .fetch(ContentRequest::RelatedArticles {
                exclude_slug: source_slug.to_string(),
                category_ids: category_ids.to_vec(),
                limit,
            })
            .await?;
        let candidates = decode_list(value, "related article");
        Ok(rank_related(category_ids, source_slug, candidates, limit))
    }

    pub async fn article_with_related(&self, slug: &str, limit: usize) -> Result<Option<ArticleView>> {
        let Some(article) = self.article(slug).await? else {
            return Ok(None);
        };
        let source = article.slug.as_deref().unwrap_or(slug);
        let related = self.related(source, &article.category_keys(), limit).await?;
        Ok(Some(ArticleView { article, related }))
    }

    pub async fn category(&self, slug: &str) -> Result<Option<Category>> {
        if slug.is_empty() {
            return Ok(None);
        }
        let value = self
            .fetch(ContentRequest::CategoryBySlug {
                slug: slug.to_string(),
            })
            .await?;
        Ok(decode(value, "category"))
    }

    /// All categories, ordered by title
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let value = self.fetch(ContentRequest::Categories).await?;
        Ok(decode_list(value, "category"))
    }

    /// A page of all articles, newest first
    pub async fn articles_page(&self, page: PageNumber) -> Result<Paginated<Article>> {
        self.page(ArticleFilter::All, page, self.home_per_page).await
    }

    /// A category with a page of its articles, `None` for an unknown slug
    pub async fn category_page(
        &self,
        slug: &str,
        page: PageNumber,
    ) -> Result<Option<CategoryListing>> {
        let filter = ArticleFilter::InCategory(CategoryKey::Slug(slug.to_string()));
        let (category, articles) = tokio::try_join!(
            self.category(slug),
            self.page(filter, page, self.category_per_page)
        )?;
        Ok(category.map(|category| CategoryListing { category, articles }))
    }

    /// Settings and the latest articles, fetched together
    pub async fn homepage(&self, page: PageNumber) -> Result<Homepage> {
        let (settings, latest) = tokio::try_join!(
            self.fetch(ContentRequest::HomepageSettings),
            self.articles_page(page)
        )?;
        let settings: HomepageSettings =
            decode(settings, "homepage settings").unwrap_or_default();
        for violation in settings.validate() {
            debug!("homepage settings: {}", violation);
        }
        Ok(Homepage {
            label: settings.label().to_string(),
            hero: settings.hero_article,
            latest,
        })
    }

    pub async fn article_slugs(&self) -> Result<Vec<String>> {
        let value = self.fetch(ContentRequest::ArticleSlugs).await?;
        Ok(slugs(value))
    }

    pub async fn category_slugs(&self) -> Result<Vec<String>> {
        let value = self.fetch(ContentRequest::CategorySlugs).await?;
        Ok(slugs(value))
    }

    async fn page(
        &self,
        filter: ArticleFilter,
        page: PageNumber,
        per_page: usize,
    ) -> Result<Paginated<Article>> {
        let window = Window::for_page(page, per_page)?;
        let (items, count) = tokio::try_join!(
            self.fetch(ContentRequest::ArticlePage {
                filter: filter.clone(),
                window,
            }),
            self.fetch(ContentRequest::ArticleCount { filter })
        )?;
        let total = count.as_u64().unwrap_or(0) as usize;
        Ok(Paginated::new(
            decode_list(items, "article"),
            page,
            total,
            per_page,
        ))
    }
}

fn slugs(value: Value) -> Vec<String> {
    value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.get("slug").and_then(Value::as_str))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
