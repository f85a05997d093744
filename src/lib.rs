//! press-rs: a read-only publisher for content-lake articles
//!
//! Pages are assembled from a remote structured-content store queried with
//! GROQ. The crate provides the query composer that builds and runs those
//! reads, and a rich-text renderer that turns portable-text bodies into HTML.

pub mod assets;
pub mod commands;
pub mod config;
pub mod error;
pub mod helpers;
pub mod query;
pub mod render;
pub mod schema;
pub mod server;
pub mod store;
pub mod templates;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use assets::{CdnAssetResolver, Fit, ImageOptions};
use query::ContentService;
use render::Renderer;
use store::{CachedStore, ContentStore, HttpStore, MemoryStore};

/// The press application
#[derive(Clone)]
pub struct Press {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Composed reads against the configured store
    pub service: ContentService,
    /// Renderer for article bodies
    pub renderer: Renderer,
    /// Image URL builder for cards, heroes and main images
    pub images: Arc<CdnAssetResolver>,
}

impl Press {
    /// Assemble the application around any store
    pub fn new(config: config::SiteConfig, store: Arc<dyn ContentStore>) -> Self {
        let images = Arc::new(image_resolver(&config));
        let renderer = body_renderer(&config);
        let service = ContentService::from_config(store, &config);

        Self {
            config,
            service,
            renderer,
            images,
        }
    }

    /// Load `config_path` (defaults when missing) and connect to the store.
    /// With a dataset file, content is served from memory instead of the
    /// remote store.
    pub fn load(config_path: &Path, dataset: Option<&Path>) -> Result<Self> {
        let config = config::SiteConfig::load_or_default(config_path)?;

        let store: Arc<dyn ContentStore> = match dataset {
            Some(path) => Arc::new(MemoryStore::load(path)?),
            None => {
                let remote = HttpStore::new(&config.store)?;
                match config.cache_ttl() {
                    Some(ttl) => {
                        tracing::debug!("Caching store results for {:?}", ttl);
                        Arc::new(CachedStore::new(remote, ttl, config.cache_capacity))
                    }
                    None => Arc::new(remote),
                }
            }
        };

        Ok(Self::new(config, store))
    }

    /// Serve the site over HTTP
    pub async fn serve(&self, ip: &str, port: u16) -> Result<()> {
        commands::serve::run(self, ip, port).await
    }
}

fn image_resolver(config: &config::SiteConfig) -> CdnAssetResolver {
    CdnAssetResolver::new(
        &config.image_cdn,
        &config.store.project_id,
        &config.store.dataset,
    )
}

/// Renderer for article bodies; body images are scaled to fit and served in
/// the best format the client accepts
pub fn body_renderer(config: &config::SiteConfig) -> Renderer {
    let images = image_resolver(config)
        .with_options(ImageOptions::default().fit(Fit::Max).auto_format());
    Renderer::builder().resolver(Arc::new(images)).build()
}
