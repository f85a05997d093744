//! Site configuration (press.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub url: String,
    pub language: String,

    // Content store
    #[serde(default)]
    pub store: StoreConfig,

    // Caching
    pub cache_ttl_secs: u64,
    pub cache_capacity: u64,

    // Pagination
    pub home_per_page: usize,
    pub category_per_page: usize,
    pub related_count: usize,

    // Images
    pub image_cdn: String,
    pub hero_image_width: u32,
    pub article_image_width: u32,

    // Date format (chrono strftime)
    pub date_format: String,

    // Web app manifest
    #[serde(default)]
    pub manifest: ManifestConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "The Trend Report".to_string(),
            description: String::new(),
            url: "http://localhost:3000".to_string(),
            language: "en".to_string(),

            store: StoreConfig::default(),

            cache_ttl_secs: 3600,
            cache_capacity: 1000,

            home_per_page: 20,
            category_per_page: 15,
            related_count: 3,

            image_cdn: "https://cdn.sanity.io".to_string(),
            hero_image_width: 800,
            article_image_width: 1000,

            date_format: "%B %-d, %Y".to_string(),

            manifest: ManifestConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            Self::load(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Time-bounded cache lifetime, `None` when caching is disabled
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

/// Remote content store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub project_id: String,
    pub dataset: String,
    /// API version date, `YYYY-MM-DD`
    pub api_version: String,
    /// Query the CDN edge instead of the live API
    pub use_cdn: bool,
    /// Only needed for private datasets
    pub token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2025-05-07".to_string(),
            use_cdn: true,
            token: None,
            request_timeout_secs: 10,
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Install metadata served as the web app manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    pub short_name: String,
    pub start_url: String,
    pub display: String,
    pub background_color: String,
    pub theme_color: String,
    pub icons: Vec<ManifestIcon>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl ManifestIcon {
    fn png(size: u32) -> Self {
        Self {
            src: format!("/icons/icon-{size}x{size}.png"),
            sizes: format!("{size}x{size}"),
            mime_type: "image/png".to_string(),
        }
    }
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            short_name: "TrendReport".to_string(),
            start_url: "/".to_string(),
            display: "standalone".to_string(),
            background_color: "#ffffff".to_string(),
            theme_color: "#000000".to_string(),
            icons: vec![ManifestIcon::png(192), ManifestIcon::png(512)],
        }
    }
}
