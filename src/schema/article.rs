//! Article model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient::{lenient_datetime, nullable_vec};
use super::{Category, ImageRef};

/// An article as projected by a query
///
/// List projections leave `body` empty; the single-article projection also
/// carries `category_ids`, the raw reference ids used for related content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "mainImage")]
    pub main_image: Option<ImageRef>,
    #[serde(rename = "publishedAt", deserialize_with = "lenient_datetime")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "nullable_vec")]
    pub categories: Vec<Category>,
    #[serde(rename = "categoryIds", deserialize_with = "nullable_vec")]
    pub category_ids: Vec<String>,
    pub excerpt: Option<String>,
    /// Raw rich-text blocks; rendered by [`crate::render::Renderer`]
    #[serde(deserialize_with = "nullable_vec")]
    pub body: Vec<Value>,
}

impl Article {
    /// Title for display, never empty
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Untitled article")
    }

    /// Alt text for the main image, falling back to the title
    pub fn main_image_alt(&self) -> &str {
        self.main_image
            .as_ref()
            .and_then(|img| img.alt_text())
            .unwrap_or_else(|| self.display_title())
    }

    /// Whether the main image has an asset worth resolving
    pub fn has_main_image(&self) -> bool {
        self.main_image
            .as_ref()
            .map(ImageRef::has_asset)
            .unwrap_or(false)
    }

    /// Category ids, preferring raw reference ids over expanded categories
    pub fn category_keys(&self) -> Vec<String> {
        if !self.category_ids.is_empty() {
            return self.category_ids.clone();
        }
        self.categories.iter().filter_map(|c| c.id.clone()).collect()
    }
}
