//! Homepage settings singleton

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Article;

/// Fixed document id of the one and only homepage settings document
pub const HOMEPAGE_SETTINGS_ID: &str = "homepageSettings";

/// Homepage configuration: a label and the featured ("hero") article
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomepageSettings {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    /// `None` when unset or when the referenced article no longer exists
    #[serde(rename = "heroArticle", deserialize_with = "hero_article")]
    pub hero_article: Option<Article>,
}

impl HomepageSettings {
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Homepage Configuration")
    }
}

/// A dangling hero reference expands to `null`, or to an unresolved
/// `{_ref}` stub when the projection did not dereference it. Both mean "no
/// hero".
fn hero_article<'de, D>(deserializer: D) -> Result<Option<Article>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.get("_ref").is_some() {
        tracing::debug!("Hero article reference was not expanded, treating as absent");
        return Ok(None);
    }
    Ok(super::lenient::decode::<Article>(value, "hero article")
        .filter(|a| a.id.is_some() || a.slug.is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::lenient::decode;
    use serde_json::json;

    #[test]
    fn test_dangling_hero_is_none() {
        let settings: HomepageSettings = decode(
            json!({ "_id": "homepageSettings", "title": "Home", "heroArticle": null }),
            "settings",
        )
        .unwrap();
        assert!(settings.hero_article.is_none());
        assert_eq!(settings.label(), "Home");
    }

    #[test]
    fn test_unexpanded_reference_is_none() {
        let settings: HomepageSettings = decode(
            json!({ "heroArticle": { "_ref": "art-404", "_type": "reference" } }),
            "settings",
        )
        .unwrap();
        assert!(settings.hero_article.is_none());
        assert_eq!(settings.label(), "Homepage Configuration");
    }

    #[test]
    fn test_resolved_hero() {
        let settings: HomepageSettings = decode(
            json!({ "heroArticle": { "_id": "art-1", "title": "Big", "slug": "big" } }),
            "settings",
        )
        .unwrap();
        assert_eq!(settings.hero_article.unwrap().slug.as_deref(), Some("big"));
    }
}
