//! Image fields and asset references

use serde::{Deserialize, Serialize};

/// An image field: a reference to an uploaded asset plus accessibility text
///
/// Used both for an article's main image and for image nodes inside a
/// rich-text body (which additionally carry a caption).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageRef {
    pub asset: Option<AssetRef>,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

impl ImageRef {
    /// Alt text, if present and not blank
    pub fn alt_text(&self) -> Option<&str> {
        self.alt.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn caption_text(&self) -> Option<&str> {
        self.caption.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Whether the field points at something resolvable at all
    pub fn has_asset(&self) -> bool {
        self.asset
            .as_ref()
            .map(|a| a.asset_id().is_some() || a.url.is_some())
            .unwrap_or(false)
    }
}

/// Either an unresolved `{_ref}` or an expanded `{_id, url, metadata}` asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetRef {
    #[serde(rename = "_ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AssetMetadata>,
}

impl AssetRef {
    /// The asset document id, from either representation
    pub fn asset_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.reference.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.metadata.as_ref().and_then(|m| m.dimensions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetMetadata {
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}
