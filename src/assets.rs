//! Asset resolution
//!
//! Turns image fields into CDN locations. Anything that cannot be resolved is
//! reported as `None`, and callers render nothing in its place.

use url::Url;

use crate::schema::{Dimensions, ImageRef};

/// A resolved image location
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAsset {
    pub url: String,
    pub dimensions: Option<Dimensions>,
}

/// Source of asset locations
pub trait AssetResolver: Send + Sync {
    /// Resolve an image field, `None` when it points nowhere usable
    fn resolve(&self, image: &ImageRef) -> Option<ResolvedAsset>;
}

/// How the CDN should crop a resized image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    Crop,
    Max,
}

impl Fit {
    fn as_str(self) -> &'static str {
        match self {
            Fit::Crop => "crop",
            Fit::Max => "max",
        }
    }
}

/// Image transformation parameters understood by the CDN
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Option<Fit>,
    pub auto_format: bool,
}

impl ImageOptions {
    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            ..Default::default()
        }
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn fit(mut self, fit: Fit) -> Self {
        self.fit = Some(fit);
        self
    }

    pub fn auto_format(mut self) -> Self {
        self.auto_format = true;
        self
    }
}

/// Parts of an image asset id such as `image-Tb9Ew8-2000x3000-jpg`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId<'a> {
    pub hash: &'a str,
    pub dimensions: Dimensions,
    pub format: &'a str,
}

impl<'a> AssetId<'a> {
    pub fn parse(id: &'a str) -> Option<Self> {
        let rest = id.strip_prefix("image-")?;
        let (rest, format) = rest.rsplit_once('-')?;
        let (hash, dims) = rest.rsplit_once('-')?;
        let (w, h) = dims.split_once('x')?;
        let dimensions = Dimensions {
            width: w.parse().ok()?,
            height: h.parse().ok()?,
        };
        if hash.is_empty() || format.is_empty() {
            return None;
        }
        Some(Self {
            hash,
            dimensions,
            format,
        })
    }
}

/// Resolves asset references against the image CDN of one project/dataset
#[derive(Debug, Clone)]
pub struct CdnAssetResolver {
    base: String,
    project_id: String,
    dataset: String,
    options: ImageOptions,
}

impl CdnAssetResolver {
    pub fn new(base: &str, project_id: &str, dataset: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            dataset: dataset.to_string(),
            options: ImageOptions::default(),
        }
    }

    /// Transformation applied to every resolved URL
    pub fn with_options(mut self, options: ImageOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve with explicit transformation parameters
    pub fn resolve_with(&self, image: &ImageRef, options: ImageOptions) -> Option<ResolvedAsset> {
        let asset = image.asset.as_ref()?;

        let (base_url, dimensions) = match asset.asset_id().and_then(AssetId::parse) {
            Some(id) if !self.project_id.is_empty() => (
                format!(
                    "{}/images/{}/{}/{}-{}x{}.{}",
                    self.base,
                    self.project_id,
                    self.dataset,
                    id.hash,
                    id.dimensions.width,
                    id.dimensions.height,
                    id.format
                ),
                Some(id.dimensions),
            ),
            _ => {
                let url = asset.url.as_deref()?;
                let parsed = Url::parse(url).ok()?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return None;
                }
                (url.to_string(), asset.dimensions())
            }
        };

        Some(ResolvedAsset {
            url: apply_options(&base_url, options),
            dimensions: scale(dimensions, options),
        })
    }
}

impl AssetResolver for CdnAssetResolver {
    fn resolve(&self, image: &ImageRef) -> Option<ResolvedAsset> {
        self.resolve_with(image, self.options)
    }
}

fn apply_options(url: &str, options: ImageOptions) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    {
        let mut query = parsed.query_pairs_mut();
        if let Some(width) = options.width {
            query.append_pair("w", &width.to_string());
        }
        if let Some(height) = options.height {
            query.append_pair("h", &height.to_string());
        }
        if let Some(fit) = options.fit {
            query.append_pair("fit", fit.as_str());
        }
        if options.auto_format {
            query.append_pair("auto", "format");
        }
    }
    let mut out = parsed.to_string();
    if out.ends_with('?') {
        out.pop();
    }
    out
}

/// Dimensions after resizing: a crop to both sides yields exactly that box,
/// otherwise the width is scaled down keeping the aspect ratio
fn scale(dimensions: Option<Dimensions>, options: ImageOptions) -> Option<Dimensions> {
    if let (Some(width), Some(height), Some(Fit::Crop)) =
        (options.width, options.height, options.fit)
    {
        return Some(Dimensions { width, height });
    }
    let dims = dimensions?;
    match options.width {
        Some(w) if dims.width > 0 && w < dims.width => Some(Dimensions {
            width: w,
            height: ((dims.height as u64 * w as u64) / dims.width as u64) as u32,
        }),
        _ => Some(dims),
    }
}
