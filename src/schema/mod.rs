//! Content schema - entity shapes as read from the content store
//!
//! Every field is optional at the type level. Authoring-time constraints are
//! enforced by the store; the predicates in [`validate`] only report
//! violations and are never used to reject read results.

mod article;
mod category;
mod homepage;
mod image;
pub mod lenient;
pub mod portable;
pub mod validate;

pub use article::Article;
pub use category::Category;
pub use homepage::{HomepageSettings, HOMEPAGE_SETTINGS_ID};
pub use image::{AssetMetadata, AssetRef, Dimensions, ImageRef};
pub use portable::{MarkDef, Node, Span, TextBlock};
pub use validate::{derive_slug, is_valid_slug, SchemaViolation};

/// Maximum slug length accepted by the authoring schema
pub const SLUG_MAX_LEN: usize = 96;

/// Maximum excerpt length accepted by the authoring schema
pub const EXCERPT_MAX_LEN: usize = 500;

/// List projections share the article shape with an empty body
pub type ArticleSummary = Article;

/// An expanded category reference
pub type CategoryRef = Category;

/// A rich-text body as stored: an ordered array of raw block nodes
pub type Document = Vec<serde_json::Value>;

/// A classified body block
pub type Block = Node;

/// A media node inside a body
pub type ImageNode = ImageRef;
