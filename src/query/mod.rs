//! Query composer
//!
//! Builds fully parameterized read requests and runs composed operations
//! (page + count, homepage joins, related content) against a
//! [`ContentStore`](crate::store::ContentStore).

pub mod pagination;
pub mod related;
mod request;
mod service;

pub use pagination::{total_pages, PageNumber, Paginated, Window};
pub use related::rank_related;
pub use request::{ArticleFilter, CategoryKey, ContentRequest, Query};
pub use service::{ArticleView, CategoryListing, ContentService, FetchOptions, Homepage};
