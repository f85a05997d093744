//! Error types for content fetching
//!
//! Only failures that must reach the page layer live here. Missing entities
//! are `Ok(None)`, dangling references become `None` fields, and malformed or
//! unknown rich-text nodes are dropped inside the renderer.

use std::time::Duration;
use thiserror::Error;

/// Failure reported by a content store backend
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("store returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("could not decode store response: {0}")]
    Decode(String),

    #[error("request not supported by this store: {0}")]
    Unsupported(String),
}

/// Errors surfaced by the content service
#[derive(Debug, Error)]
pub enum PressError {
    /// The store could not complete a request. One failed fetch fails the
    /// whole composed operation.
    #[error("content temporarily unavailable: {0}")]
    Fetch(#[from] StoreError),

    #[error("request cancelled")]
    Cancelled,

    #[error("page size must be at least 1, got {0}")]
    InvalidPageSize(usize),
}

impl PressError {
    /// Whether the page layer should answer "temporarily unavailable"
    pub fn is_unavailable(&self) -> bool {
        matches!(self, PressError::Fetch(_))
    }
}

pub type Result<T> = std::result::Result<T, PressError>;
