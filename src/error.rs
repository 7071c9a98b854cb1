//! Error types for livecache.

use thiserror::Error;

/// Boxed error produced by a backing-store collaborator.
///
/// The store's original error is carried through unmodified so subscribers
/// can downcast it if they need the concrete type.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by cache construction and subscription streams.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A required collaborator (store, change feed, key extractor) was
    /// missing at construction time. Raised synchronously, before any
    /// stream is handed out.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A single-entity lookup matched nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The snapshot source or the change feed failed. The payload is the
    /// collaborator's own error, undecorated.
    #[error("upstream failure: {0}")]
    Upstream(StoreError),
}

impl CacheError {
    /// Wraps a collaborator failure without decorating it.
    pub fn upstream(err: impl Into<StoreError>) -> Self {
        Self::Upstream(err.into())
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
