//! Catalog store: read-only access to the product catalog.

mod memory;

pub use memory::JsonCatalog;

use crate::domain::types::{CatalogItem, ScoredItem};
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse catalog from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog query failed: {0}")]
    Query(String),
}

/// Read operations over one collection of catalog items. The engine never
/// writes through this trait; seeding is a separate concern.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Number of items in the catalog.
    async fn count(&self) -> Result<usize, CatalogError>;

    /// Up to `n` nearest items to `embedding` by cosine similarity, best
    /// first, with their scores.
    async fn nearest(&self, embedding: &[f32], n: usize) -> Result<Vec<ScoredItem>, CatalogError>;

    /// Up to `n` items whose name, description, categories, or summary
    /// contain `query`, case-insensitively.
    async fn keyword_matches(&self, query: &str, n: usize)
        -> Result<Vec<CatalogItem>, CatalogError>;
}
