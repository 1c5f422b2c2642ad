use super::envelope::LookupEnvelope;
use crate::infrastructure::model::{EmbeddingProvider, ModelError, ToolSchema};
use crate::infrastructure::store::{CatalogError, CatalogStore};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const TOOL_NAME: &str = "inventory_lookup";
pub const DEFAULT_RESULT_LIMIT: usize = 10;

#[derive(Debug, Error)]
enum LookupFault {
    #[error("embedding failed: {0}")]
    Embedding(#[from] ModelError),
    #[error("catalog query failed: {0}")]
    Catalog(#[from] CatalogError),
}

/// The hybrid inventory lookup tool. Prefers semantic search and falls back
/// to a lexical match when the vector search finds nothing. All failure
/// paths come back as envelopes; `lookup` never returns an error.
pub struct InventoryLookup {
    store: Arc<dyn CatalogStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl InventoryLookup {
    pub fn new(store: Arc<dyn CatalogStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Schema advertised to the model.
    pub fn schema() -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.to_string(),
            description: "Search the furniture inventory for items matching a free-text query. \
                          Returns matched items with prices, reviews, and similarity scores."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What the customer is looking for"
                    },
                    "n": {
                        "type": "integer",
                        "description": "Maximum number of items to return (default 10)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    /// Parse the arguments of a tool-call request. Missing `n` defaults to
    /// ten; a missing query becomes an empty string rather than a fault.
    pub fn parse_arguments(arguments: &Value) -> (String, usize) {
        let query = arguments
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let n = arguments
            .get("n")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_RESULT_LIMIT);
        (query, n)
    }

    pub async fn lookup(&self, query: &str, n: usize) -> LookupEnvelope {
        let count = match self.store.count().await {
            Ok(count) => count,
            Err(error) => {
                warn!(%error, "Could not count catalog items");
                return LookupEnvelope::failure(query, error.to_string());
            }
        };

        if count == 0 {
            info!(query, "Inventory is empty; skipping search");
            return LookupEnvelope::empty_catalog(query);
        }

        match self.search(query, n).await {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(query, %error, "Inventory lookup faulted");
                LookupEnvelope::failure(query, error.to_string())
            }
        }
    }

    async fn search(&self, query: &str, n: usize) -> Result<LookupEnvelope, LookupFault> {
        let embedding = self.embedder.embed(query).await?;
        let hits = self.store.nearest(&embedding, n).await?;

        if !hits.is_empty() {
            info!(query, hits = hits.len(), "Vector search matched items");
            return Ok(LookupEnvelope::vector(query, hits));
        }

        // Hard zero-results trigger: low-relevance vector hits still count as
        // success and never reach this fallback.
        debug!(query, "Vector search empty; falling back to keyword match");
        let matches = self.store.keyword_matches(query, n).await?;
        info!(query, matches = matches.len(), "Keyword search finished");
        Ok(LookupEnvelope::text(query, matches))
    }
}
