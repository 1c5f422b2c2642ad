use crate::domain::types::{CatalogItem, ScoredItem};
use serde::{Deserialize, Serialize};

/// Result envelope of one inventory lookup. Always carries the original
/// query and a discriminator; never an exception.
///
/// `Error` means the catalog itself is empty, `Failure` means the lookup
/// procedure faulted (embedding or query error). An empty `TextResults` is a
/// valid non-error outcome: the catalog has items but none matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupEnvelope {
    Error {
        error: String,
        message: String,
        query: String,
    },
    Failure {
        error: String,
        message: String,
        query: String,
    },
    VectorResults {
        query: String,
        count: usize,
        results: Vec<ScoredItem>,
    },
    TextResults {
        query: String,
        count: usize,
        results: Vec<CatalogItem>,
    },
}

impl LookupEnvelope {
    pub fn empty_catalog(query: impl Into<String>) -> Self {
        Self::Error {
            error: "No items found in inventory".to_string(),
            message: "The inventory has no items to search. Tell the customer the catalog is currently empty.".to_string(),
            query: query.into(),
        }
    }

    pub fn failure(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure {
            error: "Inventory lookup failed".to_string(),
            message: message.into(),
            query: query.into(),
        }
    }

    pub fn vector(query: impl Into<String>, mut results: Vec<ScoredItem>) -> Self {
        for hit in &mut results {
            hit.item.embedding = Vec::new();
        }
        Self::VectorResults {
            query: query.into(),
            count: results.len(),
            results,
        }
    }

    pub fn text(query: impl Into<String>, results: Vec<CatalogItem>) -> Self {
        let results: Vec<CatalogItem> = results
            .into_iter()
            .map(CatalogItem::without_embedding)
            .collect();
        Self::TextResults {
            query: query.into(),
            count: results.len(),
            results,
        }
    }

    pub fn query(&self) -> &str {
        match self {
            LookupEnvelope::Error { query, .. }
            | LookupEnvelope::Failure { query, .. }
            | LookupEnvelope::VectorResults { query, .. }
            | LookupEnvelope::TextResults { query, .. } => query,
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            LookupEnvelope::VectorResults { count, .. }
            | LookupEnvelope::TextResults { count, .. } => Some(*count),
            _ => None,
        }
    }

    /// Serialized form delivered to the model as tool output.
    pub fn to_tool_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"outcome":"failure","error":"Inventory lookup failed","message":"could not serialize results","query":""}"#.to_string()
        })
    }
}
