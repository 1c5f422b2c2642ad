//! Model traits

use super::types::{CompletionRequest, ModelError};
use crate::domain::types::ChatMessage;
use async_trait::async_trait;

/// Capability to produce the next assistant message for a conversation.
/// The returned message may carry zero or more tool-call requests.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<ChatMessage, ModelError>;
}

/// Capability to embed free text into the catalog's vector space.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError>;
}
