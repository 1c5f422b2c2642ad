use super::TurnController;
use super::errors::AgentError;
use super::models::{AgentOptions, AgentReply};
use crate::application::catalog::InventoryLookup;
use crate::application::checkpoint::CheckpointStore;
use crate::domain::types::{ChatMessage, MessageRole};
use crate::infrastructure::model::{CompletionProvider, EmbeddingProvider};
use crate::infrastructure::store::CatalogStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// The agent entry point: composes the turn controller, the lookup tool, and
/// the checkpoint store into a single callable.
pub struct Agent<P: CompletionProvider> {
    provider: Arc<P>,
    lookup: InventoryLookup,
    checkpoints: Arc<dyn CheckpointStore>,
    options: AgentOptions,
}

impl<P: CompletionProvider> Agent<P> {
    pub fn new(
        provider: Arc<P>,
        catalog: Arc<dyn CatalogStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        checkpoints: Arc<dyn CheckpointStore>,
        options: AgentOptions,
    ) -> Self {
        Self {
            provider,
            lookup: InventoryLookup::new(catalog, embedder),
            checkpoints,
            options,
        }
    }

    /// Answer `query` within the conversation `thread_id`. A missing or
    /// blank id starts a fresh conversation under a minted id; passing the
    /// returned id back continues it with full context.
    pub async fn respond(
        &self,
        query: &str,
        thread_id: Option<String>,
    ) -> Result<AgentReply, AgentError> {
        let thread_id = thread_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(mint_thread_id);
        info!(thread_id = thread_id.as_str(), "Agent invocation started");

        let history = self.checkpoints.load(&thread_id).await?;
        debug!(
            thread_id = thread_id.as_str(),
            history_count = history.len(),
            "Loaded checkpointed history"
        );

        let mut produced = vec![ChatMessage::new(MessageRole::User, query)];
        let controller = TurnController::new(self.provider.as_ref(), &self.lookup, &self.options);
        let reply = controller.run(&history, &mut produced).await?;

        self.checkpoints.append(&thread_id, &produced).await?;
        info!(
            thread_id = thread_id.as_str(),
            appended = produced.len(),
            "Agent invocation finished"
        );

        Ok(AgentReply { thread_id, reply })
    }
}

/// Fresh point-in-time conversation token, matching the wire contract where
/// continuing a conversation means echoing this id back.
fn mint_thread_id() -> String {
    Utc::now().timestamp_millis().to_string()
}
