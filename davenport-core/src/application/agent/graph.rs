use super::errors::AgentError;
use super::models::AgentOptions;
use crate::application::catalog::{InventoryLookup, TOOL_NAME};
use crate::domain::types::{ChatMessage, MessageRole};
use crate::infrastructure::model::{CompletionProvider, CompletionRequest};
use chrono::Utc;
use tracing::{debug, info, warn};

/// States of the turn loop. `Agent` asks the model for the next message,
/// `Tools` answers its tool-call requests, `End` terminates the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    Agent,
    Tools,
    End,
}

/// Drives one invocation through the agent/tools loop until the model stops
/// requesting tools or the transition budget runs out.
pub(crate) struct TurnController<'a, P: CompletionProvider> {
    provider: &'a P,
    lookup: &'a InventoryLookup,
    options: &'a AgentOptions,
}

impl<'a, P: CompletionProvider> TurnController<'a, P> {
    pub(crate) fn new(provider: &'a P, lookup: &'a InventoryLookup, options: &'a AgentOptions) -> Self {
        Self {
            provider,
            lookup,
            options,
        }
    }

    /// Run the loop. `history` is the checkpointed past; `produced` starts
    /// with this invocation's user message and accumulates, in order, every
    /// message the loop appends. Returns the final answer text.
    pub(crate) async fn run(
        &self,
        history: &[ChatMessage],
        produced: &mut Vec<ChatMessage>,
    ) -> Result<String, AgentError> {
        let mut state = TurnState::Agent;
        let mut transitions = 0usize;

        loop {
            transitions += 1;
            if transitions > self.options.max_turns {
                warn!(
                    limit = self.options.max_turns,
                    "Turn limit exceeded; aborting invocation"
                );
                return Err(AgentError::TurnLimit {
                    limit: self.options.max_turns,
                });
            }

            state = match state {
                TurnState::Agent => {
                    let mut messages = Vec::with_capacity(history.len() + produced.len() + 1);
                    messages.push(ChatMessage::new(MessageRole::System, system_instruction()));
                    messages.extend_from_slice(history);
                    messages.extend_from_slice(produced);

                    let request = CompletionRequest {
                        model: self.options.model.clone(),
                        messages,
                        tools: vec![InventoryLookup::schema()],
                    };

                    debug!(
                        transition = transitions,
                        messages = request.messages.len(),
                        "Submitting turn to completion provider"
                    );
                    let response = self
                        .options
                        .retry
                        .execute(|| self.provider.complete(request.clone()))
                        .await?;

                    let next = if response.requests_tools() {
                        TurnState::Tools
                    } else {
                        TurnState::End
                    };
                    produced.push(response);
                    next
                }
                TurnState::Tools => {
                    let calls = produced
                        .last()
                        .map(|message| message.tool_calls.clone())
                        .unwrap_or_default();

                    // Every requested call runs, in request order, and every
                    // result lands before control returns to the model.
                    for call in calls {
                        if call.name != TOOL_NAME {
                            warn!(tool = %call.name, "Model requested an unknown tool");
                        }
                        let (query, n) = InventoryLookup::parse_arguments(&call.arguments);
                        info!(tool = %call.name, query = %query, n, "Executing tool request");
                        let envelope = self.lookup.lookup(&query, n).await;
                        produced.push(ChatMessage::tool(call.name, envelope.to_tool_content()));
                    }
                    TurnState::Agent
                }
                TurnState::End => {
                    let reply = produced
                        .iter()
                        .rev()
                        .find(|message| message.role == MessageRole::Assistant)
                        .map(|message| message.content.clone())
                        .unwrap_or_default();
                    info!(transitions, "Turn loop reached its final answer");
                    return Ok(reply);
                }
            };
        }
    }
}

fn system_instruction() -> String {
    format!(
        "You are a friendly assistant for a furniture store. Answer customer questions about \
         the store's inventory: items, prices, categories, and reviews. For ANY question about \
         furniture or products you MUST call the {TOOL_NAME} tool first, even though it may \
         return an error or no results. Ground every claim in the tool output; if it reports \
         an empty catalog or no matching items, say so plainly and offer to help another way. \
         Current time: {}.",
        Utc::now().to_rfc3339()
    )
}
