use super::*;
use crate::application::checkpoint::{CheckpointStore, InMemoryCheckpointStore};
use crate::domain::types::{CatalogItem, ChatMessage, ItemPrices, MessageRole, ToolCallRequest};
use crate::infrastructure::model::{
    CompletionProvider, CompletionRequest, EmbeddingProvider, ModelError,
};
use crate::infrastructure::store::JsonCatalog;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;

#[derive(Clone)]
struct ScriptedProvider {
    responses: Arc<Mutex<Vec<ChatMessage>>>,
    recordings: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ChatMessage>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            recordings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn requests(&self) -> Vec<CompletionRequest> {
        self.recordings.lock().await.clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<ChatMessage, ModelError> {
        self.recordings.lock().await.push(request);
        let mut responses = self.responses.lock().await;
        if responses.is_empty() {
            return Err(ModelError::invalid_response("stub", "script exhausted"));
        }
        Ok(responses.remove(0))
    }
}

/// Provider that never converges: every turn requests another lookup.
struct RepeatingProvider {
    calls: AtomicU32,
}

impl RepeatingProvider {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl CompletionProvider for RepeatingProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<ChatMessage, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ChatMessage::with_tool_calls(
            "",
            vec![lookup_call("more sofas")],
        ))
    }
}

struct StubEmbedder;

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ModelError> {
        Ok(vec![1.0, 0.0])
    }
}

fn lookup_call(query: &str) -> ToolCallRequest {
    ToolCallRequest {
        name: "inventory_lookup".to_string(),
        arguments: json!({"query": query}),
    }
}

fn oslo_sofa() -> CatalogItem {
    CatalogItem {
        item_id: "oslo-1".to_string(),
        item_name: "Oslo Sofa".to_string(),
        item_desc: "A three-seat sofa with oak legs".to_string(),
        brand: "Norden".to_string(),
        categories: vec!["sofa".to_string(), "living room".to_string()],
        prices: ItemPrices {
            full_price: 899.0,
            sale_price: 749.0,
        },
        reviews: Vec::new(),
        summary: "Oslo Sofa, sofa, living room".to_string(),
        embedding: vec![0.9, 0.1],
    }
}

fn build_agent<P: CompletionProvider>(
    provider: P,
    checkpoints: Arc<dyn CheckpointStore>,
    options: AgentOptions,
) -> Agent<P> {
    Agent::new(
        Arc::new(provider),
        Arc::new(JsonCatalog::new(vec![oslo_sofa()])),
        Arc::new(StubEmbedder),
        checkpoints,
        options,
    )
}

#[tokio::test]
async fn final_answer_without_tools_is_checkpointed() {
    let provider = ScriptedProvider::new(vec![ChatMessage::new(
        MessageRole::Assistant,
        "Hello! Ask me about our furniture.",
    )]);
    let checkpoints = Arc::new(InMemoryCheckpointStore::new());
    let agent = build_agent(provider.clone(), checkpoints.clone(), AgentOptions::default());

    let reply = agent.respond("hi there", None).await.expect("agent succeeds");

    assert_eq!(reply.reply, "Hello! Ask me about our furniture.");
    assert!(!reply.thread_id.is_empty());

    let history = checkpoints.load(&reply.thread_id).await.expect("load works");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[1].role, MessageRole::Assistant);

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 1);
    let first = &requests[0];
    assert_eq!(first.messages[0].role, MessageRole::System);
    assert!(first.messages[0].content.contains("inventory_lookup"));
    assert_eq!(first.tools.len(), 1);
    assert_eq!(first.tools[0].name, "inventory_lookup");
}

#[tokio::test]
async fn tool_round_trip_feeds_results_back_to_the_model() {
    let provider = ScriptedProvider::new(vec![
        ChatMessage::with_tool_calls("", vec![lookup_call("comfy couch")]),
        ChatMessage::new(
            MessageRole::Assistant,
            "The Oslo Sofa is on sale for 749 USD.",
        ),
    ]);
    let checkpoints = Arc::new(InMemoryCheckpointStore::new());
    let agent = build_agent(provider.clone(), checkpoints.clone(), AgentOptions::default());

    let reply = agent
        .respond("Do you have a comfy couch?", None)
        .await
        .expect("agent succeeds");

    assert_eq!(reply.reply, "The Oslo Sofa is on sale for 749 USD.");

    // user, assistant(tool call), tool result, final assistant - in order.
    let history = checkpoints.load(&reply.thread_id).await.expect("load works");
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].role, MessageRole::User);
    assert!(history[1].requests_tools());
    assert_eq!(history[2].role, MessageRole::Tool);
    assert!(history[2].content.contains("vector_results"));
    assert!(history[2].content.contains("Oslo Sofa"));
    assert_eq!(history[3].role, MessageRole::Assistant);

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 2);
    assert!(
        requests[1]
            .messages
            .iter()
            .any(|msg| msg.role == MessageRole::Tool && msg.content.contains("vector_results"))
    );
}

#[tokio::test]
async fn every_requested_call_runs_before_the_next_turn() {
    let provider = ScriptedProvider::new(vec![
        ChatMessage::with_tool_calls("", vec![lookup_call("sofa"), lookup_call("desk")]),
        ChatMessage::new(MessageRole::Assistant, "Found a sofa; no desks."),
    ]);
    let checkpoints = Arc::new(InMemoryCheckpointStore::new());
    let agent = build_agent(provider.clone(), checkpoints.clone(), AgentOptions::default());

    let reply = agent
        .respond("Compare sofas and desks", None)
        .await
        .expect("agent succeeds");

    let history = checkpoints.load(&reply.thread_id).await.expect("load works");
    // user, assistant(2 calls), two tool results, final.
    assert_eq!(history.len(), 5);
    assert_eq!(history[2].role, MessageRole::Tool);
    assert_eq!(history[3].role, MessageRole::Tool);

    let requests = provider.requests().await;
    let tool_messages = requests[1]
        .messages
        .iter()
        .filter(|msg| msg.role == MessageRole::Tool)
        .count();
    assert_eq!(tool_messages, 2);
}

#[tokio::test]
async fn second_invocation_resumes_with_prior_context() {
    let provider = ScriptedProvider::new(vec![
        ChatMessage::new(MessageRole::Assistant, "We carry the Oslo Sofa."),
        ChatMessage::new(MessageRole::Assistant, "The sale price is 749 USD."),
    ]);
    let checkpoints = Arc::new(InMemoryCheckpointStore::new());
    let agent = build_agent(provider.clone(), checkpoints.clone(), AgentOptions::default());

    let first = agent
        .respond("What sofas do you have?", None)
        .await
        .expect("first call succeeds");
    let second = agent
        .respond("What about the cheaper one?", Some(first.thread_id.clone()))
        .await
        .expect("second call succeeds");

    assert_eq!(first.thread_id, second.thread_id);

    let history = checkpoints.load(&first.thread_id).await.expect("load works");
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].content, "What sofas do you have?");
    assert_eq!(history[2].content, "What about the cheaper one?");

    // The second model call replays the persisted first exchange.
    let requests = provider.requests().await;
    assert!(
        requests[1]
            .messages
            .iter()
            .any(|msg| msg.content == "What sofas do you have?")
    );
    assert!(
        requests[1]
            .messages
            .iter()
            .any(|msg| msg.content == "We carry the Oslo Sofa.")
    );
}

#[tokio::test]
async fn blank_thread_id_starts_a_fresh_conversation() {
    let provider = ScriptedProvider::new(vec![ChatMessage::new(MessageRole::Assistant, "hi")]);
    let checkpoints = Arc::new(InMemoryCheckpointStore::new());
    let agent = build_agent(provider, checkpoints, AgentOptions::default());

    let reply = agent
        .respond("hello", Some("   ".to_string()))
        .await
        .expect("agent succeeds");
    assert!(!reply.thread_id.trim().is_empty());
    assert_ne!(reply.thread_id, "   ");
}

#[tokio::test]
async fn turn_limit_aborts_a_non_converging_loop() {
    let provider = Arc::new(RepeatingProvider::new());
    let checkpoints = Arc::new(InMemoryCheckpointStore::new());
    let options = AgentOptions {
        max_turns: 4,
        ..AgentOptions::default()
    };
    let agent = Agent::new(
        provider.clone(),
        Arc::new(JsonCatalog::new(vec![oslo_sofa()])),
        Arc::new(StubEmbedder),
        checkpoints,
        options,
    );

    let result = agent.respond("sofas?", None).await;

    match result {
        Err(AgentError::TurnLimit { limit }) => assert_eq!(limit, 4),
        other => panic!("expected turn-limit abort, got {other:?}"),
    }
    // Four transitions = two agent-state visits; the loop never runs past
    // the bound.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn rate_limited_turn_recovers_through_backoff() {
    struct FlakyProvider {
        calls: AtomicU32,
    }

    #[async_trait]
    impl CompletionProvider for FlakyProvider {
        async fn complete(&self, _request: CompletionRequest) -> Result<ChatMessage, ModelError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ModelError::status("gemini", 429, "quota"))
            } else {
                Ok(ChatMessage::new(MessageRole::Assistant, "recovered"))
            }
        }
    }

    let checkpoints = Arc::new(InMemoryCheckpointStore::new());
    let agent = build_agent(
        FlakyProvider {
            calls: AtomicU32::new(0),
        },
        checkpoints,
        AgentOptions::default(),
    );

    let reply = agent.respond("hello", None).await.expect("agent recovers");
    assert_eq!(reply.reply, "recovered");
}
