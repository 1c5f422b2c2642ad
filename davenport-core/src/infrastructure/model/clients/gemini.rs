//! Gemini client implementation

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::base::HttpClientBase;
use crate::domain::types::{ChatMessage, MessageRole, ToolCallRequest};
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::{CompletionProvider, EmbeddingProvider};
use crate::infrastructure::model::types::{CompletionRequest, ModelError, ToolSchema};

const PROVIDER_ID: &str = "gemini";
const API_KEY_ENV: &str = "GEMINI_API_KEY";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub embedding_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            embedding_model: "text-embedding-004".to_string(),
        }
    }
}

/// Gemini client for Google AI. Serves both the completion and the embedding
/// capability from the same endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    base: HttpClientBase,
    embedding_model: String,
}

impl GeminiClient {
    pub fn from_config(config: &GeminiConfig) -> Self {
        let api_key = resolve_api_key(config.api_key.as_deref());
        Self {
            base: HttpClientBase::new(PROVIDER_ID.to_string(), config.endpoint.clone(), api_key),
            embedding_model: config.embedding_model.clone(),
        }
    }

    fn build_model_url(&self, model: &str, operation: &str) -> String {
        let base = self.base.endpoint.trim_end_matches('/');
        format!("{base}/models/{model}:{operation}")
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<ChatMessage, ModelError> {
        let url = self.build_model_url(&request.model, "generateContent");
        let (system_text, contents) = MessageAdapter::to_gemini_format(&request.messages);

        let mut payload = json!({ "contents": contents });

        if let Some(system) = system_text {
            payload["system_instruction"] = json!({
                "parts": [{"text": system}]
            });
        }

        if !request.tools.is_empty() {
            payload["tools"] = json!([{
                "functionDeclarations": request.tools.iter().map(declaration).collect::<Vec<_>>()
            }]);
        }

        info!(
            provider = PROVIDER_ID,
            model = request.model.as_str(),
            messages = request.messages.len(),
            "Sending request to Gemini"
        );

        let response: GenerateResponse = self.base.post_with_query_key(&url, &payload).await?;
        debug!("Received response from Gemini");

        let parts = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .flat_map(|c| c.content)
            .flat_map(|c| c.parts)
            .collect::<Vec<_>>();

        if parts.is_empty() {
            return Err(ModelError::invalid_response(PROVIDER_ID, "empty candidate"));
        }

        let mut text_chunks = Vec::new();
        let mut tool_calls = Vec::new();
        for part in parts {
            if let Some(text) = part.text {
                text_chunks.push(text);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCallRequest {
                    name: call.name,
                    arguments: call.args.unwrap_or(Value::Null),
                });
            }
        }

        let content = text_chunks.join("");
        if tool_calls.is_empty() {
            Ok(ChatMessage::new(MessageRole::Assistant, content))
        } else {
            Ok(ChatMessage::with_tool_calls(content, tool_calls))
        }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        let url = self.build_model_url(&self.embedding_model, "embedContent");
        let payload = json!({
            "content": { "parts": [{"text": text}] }
        });

        debug!(
            provider = PROVIDER_ID,
            model = self.embedding_model.as_str(),
            "Embedding query text"
        );

        let response: EmbedResponse = self.base.post_with_query_key(&url, &payload).await?;
        response
            .embedding
            .map(|e| e.values)
            .filter(|values| !values.is_empty())
            .ok_or_else(|| ModelError::invalid_response(PROVIDER_ID, "missing embedding values"))
    }
}

fn declaration(schema: &ToolSchema) -> Value {
    json!({
        "name": schema.name,
        "description": schema.description,
        "parameters": schema.parameters,
    })
}

fn resolve_api_key(configured: Option<&str>) -> Option<String> {
    configured
        .map(str::to_string)
        .filter(|key| !key.trim().is_empty())
        .or_else(|| std::env::var(API_KEY_ENV).ok())
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<FunctionCall>,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    args: Option<Value>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Option<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}
