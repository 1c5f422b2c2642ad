//! Message adapters - convert conversation history into provider wire formats

use crate::domain::types::{ChatMessage, MessageRole};
use serde_json::{Value, json};

/// Adapter for converting messages to provider-specific formats
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert messages to Gemini format.
    /// Returns: (system_instruction_text, contents)
    ///
    /// Assistant tool-call requests become `functionCall` parts and tool-role
    /// messages become `functionResponse` parts, per the generateContent API.
    pub fn to_gemini_format(messages: &[ChatMessage]) -> (Option<String>, Vec<Value>) {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in messages {
            match message.role {
                MessageRole::System => system_parts.push(message.content.clone()),
                MessageRole::User => contents.push(json!({
                    "role": "user",
                    "parts": [{"text": message.content.clone()}]
                })),
                MessageRole::Assistant => {
                    let mut parts = Vec::new();
                    if !message.content.is_empty() {
                        parts.push(json!({"text": message.content.clone()}));
                    }
                    for call in &message.tool_calls {
                        parts.push(json!({
                            "functionCall": {
                                "name": call.name.clone(),
                                "args": call.arguments.clone(),
                            }
                        }));
                    }
                    if parts.is_empty() {
                        parts.push(json!({"text": ""}));
                    }
                    contents.push(json!({"role": "model", "parts": parts}));
                }
                MessageRole::Tool => {
                    let name = message.tool_name.clone().unwrap_or_default();
                    contents.push(json!({
                        "role": "user",
                        "parts": [{
                            "functionResponse": {
                                "name": name,
                                "response": Self::tool_payload(&message.content),
                            }
                        }]
                    }));
                }
            }
        }

        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system_instruction, contents)
    }

    // functionResponse.response must be a JSON object.
    fn tool_payload(content: &str) -> Value {
        match serde_json::from_str::<Value>(content) {
            Ok(value @ Value::Object(_)) => value,
            Ok(other) => json!({"content": other}),
            Err(_) => json!({"content": content}),
        }
    }
}
