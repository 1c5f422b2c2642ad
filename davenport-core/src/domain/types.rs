use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "system" => Some(MessageRole::System),
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            "tool" => Some(MessageRole::Tool),
            _ => None,
        }
    }
}

/// A tool invocation requested by the model inside an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    pub arguments: Value,
}

/// One turn in a conversation. Messages are append-only: once a message has
/// been pushed onto a thread's history it is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    /// Tool invocations the model asked for. Empty for plain messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    /// Name of the tool a tool-role message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_name: None,
        }
    }

    pub fn tool(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_name: Some(name.into()),
        }
    }

    pub fn with_tool_calls(content: impl Into<String>, calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls: calls,
            tool_name: None,
        }
    }

    pub fn requests_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemPrices {
    pub full_price: f64,
    pub sale_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReview {
    pub review_date: String,
    pub rating: f64,
    pub comment: String,
}

/// One catalog entry. `summary` is the precomputed searchable text the
/// embedding was built from; `embedding` is only populated when the item is
/// read from the catalog store and is stripped before the item is shown to
/// the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_id: String,
    pub item_name: String,
    pub item_desc: String,
    pub brand: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub prices: ItemPrices,
    #[serde(default)]
    pub reviews: Vec<ItemReview>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl CatalogItem {
    pub fn without_embedding(mut self) -> Self {
        self.embedding = Vec::new();
        self
    }
}

/// A catalog entry paired with its cosine similarity against a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: CatalogItem,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Tool,
        ] {
            assert_eq!(MessageRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(MessageRole::from_str("model"), None);
    }

    #[test]
    fn plain_message_serializes_without_tool_fields() {
        let message = ChatMessage::new(MessageRole::User, "hello");
        let json = serde_json::to_value(&message).expect("serializes");
        assert_eq!(json["role"], "user");
        assert!(json.get("tool_calls").is_none());
        assert!(json.get("tool_name").is_none());
    }

    #[test]
    fn tool_message_carries_tool_name() {
        let message = ChatMessage::tool("inventory_lookup", "{}");
        let json = serde_json::to_value(&message).expect("serializes");
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_name"], "inventory_lookup");

        let back: ChatMessage = serde_json::from_value(json).expect("deserializes");
        assert_eq!(back, message);
    }
}
