//! Model layer: capability traits plus the HTTP provider clients.

mod adapter;
mod clients;
mod traits;
mod types;

pub use adapter::MessageAdapter;
pub use clients::{GeminiClient, GeminiConfig, HttpClientBase};
pub use traits::{CompletionProvider, EmbeddingProvider};
pub use types::{CompletionRequest, ModelError, ToolSchema};
