mod base;
mod gemini;

pub use base::HttpClientBase;
pub use gemini::{GeminiClient, GeminiConfig};
