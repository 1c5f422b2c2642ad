use super::retry::RetryPolicy;

pub const DEFAULT_MAX_TURNS: usize = 15;
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Completion model identifier passed to the provider.
    pub model: String,
    /// Bound on state transitions per invocation, counting every visit to
    /// the agent, tools, and end states.
    pub max_turns: usize,
    pub retry: RetryPolicy,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
            retry: RetryPolicy::default(),
        }
    }
}

/// Outcome of one entry-point invocation.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub thread_id: String,
    pub reply: String,
}
