use crate::application::checkpoint::CheckpointError;
use crate::infrastructure::model::ModelError;
use thiserror::Error;

/// Every way an invocation can terminate without an answer. Lookup faults are
/// absent on purpose: the tool converts its own failures into envelopes.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Upstream error re-raised unchanged (non-retryable status, or rate
    /// limiting after the retry budget ran out).
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    /// Fatal agent failure: malformed upstream error or exhausted retry loop.
    #[error("agent failed: {0}")]
    Failed(String),
    #[error("conversation did not converge within {limit} turns")]
    TurnLimit { limit: usize },
}

impl AgentError {
    /// Operator-facing message. The HTTP layer never sends this to clients;
    /// it answers with a generic failure and logs this instead.
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Model(error) => error.user_message(),
            AgentError::Checkpoint(_) => {
                "Could not read or persist the conversation history.".to_string()
            }
            AgentError::Failed(_) => {
                "The assistant hit an internal failure. Please try again.".to_string()
            }
            AgentError::TurnLimit { .. } => {
                "The assistant could not reach an answer in time. Please rephrase the question."
                    .to_string()
            }
        }
    }
}
