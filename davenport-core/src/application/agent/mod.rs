//! The agent orchestration engine: a two-state turn loop over the model and
//! the inventory lookup tool, shielded by a bounded retry policy.

mod errors;
mod graph;
mod models;
mod retry;
mod runner;

#[cfg(test)]
mod tests;

pub use errors::AgentError;
pub use models::{AgentOptions, AgentReply, DEFAULT_MAX_TURNS};
pub use retry::RetryPolicy;
pub use runner::Agent;
pub(crate) use graph::TurnController;
