use crate::application::agent::Agent;
use crate::infrastructure::model::CompletionProvider;
use std::sync::Arc;

pub(crate) struct ServerState<P: CompletionProvider> {
    agent: Arc<Agent<P>>,
}

impl<P: CompletionProvider> ServerState<P> {
    pub(crate) fn new(agent: Arc<Agent<P>>) -> Self {
        Self { agent }
    }

    pub(crate) fn agent(&self) -> Arc<Agent<P>> {
        Arc::clone(&self.agent)
    }
}
