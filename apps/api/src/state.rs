use crate::config::Config;
use crate::generation::context_builder::ContextBudget;
use crate::generation::dispatcher::GenerationDispatcher;
use crate::session::SessionStore;
use crate::store::ExampleStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: ExampleStore,
    pub dispatcher: GenerationDispatcher,
    pub sessions: SessionStore,
    /// Retrieval limits for the context block.
    pub budget: ContextBudget,
    pub config: Config,
}
