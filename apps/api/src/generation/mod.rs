// Script improvement: retrieval context, prompt assembly, backend dispatch.
// All backend calls go through llm_client via the dispatcher.

pub mod context_builder;
pub mod dispatcher;
pub mod generator;
pub mod handlers;
pub mod prompts;
