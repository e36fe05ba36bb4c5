// Idea generation: briefing, prompt assembly, the generation run, and export.
// All LLM calls go through llm_client, never direct HTTP calls here.

pub mod briefing;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod request;
