// Interview question generation.
// Implements: prompt building, LLM question client, fallback set, orchestration.
// All generation API calls go through llm_client.

pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod questions;
