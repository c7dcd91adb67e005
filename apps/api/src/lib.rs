//! Mock-interview question generation service.
//!
//! Collected preference data comes in over HTTP, a question set is generated by
//! the LLM (or the canned fallback), and every generation is stored.

pub mod config;
pub mod errors;
pub mod generation;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
