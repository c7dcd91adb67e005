//! Posts a sample payload to a running server and prints what came back.
//!
//! Usage: start the API, then `cargo run --bin generate-smoke`.
//! Override the target with GENERATE_URL.

use anyhow::Result;
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use prepsmart_api::models::interview::PreferencePayload;
use prepsmart_api::session::client::InterviewApiClient;

const DEFAULT_GENERATE_URL: &str = "http://localhost:8080/generate";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let url = std::env::var("GENERATE_URL").unwrap_or_else(|_| DEFAULT_GENERATE_URL.to_string());
    let payload = PreferencePayload::from_json(&json!({
        "role": "Frontend Developer",
        "level": "junior",
        "techStack": ["react", "typescript"],
        "experienceYears": 2,
        "interviewType": "technical",
        "preferences": {"focus": "components, hooks, testing"}
    }));

    info!("POST -> {url}");
    let client = InterviewApiClient::new(url)?;
    let reply = match client.generate(&payload).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Request failed: {e}");
            std::process::exit(1);
        }
    };

    info!(
        "Stored document {} (fallback: {})",
        reply.id.as_deref().unwrap_or("<none>"),
        reply.is_fallback()
    );
    for question in reply.display_questions() {
        println!(
            "[{}] ({}, {}) {}",
            question.id, question.question_type, question.difficulty, question.text
        );
    }

    Ok(())
}
