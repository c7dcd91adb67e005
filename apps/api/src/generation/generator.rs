//! Interview generation — orchestrates one request end to end.
//!
//! Flow: ensure store handle → generate (bounded, single attempt) → fall back on
//! any generation error → persist one record → shape the response.
//!
//! Only store configuration and the persistence write can fail the request.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::generation::fallback::fallback_questions;
use crate::generation::questions::QuestionGenerator;
use crate::llm_client::LlmError;
use crate::models::interview::{GenerationRecord, GenerationResult, PreferencePayload};
use crate::store::{CredentialProvider, COLLECTION};

/// Intake channel recorded with every generation event.
pub const SOURCE_TAG: &str = "vapi";

/// Response body for a successful generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub id: String,
    pub generated: GenerationResult,
}

/// Which path produced the question set.
#[derive(Debug)]
pub enum GenerationOutcome {
    Generated(GenerationResult),
    FallenBack {
        result: GenerationResult,
        reason: LlmError,
    },
}

impl GenerationOutcome {
    pub fn into_result(self) -> GenerationResult {
        match self {
            GenerationOutcome::Generated(result) => result,
            GenerationOutcome::FallenBack { result, .. } => result,
        }
    }
}

/// Reads a request body as a JSON object. Empty, malformed, or non-object
/// bodies all become `{}`.
pub fn parse_request_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            warn!("Request body is not a JSON object ({other}); using empty preferences");
            Value::Object(Map::new())
        }
        Err(e) => {
            warn!("Request body is not valid JSON ({e}); using empty preferences");
            Value::Object(Map::new())
        }
    }
}

/// Runs the generator under a timeout. Never fails: any error or timeout
/// yields the canned question set.
pub async fn generate_with_fallback(
    generator: &dyn QuestionGenerator,
    payload: &PreferencePayload,
    timeout: Duration,
) -> GenerationOutcome {
    let attempt = tokio::time::timeout(timeout, generator.generate(payload))
        .await
        .unwrap_or_else(|_| Err(LlmError::Timeout(timeout)));

    match attempt {
        Ok(result) => GenerationOutcome::Generated(result),
        Err(reason) => {
            error!("Question generation failed, using fallback: {reason}");
            GenerationOutcome::FallenBack {
                result: fallback_questions(payload),
                reason,
            }
        }
    }
}

/// Runs the full generation pipeline and persists the result.
pub async fn generate_interview(
    store: &CredentialProvider,
    generator: &dyn QuestionGenerator,
    timeout: Duration,
    collected: PreferencePayload,
) -> Result<GenerateResponse, AppError> {
    // Step 1: store handle (the only hard failure before any external call)
    let sink = store.ensure_initialized().await?;

    // Step 2: generation, absorbed into the fallback on error
    let generated = generate_with_fallback(generator, &collected, timeout)
        .await
        .into_result();

    // Step 3: persist
    let record = GenerationRecord {
        created_at: Utc::now(),
        collected,
        generated,
        source: SOURCE_TAG.to_string(),
    };
    let id = sink
        .append(COLLECTION, &record)
        .await
        .map_err(|e| AppError::Persistence(e.to_string()))?;

    info!(
        "Stored generation {} with {} questions (fallback: {})",
        id,
        record.generated.questions.len(),
        record.generated.fallback
    );

    // Step 4: the record is owned by the store from here on; only the result goes back
    Ok(GenerateResponse {
        success: true,
        id,
        generated: record.generated,
    })
}
