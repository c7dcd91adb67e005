/// LLM Client — the single point of entry for generative-text API calls.
///
/// No other module talks to the generation API directly. One call per request:
/// there is no retry here, callers decide what a failure means.
///
/// Model: text-bison-001 on the Generative Language API.
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta2";
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// The model used for question generation.
pub const MODEL: &str = "text-bison-001";
const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 512;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0} is not set in environment variables")]
    MissingApiKey(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Generated output rejected: {0}")]
    Schema(String),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTextRequest<'a> {
    prompt: PromptText<'a>,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct PromptText<'a> {
    text: &'a str,
}

/// Thin wrapper over the generateText endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl LlmClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Makes a single call to the generation API and returns the raw response body.
    pub async fn call(&self, prompt: &str) -> Result<Value, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey(API_KEY_VAR))?;

        let request_body = GenerateTextRequest {
            prompt: PromptText { text: prompt },
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/models/{}:generate", self.base_url, MODEL))
            .query(&[("key", api_key)])
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Generation API returned {}: {}", status, body);
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Value = response.json().await?;
        debug!("Generation API call succeeded");
        Ok(raw)
    }

    /// Calls the API and coerces whatever text came back into a JSON value.
    pub async fn call_json(&self, prompt: &str) -> Result<Value, LlmError> {
        let raw = self.call(prompt).await?;
        let text = extract_candidate_text(&raw);
        parse_json_payload(&text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response shape negotiation
// ────────────────────────────────────────────────────────────────────────────

type TextExtractor = fn(&Value) -> Option<&str>;

fn candidate_output(raw: &Value) -> Option<&str> {
    raw.pointer("/candidates/0/output").and_then(Value::as_str)
}

fn candidate_content(raw: &Value) -> Option<&str> {
    raw.pointer("/candidates/0/content").and_then(Value::as_str)
}

fn output_content(raw: &Value) -> Option<&str> {
    raw.pointer("/output/0/content").and_then(Value::as_str)
}

fn candidate_content_parts(raw: &Value) -> Option<&str> {
    raw.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}

/// Known places the API puts its generated text, tried in order.
const TEXT_EXTRACTORS: [(&str, TextExtractor); 4] = [
    ("candidates[0].output", candidate_output),
    ("candidates[0].content", candidate_content),
    ("output[0].content", output_content),
    ("candidates[0].content.parts[0].text", candidate_content_parts),
];

/// Pulls the generated text out of a raw response. Falls back to the whole
/// response serialized when no known field carries non-empty text.
pub fn extract_candidate_text(raw: &Value) -> String {
    for (path, extract) in TEXT_EXTRACTORS {
        if let Some(text) = extract(raw).filter(|t| !t.is_empty()) {
            debug!("Candidate text found at {path}");
            return text.to_string();
        }
    }
    raw.to_string()
}

/// Parses model text as JSON: directly, then without code fences, then the
/// first-`{`-to-last-`}` substring.
pub fn parse_json_payload(text: &str) -> Result<Value, LlmError> {
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Ok(value);
    }

    if let Ok(value) = serde_json::from_str(strip_json_fences(text)) {
        return Ok(value);
    }

    match brace_block(text) {
        Some(block) => serde_json::from_str(block).map_err(|e| {
            LlmError::Parse(format!("failed to parse JSON block from response: {e}"))
        }),
        None => Err(LlmError::Parse(
            "response did not contain parseable JSON".to_string(),
        )),
    }
}

fn brace_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
