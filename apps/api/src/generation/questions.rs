//! Question generation — turns a preference payload into a question set via the LLM.
//!
//! `AppState` holds an `Arc<dyn QuestionGenerator>`; the default backend is
//! `LlmQuestionGenerator`. Output is validated and normalized here so the rest
//! of the pipeline only ever sees well-formed questions.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::generation::prompts::QUESTION_PROMPT_TEMPLATE;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::interview::{
    Difficulty, GeneratedQuestion, GenerationResult, PreferencePayload, QuestionType,
};

/// Produces a question set for a payload. Single attempt; errors are the
/// caller's to recover from.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, payload: &PreferencePayload) -> Result<GenerationResult, LlmError>;
}

pub struct LlmQuestionGenerator {
    llm: LlmClient,
}

impl LlmQuestionGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(&self, payload: &PreferencePayload) -> Result<GenerationResult, LlmError> {
        let prompt = build_question_prompt(payload)?;
        let parsed = self.llm.call_json(&prompt).await?;
        let result = normalize_generated(parsed)?;
        info!("Generated {} questions", result.questions.len());
        Ok(result)
    }
}

/// Fills the prompt template with the serialized payload.
pub fn build_question_prompt(payload: &PreferencePayload) -> Result<String, LlmError> {
    let profile_json = serde_json::to_string(payload)?;
    Ok(QUESTION_PROMPT_TEMPLATE
        .replace("{profile_json}", &profile_json)
        .replace("{json_only_instruction}", JSON_ONLY_INSTRUCTION))
}

/// Validates parsed model output and fills in missing fields.
///
/// Entries without text are dropped. Missing or repeated ids become `q<index>`.
/// Fails when nothing usable is left, which sends the request to the fallback.
pub fn normalize_generated(parsed: Value) -> Result<GenerationResult, LlmError> {
    let items = parsed
        .get("questions")
        .and_then(Value::as_array)
        .ok_or_else(|| LlmError::Schema("missing `questions` array".to_string()))?;

    let mut seen = HashSet::new();
    let mut questions = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let Some(text) = item
            .get("text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
        else {
            warn!("Dropping generated question {index}: no text");
            continue;
        };

        let difficulty = item
            .get("difficulty")
            .and_then(Value::as_str)
            .map(Difficulty::parse_lenient)
            .unwrap_or(Difficulty::Medium);

        let question_type = item
            .get("type")
            .and_then(Value::as_str)
            .map(QuestionType::parse_lenient)
            .unwrap_or(QuestionType::Technical);

        let estimated_seconds = item
            .get("estimated_seconds")
            .and_then(Value::as_f64)
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(|s| s.round() as u32)
            .unwrap_or_else(|| difficulty.default_seconds());

        let id = unique_id(question_id(item), index, &mut seen);

        questions.push(GeneratedQuestion {
            id,
            text: text.to_string(),
            question_type,
            difficulty,
            estimated_seconds,
        });
    }

    if questions.is_empty() {
        return Err(LlmError::Schema("no usable questions".to_string()));
    }

    Ok(GenerationResult {
        questions,
        fallback: false,
    })
}

fn question_id(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn unique_id(candidate: Option<String>, index: usize, seen: &mut HashSet<String>) -> String {
    let mut id = match candidate {
        Some(id) if !seen.contains(&id) => id,
        _ => format!("q{index}"),
    };
    let mut suffix = 1;
    while seen.contains(&id) {
        id = format!("q{index}-{suffix}");
        suffix += 1;
    }
    seen.insert(id.clone());
    id
}
