//! HTTP client the session layer uses to hand collected data to `/generate`.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::models::interview::PreferencePayload;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("API returned success but no questions were generated")]
    NoQuestions,
}

/// Raw response body from `/generate`. Questions are kept untyped here; the
/// display layer applies its own defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateReply {
    pub success: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub generated: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A question ready to show in the interview room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayQuestion {
    pub id: String,
    pub text: String,
    pub difficulty: String,
    pub question_type: String,
}

impl GenerateReply {
    /// Questions with the consumer-side defaults applied.
    pub fn display_questions(&self) -> Vec<DisplayQuestion> {
        let Some(questions) = self
            .generated
            .as_ref()
            .and_then(|g| g.get("questions"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        questions
            .iter()
            .enumerate()
            .map(|(idx, q)| DisplayQuestion {
                id: str_field(q, "id").unwrap_or_else(|| format!("q{idx}")),
                text: str_field(q, "text")
                    .unwrap_or_else(|| "No question text provided".to_string()),
                difficulty: str_field(q, "difficulty").unwrap_or_else(|| "medium".to_string()),
                question_type: str_field(q, "type").unwrap_or_else(|| "technical".to_string()),
            })
            .collect()
    }

    pub fn is_fallback(&self) -> bool {
        self.generated
            .as_ref()
            .and_then(|g| g.get("fallback"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub struct InterviewApiClient {
    client: Client,
    generate_url: String,
}

impl InterviewApiClient {
    pub fn new(generate_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            generate_url: generate_url.into(),
        })
    }

    /// Posts a payload and returns the reply. Fails on non-2xx, on
    /// `success: false`, or when the reply carries no questions.
    pub async fn generate(&self, payload: &PreferencePayload) -> Result<GenerateReply, ClientError> {
        info!("Calling {} with collected preferences", self.generate_url);

        let response = self
            .client
            .post(&self.generate_url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateReply = response.json().await?;
        if !reply.success {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body: reply.error.unwrap_or_default(),
            });
        }
        if reply.display_questions().is_empty() {
            return Err(ClientError::NoQuestions);
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    #[test]
    fn test_display_defaults() {
        let reply = GenerateReply {
            success: true,
            id: Some("abc".into()),
            generated: Some(json!({"questions": [{"text": "Why?"}, {"id": "x"}]})),
            error: None,
        };

        assert_eq!(
            reply.display_questions(),
            vec![
                DisplayQuestion {
                    id: "q0".into(),
                    text: "Why?".into(),
                    difficulty: "medium".into(),
                    question_type: "technical".into(),
                },
                DisplayQuestion {
                    id: "x".into(),
                    text: "No question text provided".into(),
                    difficulty: "medium".into(),
                    question_type: "technical".into(),
                },
            ]
        );
        assert!(!reply.is_fallback());
    }

    #[tokio::test]
    async fn test_generate_posts_camel_case_payload() {
        let router = Router::new().route(
            "/generate",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "success": true,
                    "id": "doc-9",
                    "generated": {
                        "questions": [{"id": "q1", "text": body["techStack"][0]}],
                        "fallback": true
                    }
                }))
            }),
        );
        let base = serve(router).await;
        let client = InterviewApiClient::new(format!("{base}/generate")).unwrap();

        let payload = PreferencePayload::from_json(&json!({"techStack": "elixir"}));
        let reply = client.generate(&payload).await.unwrap();

        assert_eq!(reply.id.as_deref(), Some("doc-9"));
        assert!(reply.is_fallback());
        assert_eq!(reply.display_questions()[0].text, "elixir");
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let router = Router::new().route(
            "/generate",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"success": false, "error": "write failed"})),
                )
            }),
        );
        let base = serve(router).await;
        let client = InterviewApiClient::new(format!("{base}/generate")).unwrap();

        let err = client.generate(&PreferencePayload::default()).await.unwrap_err();
        match err {
            ClientError::Api { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("write failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_without_questions_is_an_error() {
        let router = Router::new().route(
            "/generate",
            post(|| async { Json(json!({"success": true, "id": "d", "generated": {}})) }),
        );
        let base = serve(router).await;
        let client = InterviewApiClient::new(format!("{base}/generate")).unwrap();

        let err = client.generate(&PreferencePayload::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::NoQuestions));
    }

    #[tokio::test]
    async fn test_agent_session_forwarded_to_live_router() {
        use crate::generation::questions::LlmQuestionGenerator;
        use crate::llm_client::LlmClient;
        use crate::models::interview::Difficulty;
        use crate::routes::build_router;
        use crate::session::{AgentEvent, CollectionSession, FormSelection, InterviewKind};
        use crate::state::AppState;
        use crate::store::{CredentialEnv, CredentialProvider};
        use crate::test_support::{MemorySink, StaticInitializer};
        use std::sync::Arc;
        use tokio::sync::mpsc;

        // No API key: generation fails fast and the fallback set is stored
        let llm = LlmClient::new(None, "http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let sink = Arc::new(MemorySink::default());
        let env = CredentialEnv {
            service_account_json: Some(
                r#"{"project_id":"p","client_email":"e","private_key":"k"}"#.into(),
            ),
            ..Default::default()
        };
        let base = serve(build_router(AppState {
            store: Arc::new(CredentialProvider::new(env, Arc::new(StaticInitializer(sink.clone())))),
            generator: Arc::new(LlmQuestionGenerator::new(llm)),
            generation_timeout: Duration::from_secs(1),
        }))
        .await;

        let (tx, rx) = mpsc::channel(4);
        tx.send(AgentEvent::ConversationUpdate {
            collected_data: Some(json!({"role": "Mobile Developer", "techStack": "swift"})),
        })
        .await
        .unwrap();
        tx.send(AgentEvent::CallEnd).await.unwrap();

        let selection = FormSelection {
            interview_type: InterviewKind::Behavioral,
            difficulty: Difficulty::Easy,
        };
        let payload = CollectionSession::new(selection).run(rx).await.unwrap();
        let reply = InterviewApiClient::new(format!("{base}/generate"))
            .unwrap()
            .generate(&payload)
            .await
            .unwrap();

        assert!(reply.is_fallback());
        let questions = reply.display_questions();
        assert_eq!(questions[0].text, "Tell me about your experience as a Mobile Developer.");
        assert_eq!(questions[1].question_type, "technical");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].collected.interview_type.as_deref(), Some("behavioral"));
    }
}
