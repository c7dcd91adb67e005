//! Axum route handlers for the Generation API.

use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::{generate_interview, parse_request_body, GenerateResponse};
use crate::models::interview::PreferencePayload;
use crate::state::AppState;

/// POST /generate
///
/// Accepts collected preference data (any JSON object, possibly empty) and
/// returns a persisted question set. Generation problems degrade to the
/// fallback set; only store configuration or the write itself return 500.
pub async fn handle_generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("generate", %request_id);

    async move {
        let raw = parse_request_body(&body);
        info!("Received collected data: {raw}");
        let collected = PreferencePayload::from_json(&raw);

        let response = generate_interview(
            &state.store,
            state.generator.as_ref(),
            state.generation_timeout,
            collected,
        )
        .await?;

        Ok::<_, AppError>(Json(response))
    }
    .instrument(span)
    .await
}

/// GET /generate
///
/// Liveness probe. No side effects.
pub async fn handle_generate_status() -> Json<Value> {
    Json(json!({
        "message": "Interview generation endpoint is live",
        "status": "ready"
    }))
}
