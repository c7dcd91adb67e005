pub mod health;

use axum::{routing::get, Router};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/generate",
            get(handlers::handle_generate_status).post(handlers::handle_generate),
        )
        // Path used by the voice-agent integration
        .route(
            "/api/vapi/generate",
            get(handlers::handle_generate_status).post(handlers::handle_generate),
        )
        .with_state(state)
}
