use std::sync::Arc;
use std::time::Duration;

use crate::generation::questions::QuestionGenerator;
use crate::store::CredentialProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Lazily-initialized document store handle.
    pub store: Arc<CredentialProvider>,
    /// Pluggable question generator. Default: LlmQuestionGenerator.
    pub generator: Arc<dyn QuestionGenerator>,
    /// Upper bound on one generation call before falling back.
    pub generation_timeout: Duration,
}
