use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_API_BASE;
use crate::store::credentials::{
    CredentialEnv, CLIENT_EMAIL_VAR, CREDENTIALS_JSON_VAR, PRIVATE_KEY_VAR, PROJECT_ID_VAR,
};

/// Application configuration loaded from environment variables.
///
/// Credentials and the generation API key are optional here and checked per
/// request, so the service starts and answers probes on a partial setup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub generation_timeout: Duration,
    pub credentials: CredentialEnv,
    pub firestore_emulator_host: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            generation_timeout: Duration::from_secs(
                std::env::var("GENERATION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "8".to_string())
                    .parse::<u64>()
                    .context("GENERATION_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            credentials: CredentialEnv {
                service_account_json: optional_env(CREDENTIALS_JSON_VAR),
                project_id: optional_env(PROJECT_ID_VAR),
                client_email: optional_env(CLIENT_EMAIL_VAR),
                private_key: optional_env(PRIVATE_KEY_VAR),
            },
            firestore_emulator_host: optional_env("FIRESTORE_EMULATOR_HOST"),
        })
    }
}

/// Unset and blank variables are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
