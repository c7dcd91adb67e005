//! Firestore REST backend for [`RecordSink`].
//!
//! Production writes authenticate with a short-lived OAuth token minted from a
//! service-account JWT. Emulator writes skip signing and use the `owner` token.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::interview::GenerationRecord;
use crate::store::{RecordSink, ServiceAccount, StoreError, StoreInitializer};

const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com";
const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const EMULATOR_TOKEN: &str = "owner";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh a cached token this long before it actually expires.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where documents are written.
#[derive(Debug, Clone)]
pub enum FirestoreEndpoint {
    Production,
    /// `host:port` of a local emulator.
    Emulator(String),
}

impl FirestoreEndpoint {
    pub fn from_emulator_host(host: Option<String>) -> Self {
        match host {
            Some(host) => FirestoreEndpoint::Emulator(host),
            None => FirestoreEndpoint::Production,
        }
    }

    fn base_url(&self) -> String {
        match self {
            FirestoreEndpoint::Production => FIRESTORE_API_BASE.to_string(),
            FirestoreEndpoint::Emulator(host) if host.starts_with("http") => {
                host.trim_end_matches('/').to_string()
            }
            FirestoreEndpoint::Emulator(host) => format!("http://{host}"),
        }
    }
}

/// Builds a [`FirestoreSink`] once credentials are resolved.
pub struct FirestoreInitializer {
    endpoint: FirestoreEndpoint,
}

impl FirestoreInitializer {
    pub fn new(endpoint: FirestoreEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl StoreInitializer for FirestoreInitializer {
    async fn initialize(&self, account: ServiceAccount) -> Result<Arc<dyn RecordSink>, StoreError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        let auth = match &self.endpoint {
            FirestoreEndpoint::Production => {
                let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes()).map_err(|e| {
                    StoreError::Configuration(format!("Invalid service account private key: {e}"))
                })?;
                TokenSource::ServiceAccount {
                    client_email: account.client_email.clone(),
                    token_uri: account.token_uri.clone(),
                    key,
                    cached: Mutex::new(None),
                }
            }
            FirestoreEndpoint::Emulator(host) => {
                info!("Using Firestore emulator at {host}");
                TokenSource::Emulator
            }
        };

        Ok(Arc::new(FirestoreSink {
            client,
            base_url: self.endpoint.base_url(),
            project_id: account.project_id,
            auth,
        }))
    }
}

enum TokenSource {
    ServiceAccount {
        client_email: String,
        token_uri: String,
        key: EncodingKey,
        cached: Mutex<Option<AccessToken>>,
    },
    Emulator,
}

#[derive(Clone)]
struct AccessToken {
    value: String,
    expires_at: i64,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Deserialize)]
struct CreatedDocument {
    name: String,
}

pub struct FirestoreSink {
    client: Client,
    base_url: String,
    project_id: String,
    auth: TokenSource,
}

impl FirestoreSink {
    async fn bearer_token(&self) -> Result<String, StoreError> {
        let TokenSource::ServiceAccount {
            client_email,
            token_uri,
            key,
            cached,
        } = &self.auth
        else {
            return Ok(EMULATOR_TOKEN.to_string());
        };

        let mut cached = cached.lock().await;
        let now = Utc::now().timestamp();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - TOKEN_EXPIRY_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let claims = AssertionClaims {
            iss: client_email,
            scope: DATASTORE_SCOPE,
            aud: token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, key)
            .map_err(|e| StoreError::Auth(format!("failed to sign assertion: {e}")))?;

        let response = self
            .client
            .post(token_uri.as_str())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!("token endpoint returned {status}: {body}")));
        }

        let token: TokenResponse = response.json().await?;
        debug!("Obtained access token valid for {}s", token.expires_in);
        *cached = Some(AccessToken {
            value: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });
        Ok(token.access_token)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, collection
        )
    }
}

#[async_trait]
impl RecordSink for FirestoreSink {
    async fn append(
        &self,
        collection: &str,
        record: &GenerationRecord,
    ) -> Result<String, StoreError> {
        let token = self.bearer_token().await?;
        let document = json!({ "fields": encode_record(record)? });

        let response = self
            .client
            .post(self.collection_url(collection))
            .bearer_auth(token)
            .json(&document)
            .send()
            .await
            .map_err(|e| StoreError::Persistence(format!("Firestore write failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Persistence(format!(
                "Firestore write failed ({status}): {body}"
            )));
        }

        let created: CreatedDocument = response.json().await.map_err(|e| {
            StoreError::Persistence(format!("Unexpected Firestore response: {e}"))
        })?;

        created
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                StoreError::Persistence(format!("Document name has no id: {}", created.name))
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Typed-value encoding
// ────────────────────────────────────────────────────────────────────────────

fn encode_record(record: &GenerationRecord) -> Result<Map<String, Value>, StoreError> {
    let to_value = |v: Result<Value, serde_json::Error>| {
        v.map_err(|e| StoreError::Persistence(format!("Failed to serialize record: {e}")))
    };

    let mut fields = Map::new();
    fields.insert(
        "createdAt".to_string(),
        json!({ "timestampValue": record.created_at.to_rfc3339() }),
    );
    fields.insert(
        "collected".to_string(),
        encode_value(&to_value(serde_json::to_value(&record.collected))?),
    );
    fields.insert(
        "generated".to_string(),
        encode_value(&to_value(serde_json::to_value(&record.generated))?),
    );
    fields.insert("source".to_string(), json!({ "stringValue": record.source }));
    Ok(fields)
}

/// Encodes plain JSON as a Firestore typed value.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            json!({ "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}
