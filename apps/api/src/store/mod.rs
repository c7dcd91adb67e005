//! Document store — append-only persistence for generation records.
//!
//! The handle is created lazily by [`credentials::CredentialProvider`] the first
//! time a request needs it, then shared by every later request.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::interview::GenerationRecord;

pub mod credentials;
pub mod firestore;

pub use credentials::{CredentialEnv, CredentialProvider, ServiceAccount};

/// Collection every generation event is appended to.
pub const COLLECTION: &str = "generated_interviews";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Configuration(String),

    #[error("Document store authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Persistence(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Appends one record to a collection and returns the id the store assigned.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn append(&self, collection: &str, record: &GenerationRecord)
        -> Result<String, StoreError>;
}

/// Builds the process-wide store handle from resolved credentials.
#[async_trait]
pub trait StoreInitializer: Send + Sync {
    async fn initialize(&self, account: ServiceAccount) -> Result<Arc<dyn RecordSink>, StoreError>;
}
