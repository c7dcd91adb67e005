//! Shared fixtures for unit tests: in-process HTTP stubs and in-memory store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use crate::models::interview::GenerationRecord;
use crate::store::{RecordSink, ServiceAccount, StoreError, StoreInitializer};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Keeps appended records in memory and hands out `doc-<n>` ids.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<GenerationRecord>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<GenerationRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn append(&self, _: &str, record: &GenerationRecord) -> Result<String, StoreError> {
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(format!("doc-{}", records.len()))
    }
}

/// Hands out the same sink regardless of credentials.
pub struct StaticInitializer(pub Arc<MemorySink>);

#[async_trait]
impl StoreInitializer for StaticInitializer {
    async fn initialize(&self, _: ServiceAccount) -> Result<Arc<dyn RecordSink>, StoreError> {
        Ok(self.0.clone())
    }
}
