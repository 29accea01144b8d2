//! Audit trail of search executions: one record per completed or failed
//! job. Records carry counts, keys, booleans, and timings only — never the
//! user's problem text and never model prose, which bounds the privacy
//! surface of the trail.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    pub step1_completed: bool,
    pub step2_needed: bool,
    pub services_requested: Vec<String>,
    pub services_recommended: Vec<String>,
    pub tokens_used_step1: Option<u64>,
    pub tokens_used_step2: Option<u64>,
    pub error_occurred: bool,
    pub error_message: Option<String>,
    pub duration_seconds: f64,
}

/// Accepts one record per job execution. Fire-and-forget from the
/// orchestrator's perspective: sinks swallow their own failures.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord);
}

/// Append-only JSONL file sink, one record per line.
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn record(&self, record: AuditRecord) {
        let mut line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to encode audit record: {e}");
                return;
            }
        };
        line.push('\n');

        let result = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = result {
            error!(
                "Failed to append audit record to {}: {e}",
                self.path.display()
            );
        }
    }
}

/// Sink that emits records to the tracing log, for development and tests.
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) {
        match serde_json::to_string(&record) {
            Ok(line) => info!(target: "audit", "{line}"),
            Err(e) => error!("Failed to encode audit record: {e}"),
        }
    }
}
