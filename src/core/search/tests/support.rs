//! Shared fakes for orchestrator and interface tests: a scripted chat
//! provider, a counting catalogue gateway, and an in-memory audit sink.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::catalogue::{
    CatalogueGateway, CategorySummary, DetailRecord, ServiceSummary,
};
use crate::core::config::AssistConfig;
use crate::core::llm::{ChatMessage, ChatProvider, Completion, LlmError, LlmResult};
use crate::core::search::audit::{AuditRecord, AuditSink};
use crate::core::search::{JobStore, SearchJob, SearchOrchestrator};

/// Replays a scripted list of replies and records every conversation it
/// was called with. An optional delay keeps a call in flight long enough
/// for launch-latency assertions.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<LlmResult<Completion>>>,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<LlmResult<Completion>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn slow(replies: Vec<LlmResult<Completion>>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(replies)
        }
    }

    pub fn reply(text: &str) -> LlmResult<Completion> {
        Ok(Completion {
            text: text.to_string(),
            total_tokens: Some(42),
        })
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _temperature: f32,
    ) -> LlmResult<Completion> {
        self.calls.lock().await.push(messages.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("no scripted reply left".to_string())))
    }
}

/// Serves a fixed triage listing and detail map, counting calls so tests
/// can assert that the triage-only path never touches step 2.
pub struct FakeGateway {
    pub details: BTreeMap<String, DetailRecord>,
    pub triage_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new(details: BTreeMap<String, DetailRecord>) -> Self {
        Self {
            details,
            triage_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CatalogueGateway for FakeGateway {
    async fn list_triage(
        &self,
        _language: &str,
    ) -> anyhow::Result<(Vec<CategorySummary>, Vec<ServiceSummary>)> {
        self.triage_calls.fetch_add(1, Ordering::SeqCst);
        Ok((
            vec![CategorySummary {
                acronym: "HPC".to_string(),
                name: "High Performance Computing".to_string(),
                description: "Compute at scale".to_string(),
            }],
            vec![ServiceSummary {
                key: "HPC-CLUST".to_string(),
                name: "Compute Cluster".to_string(),
                purpose: "Batch computing".to_string(),
            }],
        ))
    }

    async fn fetch_details(
        &self,
        _service_keys: &[String],
        _language: &str,
    ) -> anyhow::Result<BTreeMap<String, DetailRecord>> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.details.clone())
    }
}

pub fn detail_record(key: &str, name: &str, version: &str) -> DetailRecord {
    DetailRecord {
        key: key.to_string(),
        name: name.to_string(),
        category: "High Performance Computing".to_string(),
        purpose: "Batch computing".to_string(),
        description: "Runs batch jobs on shared nodes.".to_string(),
        version: version.to_string(),
        listed_from: Some("2024-01-01".parse().unwrap()),
        listed_until: None,
        requirements: Some("A cluster account".to_string()),
        usage_information: None,
        details: None,
        options: None,
        service_level: None,
        contact: None,
        url: None,
    }
}

/// Collects audit records in memory. `wait_for_record` blocks until the
/// worker has fully finished, since the audit write is its last action.
#[derive(Default)]
pub struct MemoryAuditSink {
    pub records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub async fn wait_for_record(&self) -> AuditRecord {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(record) = self.records.lock().await.last().cloned() {
                    return record;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("no audit record arrived in time")
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, record: AuditRecord) {
        self.records.lock().await.push(record);
    }
}

pub fn enabled_config() -> AssistConfig {
    let mut config = AssistConfig::default();
    config.llm.api_url = "https://llm.example.org/v1".to_string();
    config.llm.api_key = "test-key".to_string();
    config.llm.model = "test-model".to_string();
    config
}

pub struct TestHarness {
    pub orchestrator: Arc<SearchOrchestrator>,
    pub provider: Arc<ScriptedProvider>,
    pub gateway: Arc<FakeGateway>,
    pub audit: Arc<MemoryAuditSink>,
}

pub fn harness(provider: ScriptedProvider, gateway: FakeGateway) -> TestHarness {
    let provider = Arc::new(provider);
    let gateway = Arc::new(gateway);
    let audit = Arc::new(MemoryAuditSink::default());
    let orchestrator = Arc::new(SearchOrchestrator::new(
        enabled_config(),
        provider.clone(),
        gateway.clone(),
        audit.clone(),
    ));
    TestHarness {
        orchestrator,
        provider,
        gateway,
        audit,
    }
}

/// Poll the store until the job is terminal. Panics after five seconds —
/// a worker that never terminates is itself a bug.
pub async fn wait_terminal(store: &JobStore, id: Uuid) -> SearchJob {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(job) = store.get(id).await
                && job.status.is_terminal()
            {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("job did not reach a terminal state in time")
}
