//! Job lifecycle: launch validation, background execution of the two-step
//! evaluation, terminal state writes, and audit shaping.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::core::catalogue::CatalogueGateway;
use crate::core::config::AssistConfig;
use crate::core::llm::{ChatMessage, ChatProvider};

use super::audit::{AuditRecord, AuditSink};
use super::extract::extract_json;
use super::prompts;
use super::store::JobStore;
use super::types::{JobStatus, RecommendationEntry, SearchOutcome};
use super::can_transition;

// Wire shapes of the model's two JSON replies. Every field is defaulted:
// a structurally valid object with missing keys is treated as empty, only
// non-JSON replies are errors.

#[derive(Debug, Deserialize)]
struct TriageReply {
    #[serde(default)]
    services_to_check: Vec<String>,
    #[serde(default)]
    is_it_related: bool,
    #[serde(default)]
    preliminary_note: String,
}

#[derive(Debug, Deserialize)]
struct DetailReply {
    #[serde(default)]
    overall_assessment: String,
    #[serde(default)]
    recommended_services: Vec<RecommendationEntry>,
    #[serde(default)]
    also_checked: Vec<RecommendationEntry>,
}

pub struct SearchOrchestrator {
    config: AssistConfig,
    provider: Arc<dyn ChatProvider>,
    gateway: Arc<dyn CatalogueGateway>,
    audit: Arc<dyn AuditSink>,
    store: JobStore,
}

impl SearchOrchestrator {
    pub fn new(
        config: AssistConfig,
        provider: Arc<dyn ChatProvider>,
        gateway: Arc<dyn CatalogueGateway>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            config,
            provider,
            gateway,
            audit,
            store: JobStore::new(),
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn is_enabled(&self) -> bool {
        self.config.llm.is_enabled()
    }

    /// Validate the input, register the job, and hand it to a worker task.
    /// Returns the job id as soon as the job is registered; all LLM I/O
    /// happens off the caller's execution path.
    pub async fn launch(
        &self,
        user_input: &str,
        language: &str,
        caller: Option<String>,
    ) -> Result<Uuid> {
        let user_input = user_input.trim();
        if user_input.is_empty() {
            bail!("user input is required");
        }

        let id = self.store.create(user_input.to_string()).await;
        info!("AI search initiated: job_id={id}");

        let worker = Worker {
            provider: self.provider.clone(),
            gateway: self.gateway.clone(),
            audit: self.audit.clone(),
            store: self.store.clone(),
            temperature: self.config.llm.temperature,
        };
        tokio::spawn(worker.run(id, user_input.to_string(), language.to_string(), caller));

        Ok(id)
    }

    /// Launch and wait for the terminal state; used by the one-shot CLI.
    pub async fn run_blocking(
        &self,
        user_input: &str,
        language: &str,
        caller: Option<String>,
    ) -> Result<super::types::SearchJob> {
        let id = self.launch(user_input, language, caller).await?;
        let handle = self.drive(id);
        handle
            .await
            .map_err(|e| anyhow!("search worker panicked: {e}"))?;
        self.store
            .get(id)
            .await
            .ok_or_else(|| anyhow!("job vanished before completion"))
    }

    // Polls the store until the job reaches a terminal state.
    fn drive(&self, id: Uuid) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            loop {
                match store.get(id).await {
                    Some(job) if job.status.is_terminal() => break,
                    Some(_) => {
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    }
                    None => break,
                }
            }
        })
    }
}

/// Everything a worker task needs, cloned out of the orchestrator so the
/// task owns its data outright.
struct Worker {
    provider: Arc<dyn ChatProvider>,
    gateway: Arc<dyn CatalogueGateway>,
    audit: Arc<dyn AuditSink>,
    store: JobStore,
    temperature: f32,
}

/// Audit fields accumulated as the run advances, finished into a record
/// at the terminal write.
#[derive(Default)]
struct AuditDraft {
    step1_completed: bool,
    step2_needed: bool,
    services_requested: Vec<String>,
    services_recommended: Vec<String>,
    tokens_used_step1: Option<u64>,
    tokens_used_step2: Option<u64>,
}

impl AuditDraft {
    fn finish(
        self,
        caller: Option<String>,
        duration_seconds: f64,
        error_message: Option<String>,
    ) -> AuditRecord {
        AuditRecord {
            timestamp: Utc::now(),
            caller,
            step1_completed: self.step1_completed,
            step2_needed: self.step2_needed,
            services_requested: self.services_requested,
            services_recommended: self.services_recommended,
            tokens_used_step1: self.tokens_used_step1,
            tokens_used_step2: self.tokens_used_step2,
            error_occurred: error_message.is_some(),
            error_message,
            duration_seconds,
        }
    }
}

impl Worker {
    async fn run(self, id: Uuid, user_input: String, language: String, caller: Option<String>) {
        let started = Instant::now();
        let mut draft = AuditDraft::default();

        let outcome = self
            .perform_search(id, &user_input, &language, &mut draft)
            .await;
        let duration = started.elapsed().as_secs_f64();

        // All failures funnel into the job's terminal state here; nothing
        // escapes the worker. The entry may already be cleared, in which
        // case the write silently misses.
        let error_message = match outcome {
            Ok(outcome) => {
                self.advance(id, JobStatus::Completed, None, |job| {
                    job.result = Some(outcome);
                })
                .await;
                info!("AI search {id}: completed in {duration:.1}s");
                None
            }
            Err(e) => {
                let message = e.to_string();
                self.advance(id, JobStatus::Failed, None, |job| {
                    job.error = Some(message.clone());
                })
                .await;
                error!("AI search {id}: failed after {duration:.1}s: {message}");
                Some(message)
            }
        };

        self.audit
            .record(draft.finish(caller, duration, error_message))
            .await;
    }

    async fn perform_search(
        &self,
        id: Uuid,
        user_input: &str,
        language: &str,
        draft: &mut AuditDraft,
    ) -> Result<SearchOutcome> {
        // ── Step 1: triage ──
        info!("AI search {id}: starting step 1 (triage)");
        self.advance(id, JobStatus::RunningStep1, Some("step1"), |_| {})
            .await;

        let (categories, services) = self.gateway.list_triage(language).await?;
        let step1_prompt =
            prompts::render_triage_prompt(language, &categories, &services, user_input);
        let messages = vec![ChatMessage::system(step1_prompt.clone())];

        let step1 = self.provider.complete(&messages, self.temperature).await?;
        draft.tokens_used_step1 = step1.total_tokens;
        draft.step1_completed = true;

        let triage: TriageReply = parse_reply(&step1.text, "step 1")?;
        draft.services_requested = triage.services_to_check.clone();

        // No candidates: a normal terminal path, not an error. The user
        // gets the model's own explanatory note.
        if triage.services_to_check.is_empty() {
            return Ok(SearchOutcome::step1_only(
                triage.is_it_related,
                triage.preliminary_note,
            ));
        }

        // ── Step 2: detailed evaluation ──
        info!(
            "AI search {id}: starting step 2 over {} candidate service(s)",
            triage.services_to_check.len()
        );
        draft.step2_needed = true;
        self.advance(id, JobStatus::RunningStep2, Some("step2"), |_| {})
            .await;

        let details = self
            .gateway
            .fetch_details(&triage.services_to_check, language)
            .await?;
        let step2_prompt = prompts::render_detail_prompt(
            language,
            user_input,
            &triage.services_to_check,
            &details,
        );

        // Continue the conversation instead of restarting: the step-1
        // prompt and the model's raw step-1 reply stay as prior turns.
        let messages = vec![
            ChatMessage::system(step1_prompt),
            ChatMessage::assistant(step1.text.clone()),
            ChatMessage::user(step2_prompt),
        ];

        let step2 = self.provider.complete(&messages, self.temperature).await?;
        draft.tokens_used_step2 = step2.total_tokens;

        let mut reply: DetailReply = parse_reply(&step2.text, "step 2")?;

        for entry in reply
            .recommended_services
            .iter_mut()
            .chain(reply.also_checked.iter_mut())
        {
            if let Some(record) = details.get(&entry.service_key) {
                entry.service_name = Some(record.name.clone());
                entry.service_version = Some(record.version.clone());
            }
        }

        draft.services_recommended = reply
            .recommended_services
            .iter()
            .map(|entry| entry.service_key.clone())
            .collect();

        Ok(SearchOutcome::full(
            triage.services_to_check,
            reply.overall_assessment,
            reply.recommended_services,
            reply.also_checked,
        ))
    }

    /// Guarded status write: the transition must be legal and the entry may
    /// be gone. Progress is only touched when a new stage marker is given.
    async fn advance<F>(&self, id: Uuid, to: JobStatus, progress: Option<&str>, extra: F)
    where
        F: FnOnce(&mut super::types::SearchJob),
    {
        self.store
            .update(id, |job| {
                if can_transition(job.status, to) {
                    job.status = to;
                    if let Some(progress) = progress {
                        job.progress = progress.to_string();
                    }
                    extra(job);
                }
            })
            .await;
    }
}

/// Extract and parse one JSON reply. A parse failure is terminal for the
/// job; the raw reply goes to the operator log only, never to the caller
/// or the audit record.
fn parse_reply<T: serde::de::DeserializeOwned>(reply_text: &str, step: &str) -> Result<T> {
    let json_content = extract_json(reply_text);
    if json_content.is_empty() {
        error!(
            "Empty JSON content after extraction in {step}. Original reply: {}",
            head(reply_text, 1000)
        );
        bail!("AI returned an empty response");
    }
    serde_json::from_str(&json_content).map_err(|e| {
        error!(
            "Failed to parse {step} reply as JSON: {e}. Original reply: {}",
            head(reply_text, 1000)
        );
        anyhow!("AI response was not valid JSON")
    })
}

fn head(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
