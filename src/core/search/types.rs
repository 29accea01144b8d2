use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Initiated,
    RunningStep1,
    RunningStep2,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Initiated => "initiated",
            JobStatus::RunningStep1 => "running_step1",
            JobStatus::RunningStep2 => "running_step2",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn from_status(value: &str) -> Option<Self> {
        match value {
            "initiated" => Some(JobStatus::Initiated),
            "running_step1" => Some(JobStatus::RunningStep1),
            "running_step2" => Some(JobStatus::RunningStep2),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One in-flight or finished search run. Lives only in the job store;
/// `input` stays inside the process and is never logged or audited.
#[derive(Debug, Clone)]
pub struct SearchJob {
    pub id: Uuid,
    pub status: JobStatus,
    pub input: String,
    pub progress: String,
    pub result: Option<SearchOutcome>,
    pub error: Option<String>,
}

impl SearchJob {
    pub fn new(id: Uuid, input: String) -> Self {
        Self {
            id,
            status: JobStatus::Initiated,
            input,
            progress: "starting".to_string(),
            result: None,
            error: None,
        }
    }
}

/// A recommendation (or also-checked) entry as returned by the model,
/// enriched with display metadata when the key matches a fetched detail
/// record. Fields the model invents beyond the known ones (reason,
/// confidence, ...) pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationEntry {
    #[serde(default)]
    pub service_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_version: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Terminal result of a completed job. `step1_only` marks the normal
/// short-circuit where triage found no candidates worth a detailed look —
/// not an error, and visually a "no results" outcome for the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub step1_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_it_related: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services_checked: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_assessment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_services: Vec<RecommendationEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub also_checked: Vec<RecommendationEntry>,
}

impl SearchOutcome {
    pub fn step1_only(is_it_related: bool, message: String) -> Self {
        Self {
            step1_only: true,
            is_it_related: Some(is_it_related),
            message: Some(message),
            services_checked: Vec::new(),
            overall_assessment: None,
            recommended_services: Vec::new(),
            also_checked: Vec::new(),
        }
    }

    pub fn full(
        services_checked: Vec<String>,
        overall_assessment: String,
        recommended_services: Vec<RecommendationEntry>,
        also_checked: Vec<RecommendationEntry>,
    ) -> Self {
        Self {
            step1_only: false,
            is_it_related: None,
            message: None,
            services_checked,
            overall_assessment: Some(overall_assessment),
            recommended_services,
            also_checked,
        }
    }
}
