//! Search-job orchestration: runs the two-step LLM evaluation and updates
//! job state.
//!
//! Step 1 (triage) decides relevance over lightweight catalogue summaries
//! and shortlists candidate services. Step 2 (detail) ranks and explains
//! recommendations over the full candidate records, continuing the same
//! conversation. Each launched job runs on its own worker task; callers
//! observe it only through the job store.

pub mod audit;
pub mod extract;
pub mod orchestrator;
pub mod prompts;
pub mod store;
pub mod types;

pub use extract::extract_json;
pub use orchestrator::SearchOrchestrator;
pub use store::JobStore;
pub use types::{JobStatus, RecommendationEntry, SearchJob, SearchOutcome};

pub fn can_transition(from: JobStatus, to: JobStatus) -> bool {
    if from == to {
        return true;
    }
    match from {
        JobStatus::Initiated => matches!(to, JobStatus::RunningStep1 | JobStatus::Failed),
        JobStatus::RunningStep1 => matches!(
            to,
            JobStatus::RunningStep2 | JobStatus::Completed | JobStatus::Failed
        ),
        JobStatus::RunningStep2 => matches!(to, JobStatus::Completed | JobStatus::Failed),
        JobStatus::Completed | JobStatus::Failed => false,
    }
}

#[cfg(test)]
pub(crate) mod tests;
