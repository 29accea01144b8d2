use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use uuid::Uuid;

use super::super::AppState;
use crate::core::search::JobStatus;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(serde::Deserialize)]
pub struct InitiateSearchRequest {
    #[serde(default)]
    user_input: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    caller: Option<String>,
}

/// Launch a search job. Returns immediately with a request id the caller
/// polls; the two-step evaluation runs on a background worker.
pub async fn initiate_search(
    State(state): State<AppState>,
    Json(payload): Json<InitiateSearchRequest>,
) -> (StatusCode, Json<Value>) {
    if !state.orchestrator.is_enabled() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "AI search is not enabled" })),
        );
    }

    let user_input = payload.user_input.trim();
    if user_input.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "user_input is required" })),
        );
    }

    let language = payload
        .language
        .unwrap_or_else(|| state.default_language.clone());

    match state
        .orchestrator
        .launch(user_input, &language, payload.caller)
        .await
    {
        Ok(id) => (
            StatusCode::OK,
            Json(json!({ "success": true, "request_id": id })),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

/// Poll a job. Side-effect-free and idempotent; the result or error is
/// only attached once the job is terminal.
pub async fn search_status(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> (StatusCode, Json<Value>) {
    let Some(job) = state.orchestrator.store().get(id).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "request not found" })),
        );
    };

    let mut response = json!({
        "status": job.status.as_str(),
        "progress": job.progress,
    });

    match job.status {
        JobStatus::Completed => {
            response["result"] = serde_json::to_value(&job.result).unwrap_or(Value::Null);
            // Echoed back to the launching caller only; the input never
            // appears in logs or audit records.
            response["user_input"] = Value::String(job.input);
        }
        JobStatus::Failed => {
            response["error"] =
                Value::String(job.error.unwrap_or_else(|| "unknown error".to_string()));
        }
        _ => {}
    }

    (StatusCode::OK, Json(response))
}

/// Remove a job entry. Idempotent: clearing an unknown or already-cleared
/// id succeeds. A still-running worker is not interrupted; its final
/// write simply misses the removed entry.
pub async fn clear_search(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Json<Value> {
    state.orchestrator.store().clear(id).await;
    Json(json!({ "success": true }))
}
