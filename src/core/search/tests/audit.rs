use chrono::Utc;

use crate::core::search::audit::{AuditRecord, AuditSink, JsonlAuditSink};

fn sample_record() -> AuditRecord {
    AuditRecord {
        timestamp: Utc::now(),
        caller: Some("alice".to_string()),
        step1_completed: true,
        step2_needed: true,
        services_requested: vec!["HPC-CLUST".to_string()],
        services_recommended: vec!["HPC-CLUST-2".to_string()],
        tokens_used_step1: Some(1200),
        tokens_used_step2: Some(3400),
        error_occurred: false,
        error_message: None,
        duration_seconds: 6.25,
    }
}

#[tokio::test]
async fn jsonl_sink_appends_one_parseable_line_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit-log.jsonl");
    let sink = JsonlAuditSink::new(&path);

    sink.record(sample_record()).await;
    sink.record(AuditRecord {
        error_occurred: true,
        error_message: Some("chat completion request timed out".to_string()),
        ..sample_record()
    })
    .await;

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: AuditRecord = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first.services_recommended, vec!["HPC-CLUST-2"]);
    assert_eq!(first.tokens_used_step1, Some(1200));

    let second: AuditRecord = serde_json::from_str(lines[1]).unwrap();
    assert!(second.error_occurred);
}

#[tokio::test]
async fn jsonl_sink_swallows_unwritable_paths() {
    let sink = JsonlAuditSink::new("/nonexistent-dir/audit-log.jsonl");
    // Fire-and-forget: a broken sink must not take the worker down.
    sink.record(sample_record()).await;
}
