use crate::core::search::extract_json;

#[test]
fn clean_json_passes_through() {
    assert_eq!(extract_json(r#"{"a":1}"#), r#"{"a":1}"#);
    assert_eq!(extract_json(r#"[1, 2, 3]"#), r#"[1, 2, 3]"#);
}

#[test]
fn fenced_json_is_unwrapped() {
    assert_eq!(extract_json("```json\n{\"a\":1}\n```"), r#"{"a":1}"#);
    assert_eq!(extract_json("```\n{\"a\":1}\n```"), r#"{"a":1}"#);
}

#[test]
fn reasoning_block_is_stripped() {
    assert_eq!(
        extract_json("<think>let me reason\nover lines</think>{\"a\":1}"),
        r#"{"a":1}"#
    );
}

#[test]
fn reasoning_then_fence_is_handled() {
    assert_eq!(
        extract_json("<think>hmm</think>\n```json\n{\"a\": 1}\n```"),
        r#"{"a": 1}"#
    );
}

#[test]
fn surrounding_prose_is_trimmed_to_span() {
    let reply = r#"Sure, here you go: {"a":1} Hope that helps!"#;
    assert_eq!(extract_json(reply), r#"{"a":1}"#);
}

#[test]
fn prose_around_array_is_trimmed_to_span() {
    assert_eq!(extract_json("result: [1,2] done"), "[1,2]");
}

#[test]
fn span_uses_last_closer() {
    // Nested objects: the last `}` closes the outermost one.
    let reply = r#"answer {"a": {"b": 2}} trailing"#;
    assert_eq!(extract_json(reply), r#"{"a": {"b": 2}}"#);
}

#[test]
fn unterminated_fence_is_left_alone() {
    // The only ``` is the opening fence, so the fence pass backs off and
    // the span pass takes over.
    assert_eq!(extract_json("```json\n{\"a\":1}"), r#"{"a":1}"#);
}

#[test]
fn text_without_json_is_returned_as_is() {
    assert_eq!(extract_json("no structured data here"), "no structured data here");
    assert_eq!(extract_json(""), "");
    assert_eq!(extract_json("   "), "");
}

#[test]
fn total_on_pathological_inputs() {
    for input in ["```", "```\n", "{", "}", "][", "<think>", "</think>", "{]"] {
        // Must not panic; the exact value is the heuristic's business.
        let _ = extract_json(input);
    }
}

#[test]
fn extraction_is_idempotent() {
    let corpus = [
        r#"{"a":1}"#,
        "```json\n{\"a\":1}\n```",
        "<think>x</think>{\"a\":1}",
        r#"Sure, here you go: {"a":1} Hope that helps!"#,
        "plain prose",
        "",
        "result: [1,2] done",
        "```\n[1]\n```",
        "{ \"nested\": {\"deep\": true} }",
        "<think>a</think>```json\n[\"x\"]\n```",
    ];
    for input in corpus {
        let once = extract_json(input);
        let twice = extract_json(&once);
        assert_eq!(once, twice, "not idempotent for input {input:?}");
    }
}
