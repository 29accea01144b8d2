//! Recover a JSON payload from a free-form model reply.
//!
//! Models wrap JSON in reasoning tags (`<think>...</think>`), markdown code
//! fences, and surrounding prose, in any combination. The extraction is a
//! pipeline of independent passes; each operates on the previous pass's
//! output. Total and pure: never fails, never touches anything outside its
//! input. The final parse/validate step stays with the caller.

use std::sync::OnceLock;

use regex::Regex;

fn think_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").expect("static pattern"))
}

/// Drop `<think>...</think>` reasoning blocks (non-greedy, may span lines).
fn strip_reasoning(text: &str) -> String {
    think_block().replace_all(text, "").trim().to_string()
}

/// Cut the content out of a markdown code fence. The opening fence may
/// carry a language tag, so the content starts after the first newline;
/// the closing fence is the LAST triple backtick. An unterminated fence
/// leaves the text unchanged.
fn strip_code_fence(text: &str) -> &str {
    if !text.starts_with("```") {
        return text;
    }
    let Some(first_newline) = text.find('\n') else {
        return text;
    };
    match text.rfind("```") {
        Some(closing) if closing > first_newline => text[first_newline + 1..closing].trim(),
        _ => text,
    }
}

/// Narrow to the span between the first `{` (or, failing that, the first
/// `[`) and the last matching closer. Only applied when the text does not
/// already start with a JSON opener.
fn narrow_to_json_span(text: &str) -> &str {
    if text.starts_with('{') || text.starts_with('[') {
        return text;
    }
    let (start, closer) = match text.find('{') {
        Some(idx) => (idx, '}'),
        None => match text.find('[') {
            Some(idx) => (idx, ']'),
            None => return text,
        },
    };
    match text.rfind(closer) {
        Some(end) if end > start => &text[start..=end],
        _ => text,
    }
}

/// Best-effort extraction of a single JSON value from a raw model reply.
/// Returns the original (possibly empty) text when no better candidate is
/// found. Idempotent: running it on its own output changes nothing.
pub fn extract_json(reply: &str) -> String {
    let stripped = strip_reasoning(reply.trim());
    let fenced = strip_code_fence(stripped.trim());
    narrow_to_json_span(fenced).to_string()
}
