pub mod openai;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// One assistant reply plus the endpoint's token accounting, when reported.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub total_tokens: Option<u64>,
}

pub type LlmResult<T> = Result<T, LlmError>;

/// Transport failures are kept distinct so the orchestrator can log and
/// audit them precisely. No variant triggers a retry anywhere — retry
/// policy belongs to the caller, and this design does not retry.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("chat completion request timed out")]
    Timeout,
    #[error("chat completion request failed: {0}")]
    Transport(String),
    #[error("chat endpoint returned HTTP {code}: {detail}")]
    Status { code: u16, detail: String },
    #[error("chat endpoint reply was malformed: {0}")]
    Malformed(String),
}

/// Execute one chat completion over a structured conversation history.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], temperature: f32)
    -> LlmResult<Completion>;
}
