use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Environment variable that overrides the configured LLM API key, so the
/// key can be kept out of the config file on shared machines.
pub const API_KEY_ENV: &str = "CONCIERGE_API_KEY";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AssistConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub language: LanguageConfig,

    #[serde(default)]
    pub fields: FieldVisibility,

    #[serde(default)]
    pub catalogue: CatalogueConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL of an OpenAI-compatible endpoint, without the
    /// `/chat/completions` suffix.
    #[serde(default)]
    pub api_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Low temperature keeps the triage pass close to deterministic.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageConfig {
    #[serde(default = "default_language")]
    pub default: String,

    /// Fallback chain consulted when a catalogue field has no text in the
    /// requested language. The base language terminates the chain.
    #[serde(default = "default_fallbacks")]
    pub fallbacks: Vec<String>,
}

/// One switch per optional detail field. The catalogue gateway consults
/// these once while assembling a detail record; fields that are switched
/// off never leave the process.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldVisibility {
    #[serde(default = "default_enabled")]
    pub requirements: bool,

    #[serde(default = "default_enabled")]
    pub usage_information: bool,

    #[serde(default = "default_enabled")]
    pub details: bool,

    #[serde(default = "default_enabled")]
    pub options: bool,

    #[serde(default = "default_enabled")]
    pub service_level: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogueConfig {
    #[serde(default = "default_catalogue_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,

    #[serde(default = "default_api_port")]
    pub port: u16,
}

fn default_enabled() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_temperature() -> f32 {
    0.3
}
fn default_language() -> String {
    "en".to_string()
}
fn default_fallbacks() -> Vec<String> {
    vec!["en".to_string()]
}
fn default_catalogue_path() -> String {
    "catalogue.toml".to_string()
}
fn default_audit_path() -> String {
    "audit-log.jsonl".to_string()
}
fn default_api_host() -> String {
    "127.0.0.1".to_string()
}
fn default_api_port() -> u16 {
    8750
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_url: String::new(),
            api_key: String::new(),
            model: String::new(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default: default_language(),
            fallbacks: default_fallbacks(),
        }
    }
}

impl Default for FieldVisibility {
    fn default() -> Self {
        Self {
            requirements: true,
            usage_information: true,
            details: true,
            options: true,
            service_level: true,
        }
    }
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            path: default_catalogue_path(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_audit_path(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

impl AssistConfig {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str::<AssistConfig>(&content)
                .with_context(|| format!("invalid config file {}", path.display()))?
        } else {
            info!(
                "No config file at {}, using built-in defaults.",
                path.display()
            );
            AssistConfig::default()
        };

        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            config.llm.api_key = key;
        }

        Ok(config)
    }
}

impl LlmConfig {
    /// Mirrors the launch gate: the feature flag must be on and the endpoint
    /// must be fully configured before any job is accepted.
    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.api_url.is_empty() && !self.api_key.is_empty()
    }
}
