//! Catalogue data gateway: the narrow interface the search orchestrator
//! consumes. The gateway alone is responsible for field visibility,
//! language fallback, and listing-window filtering — the orchestrator never
//! branches on any of those concerns.

pub mod toml_store;

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category summary for the triage prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub acronym: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Service summary for the triage prompt. The key is the version-less
/// `CATEGORY-SERVICE` form; triage operates at service level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub key: String,
    pub name: String,
    pub purpose: String,
}

/// Public fields of one service revision, keyed by the fully qualified
/// revision key `CATEGORY-SERVICE-VERSION`. Built fresh for every job:
/// catalogue content and visibility configuration may change between calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailRecord {
    pub key: String,
    pub name: String,
    pub category: String,
    pub purpose: String,
    pub description: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listed_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listed_until: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[async_trait]
pub trait CatalogueGateway: Send + Sync {
    /// Deduplicated categories and services with at least one currently
    /// listed revision, resolved for the given language.
    async fn list_triage(
        &self,
        language: &str,
    ) -> Result<(Vec<CategorySummary>, Vec<ServiceSummary>)>;

    /// Full detail records for the given version-less service keys. Each
    /// key expands to ALL currently listed revisions of that service, so
    /// coexisting versions stay individually distinguishable. Keys that
    /// match nothing are skipped, not errors.
    async fn fetch_details(
        &self,
        service_keys: &[String],
        language: &str,
    ) -> Result<BTreeMap<String, DetailRecord>>;
}
