//! In-memory catalogue loaded from a TOML file. Stands in for a full
//! catalogue backend while keeping the gateway contract: dedup, ordering,
//! listing-window filtering, language fallback, and the field-visibility
//! allowlist all live here.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::core::config::FieldVisibility;

use super::{CatalogueGateway, CategorySummary, DetailRecord, ServiceSummary};

/// Text in one or more languages, e.g. `{ en = "...", de = "..." }`.
/// Resolution walks: requested language, then the fallback chain, then any
/// remaining entry so a sparsely translated catalogue still renders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn resolve(&self, language: &str, fallbacks: &[String]) -> String {
        if let Some(text) = self.0.get(language) {
            return text.clone();
        }
        for fallback in fallbacks {
            if let Some(text) = self.0.get(fallback) {
                return text.clone();
            }
        }
        self.0.values().next().cloned().unwrap_or_default()
    }

    fn is_empty(&self) -> bool {
        self.0.values().all(|text| text.is_empty())
    }

    #[cfg(test)]
    pub fn single(language: &str, text: &str) -> Self {
        Self(BTreeMap::from([(language.to_string(), text.to_string())]))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryEntry {
    acronym: String,
    #[serde(default)]
    order: i64,
    name: LocalizedText,
    #[serde(default)]
    description: LocalizedText,
}

#[derive(Debug, Clone, Deserialize)]
struct ServiceEntry {
    category: String,
    acronym: String,
    #[serde(default)]
    order: i64,
    name: LocalizedText,
    #[serde(default)]
    purpose: LocalizedText,
    #[serde(default)]
    revisions: Vec<RevisionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct RevisionEntry {
    version: String,
    /// Dates as quoted `"YYYY-MM-DD"` strings. A revision with no
    /// `listed_from` is never listed.
    #[serde(default)]
    listed_from: Option<NaiveDate>,
    #[serde(default)]
    listed_until: Option<NaiveDate>,
    #[serde(default)]
    description: LocalizedText,
    #[serde(default)]
    requirements: LocalizedText,
    #[serde(default)]
    usage_information: LocalizedText,
    #[serde(default)]
    details: LocalizedText,
    #[serde(default)]
    options: LocalizedText,
    #[serde(default)]
    service_level: LocalizedText,
    #[serde(default)]
    contact: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl RevisionEntry {
    fn is_listed(&self, today: NaiveDate) -> bool {
        let from_ok = self.listed_from.map(|d| d <= today).unwrap_or(false);
        let until_ok = self.listed_until.map(|d| d >= today).unwrap_or(true);
        from_ok && until_ok
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogueFile {
    #[serde(default)]
    categories: Vec<CategoryEntry>,
    #[serde(default)]
    services: Vec<ServiceEntry>,
}

pub struct TomlCatalogue {
    categories: Vec<CategoryEntry>,
    services: Vec<ServiceEntry>,
    visibility: FieldVisibility,
    fallbacks: Vec<String>,
}

impl TomlCatalogue {
    pub async fn load<P: AsRef<Path>>(
        path: P,
        visibility: FieldVisibility,
        fallbacks: Vec<String>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read catalogue file {}", path.display()))?;
        let file: CatalogueFile = toml::from_str(&content)
            .with_context(|| format!("invalid catalogue file {}", path.display()))?;
        Ok(Self::from_entries(file, visibility, fallbacks))
    }

    fn from_entries(
        mut file: CatalogueFile,
        visibility: FieldVisibility,
        fallbacks: Vec<String>,
    ) -> Self {
        file.categories.sort_by_key(|c| c.order);
        Self {
            categories: file.categories,
            services: file.services,
            visibility,
            fallbacks,
        }
    }

    pub fn counts(&self) -> (usize, usize) {
        (self.categories.len(), self.services.len())
    }

    fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    fn category_order(&self, acronym: &str) -> i64 {
        self.categories
            .iter()
            .find(|c| c.acronym == acronym)
            .map(|c| c.order)
            .unwrap_or(i64::MAX)
    }

    fn listed_services(&self, today: NaiveDate) -> Vec<&ServiceEntry> {
        let mut listed: Vec<&ServiceEntry> = self
            .services
            .iter()
            .filter(|s| s.revisions.iter().any(|r| r.is_listed(today)))
            .collect();
        listed.sort_by_key(|s| (self.category_order(&s.category), s.order));
        listed
    }

    fn build_detail(
        &self,
        service: &ServiceEntry,
        revision: &RevisionEntry,
        category_name: String,
        language: &str,
    ) -> DetailRecord {
        let revision_key = format!(
            "{}-{}-{}",
            service.category, service.acronym, revision.version
        );

        let gated = |enabled: bool, text: &LocalizedText| -> Option<String> {
            if enabled && !text.is_empty() {
                Some(text.resolve(language, &self.fallbacks))
            } else {
                None
            }
        };

        DetailRecord {
            key: revision_key,
            name: service.name.resolve(language, &self.fallbacks),
            category: category_name,
            purpose: service.purpose.resolve(language, &self.fallbacks),
            description: revision.description.resolve(language, &self.fallbacks),
            version: revision.version.clone(),
            listed_from: revision.listed_from,
            listed_until: revision.listed_until,
            requirements: gated(self.visibility.requirements, &revision.requirements),
            usage_information: gated(
                self.visibility.usage_information,
                &revision.usage_information,
            ),
            details: gated(self.visibility.details, &revision.details),
            options: gated(self.visibility.options, &revision.options),
            service_level: gated(self.visibility.service_level, &revision.service_level),
            contact: revision.contact.clone(),
            url: revision.url.clone(),
        }
    }
}

#[async_trait]
impl CatalogueGateway for TomlCatalogue {
    async fn list_triage(
        &self,
        language: &str,
    ) -> Result<(Vec<CategorySummary>, Vec<ServiceSummary>)> {
        let today = Self::today();
        let listed = self.listed_services(today);

        let mut categories = Vec::new();
        let mut seen_acronyms = Vec::new();
        for category in &self.categories {
            if seen_acronyms.contains(&category.acronym) {
                continue;
            }
            if !listed.iter().any(|s| s.category == category.acronym) {
                continue;
            }
            seen_acronyms.push(category.acronym.clone());
            categories.push(CategorySummary {
                acronym: category.acronym.clone(),
                name: category.name.resolve(language, &self.fallbacks),
                description: category.description.resolve(language, &self.fallbacks),
            });
        }

        let mut services = Vec::new();
        let mut seen_keys = Vec::new();
        for service in listed {
            let key = format!("{}-{}", service.category, service.acronym);
            if seen_keys.contains(&key) {
                continue;
            }
            seen_keys.push(key.clone());
            services.push(ServiceSummary {
                key,
                name: service.name.resolve(language, &self.fallbacks),
                purpose: service.purpose.resolve(language, &self.fallbacks),
            });
        }

        Ok((categories, services))
    }

    async fn fetch_details(
        &self,
        service_keys: &[String],
        language: &str,
    ) -> Result<BTreeMap<String, DetailRecord>> {
        let today = Self::today();
        let mut details = BTreeMap::new();

        for key in service_keys {
            let Some((category_acronym, service_acronym)) = key.split_once('-') else {
                warn!("Invalid service key format: {key}");
                continue;
            };

            let mut found = false;
            for service in self
                .services
                .iter()
                .filter(|s| s.category == category_acronym && s.acronym == service_acronym)
            {
                let category_name = self
                    .categories
                    .iter()
                    .find(|c| c.acronym == service.category)
                    .map(|c| c.name.resolve(language, &self.fallbacks))
                    .unwrap_or_else(|| service.category.clone());

                for revision in service.revisions.iter().filter(|r| r.is_listed(today)) {
                    found = true;
                    let record =
                        self.build_detail(service, revision, category_name.clone(), language);
                    details.insert(record.key.clone(), record);
                }
            }

            if !found {
                warn!("No currently listed revisions found for service {key}");
            }
        }

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revision(version: &str, from: &str, until: Option<&str>) -> RevisionEntry {
        RevisionEntry {
            version: version.to_string(),
            listed_from: Some(from.parse().unwrap()),
            listed_until: until.map(|d| d.parse().unwrap()),
            description: LocalizedText::single("en", "A description"),
            requirements: LocalizedText::single("en", "Some requirements"),
            usage_information: LocalizedText::default(),
            details: LocalizedText::default(),
            options: LocalizedText::default(),
            service_level: LocalizedText::single("en", "Best effort"),
            contact: Some("help@example.org".to_string()),
            url: None,
        }
    }

    fn sample() -> CatalogueFile {
        CatalogueFile {
            categories: vec![
                CategoryEntry {
                    acronym: "NET".to_string(),
                    order: 2,
                    name: LocalizedText::single("en", "Networking"),
                    description: LocalizedText::default(),
                },
                CategoryEntry {
                    acronym: "HPC".to_string(),
                    order: 1,
                    name: LocalizedText::single("en", "High Performance Computing"),
                    description: LocalizedText::single("en", "Compute at scale"),
                },
            ],
            services: vec![
                ServiceEntry {
                    category: "HPC".to_string(),
                    acronym: "CLUST".to_string(),
                    order: 1,
                    name: LocalizedText::single("en", "Compute Cluster"),
                    purpose: LocalizedText::single("en", "Batch computing"),
                    revisions: vec![
                        revision("1", "2020-01-01", Some("2021-01-01")),
                        revision("2", "2021-01-01", None),
                        revision("3", "2024-01-01", None),
                    ],
                },
                ServiceEntry {
                    category: "NET".to_string(),
                    acronym: "VPN".to_string(),
                    order: 1,
                    name: LocalizedText::single("en", "VPN Access"),
                    purpose: LocalizedText::single("en", "Remote network access"),
                    revisions: vec![revision("1", "2020-01-01", None)],
                },
                ServiceEntry {
                    category: "NET".to_string(),
                    acronym: "OLD".to_string(),
                    order: 2,
                    name: LocalizedText::single("en", "Retired Service"),
                    purpose: LocalizedText::default(),
                    revisions: vec![revision("1", "2019-01-01", Some("2020-01-01"))],
                },
            ],
        }
    }

    fn store(file: CatalogueFile) -> TomlCatalogue {
        TomlCatalogue::from_entries(file, FieldVisibility::default(), vec!["en".to_string()])
    }

    #[tokio::test]
    async fn triage_skips_unlisted_services_and_orders_by_category() {
        let store = store(sample());
        let (categories, services) = store.list_triage("en").await.unwrap();

        let category_acronyms: Vec<&str> =
            categories.iter().map(|c| c.acronym.as_str()).collect();
        assert_eq!(category_acronyms, vec!["HPC", "NET"]);

        let keys: Vec<&str> = services.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["HPC-CLUST", "NET-VPN"]);
    }

    #[tokio::test]
    async fn details_expand_to_all_listed_revisions() {
        let store = store(sample());
        let details = store
            .fetch_details(&["HPC-CLUST".to_string()], "en")
            .await
            .unwrap();

        assert!(details.contains_key("HPC-CLUST-2"));
        assert!(details.contains_key("HPC-CLUST-3"));
        assert!(!details.contains_key("HPC-CLUST-1"), "delisted revision leaked");
    }

    #[tokio::test]
    async fn details_skip_malformed_and_unknown_keys() {
        let store = store(sample());
        let details = store
            .fetch_details(
                &["nodash".to_string(), "ZZ-NOPE".to_string(), "NET-VPN".to_string()],
                "en",
            )
            .await
            .unwrap();

        assert_eq!(details.len(), 1);
        assert!(details.contains_key("NET-VPN-1"));
    }

    #[tokio::test]
    async fn visibility_gates_optional_fields() {
        let visibility = FieldVisibility {
            requirements: false,
            service_level: true,
            ..FieldVisibility::default()
        };
        let store =
            TomlCatalogue::from_entries(sample(), visibility, vec!["en".to_string()]);
        let details = store
            .fetch_details(&["NET-VPN".to_string()], "en")
            .await
            .unwrap();

        let record = details.get("NET-VPN-1").unwrap();
        assert!(record.requirements.is_none());
        assert_eq!(record.service_level.as_deref(), Some("Best effort"));
        assert_eq!(record.contact.as_deref(), Some("help@example.org"));
    }

    #[test]
    fn localized_text_walks_fallback_chain() {
        let mut map = BTreeMap::new();
        map.insert("de".to_string(), "Rechencluster".to_string());
        let text = LocalizedText(map);

        assert_eq!(
            text.resolve("fr", &["de".to_string(), "en".to_string()]),
            "Rechencluster"
        );
        assert_eq!(text.resolve("de", &[]), "Rechencluster");
        assert_eq!(LocalizedText::default().resolve("en", &[]), "");
    }
}
