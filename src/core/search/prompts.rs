//! Prompt construction for the two evaluation steps.
//!
//! Templates are plain text with named `{placeholder}` substitution points,
//! filled by literal replacement (never `format!`, since the templates
//! contain JSON braces). Catalogue listings are rendered as flat,
//! line-oriented text with spelled-out field labels — the model consumes
//! them as natural-language context, not as data to round-trip.

use std::collections::BTreeMap;

use crate::core::catalogue::{CategorySummary, DetailRecord, ServiceSummary};

pub const TRIAGE_PROMPT_TEMPLATE: &str = r#"You are the virtual assistant of an organization's service catalogue. A user describes a problem; your task is to decide whether it can be addressed by one of the organization's services and to shortlist candidates for a detailed look.

Answer the user in {language_name}.

Available service categories:
{categories_list}

Available services:
{services_list}

User problem description:
{user_input}

Respond with ONLY a single JSON object, no markdown fences and no prose around it:
{"is_it_related": true, "services_to_check": ["CATEGORY-SERVICE"], "preliminary_note": "one short paragraph for the user"}

Rules:
- "is_it_related" is true when the problem can plausibly be addressed by this catalogue, false otherwise.
- "services_to_check" lists the keys, exactly as shown above, of up to five services worth a detailed evaluation. Leave the list empty when no service applies.
- "preliminary_note" briefly explains your assessment to the user, written in {language_name}."#;

pub const DETAIL_PROMPT_TEMPLATE: &str = r#"Here is the user's problem description again:
{user_input}

You shortlisted the following services for a detailed evaluation: {services_to_check}

Below are the full public records of every currently listed revision of those services. Multiple revisions of the same service may coexist; treat them individually.

{services_details}

Evaluate how well each revision addresses the user's problem. Answer the user in {language_name}.

Respond with ONLY a single JSON object, no markdown fences and no prose around it:
{"overall_assessment": "a few sentences for the user", "recommended_services": [{"service_key": "CATEGORY-SERVICE-VERSION", "reason": "why this helps", "confidence": "high"}], "also_checked": [{"service_key": "CATEGORY-SERVICE-VERSION", "reason": "why this was not recommended"}]}

Rules:
- Use the revision keys exactly as shown in the records above (they include the version).
- When revisions are otherwise equivalent, prefer the one with the longer remaining listing window.
- Every shortlisted service appears in either "recommended_services" or "also_checked".
- Write every user-facing text in {language_name}."#;

/// Display name for a language code; unmapped codes fall back to the
/// uppercased code so the model still gets an explicit instruction.
pub fn language_display_name(code: &str) -> String {
    match code {
        "en" => "English".to_string(),
        "de" => "German (Deutsch)".to_string(),
        "fr" => "French (Français)".to_string(),
        "es" => "Spanish (Español)".to_string(),
        other => other.to_uppercase(),
    }
}

pub fn format_categories_list(categories: &[CategorySummary]) -> String {
    if categories.is_empty() {
        return "No categories available.".to_string();
    }
    let mut lines = Vec::new();
    for category in categories {
        lines.push(format!("- Acronym: {}", category.acronym));
        lines.push(format!("  Name: {}", category.name));
        if !category.description.is_empty() {
            lines.push(format!("  Description: {}", category.description));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

pub fn format_services_list(services: &[ServiceSummary]) -> String {
    let mut lines = Vec::new();
    for service in services {
        lines.push(format!("- Key: {}", service.key));
        lines.push(format!("  Name: {}", service.name));
        lines.push(format!("  Purpose: {}", service.purpose));
        lines.push(String::new());
    }
    lines.join("\n")
}

pub fn format_service_details(details: &BTreeMap<String, DetailRecord>) -> String {
    let mut lines = Vec::new();
    for (key, record) in details {
        lines.push(format!("=== {} ({}) ===", record.name, key));
        lines.push(format!("Category: {}", record.category));
        lines.push(format!("Version: {}", record.version));

        // Listing window matters: the model is told to prefer revisions
        // that stay available longer.
        if let Some(from) = record.listed_from {
            lines.push(format!("Listed from: {from}"));
        }
        if let Some(until) = record.listed_until {
            lines.push(format!("Listed until: {until}"));
        }

        lines.push(format!("\nPurpose: {}", record.purpose));
        lines.push(format!("\nDescription:\n{}", record.description));

        if let Some(requirements) = &record.requirements {
            lines.push(format!("\nRequirements:\n{requirements}"));
        }
        if let Some(usage_information) = &record.usage_information {
            lines.push(format!("\nUsage Information:\n{usage_information}"));
        }
        if let Some(details_text) = &record.details {
            lines.push(format!("\nDetails:\n{details_text}"));
        }
        if let Some(options) = &record.options {
            lines.push(format!("\nOptions:\n{options}"));
        }
        if let Some(service_level) = &record.service_level {
            lines.push(format!("\nService Level:\n{service_level}"));
        }
        if let Some(contact) = &record.contact {
            lines.push(format!("\nContact: {contact}"));
        }
        if let Some(url) = &record.url {
            lines.push(format!("\nURL: {url}"));
        }

        lines.push(format!("\n{}\n", "=".repeat(80)));
    }
    lines.join("\n")
}

pub fn render_triage_prompt(
    language: &str,
    categories: &[CategorySummary],
    services: &[ServiceSummary],
    user_input: &str,
) -> String {
    // User input last, see render_detail_prompt.
    TRIAGE_PROMPT_TEMPLATE
        .replace("{language_name}", &language_display_name(language))
        .replace("{categories_list}", &format_categories_list(categories))
        .replace("{services_list}", &format_services_list(services))
        .replace("{user_input}", user_input)
}

pub fn render_detail_prompt(
    language: &str,
    user_input: &str,
    services_to_check: &[String],
    details: &BTreeMap<String, DetailRecord>,
) -> String {
    // User input is substituted last so its text cannot smuggle one of the
    // other placeholders into the template.
    DETAIL_PROMPT_TEMPLATE
        .replace("{language_name}", &language_display_name(language))
        .replace("{services_to_check}", &services_to_check.join(", "))
        .replace("{services_details}", &format_service_details(details))
        .replace("{user_input}", user_input)
}
