use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use crate::core::catalogue::toml_store::TomlCatalogue;
use crate::core::config::AssistConfig;
use crate::core::llm::openai::OpenAiProvider;
use crate::core::search::SearchOrchestrator;
use crate::core::search::audit::JsonlAuditSink;
use crate::core::terminal::{self, GuideSection};
use crate::interfaces::web::ApiServer;

const DEFAULT_CONFIG_PATH: &str = "concierge.toml";

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Commands")
        .command("serve", "Run the search API server")
        .command("search", "Run a single search from the command line")
        .command("check", "Check configuration and catalogue")
        .print();

    GuideSection::new("Options")
        .command("--config", "Path to the config file (default: concierge.toml)")
        .command("--host", "Override the API host (serve)")
        .command("--port", "Override the API port (serve)")
        .command("--language", "Language code for the search (search)")
        .print();
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Flags shared by all commands, parsed from a flat argument list.
struct CliArgs {
    command: Option<String>,
    config_path: String,
    host: Option<String>,
    port: Option<u16>,
    language: Option<String>,
    positional: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs {
        command: None,
        config_path: DEFAULT_CONFIG_PATH.to_string(),
        host: None,
        port: None,
        language: None,
        positional: Vec::new(),
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                parsed.config_path = iter
                    .next()
                    .context("--config requires a path")?
                    .to_string();
            }
            "--host" => {
                parsed.host = Some(iter.next().context("--host requires a value")?.to_string());
            }
            "--port" => {
                let value = iter.next().context("--port requires a value")?;
                parsed.port = Some(value.parse().context("--port must be a number")?);
            }
            "--language" => {
                parsed.language = Some(
                    iter.next()
                        .context("--language requires a code")?
                        .to_string(),
                );
            }
            "help" | "--help" | "-h" => {
                parsed.command = Some("help".to_string());
            }
            other if parsed.command.is_none() => {
                parsed.command = Some(other.to_string());
            }
            other => {
                parsed.positional.push(other.to_string());
            }
        }
    }

    Ok(parsed)
}

async fn build_orchestrator(config: &AssistConfig) -> Result<Arc<SearchOrchestrator>> {
    let catalogue = TomlCatalogue::load(
        &config.catalogue.path,
        config.fields.clone(),
        config.language.fallbacks.clone(),
    )
    .await?;
    let provider = OpenAiProvider::new(&config.llm)?;
    let audit = JsonlAuditSink::new(&config.audit.path);

    Ok(Arc::new(SearchOrchestrator::new(
        config.clone(),
        Arc::new(provider),
        Arc::new(catalogue),
        Arc::new(audit),
    )))
}

pub async fn run_main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args)?;

    match cli.command.as_deref() {
        Some("serve") => serve(cli).await,
        Some("search") => search(cli).await,
        Some("check") => check(cli).await,
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(other) => {
            print_help();
            bail!("unknown command: {other}");
        }
    }
}

async fn serve(cli: CliArgs) -> Result<()> {
    let config = AssistConfig::load(&cli.config_path).await?;
    let orchestrator = build_orchestrator(&config).await?;

    if !orchestrator.is_enabled() {
        terminal::print_warn(
            "AI search is not fully configured; the API will answer 503 until llm.api_url and llm.api_key are set.",
        );
    }

    let host = cli.host.unwrap_or_else(|| config.api.host.clone());
    let port = cli.port.unwrap_or(config.api.port);

    let server = ApiServer::new(orchestrator, config.language.default.clone(), host, port);
    server.serve().await
}

async fn search(cli: CliArgs) -> Result<()> {
    let Some(user_input) = cli.positional.first().cloned() else {
        bail!("usage: concierge search \"<problem description>\" [--language <code>]");
    };

    let config = AssistConfig::load(&cli.config_path).await?;
    let orchestrator = build_orchestrator(&config).await?;

    if !orchestrator.is_enabled() {
        bail!("AI search is not enabled; set llm.api_url and llm.api_key first");
    }

    let language = cli
        .language
        .unwrap_or_else(|| config.language.default.clone());

    terminal::print_step("Running two-step search...");
    let job = orchestrator
        .run_blocking(&user_input, &language, None)
        .await?;
    terminal::print_status("Job", &job.id.to_string());

    match (job.result, job.error) {
        (Some(outcome), _) => {
            if outcome.step1_only {
                terminal::print_info(outcome.message.as_deref().unwrap_or("No matching services."));
            } else {
                if let Some(assessment) = &outcome.overall_assessment {
                    terminal::print_info(assessment);
                }
                for entry in &outcome.recommended_services {
                    let name = entry.service_name.as_deref().unwrap_or(&entry.service_key);
                    terminal::print_status("Recommended", &format!("{name} ({})", entry.service_key));
                }
                for entry in &outcome.also_checked {
                    let name = entry.service_name.as_deref().unwrap_or(&entry.service_key);
                    terminal::print_status("Also checked", &format!("{name} ({})", entry.service_key));
                }
            }
            terminal::print_success("Search completed.");
            Ok(())
        }
        (None, Some(error)) => bail!("search failed: {error}"),
        (None, None) => bail!("search ended without a result"),
    }
}

async fn check(cli: CliArgs) -> Result<()> {
    let config = AssistConfig::load(&cli.config_path).await?;

    terminal::print_step("Configuration");
    terminal::print_status("Config file", &cli.config_path);
    terminal::print_status(
        "LLM endpoint",
        if config.llm.api_url.is_empty() {
            "(not set)"
        } else {
            config.llm.api_url.as_str()
        },
    );
    terminal::print_status(
        "LLM API key",
        if config.llm.api_key.is_empty() {
            "(not set)"
        } else {
            "(set)"
        },
    );
    terminal::print_status(
        "Model",
        if config.llm.model.is_empty() {
            "(not set)"
        } else {
            config.llm.model.as_str()
        },
    );
    terminal::print_status("Audit log", &config.audit.path);

    match TomlCatalogue::load(
        &config.catalogue.path,
        config.fields.clone(),
        config.language.fallbacks.clone(),
    )
    .await
    {
        Ok(catalogue) => {
            let (categories, services) = catalogue.counts();
            terminal::print_status(
                "Catalogue",
                &format!(
                    "{} ({categories} categories, {services} services)",
                    config.catalogue.path
                ),
            );
        }
        Err(e) => {
            terminal::print_error(&format!("Catalogue: {e}"));
        }
    }

    if config.llm.is_enabled() {
        terminal::print_success("AI search is enabled.");
    } else {
        terminal::print_warn("AI search is disabled or not fully configured.");
    }
    Ok(())
}
