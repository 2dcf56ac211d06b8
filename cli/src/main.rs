//! CLI entrypoint for listing-vetting
//!
//! This is the main binary that wires together all layers using
//! dependency injection. Every handle is built once here and passed down.

mod cli;
mod output;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command, OutputFormat, ReviewArgs};
use output::ReviewFormatter;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};
use vetting_application::{
    AgentFactory, AuditLogger, CircuitBreaker, Explainer, GetReviewStatusUseCase, LlmClient,
    NoAuditLog, PolicyRouter, ProcessReviewUseCase, ReviewQueue, ReviewStatusView,
    SubmitListingUseCase,
};
use vetting_domain::NewListing;
use vetting_infrastructure::providers::mask_api_key;
use vetting_infrastructure::{
    AnthropicConfig, AnthropicGateway, ConfigLoader, FileConfig, InMemoryStore, InProcessQueue,
    InProcessQueueConfig, JsonlAuditLogger, OpenAiEmbeddingConfig, OpenAiEmbeddingService,
    PolicyIngestor, load_agents_file,
};

const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()?
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    let _log_guard = init_logging(&cli, &config)?;
    info!("Starting listing-vetting");

    match cli.command {
        Command::Review(args) => run_review(&config, args).await,
        Command::Config => {
            show_config(&cli, &config)?;
            Ok(())
        }
    }
}

/// Initialize tracing; the returned guard must live as long as the process.
fn init_logging(cli: &Cli, config: &FileConfig) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let json = cli.log_json || config.logging.json;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let stderr = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    layers.push(if json {
        stderr.json().boxed()
    } else {
        stderr.boxed()
    });

    let mut guard = None;
    if let Some(dir) = &config.logging.file_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
        let appender = tracing_appender::rolling::daily(dir, "listing-vetting.log");
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        let file = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer);
        layers.push(if json { file.json().boxed() } else { file.boxed() });
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("initializing logging")?;
    Ok(guard)
}

/// Listing file as accepted on the command line
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingFile {
    title: String,
    description: String,
    category: String,
    #[serde(default)]
    image_urls: Vec<String>,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

fn read_listing(path: &Path, tenant_id: &str) -> Result<NewListing> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading listing file {}", path.display()))?;
    let file: ListingFile = serde_json::from_str(&content)
        .with_context(|| format!("parsing listing file {}", path.display()))?;

    let mut listing = NewListing::new(tenant_id, file.title, file.description, file.category);
    for url in file.image_urls {
        listing = listing.with_image_url(url);
    }
    listing.metadata = file.metadata;
    Ok(listing)
}

async fn run_review(config: &FileConfig, args: ReviewArgs) -> Result<()> {
    let new_listing = read_listing(&args.listing, &args.tenant)?;

    // === Dependency Injection ===
    let gateway = Arc::new(AnthropicGateway::new(
        AnthropicConfig::new(config.llm.resolve_api_key()?)
            .with_base_url(&config.llm.base_url)
            .with_model(&config.llm.model)
            .with_timeout(Duration::from_secs(config.llm.request_timeout_secs)),
    )?);
    let embedding = Arc::new(OpenAiEmbeddingService::new(
        OpenAiEmbeddingConfig::new(config.embedding.resolve_api_key()?)
            .with_base_url(&config.embedding.base_url)
            .with_model(&config.embedding.model)
            .with_timeout(Duration::from_secs(config.embedding.request_timeout_secs)),
    )?);
    let store = Arc::new(InMemoryStore::new());

    let agents = load_agents_file(&args.agents, &args.tenant)?;
    if !agents.iter().any(|a| a.active) {
        bail!("No active agents in {}", args.agents.display());
    }
    info!(agents = agents.len(), "Agents loaded");
    store.upsert_agent_configs(agents);

    let report = PolicyIngestor::new(embedding.clone(), Arc::clone(&store))
        .ingest_dir(&args.tenant, &args.policies)
        .await?;
    if report.chunks == 0 {
        warn!(dir = %args.policies.display(), "No policy documents found");
    }

    let params = config.pipeline.to_params();
    let breaker = Arc::new(CircuitBreaker::new(
        "anthropic",
        config.circuit_breaker.to_config(),
    ));
    let client = Arc::new(LlmClient::new(gateway, breaker).with_config(config.llm_client_config()));

    let audit: Arc<dyn AuditLogger> = match config
        .logging
        .audit_log
        .as_ref()
        .and_then(JsonlAuditLogger::open)
    {
        Some(logger) => {
            info!(path = %logger.path().display(), "Audit log enabled");
            Arc::new(logger)
        }
        None => Arc::new(NoAuditLog),
    };

    let router = PolicyRouter::new(store.clone(), store.clone(), embedding)
        .with_top_k(params.policy_top_k);
    let process = Arc::new(
        ProcessReviewUseCase::new(
            store.clone(),
            store.clone(),
            Arc::new(router),
            Arc::new(AgentFactory::new(Arc::clone(&client))),
            Arc::new(Explainer::new(client).with_max_tokens(params.explainer_max_tokens)),
        )
        .with_audit_logger(audit)
        .with_params(params.clone()),
    );

    let queue = Arc::new(InProcessQueue::new(
        InProcessQueueConfig::default()
            .with_concurrency(config.worker.concurrency)
            .with_max_deliveries(config.worker.max_deliveries)
            .with_redelivery_delay(Duration::from_millis(config.worker.redelivery_delay_ms)),
    ));
    let worker = queue.create_worker(process)?;

    let submitted = SubmitListingUseCase::new(store.clone(), queue.clone())
        .execute(new_listing)
        .await?;
    info!(review_id = %submitted.review_id, "Listing submitted for review");

    let status = GetReviewStatusUseCase::new(store.clone(), store, queue)
        .with_stale_after(params.stale_after);
    let outcome = tokio::time::timeout(
        Duration::from_secs(args.timeout_secs),
        wait_for_decision(&status, &submitted.review_id),
    )
    .await;
    worker.close().await;

    let view = match outcome {
        Ok(view) => view?,
        Err(_) => bail!(
            "Review {} did not finish within {}s",
            submitted.review_id,
            args.timeout_secs
        ),
    };

    let rendered = match args.output {
        OutputFormat::Text => ReviewFormatter::format_text(&view),
        OutputFormat::Json => ReviewFormatter::format_json(&view),
    };
    println!("{}", rendered);
    Ok(())
}

async fn wait_for_decision(
    status: &GetReviewStatusUseCase,
    review_id: &str,
) -> Result<ReviewStatusView> {
    loop {
        let view = status.execute(review_id).await?;
        if view.is_terminal() {
            return Ok(view);
        }
        tokio::time::sleep(STATUS_POLL_INTERVAL).await;
    }
}

fn show_config(cli: &Cli, config: &FileConfig) -> Result<()> {
    println!("Configuration sources (in priority order):");
    for source in ConfigLoader::config_sources(cli.config.as_deref()) {
        println!("  {}", source);
    }

    println!();
    println!("Secrets:");
    for var in [&config.llm.api_key_env, &config.embedding.api_key_env] {
        let shown = std::env::var(var)
            .map(|key| mask_api_key(&key))
            .unwrap_or_else(|_| "(not set)".to_string());
        println!("  {var} = {shown}");
    }

    println!();
    println!("Effective configuration:");
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
