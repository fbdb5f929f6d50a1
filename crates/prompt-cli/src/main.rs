//! Command-line entry point for the prompt-improvement service.
//! `serve` wires the infrastructure adapters into a `Selector` and
//! starts the HTTP surface; `validate-catalog` is the maintenance tool
//! an operator runs before deploying a new exemplar file.

use std::sync::Arc;

use clap::{Arg, Command};

use prompt_api::{build_router, AppState};
use prompt_core::{Selector, SelectorMode};
use prompt_infra::{
    load_threshold, ConfigLoader, FileSystemCatalogRepository, HttpLlmClient, MetricsRepository,
};
use prompt_types::PromptServiceConfig;

fn cli() -> Command {
    Command::new("prompt-service")
        .version("0.1.0")
        .about("Prompt improvement and optimization service")
        .subcommand(
            Command::new("serve")
                .about("Start the HTTP server")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("PATH")
                        .help("Path to a TOML config file; falls back to environment variables"),
                ),
        )
        .subcommand(
            Command::new("validate-catalog")
                .about("Load and validate an exemplar catalog file")
                .arg(Arg::new("path").required(true).help("Path to the catalog JSON file")),
        )
}

fn load_config(matches: &clap::ArgMatches) -> anyhow::Result<PromptServiceConfig> {
    match matches.get_one::<String>("config") {
        Some(path) => Ok(ConfigLoader::from_file(path)?),
        None => Ok(ConfigLoader::from_env()?),
    }
}

async fn serve(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    let config = load_config(matches)?;
    prompt_infra::logging::init();

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .install()
        .map_err(|error| anyhow::anyhow!("failed to install prometheus recorder: {error}"))?;

    tracing::info!(host = %config.server.host, port = config.server.port, "starting prompt-service");

    let catalog_source = FileSystemCatalogRepository::new(&config.catalog.path);
    let knn_result = prompt_core::knn::KnnProvider::new(&catalog_source, 5);
    let complex_init = knn_result.as_ref().map(|_| ()).map_err(Clone::clone);

    let llm: Option<prompt_core::SharedLlmClient> = if config.llm.enabled {
        let api_base = config
            .llm
            .api_base
            .clone()
            .unwrap_or_else(|| "http://localhost:8081".to_string());
        Some(Arc::new(HttpLlmClient::new(
            api_base,
            config.llm.provider.clone(),
            config.llm.model.clone(),
            config.llm.timeout_seconds,
        )))
    } else {
        None
    };
    let llm_configured = llm.is_some();

    // NLaC is the server's default mode regardless of LLM availability
    // (spec.md §8 scenario 3: a request that needs NLaC without a
    // configured provider is a 503, handled at the HTTP boundary —
    // not a silent fallback to legacy mode here). Callers who want the
    // LLM-free legacy strategies can still ask for them per request
    // via the `mode` body field.
    let selector = Selector::new(SelectorMode::Nlac, knn_result, complex_init, llm);

    let metrics = MetricsRepository::new(&config.database.url).await?;
    metrics.initialize().await?;

    let ifeval_threshold = load_threshold(&config.calibration.path);

    let state = AppState::new(&config, selector, metrics, ifeval_threshold, llm_configured);
    let router = build_router(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}

async fn validate_catalog(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    let path = matches.get_one::<String>("path").unwrap();
    let source = FileSystemCatalogRepository::new(path);
    match prompt_core::knn::KnnProvider::new(&source, 5) {
        Ok(_) => {
            println!("catalog at {path} loaded successfully");
            Ok(())
        }
        Err(error) => {
            eprintln!("catalog at {path} failed to load: {error}");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("serve", sub_matches)) => serve(sub_matches).await,
        Some(("validate-catalog", sub_matches)) => validate_catalog(sub_matches).await,
        _ => {
            cli().print_help()?;
            println!();
            Ok(())
        }
    }
}
