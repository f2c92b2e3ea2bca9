//! VC Lead Sourcing: binary entrypoint
//! `run` collects, scores and delivers one batch; `serve` boots the Axum HTTP surface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vc_lead_sourcing::api::{self, AppState};
use vc_lead_sourcing::config::SignalConfig;
use vc_lead_sourcing::ingest::{self, providers::{CseProvider, RssProvider}, types::SourceProvider};
use vc_lead_sourcing::metrics::Metrics;
use vc_lead_sourcing::notify::{NotifierMux, RunSummary};
use vc_lead_sourcing::pipeline::{Delivery, Pipeline};
use vc_lead_sourcing::sink::CsvFileSink;

#[derive(Parser, Debug)]
#[command(name = "vc-lead-sourcing", version, about = "Score, route and dedupe VC sourcing leads")]
struct Cli {
    /// Config file (TOML or JSON); defaults to $SOURCING_CONFIG_PATH or config/sourcing.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect, score, dedupe and deliver one batch (default)
    Run {
        /// Read the batch from a JSON array instead of the configured sources
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8000)]
        port: u16,
    },
}

/// Compact logs by default; `LOG_FORMAT=json` for structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vc_lead_sourcing=info,warn"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SignalConfig> {
    let cfg = match path {
        Some(p) => SignalConfig::from_path(p),
        None => SignalConfig::load_default(),
    };
    cfg.context("failed to load sourcing config")
}

fn providers_for(cfg: &SignalConfig) -> Vec<Box<dyn SourceProvider>> {
    let mut providers: Vec<Box<dyn SourceProvider>> = Vec::new();
    if !cfg.sources.rss_feeds.is_empty() {
        providers.push(Box::new(RssProvider::from_urls(cfg.sources.rss_feeds.clone())));
    }
    if !cfg.sources.cse_queries.is_empty() {
        providers.push(Box::new(CseProvider::from_env(
            cfg.sources.cse_queries.clone(),
            cfg.sources.max_results_per_query,
        )));
    }
    providers
}

async fn run_once(cfg: SignalConfig, input: Option<PathBuf>) -> Result<()> {
    let batch = match input {
        Some(p) => ingest::read_batch_json(&p)?,
        None => {
            let providers = providers_for(&cfg);
            if providers.is_empty() {
                tracing::warn!("no rss_feeds or cse_queries configured; batch is empty");
            }
            ingest::collect_batch(&providers).await
        }
    };

    let sink = CsvFileSink::new(&cfg.output.csv_path);
    let pipeline = Pipeline::new(cfg);
    let report = pipeline.run_and_deliver(batch, &sink).await;

    let summary = RunSummary::from_report(&report, chrono::Utc::now());
    let mux = NotifierMux::from_env();
    if !mux.is_empty() {
        mux.notify(&summary).await;
    }

    println!("{}", summary.message());
    if let Delivery::Failed { sink, reason } = &report.delivery {
        anyhow::bail!("delivery to {sink} failed: {reason}");
    }
    Ok(())
}

async fn serve(cfg: SignalConfig, port: u16) -> Result<()> {
    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };
    let state = AppState::new(Pipeline::new(cfg));
    let app = api::router_with_metrics(state, metrics.as_ref());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await.context("http server")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_ref())?;

    match cli.command.unwrap_or(Command::Run { input: None }) {
        Command::Run { input } => run_once(cfg, input).await,
        Command::Serve { port } => serve(cfg, port).await,
    }
}
