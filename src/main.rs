use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fandom_activity_notifier::checkpoint::{CheckpointStore, MemoryCheckpointStore};
use fandom_activity_notifier::config::Config;
use fandom_activity_notifier::constants::USER_AGENT;
use fandom_activity_notifier::fandom::endpoint::EndpointClient;
use fandom_activity_notifier::fandom::wiki::Wiki;
use fandom_activity_notifier::{poller, transports};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting fandom-activity-notifier");

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(wikis = config.wikis.len(), "Configuration loaded");

    // One shared client; every endpoint client and transport clones it and
    // shares the underlying pool.
    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let store: Arc<dyn CheckpointStore> = Arc::new(MemoryCheckpointStore::new());
    let shutdown = CancellationToken::new();
    let started_at = Utc::now();

    let mut loops = Vec::with_capacity(config.wikis.len());
    for wiki_config in &config.wikis {
        let endpoint = EndpointClient::new(http.clone(), wiki_config.id, wiki_config.url.clone());
        let mut wiki = Wiki::new(endpoint, started_at);

        for transport_config in &wiki_config.transports {
            let kind = transport_config
                .parsed_kind()
                .context("Invalid transport in validated config")?;
            wiki.add_transport(transports::build(
                kind,
                transport_config.url.clone(),
                http.clone(),
            ));
        }

        info!(
            wiki = wiki.id,
            url = %wiki.url,
            transports = wiki.transport_count(),
            "Watching wiki"
        );

        loops.push(tokio::spawn(poller::poll_loop(
            wiki,
            Arc::clone(&store),
            config.poll_interval,
            shutdown.clone(),
        )));
    }

    shutdown_signal().await;

    info!("Shutting down...");
    shutdown.cancel();
    for handle in loops {
        let _ = handle.await;
    }

    info!("Shutdown complete");

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fandom_activity_notifier=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
