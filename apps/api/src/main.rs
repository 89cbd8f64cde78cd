mod config;
mod email;
mod errors;
mod llm_client;
mod profile;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Cli, Config};
use crate::llm_client::LlmClient;
use crate::profile::apify::ApifyClient;
use crate::profile::browser::{BrowserConfig, BrowserProfileFetcher};
use crate::profile::chrome::ChromeLauncher;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env(&cli)?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Outreach API v{}", env!("CARGO_PKG_VERSION"));

    // Missing credentials only disable the endpoints that need them
    if config.apify_api_token.is_none() {
        warn!("APIFY_API_TOKEN is not set; /scrape-linkedin will report a configuration error");
    }
    if config.google_api_key.is_none() {
        warn!("GOOGLE_API_KEY is not set; email generation will report a configuration error");
    }
    if config.linkedin.is_none() {
        warn!("LinkedIn credentials are not set; /scrape-linkedin-profile will report a configuration error");
    }

    let profiles = ApifyClient::new(config.apify_api_token.clone())?;

    let llm = LlmClient::new(config.google_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let browser = BrowserProfileFetcher::new(
        Arc::new(ChromeLauncher::new(config.chrome_path.clone())),
        BrowserConfig::default(),
        config.linkedin.clone(),
    );

    let state = AppState {
        profiles: Arc::new(profiles),
        browser,
        llm: Arc::new(llm),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
