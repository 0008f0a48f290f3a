//! Parla server binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Initialise tracing
//! 3. Build the OpenAI-compatible completion gateway
//! 4. Start the axum HTTP relay with session support

mod cli;

use std::sync::Arc;

use clap::Parser;
use parla_api::routes;
use parla_api::state::AppState;
use parla_chat::openai::OpenAiGateway;
use parla_core::config::ParlaConfig;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing is up so its log level can be honoured;
    // a load failure is reported right after.
    let config_file = args.resolve_config_path();
    let loaded = ParlaConfig::load_if_present(&config_file);
    let mut config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => ParlaConfig::default(),
    };

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    tracing::info!("Starting Parla v{}", env!("CARGO_PKG_VERSION"));

    match loaded {
        Ok(Some(_)) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Ok(None) => tracing::info!(path = %config_file.display(), "No config file, using defaults"),
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config. Using defaults."
        ),
    }

    // CLI/env overrides.
    config.general.host = args.resolve_host(&config.general.host);
    config.general.port = args.resolve_port(config.general.port);
    config.gateway.model = args.resolve_model(&config.gateway.model);

    // Completion gateway.
    let gateway = OpenAiGateway::from_config(&config.gateway)?;
    tracing::info!(
        model = %config.gateway.model,
        base_url = %config.gateway.base_url,
        credentials = gateway.has_credentials(),
        "Completion gateway ready"
    );

    let state = AppState::new(config.clone(), Arc::new(gateway))?;

    // === API server ===

    routes::start_server(&config, state, shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
