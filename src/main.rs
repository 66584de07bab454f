//! TripNavi HTTP server
//!
//! Starts an Axum web server for route planning, tourist-spot lookup, and
//! geocoding.

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tripnavi::{
    cli::{Cli, Command, generate_config_template},
    config::Config,
    handlers::{self, AppState},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(&path, template)?;
                eprintln!("Wrote configuration template to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let config = Arc::new(Config::from_file(&cli.config)?);

    telemetry::init(&config.observability.log_level);

    tracing::info!(
        config_path = %cli.config,
        model = %config.llm.model(),
        "Starting TripNavi server on {}:{}",
        config.server.host,
        config.server.port
    );

    let state = AppState::new(config.clone())?;
    let app = handlers::router(state);

    let ip = config.server.host.parse::<std::net::IpAddr>().map_err(|e| {
        format!(
            "server.host '{}' is not a valid IP address: {}",
            config.server.host, e
        )
    })?;
    let addr = SocketAddr::from((ip, config.server.port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
