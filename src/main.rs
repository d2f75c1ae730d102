//! Oraclescope HTTP server
//!
//! Starts an Axum web server answering per-validator oracle-voting health
//! scrapes against a configured blockchain node.

use axum::{Router, routing::get};
use clap::Parser;
use oraclescope::{
    cli::{Cli, Command, generate_config_template},
    config::Config,
    handlers,
    middleware::request_id_middleware,
    telemetry,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = &cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => std::fs::write(path, template)?,
            None => print!("{template}"),
        }
        return Ok(());
    }

    // Load configuration: file first (if given), then CLI flag overrides
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    // Initialize telemetry
    telemetry::init(&config.observability.log_level);

    tracing::info!(
        listen_address = %config.server.listen_address,
        node = %config.node.address,
        block_time = config.node.block_time,
        valoper_prefix = %config.node.valoper_prefix,
        log_level = %config.observability.log_level,
        "Started with following parameters"
    );

    let addr: SocketAddr = config.server.listen_address.parse()?;
    let state = handlers::AppState::new(Arc::new(config))?;

    // Build router
    let app = Router::new()
        .route("/metrics/general", get(handlers::oracle::handler))
        .route("/health", get(handlers::health::handler))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(address = %addr, "Listening");

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
