use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use clip::cli::Args;
use clip::membership::handlers;
use clip::membership::service::MembershipService;
use clip::network;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, &args.log_format);

    let config = args.into_config();
    config.validate()?;

    let service = Arc::new(MembershipService::new(config.clone()));
    service.clone().start().await;

    info!("ID: {}", config.id);
    info!("Advertising as: {}", service.full_address());
    info!(
        "Discovery: broadcast enabled (UDP port {})",
        config.broadcast_port
    );
    if config.seed_nodes.is_empty() {
        info!("Seed nodes: none (auto-discovery via broadcast)");
    } else {
        info!("Seed nodes: {:?}", config.seed_nodes);
    }
    for ip in network::local_ipv4s() {
        info!("Detected network IP: {}", ip);
    }

    let app = handlers::router(service.clone());
    let bind_addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {}", bind_addr))?;
    info!("HTTP server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(service.clone()))
        .await?;

    info!("Service stopped");
    Ok(())
}

/// Resolves once ctrl-c arrives; tells every membership loop to wind down
/// before the HTTP server drains.
async fn shutdown_signal(service: Arc<MembershipService>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down service...");
    service.stop();
}

fn init_tracing(level: &str, format: &str) {
    let level = match level.to_lowercase().as_str() {
        "debug" => tracing::Level::DEBUG,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(level)
            .init();
    } else {
        tracing_subscriber::fmt().with_max_level(level).init();
    }
}
