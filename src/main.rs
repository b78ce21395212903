//! Custom Domain Provisioner - HTTP service
//!
//! This is the composition root that wires together all the components.

use domain_provisioner::adapters::inbound::{ApiServer, ApiState};
use domain_provisioner::infrastructure::{shutdown_signal, ShutdownController};
use domain_provisioner::{build_provisioner, load_config};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting domain-provisioner listen={} base_domain={} step_timeout={}s",
        cfg.listen_addr,
        cfg.base_domain,
        cfg.step_timeout_secs
    );
    tracing::debug!("config: {:?}", cfg);

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters + application service
    let provisioner = Arc::new(build_provisioner(&cfg));

    // 2. Inbound adapter
    let state = ApiState::new(provisioner, cfg.serialize_inflight);
    let server = ApiServer::new(cfg.listen_addr.clone(), state);

    // 3. Shutdown on Ctrl+C / SIGTERM
    let shutdown = ShutdownController::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    server.run(shutdown).await
}
